//! Group Conditions
//!
//! Parsing, writing and comparing the multi-variable equality conditions
//! that guard property and item groups, e.g.
//! `'$(Configuration)|$(Platform)' == 'Debug|AnyCPU'`.

mod error;
mod grammar;
mod set;

pub use error::ConditionError;
pub use grammar::{parse_conditions, serialize_conditions};
pub use set::{Condition, ConditionSet};
