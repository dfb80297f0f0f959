//! # projkit Core Library
//!
//! Loading, editing and cloning MSBuild-style project files.
//!
//! This library provides:
//! - Group condition parsing and serialization
//! - An editable project document with typed views over groups and items
//! - An evaluated view of project properties
//! - A registry of loaded projects with cloning and include rebasing
//!
//! ## Example
//!
//! ```rust,no_run
//! use projkit_core::prelude::*;
//!
//! # fn main() -> Result<(), ProjectError> {
//! let mut registry = ProjectRegistry::new();
//! let source = registry.load("C:/Proj/A/A.csproj")?;
//!
//! // Copy to a sibling directory; compile includes are rewritten
//! let copy = registry.clone_project(&source, "C:/Proj/B/B.csproj", false)?;
//! copy.borrow_mut().save()?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

pub mod condition;
pub mod document;
pub mod project;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::condition::{Condition, ConditionError, ConditionSet};
    pub use crate::document::{
        DocumentError, ElementRef, Evaluation, Item, ItemGroup, ProjectDocument, Property,
        PropertyGroup,
    };
    pub use crate::project::{
        Project, ProjectConventions, ProjectError, ProjectHandle, ProjectRegistry,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
