//! Error types for condition parsing

use thiserror::Error;

/// Errors that can occur while parsing or building condition sets
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    /// Text is not a `'$(A)|$(B)' == 'x|y'` equality
    #[error("invalid condition text: {0}")]
    InvalidConditionText(String),

    /// A name is not a plain identifier
    #[error("invalid configuration name: {0}")]
    InvalidConfigurationName(String),

    /// Names and values differ in number
    #[error("count mismatch: {names} name(s) but {values} value(s)")]
    CountMismatch {
        /// Names on the left-hand side
        names: usize,
        /// Values on the right-hand side
        values: usize,
    },

    /// A value contains `'` or `|`
    #[error("invalid condition value: {0}")]
    InvalidConditionValue(String),

    /// A set needs at least one condition
    #[error("empty condition set")]
    EmptyConditionSet,

    /// The same name appears twice in one set
    #[error("duplicate condition name: {0}")]
    DuplicateName(String),

    /// Lookup of a name the set does not contain
    #[error("condition not found: {0}")]
    KeyNotFound(String),
}
