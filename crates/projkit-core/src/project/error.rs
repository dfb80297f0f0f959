//! Error types for project management

use std::path::PathBuf;

use thiserror::Error;

use crate::condition::ConditionError;
use crate::document::DocumentError;

/// Errors that can occur while loading, cloning or saving projects
#[derive(Error, Debug)]
pub enum ProjectError {
    /// A caller-supplied value was unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Clone target is already registered
    #[error("Project is already loaded: {0}")]
    AlreadyLoaded(PathBuf),

    /// Clone target exists on disk
    #[error("Project file already exists: {0}")]
    AlreadyExists(PathBuf),

    /// The instance to replace is borrowed through its handle
    #[error("Project is in use and cannot be replaced: {0}")]
    InUse(PathBuf),

    /// The project was unloaded
    #[error("Project has been unloaded")]
    Disposed,

    /// Document failure
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Condition failure
    #[error(transparent)]
    Condition(#[from] ConditionError),

    /// File system failure outside document I/O
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Conventions JSON could not be read
    #[error("Invalid conventions file: {0}")]
    Config(#[from] serde_json::Error),
}

impl ProjectError {
    /// Whether the error is a refused operation rather than a failure
    /// (target already loaded, already on disk, or borrowed elsewhere)
    pub fn is_invalid_operation(&self) -> bool {
        matches!(
            self,
            Self::AlreadyLoaded(_) | Self::AlreadyExists(_) | Self::InUse(_)
        )
    }
}
