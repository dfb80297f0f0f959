//! Error types for project documents

use thiserror::Error;

/// Errors that can occur while reading, writing or editing a project document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Reading or writing the file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The XML parser or writer failed
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Input has no element at all
    #[error("Document has no root element")]
    MissingRoot,

    /// Root element is not `<Project>`
    #[error("Unexpected root element <{0}>, expected <Project>")]
    InvalidRoot(String),

    /// Structurally broken input, e.g. unbalanced tags
    #[error("Malformed XML: {0}")]
    Malformed(String),

    /// The ref belongs to another document
    #[error("child of current project required")]
    ForeignNode,

    /// The ref points at a removed element
    #[error("Element is not attached to the document")]
    Detached,

    /// The root, or an element without a parent, used as a sibling anchor
    #[error("Element cannot be used as an insertion anchor")]
    InvalidAnchor,

    /// An edit expected a different element kind
    #[error("Expected <{expected}> element, found <{found}>")]
    WrongKind {
        /// Required element name
        expected: String,
        /// Actual element name
        found: String,
    },

    /// Save without a path
    #[error("Document has no file path")]
    NoPath,
}
