//! Error types for .docx package operations.
use thiserror::Error;

/// Result type for .docx package operations.
pub type Result<T> = std::result::Result<T, DocxError>;

/// Error types for .docx package operations.
#[derive(Error, Debug)]
pub enum DocxError {
    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Part not found
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for DocxError {
    fn from(err: quick_xml::Error) -> Self {
        DocxError::Xml(err.to_string())
    }
}
