//! Error types for a conversion invocation.
use crate::docx::DocxError;
use thiserror::Error;

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// The failure kinds of a conversion invocation.
///
/// All four are terminal: no retries, no partial output. Unmapped characters
/// are never errors; the character map falls back to identity.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// No input path was supplied
    #[error("no input file was selected")]
    InputMissing,

    /// The input could not be opened or parsed as a .docx document
    #[error("failed to load document: {0}")]
    Load(#[source] DocxError),

    /// The in-memory document could not be traversed or rewritten
    #[error("conversion failed: {0}")]
    Conversion(#[source] DocxError),

    /// The output could not be written
    #[error("failed to save document: {0}")]
    Save(#[source] DocxError),
}
