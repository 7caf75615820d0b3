//! nusx2geo - convert AcadNusx glyph-encoded Word documents to Unicode Georgian
//!
//! AcadNusx is a legacy font scheme in which ordinary Latin keycodes render
//! as Georgian glyph shapes, so documents written under it carry Latin code
//! points and are unsearchable, unportable and tied to one font. This
//! library rewrites such documents in place: every run of a .docx file that
//! declares the AcadNusx font gets its text transliterated to Unicode
//! Georgian and its font set to Sylfaen, while every other run and every
//! other byte of the package is left exactly as it was.
//!
//! # Example - Converting a file
//!
//! ```no_run
//! use std::path::Path;
//!
//! # fn main() -> Result<(), nusx2geo::ConvertError> {
//! let output = nusx2geo::convert_file(
//!     Some(Path::new("letter.docx")),
//!     None,
//!     nusx2geo::LEGACY_FONT,
//!     nusx2geo::REPLACEMENT_FONT,
//! )?;
//! println!("Saved as: {}", output.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Working with a loaded document
//!
//! ```no_run
//! use nusx2geo::docx::{Document, Package};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut package = Package::open("letter.docx")?;
//! let mut document = Document::parse(package.document_xml()?)?;
//!
//! let converted =
//!     nusx2geo::convert_document(&mut document, nusx2geo::LEGACY_FONT, nusx2geo::REPLACEMENT_FONT)?;
//! println!("{} runs converted", converted);
//!
//! package.set_document_xml(document.to_xml())?;
//! package.save("letter-converted.docx")?;
//! # Ok(())
//! # }
//! ```

/// Selective transliteration over a loaded document
pub mod convert;

/// Word (.docx) container support
pub mod docx;

/// Error types for a conversion invocation
pub mod error;

/// AcadNusx to Unicode Georgian character mapping
pub mod mapping;

// Re-export commonly used items for convenience
pub use convert::{LEGACY_FONT, OUTPUT_SUFFIX, REPLACEMENT_FONT, convert_document, convert_file};
pub use error::{ConvertError, Result};
