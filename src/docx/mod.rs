/// Word (.docx) container support.
///
/// A .docx file is a ZIP archive whose main content lives in the
/// `word/document.xml` part. This module loads the archive, splits the
/// document part into the block structure the converter walks (paragraphs,
/// and tables containing rows, cells and paragraphs), and writes everything
/// back. Content outside that structure (other parts, unrecognized body
/// elements, run content that is not text) round-trips byte-for-byte.
///
/// # Architecture
///
/// - `Package`: the .docx archive, an ordered list of named entries
/// - `Document`: the parsed main document part
/// - `Paragraph`/`Run`: text containers, the unit the converter rewrites
/// - `Table`/`Row`/`Cell`: the table hierarchy down to nested paragraphs
pub mod document;
pub mod error;
pub mod package;
pub mod paragraph;
pub mod table;
pub(crate) mod xml;

pub use document::{BodyNode, Document};
pub use error::{DocxError, Result};
pub use package::{DOCUMENT_PART, Package};
pub use paragraph::{Paragraph, Run};
pub use table::{Cell, Row, Table};
