//! Document - the parsed form of the main document part.
use crate::docx::error::{DocxError, Result};
use crate::docx::paragraph::Paragraph;
use crate::docx::table::Table;
use crate::docx::xml::{write_event, write_open_tag};
use quick_xml::Reader;
use quick_xml::events::Event;

/// A block-level node of the document body.
///
/// Direct children of `<w:body>` become Paragraph or Table nodes. Everything
/// else (the XML prolog, the `<w:document>`/`<w:body>` envelope, section
/// properties, structured document tags) is preserved as Raw bytes.
#[derive(Debug, Clone)]
pub enum BodyNode {
    Paragraph(Paragraph),
    Table(Table),
    Raw(Vec<u8>),
}

/// The parsed main document part of a Word document.
///
/// Corresponds to `word/document.xml`. Provides the two ordered views used
/// by the converter: top-level paragraphs and top-level tables. Content the
/// converter does not model re-serializes exactly as captured.
///
/// # Example
///
/// ```rust,ignore
/// let mut document = Document::parse(package.document_xml()?)?;
/// for para in document.paragraphs() {
///     println!("Paragraph: {}", para.text()?);
/// }
/// package.set_document_xml(document.to_xml())?;
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<BodyNode>,
}

impl Document {
    /// Parse the document part in a single streaming pass.
    ///
    /// Only direct children of `<w:body>` are split into Paragraph/Table
    /// nodes; a `<w:p>` nested anywhere deeper (inside a structured document
    /// tag, for instance) stays raw.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);

        let mut nodes = Vec::new();
        let mut raw: Vec<u8> = Vec::new();
        let mut depth = 0usize;
        let mut buf = Vec::with_capacity(2048);

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let name = e.local_name();
                    if depth == 2 && name.as_ref() == b"p" {
                        flush_raw(&mut nodes, &mut raw);
                        nodes.push(BodyNode::Paragraph(Paragraph::parse(&mut reader, e)?));
                    } else if depth == 2 && name.as_ref() == b"tbl" {
                        flush_raw(&mut nodes, &mut raw);
                        nodes.push(BodyNode::Table(Table::parse(&mut reader, e)?));
                    } else {
                        write_open_tag(&mut raw, e, false);
                        depth += 1;
                    }
                },
                Ok(Event::Empty(ref e)) => {
                    if depth == 2 && e.local_name().as_ref() == b"p" {
                        flush_raw(&mut nodes, &mut raw);
                        nodes.push(BodyNode::Paragraph(Paragraph::from_empty(e)));
                    } else {
                        write_open_tag(&mut raw, e, true);
                    }
                },
                Ok(Event::End(ref e)) => {
                    depth = depth.saturating_sub(1);
                    raw.extend_from_slice(b"</");
                    raw.extend_from_slice(e.name().as_ref());
                    raw.push(b'>');
                },
                Ok(Event::Eof) => break,
                Ok(ref event) => write_event(&mut raw, event),
                Err(e) => return Err(DocxError::Xml(e.to_string())),
            }
            buf.clear();
        }

        flush_raw(&mut nodes, &mut raw);
        Ok(Self { nodes })
    }

    /// Serialize the document part back to XML bytes.
    pub fn to_xml(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4096);
        for node in &self.nodes {
            match node {
                BodyNode::Paragraph(paragraph) => paragraph.to_xml(&mut out),
                BodyNode::Table(table) => table.to_xml(&mut out),
                BodyNode::Raw(bytes) => out.extend_from_slice(bytes),
            }
        }
        out
    }

    /// Get the body nodes, in document order.
    pub fn nodes(&self) -> &[BodyNode] {
        &self.nodes
    }

    /// Iterate over the top-level paragraphs, in document order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.nodes.iter().filter_map(|node| match node {
            BodyNode::Paragraph(paragraph) => Some(paragraph),
            _ => None,
        })
    }

    /// Iterate mutably over the top-level paragraphs, in document order.
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.nodes.iter_mut().filter_map(|node| match node {
            BodyNode::Paragraph(paragraph) => Some(paragraph),
            _ => None,
        })
    }

    /// Iterate over the top-level tables, in document order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.nodes.iter().filter_map(|node| match node {
            BodyNode::Table(table) => Some(table),
            _ => None,
        })
    }

    /// Iterate mutably over the top-level tables, in document order.
    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.nodes.iter_mut().filter_map(|node| match node {
            BodyNode::Table(table) => Some(table),
            _ => None,
        })
    }

    /// Get the number of top-level paragraphs.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    /// Get the number of top-level tables.
    pub fn table_count(&self) -> usize {
        self.tables().count()
    }
}

fn flush_raw(nodes: &mut Vec<BodyNode>, raw: &mut Vec<u8>) {
    if !raw.is_empty() {
        nodes.push(BodyNode::Raw(std::mem::take(raw)));
    }
}
