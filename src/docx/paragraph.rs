//! Paragraph and Run structures for Word documents.
use crate::docx::error::{DocxError, Result};
use crate::docx::xml::{capture_element, escape_xml, resolve_reference, write_event, write_open_tag};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smallvec::SmallVec;
use std::io::BufRead;

/// The four script-slot attributes of `<w:rFonts>` rewritten on conversion.
const FONT_SLOTS: [&str; 4] = ["w:ascii", "w:hAnsi", "w:eastAsia", "w:cs"];

/// A direct child of a paragraph.
///
/// Only direct `<w:r>` children are modelled as runs; paragraph properties,
/// hyperlinks, and any other content are kept as raw XML so they round-trip
/// unchanged through load and save.
#[derive(Debug, Clone)]
pub enum ParagraphChild {
    /// A `<w:r>` element
    Run(Run),
    /// Any other content, preserved verbatim
    Raw(Vec<u8>),
}

/// A paragraph in a Word document.
///
/// Represents a `<w:p>` element. Paragraphs contain runs which in turn
/// contain the actual text and formatting.
#[derive(Debug, Clone)]
pub struct Paragraph {
    /// The opening tag bytes, or the whole element when self-closing
    open_tag: Vec<u8>,
    /// Qualified element name, for the closing tag
    name: Vec<u8>,
    /// Ordered children
    children: SmallVec<[ParagraphChild; 8]>,
    /// Whether the source element was self-closing (`<w:p/>`)
    self_closing: bool,
}

impl Paragraph {
    /// Parse a paragraph from a reader positioned just past its opening tag.
    pub(crate) fn parse<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart<'_>) -> Result<Self> {
        let mut open_tag = Vec::with_capacity(64);
        write_open_tag(&mut open_tag, start, false);
        let name = start.name().as_ref().to_vec();

        let mut children: SmallVec<[ParagraphChild; 8]> = SmallVec::new();
        let mut raw: Vec<u8> = Vec::new();
        let mut buf = Vec::with_capacity(512);

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"r" {
                        flush_raw(&mut children, &mut raw);
                        let mut xml = Vec::with_capacity(256);
                        capture_element(reader, e, &mut xml)?;
                        children.push(ParagraphChild::Run(Run::new(xml)));
                    } else {
                        // pPr, hyperlinks, fields: whole subtree kept verbatim
                        capture_element(reader, e, &mut raw)?;
                    }
                },
                Ok(Event::Empty(ref e)) => {
                    if e.local_name().as_ref() == b"r" {
                        flush_raw(&mut children, &mut raw);
                        let mut xml = Vec::with_capacity(32);
                        write_open_tag(&mut xml, e, true);
                        children.push(ParagraphChild::Run(Run::new(xml)));
                    } else {
                        write_open_tag(&mut raw, e, true);
                    }
                },
                Ok(Event::End(_)) => {
                    // all child subtrees are consumed above, so this closes the paragraph
                    flush_raw(&mut children, &mut raw);
                    return Ok(Self {
                        open_tag,
                        name,
                        children,
                        self_closing: false,
                    });
                },
                Ok(Event::Eof) => {
                    return Err(DocxError::Xml("unexpected end of XML inside paragraph".into()));
                },
                Ok(ref event) => write_event(&mut raw, event),
                Err(e) => return Err(DocxError::Xml(e.to_string())),
            }
            buf.clear();
        }
    }

    /// Build a paragraph from a self-closing `<w:p/>` element.
    pub(crate) fn from_empty(start: &BytesStart<'_>) -> Self {
        let mut open_tag = Vec::with_capacity(32);
        write_open_tag(&mut open_tag, start, true);
        Self {
            open_tag,
            name: start.name().as_ref().to_vec(),
            children: SmallVec::new(),
            self_closing: true,
        }
    }

    /// Append this paragraph's XML to `out`.
    pub(crate) fn to_xml(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.open_tag);
        if self.self_closing {
            return;
        }
        for child in &self.children {
            match child {
                ParagraphChild::Run(run) => out.extend_from_slice(run.xml()),
                ParagraphChild::Raw(bytes) => out.extend_from_slice(bytes),
            }
        }
        out.extend_from_slice(b"</");
        out.extend_from_slice(&self.name);
        out.push(b'>');
    }

    /// Iterate over the runs of this paragraph, in order.
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.children.iter().filter_map(|child| match child {
            ParagraphChild::Run(run) => Some(run),
            ParagraphChild::Raw(_) => None,
        })
    }

    /// Iterate mutably over the runs of this paragraph, in order.
    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        self.children.iter_mut().filter_map(|child| match child {
            ParagraphChild::Run(run) => Some(run),
            ParagraphChild::Raw(_) => None,
        })
    }

    /// Get the number of runs in this paragraph.
    pub fn run_count(&self) -> usize {
        self.runs().count()
    }

    /// Get the text content of this paragraph.
    ///
    /// Concatenates all text from all runs in the paragraph.
    pub fn text(&self) -> Result<String> {
        let mut result = String::new();
        for run in self.runs() {
            result.push_str(&run.text()?);
        }
        Ok(result)
    }
}

fn flush_raw(children: &mut SmallVec<[ParagraphChild; 8]>, raw: &mut Vec<u8>) {
    if !raw.is_empty() {
        children.push(ParagraphChild::Raw(std::mem::take(raw)));
    }
}

/// A run within a paragraph.
///
/// Represents a `<w:r>` element: the smallest span of text sharing one set of
/// formatting properties. The run holds its raw XML bytes; accessors parse
/// them on demand and mutators rewrite them, so an untouched run
/// re-serializes exactly as captured.
#[derive(Debug, Clone)]
pub struct Run {
    /// The raw XML bytes for this run
    xml: Vec<u8>,
}

impl Run {
    /// Create a new Run from XML bytes.
    pub fn new(xml: Vec<u8>) -> Self {
        Self { xml }
    }

    /// Get the raw XML bytes of this run.
    #[inline]
    pub fn xml(&self) -> &[u8] {
        &self.xml
    }

    /// Get the font name declared by this run.
    ///
    /// Reads the `w:ascii` attribute of `<w:rFonts>` in the run's own
    /// properties. Returns `None` if the run declares no font of its own
    /// (inherits from its style). Properties of runs nested deeper (inside a
    /// drawing's text box, for instance) do not count.
    pub fn font_name(&self) -> Result<Option<String>> {
        let mut reader = Reader::from_reader(&self.xml[..]);

        let mut depth = 0usize;
        let mut in_r_pr = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let name = e.local_name();
                    if depth == 1 && name.as_ref() == b"rPr" {
                        in_r_pr = true;
                    } else if in_r_pr && depth == 2 && name.as_ref() == b"rFonts" {
                        return r_fonts_ascii(e);
                    }
                    depth += 1;
                },
                Ok(Event::Empty(ref e)) => {
                    if in_r_pr && depth == 2 && e.local_name().as_ref() == b"rFonts" {
                        return r_fonts_ascii(e);
                    }
                },
                Ok(Event::End(ref e)) => {
                    depth = depth.saturating_sub(1);
                    if in_r_pr && depth == 1 && e.local_name().as_ref() == b"rPr" {
                        // the run's own properties carry no font declaration
                        return Ok(None);
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(DocxError::Xml(e.to_string())),
                _ => {},
            }
            buf.clear();
        }

        Ok(None)
    }

    /// Get the text content of this run.
    ///
    /// Extracts text from the run's own `<w:t>` elements and converts
    /// special characters:
    /// - `<w:tab/>` → tab character
    /// - `<w:br/>` → newline character
    pub fn text(&self) -> Result<String> {
        let mut reader = Reader::from_reader(&self.xml[..]);
        let decoder = reader.decoder();

        let mut result = String::with_capacity(self.xml.len() / 8);
        let mut depth = 0usize;
        let mut in_text_element = false;
        let mut buf = Vec::with_capacity(256);

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    if depth == 1 && e.local_name().as_ref() == b"t" {
                        in_text_element = true;
                    }
                    depth += 1;
                },
                Ok(Event::Empty(ref e)) => {
                    if depth == 1 {
                        let name = e.local_name();
                        if name.as_ref() == b"tab" {
                            result.push('\t');
                        } else if name.as_ref() == b"br" {
                            result.push('\n');
                        }
                    }
                },
                Ok(Event::Text(ref e)) if in_text_element => {
                    let text = decoder
                        .decode(e.as_ref())
                        .map_err(|e| DocxError::Xml(e.to_string()))?;
                    let text = quick_xml::escape::unescape(&text)
                        .map_err(|e| DocxError::Xml(e.to_string()))?;
                    result.push_str(&text);
                },
                Ok(Event::GeneralRef(ref e)) if in_text_element => {
                    if let Some(c) = resolve_reference(e.as_ref()) {
                        result.push(c);
                    }
                },
                Ok(Event::End(ref e)) => {
                    depth = depth.saturating_sub(1);
                    if depth == 1 && e.local_name().as_ref() == b"t" {
                        in_text_element = false;
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(DocxError::Xml(e.to_string())),
                _ => {},
            }
            buf.clear();
        }

        Ok(result)
    }

    /// Rewrite the text of this run character by character.
    ///
    /// Every one of the run's own `<w:t>` segments is mapped through `map`
    /// in place; the element's attributes (`xml:space` in particular) and
    /// everything else in the run are preserved. Tabs and breaks are
    /// structural elements and pass through untouched.
    pub fn map_text(&mut self, map: impl Fn(char) -> char) -> Result<()> {
        let mut reader = Reader::from_reader(&self.xml[..]);
        let decoder = reader.decoder();

        let mut out = Vec::with_capacity(self.xml.len() + 64);
        let mut depth = 0usize;
        let mut in_text_element = false;
        let mut buf = Vec::with_capacity(256);

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    if depth == 1 && e.local_name().as_ref() == b"t" {
                        in_text_element = true;
                    }
                    depth += 1;
                    write_open_tag(&mut out, e, false);
                },
                Ok(Event::Text(ref e)) if in_text_element => {
                    let text = decoder
                        .decode(e.as_ref())
                        .map_err(|e| DocxError::Xml(e.to_string()))?;
                    let text = quick_xml::escape::unescape(&text)
                        .map_err(|e| DocxError::Xml(e.to_string()))?;
                    let mapped: String = text.chars().map(&map).collect();
                    out.extend_from_slice(escape_xml(&mapped).as_bytes());
                },
                Ok(Event::GeneralRef(ref e)) if in_text_element => {
                    match resolve_reference(e.as_ref()) {
                        Some(c) => {
                            let mapped: String = std::iter::once(map(c)).collect();
                            out.extend_from_slice(escape_xml(&mapped).as_bytes());
                        },
                        None => {
                            out.push(b'&');
                            out.extend_from_slice(e.as_ref());
                            out.push(b';');
                        },
                    }
                },
                Ok(Event::End(ref e)) => {
                    depth = depth.saturating_sub(1);
                    if depth == 1 && e.local_name().as_ref() == b"t" {
                        in_text_element = false;
                    }
                    out.extend_from_slice(b"</");
                    out.extend_from_slice(e.name().as_ref());
                    out.push(b'>');
                },
                Ok(Event::Eof) => break,
                Ok(ref event) => write_event(&mut out, event),
                Err(e) => return Err(DocxError::Xml(e.to_string())),
            }
            buf.clear();
        }

        self.xml = out;
        Ok(())
    }

    /// Set all four script-slot font names of this run.
    ///
    /// Rewrites `w:ascii`, `w:hAnsi`, `w:eastAsia` and `w:cs` on the run's
    /// `<w:rFonts>` element to `font`, creating `<w:rPr>` and `<w:rFonts>`
    /// when absent. Other `<w:rFonts>` attributes and every other run
    /// property (size, weight, style, color) are left untouched. Applying
    /// the same font twice is a no-op.
    pub fn set_fonts(&mut self, font: &str) -> Result<()> {
        let (has_r_pr, has_r_fonts) = self.scan_font_structure()?;

        let mut reader = Reader::from_reader(&self.xml[..]);
        let mut out = Vec::with_capacity(self.xml.len() + 96);
        let mut buf = Vec::with_capacity(256);
        let mut depth = 0usize;
        let mut in_r_pr = false;
        let mut drop_r_fonts_end = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let name = e.local_name();
                    if depth == 0 {
                        // the <w:r> element itself; rPr must be its first child
                        write_open_tag(&mut out, e, false);
                        if !has_r_pr {
                            out.extend_from_slice(b"<w:rPr>");
                            write_r_fonts(&mut out, font, None);
                            out.extend_from_slice(b"</w:rPr>");
                        }
                    } else if depth == 1 && name.as_ref() == b"rPr" {
                        write_open_tag(&mut out, e, false);
                        in_r_pr = true;
                        if !has_r_fonts {
                            write_r_fonts(&mut out, font, None);
                        }
                    } else if in_r_pr && depth == 2 && name.as_ref() == b"rFonts" {
                        write_r_fonts(&mut out, font, Some(e));
                        drop_r_fonts_end = true;
                    } else {
                        write_open_tag(&mut out, e, false);
                    }
                    depth += 1;
                },
                Ok(Event::Empty(ref e)) => {
                    let name = e.local_name();
                    if depth == 1 && name.as_ref() == b"rPr" {
                        // run properties with no children at all
                        write_open_tag(&mut out, e, false);
                        write_r_fonts(&mut out, font, None);
                        out.extend_from_slice(b"</");
                        out.extend_from_slice(e.name().as_ref());
                        out.push(b'>');
                    } else if in_r_pr && depth == 2 && name.as_ref() == b"rFonts" {
                        write_r_fonts(&mut out, font, Some(e));
                    } else {
                        write_open_tag(&mut out, e, true);
                    }
                },
                Ok(Event::End(ref e)) => {
                    depth = depth.saturating_sub(1);
                    if drop_r_fonts_end && e.local_name().as_ref() == b"rFonts" {
                        // already rewritten as a self-closing element
                        drop_r_fonts_end = false;
                        buf.clear();
                        continue;
                    }
                    if in_r_pr && depth == 1 && e.local_name().as_ref() == b"rPr" {
                        in_r_pr = false;
                    }
                    out.extend_from_slice(b"</");
                    out.extend_from_slice(e.name().as_ref());
                    out.push(b'>');
                },
                Ok(Event::Eof) => break,
                Ok(ref event) => write_event(&mut out, event),
                Err(e) => return Err(DocxError::Xml(e.to_string())),
            }
            buf.clear();
        }

        self.xml = out;
        Ok(())
    }

    /// Check whether the run already has its own `<w:rPr>` and `<w:rFonts>`
    /// elements.
    fn scan_font_structure(&self) -> Result<(bool, bool)> {
        let mut reader = Reader::from_reader(&self.xml[..]);

        let mut has_r_pr = false;
        let mut has_r_fonts = false;
        let mut depth = 0usize;
        let mut in_r_pr = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let name = e.local_name();
                    if depth == 1 && name.as_ref() == b"rPr" {
                        has_r_pr = true;
                        in_r_pr = true;
                    } else if in_r_pr && depth == 2 && name.as_ref() == b"rFonts" {
                        has_r_fonts = true;
                    }
                    depth += 1;
                },
                Ok(Event::Empty(ref e)) => {
                    let name = e.local_name();
                    if depth == 1 && name.as_ref() == b"rPr" {
                        has_r_pr = true;
                    } else if in_r_pr && depth == 2 && name.as_ref() == b"rFonts" {
                        has_r_fonts = true;
                    }
                },
                Ok(Event::End(ref e)) => {
                    depth = depth.saturating_sub(1);
                    if in_r_pr && depth == 1 && e.local_name().as_ref() == b"rPr" {
                        break;
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(DocxError::Xml(e.to_string())),
                _ => {},
            }
            buf.clear();
        }

        Ok((has_r_pr, has_r_fonts))
    }
}

/// Read the `w:ascii` attribute of an `<w:rFonts>` element.
fn r_fonts_ascii(e: &BytesStart<'_>) -> Result<Option<String>> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"ascii" {
            let value = attr
                .unescape_value()
                .map_err(|e| DocxError::Xml(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Write a `<w:rFonts/>` element with all four script slots set to `font`.
///
/// Attributes of `original` other than the four slots are carried over.
fn write_r_fonts(out: &mut Vec<u8>, font: &str, original: Option<&BytesStart<'_>>) {
    out.extend_from_slice(b"<w:rFonts");
    if let Some(e) = original {
        for attr in e.attributes().flatten() {
            if !matches!(
                attr.key.local_name().as_ref(),
                b"ascii" | b"hAnsi" | b"eastAsia" | b"cs"
            ) {
                out.push(b' ');
                out.extend_from_slice(attr.key.as_ref());
                out.extend_from_slice(b"=\"");
                out.extend_from_slice(&attr.value);
                out.push(b'"');
            }
        }
    }
    let escaped = escape_xml(font);
    for slot in FONT_SLOTS {
        out.push(b' ');
        out.extend_from_slice(slot.as_bytes());
        out.extend_from_slice(b"=\"");
        out.extend_from_slice(escaped.as_bytes());
        out.push(b'"');
    }
    out.extend_from_slice(b"/>");
}
