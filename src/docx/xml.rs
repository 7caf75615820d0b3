//! Low-level XML event helpers shared by the document parsers.
//!
//! The splitters in this module's siblings work by re-emitting `quick-xml`
//! events as bytes, so that content the converter does not model round-trips
//! through load and save untouched.

use crate::docx::error::{DocxError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::io::BufRead;

/// Escape XML special characters.
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Append an opening (or self-closing) tag for `e`, preserving the qualified
/// name and the raw attribute bytes.
pub(crate) fn write_open_tag(out: &mut Vec<u8>, e: &BytesStart<'_>, self_closing: bool) {
    out.push(b'<');
    out.extend_from_slice(e.name().as_ref());
    for attr in e.attributes().flatten() {
        out.push(b' ');
        out.extend_from_slice(attr.key.as_ref());
        out.extend_from_slice(b"=\"");
        out.extend_from_slice(&attr.value);
        out.push(b'"');
    }
    if self_closing {
        out.extend_from_slice(b"/>");
    } else {
        out.push(b'>');
    }
}

/// Append the raw byte form of `event`.
///
/// `Eof` appends nothing; callers terminate their loops on it.
pub(crate) fn write_event(out: &mut Vec<u8>, event: &Event<'_>) {
    match event {
        Event::Start(e) => write_open_tag(out, e, false),
        Event::Empty(e) => write_open_tag(out, e, true),
        Event::End(e) => {
            out.extend_from_slice(b"</");
            out.extend_from_slice(e.name().as_ref());
            out.push(b'>');
        },
        Event::Text(e) => out.extend_from_slice(e.as_ref()),
        Event::GeneralRef(e) => {
            out.push(b'&');
            out.extend_from_slice(e.as_ref());
            out.push(b';');
        },
        Event::CData(e) => {
            out.extend_from_slice(b"<![CDATA[");
            out.extend_from_slice(e.as_ref());
            out.extend_from_slice(b"]]>");
        },
        Event::Comment(e) => {
            out.extend_from_slice(b"<!--");
            out.extend_from_slice(e.as_ref());
            out.extend_from_slice(b"-->");
        },
        Event::Decl(e) => {
            out.extend_from_slice(b"<?xml");
            if let Ok(version) = e.version() {
                out.extend_from_slice(b" version=\"");
                out.extend_from_slice(&version);
                out.push(b'"');
            }
            if let Some(Ok(encoding)) = e.encoding() {
                out.extend_from_slice(b" encoding=\"");
                out.extend_from_slice(&encoding);
                out.push(b'"');
            }
            if let Some(Ok(standalone)) = e.standalone() {
                out.extend_from_slice(b" standalone=\"");
                out.extend_from_slice(&standalone);
                out.push(b'"');
            }
            out.extend_from_slice(b"?>");
        },
        Event::PI(e) => {
            out.extend_from_slice(b"<?");
            out.extend_from_slice(e.as_ref());
            out.extend_from_slice(b"?>");
        },
        Event::DocType(e) => {
            out.extend_from_slice(b"<!DOCTYPE ");
            out.extend_from_slice(e.as_ref());
            out.push(b'>');
        },
        Event::Eof => {},
    }
}

/// Capture a whole element subtree as bytes, starting from its already-read
/// opening tag and consuming events through the matching end tag.
pub(crate) fn capture_element<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart<'_>,
    out: &mut Vec<u8>,
) -> Result<()> {
    write_open_tag(out, start, false);

    let mut depth = 1usize;
    let mut buf = Vec::with_capacity(512);

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                write_open_tag(out, e, false);
            },
            Ok(Event::End(ref e)) => {
                out.extend_from_slice(b"</");
                out.extend_from_slice(e.name().as_ref());
                out.push(b'>');
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            },
            Ok(Event::Eof) => {
                return Err(DocxError::Xml(format!(
                    "unexpected end of XML inside <{}>",
                    String::from_utf8_lossy(start.name().as_ref())
                )));
            },
            Ok(ref event) => write_event(out, event),
            Err(e) => return Err(DocxError::Xml(e.to_string())),
        }
        buf.clear();
    }
}

/// Resolve a general entity reference (`amp`, `#34`, `#x10D0`, ...) to its
/// character.
pub(crate) fn resolve_reference(name: &[u8]) -> Option<char> {
    match name {
        b"amp" => Some('&'),
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"quot" => Some('"'),
        b"apos" => Some('\''),
        [b'#', digits @ ..] => {
            let code = match digits {
                [b'x' | b'X', hex @ ..] => {
                    u32::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok()?
                },
                _ => std::str::from_utf8(digits).ok()?.parse().ok()?,
            };
            char::from_u32(code)
        },
        _ => None,
    }
}
