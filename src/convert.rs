//! Selective transliteration of AcadNusx runs across a document.
//!
//! The walker visits every run of every top-level paragraph, then every run
//! of every paragraph inside every table cell, in document order. A run is
//! rewritten if and only if it declares the legacy font and carries text;
//! everything else passes through untouched. The whole conversion is one
//! synchronous pass: load, traverse and mutate, then save. The output file
//! is only written after the full traversal has succeeded.

use crate::docx::{self, Document, Package, Paragraph, Run};
use crate::error::{ConvertError, Result};
use crate::mapping;
use std::path::{Path, PathBuf};

/// Registered name of the legacy glyph font that gates conversion.
pub const LEGACY_FONT: &str = "AcadNusx";

/// Unicode-aware font applied to converted runs.
pub const REPLACEMENT_FONT: &str = "Sylfaen";

/// Suffix appended to the input base name when no output name is given.
pub const OUTPUT_SUFFIX: &str = "-converted";

const DOCX_EXTENSION: &str = ".docx";

/// Convert a single run in place if it qualifies.
///
/// The run must declare exactly `legacy_font` (no normalization) and have
/// non-empty text; otherwise it is left completely untouched, font fields
/// included. On conversion the text is mapped character by character and all
/// four script-slot font names are set to `replacement_font`.
///
/// Returns whether the run was converted.
pub fn process_run(run: &mut Run, legacy_font: &str, replacement_font: &str) -> docx::Result<bool> {
    if run.font_name()?.as_deref() != Some(legacy_font) {
        return Ok(false);
    }
    if run.text()?.is_empty() {
        return Ok(false);
    }
    run.map_text(mapping::map_char)?;
    run.set_fonts(replacement_font)?;
    Ok(true)
}

fn process_paragraph(
    paragraph: &mut Paragraph,
    legacy_font: &str,
    replacement_font: &str,
) -> docx::Result<usize> {
    let mut converted = 0;
    for run in paragraph.runs_mut() {
        if process_run(run, legacy_font, replacement_font)? {
            converted += 1;
        }
    }
    Ok(converted)
}

/// Convert every qualifying run of the document in place.
///
/// Two passes in structural order: the top-level paragraphs, then the tables
/// (rows, cells, cell paragraphs). Tables nested inside a cell are not
/// descended into. Returns the number of converted runs.
pub fn convert_document(
    document: &mut Document,
    legacy_font: &str,
    replacement_font: &str,
) -> docx::Result<usize> {
    let mut converted = 0;

    for paragraph in document.paragraphs_mut() {
        converted += process_paragraph(paragraph, legacy_font, replacement_font)?;
    }

    for table in document.tables_mut() {
        for row in table.rows_mut() {
            for cell in row.cells_mut() {
                for paragraph in cell.paragraphs_mut() {
                    converted += process_paragraph(paragraph, legacy_font, replacement_font)?;
                }
            }
        }
    }

    log::debug!("converted {} runs", converted);
    Ok(converted)
}

/// Default output name for an input path: its base name plus the suffix.
pub fn default_output_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}{}", stem, OUTPUT_SUFFIX)
}

fn resolve_output_path(input: &Path, output_name: Option<&str>) -> PathBuf {
    let mut name = match output_name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => default_output_name(input),
    };
    if !name.ends_with(DOCX_EXTENSION) {
        name.push_str(DOCX_EXTENSION);
    }
    match input.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Convert a .docx file and write the result next to it.
///
/// The conversion entry point: takes the input path and desired output name
/// explicitly and performs no user-facing I/O of its own. The output lands
/// in the input's directory, named `output_name` (with `.docx` appended when
/// missing) or, by default, the input base name with a `-converted` suffix.
///
/// Returns the output path on success. On any failure nothing is written.
pub fn convert_file(
    input: Option<&Path>,
    output_name: Option<&str>,
    legacy_font: &str,
    replacement_font: &str,
) -> Result<PathBuf> {
    let input = input.ok_or(ConvertError::InputMissing)?;
    let output_path = resolve_output_path(input, output_name);

    let mut package = Package::open(input).map_err(ConvertError::Load)?;
    let xml = package.document_xml().map_err(ConvertError::Load)?;
    let mut document = Document::parse(xml).map_err(ConvertError::Load)?;

    let converted =
        convert_document(&mut document, legacy_font, replacement_font).map_err(ConvertError::Conversion)?;
    log::info!("converted {} runs in {}", converted, input.display());

    package
        .set_document_xml(document.to_xml())
        .map_err(ConvertError::Save)?;
    package.save(&output_path).map_err(ConvertError::Save)?;

    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    const CONTENT_TYPES: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
        r#"</Types>"#,
    );

    const RELS: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
        r#"</Relationships>"#,
    );

    fn wrap_document(body: &str) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
                r#"<w:body>{}</w:body></w:document>"#,
            ),
            body
        )
    }

    fn legacy_run(text: &str) -> String {
        format!(
            r#"<w:r><w:rPr><w:rFonts w:ascii="AcadNusx" w:hAnsi="AcadNusx"/><w:sz w:val="24"/></w:rPr><w:t>{}</w:t></w:r>"#,
            text
        )
    }

    fn parse_body(body: &str) -> Document {
        Document::parse(wrap_document(body).as_bytes()).unwrap()
    }

    fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let mut zip = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for (name, data) in [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", RELS),
            ("word/document.xml", document_xml),
        ] {
            zip.start_file(name, options).unwrap();
            zip.write_all(data.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_process_run_converts_legacy_run() {
        let mut document = parse_body(&format!("<w:p>{}</w:p>", legacy_run("gamarjoba")));
        let converted = convert_document(&mut document, LEGACY_FONT, REPLACEMENT_FONT).unwrap();
        assert_eq!(converted, 1);

        let run = document.paragraphs().next().unwrap().runs().next().unwrap();
        assert_eq!(run.text().unwrap(), "გამარჯობა");
        assert_eq!(run.font_name().unwrap().as_deref(), Some("Sylfaen"));
        let xml = String::from_utf8(run.xml().to_vec()).unwrap();
        assert!(xml.contains(
            r#"<w:rFonts w:ascii="Sylfaen" w:hAnsi="Sylfaen" w:eastAsia="Sylfaen" w:cs="Sylfaen"/>"#
        ));
        // only the font names changed in the properties
        assert!(xml.contains(r#"<w:sz w:val="24"/>"#));
    }

    #[test]
    fn test_other_fonts_are_left_byte_identical() {
        let body = concat!(
            r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="Arial"/></w:rPr><w:t>gamarjoba</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>gamarjoba</w:t></w:r></w:p>"#,
        );
        let mut document = parse_body(body);
        let before = document.to_xml();

        let converted = convert_document(&mut document, LEGACY_FONT, REPLACEMENT_FONT).unwrap();
        assert_eq!(converted, 0);
        assert_eq!(document.to_xml(), before);
    }

    #[test]
    fn test_empty_text_guard() {
        let body = r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="AcadNusx"/></w:rPr><w:t></w:t></w:r></w:p>"#;
        let mut document = parse_body(body);
        let before = document.to_xml();

        let converted = convert_document(&mut document, LEGACY_FONT, REPLACEMENT_FONT).unwrap();
        assert_eq!(converted, 0);
        assert_eq!(document.to_xml(), before);
    }

    #[test]
    fn test_font_gate_is_exact_match() {
        let body = r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="acadnusx"/></w:rPr><w:t>gamarjoba</w:t></w:r></w:p>"#;
        let mut document = parse_body(body);
        let converted = convert_document(&mut document, LEGACY_FONT, REPLACEMENT_FONT).unwrap();
        assert_eq!(converted, 0);
    }

    #[test]
    fn test_rerun_is_a_no_op() {
        let body = format!(
            "<w:p>{}</w:p><w:tbl><w:tr><w:tc><w:p>{}</w:p></w:tc></w:tr></w:tbl>",
            legacy_run("cxovreba"),
            legacy_run("Tbilisi"),
        );
        let mut document = parse_body(&body);
        convert_document(&mut document, LEGACY_FONT, REPLACEMENT_FONT).unwrap();
        let first = document.to_xml();

        let mut document = Document::parse(&first).unwrap();
        let converted = convert_document(&mut document, LEGACY_FONT, REPLACEMENT_FONT).unwrap();
        assert_eq!(converted, 0);
        assert_eq!(document.to_xml(), first);
    }

    #[test]
    fn test_table_runs_convert_like_body_runs() {
        let body = format!(
            "<w:p>{run}</w:p><w:tbl><w:tr><w:tc><w:p>{run}</w:p></w:tc></w:tr></w:tbl>",
            run = legacy_run("venaxi"),
        );
        let mut document = parse_body(&body);
        let converted = convert_document(&mut document, LEGACY_FONT, REPLACEMENT_FONT).unwrap();
        assert_eq!(converted, 2);

        let body_run = document.paragraphs().next().unwrap().runs().next().unwrap();
        let cell_run = document
            .tables()
            .next()
            .unwrap()
            .rows()
            .next()
            .unwrap()
            .cells()
            .next()
            .unwrap()
            .paragraphs()
            .next()
            .unwrap()
            .runs()
            .next()
            .unwrap();
        assert_eq!(cell_run.text().unwrap(), "ვენახი");
        assert_eq!(body_run.xml(), cell_run.xml());
    }

    #[test]
    fn test_nested_table_runs_are_left_alone() {
        let body = format!(
            "<w:tbl><w:tr><w:tc><w:p>{}</w:p><w:tbl><w:tr><w:tc><w:p>{}</w:p></w:tc></w:tr></w:tbl></w:tc></w:tr></w:tbl>",
            legacy_run("gareT"),
            legacy_run("Signit"),
        );
        let mut document = parse_body(&body);
        let converted = convert_document(&mut document, LEGACY_FONT, REPLACEMENT_FONT).unwrap();
        assert_eq!(converted, 1);

        let xml = String::from_utf8(document.to_xml()).unwrap();
        // the outer run converted, the nested one kept its text and font
        assert!(xml.contains("გარეთ"));
        assert!(xml.contains("Signit"));
        assert!(xml.contains(r#"w:ascii="AcadNusx""#));
    }

    #[test]
    fn test_structure_is_preserved() {
        let body = format!(
            "<w:p>{}</w:p><w:p/><w:tbl><w:tr><w:tc><w:p>{}</w:p></w:tc><w:tc><w:p/></w:tc></w:tr></w:tbl>",
            legacy_run("erTi"),
            legacy_run("ori"),
        );
        let mut document = parse_body(&body);
        convert_document(&mut document, LEGACY_FONT, REPLACEMENT_FONT).unwrap();

        assert_eq!(document.paragraph_count(), 2);
        assert_eq!(document.table_count(), 1);
        let table = document.tables().next().unwrap();
        assert_eq!(table.row_count(), 1);
        let row = table.rows().next().unwrap();
        assert_eq!(row.cell_count(), 2);
        let cells: Vec<_> = row.cells().collect();
        assert_eq!(cells[0].paragraph_count(), 1);
        assert_eq!(cells[1].paragraph_count(), 1);
    }

    #[test]
    fn test_default_output_name() {
        assert_eq!(
            default_output_name(Path::new("/docs/report.docx")),
            "report-converted"
        );
        assert_eq!(
            resolve_output_path(Path::new("/docs/report.docx"), None),
            PathBuf::from("/docs/report-converted.docx")
        );
        assert_eq!(
            resolve_output_path(Path::new("/docs/report.docx"), Some("final")),
            PathBuf::from("/docs/final.docx")
        );
        assert_eq!(
            resolve_output_path(Path::new("/docs/report.docx"), Some("final.docx")),
            PathBuf::from("/docs/final.docx")
        );
    }

    #[test]
    fn test_convert_file_without_input() {
        let result = convert_file(None, None, LEGACY_FONT, REPLACEMENT_FONT);
        assert!(matches!(result, Err(ConvertError::InputMissing)));
    }

    #[test]
    fn test_convert_file_rejects_non_docx_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("not-a-document.docx");
        std::fs::write(&input, b"plain text, not a ZIP archive").unwrap();

        let result = convert_file(Some(&input), None, LEGACY_FONT, REPLACEMENT_FONT);
        assert!(matches!(result, Err(ConvertError::Load(_))));
        // nothing was written
        assert!(!dir.path().join("not-a-document-converted.docx").exists());
    }

    #[test]
    fn test_convert_file_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("letter.docx");
        let body = format!(
            "<w:p>{}<w:r><w:t>unchanged</w:t></w:r></w:p>",
            legacy_run("gamarjoba")
        );
        std::fs::write(&input, build_docx(&wrap_document(&body))).unwrap();

        let output = convert_file(Some(&input), None, LEGACY_FONT, REPLACEMENT_FONT).unwrap();
        assert_eq!(output, dir.path().join("letter-converted.docx"));

        let package = Package::open(&output).unwrap();
        // untouched parts came through byte-for-byte
        assert_eq!(
            package.entry("[Content_Types].xml").unwrap(),
            CONTENT_TYPES.as_bytes()
        );

        let document = Document::parse(package.document_xml().unwrap()).unwrap();
        let paragraph = document.paragraphs().next().unwrap();
        let runs: Vec<_> = paragraph.runs().collect();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text().unwrap(), "გამარჯობა");
        assert_eq!(runs[0].font_name().unwrap().as_deref(), Some("Sylfaen"));
        assert_eq!(runs[1].text().unwrap(), "unchanged");
        assert_eq!(runs[1].font_name().unwrap(), None);
    }

    #[test]
    fn test_convert_file_custom_output_name() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("letter.docx");
        std::fs::write(
            &input,
            build_docx(&wrap_document(&format!("<w:p>{}</w:p>", legacy_run("kargad")))),
        )
        .unwrap();

        let output =
            convert_file(Some(&input), Some("done"), LEGACY_FONT, REPLACEMENT_FONT).unwrap();
        assert_eq!(output, dir.path().join("done.docx"));
        assert!(output.exists());
    }
}
