//! Table, Row, and Cell structures for Word documents.
use crate::docx::error::{DocxError, Result};
use crate::docx::paragraph::Paragraph;
use crate::docx::xml::{capture_element, write_event, write_open_tag};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smallvec::SmallVec;
use std::io::BufRead;

/// A direct child of a table: a row, or anything else kept verbatim
/// (table properties, grid definition).
#[derive(Debug, Clone)]
pub enum TableChild {
    Row(Row),
    Raw(Vec<u8>),
}

/// A direct child of a row: a cell, or anything else kept verbatim.
#[derive(Debug, Clone)]
pub enum RowChild {
    Cell(Cell),
    Raw(Vec<u8>),
}

/// A direct child of a cell: a paragraph, or anything else kept verbatim.
///
/// A table nested inside a cell lands here as Raw: nested tables are not
/// traversed, and their content round-trips unchanged.
#[derive(Debug, Clone)]
pub enum CellChild {
    Paragraph(Paragraph),
    Raw(Vec<u8>),
}

/// A table in a Word document.
///
/// Represents a `<w:tbl>` element. Tables contain rows, which contain cells,
/// which contain paragraphs.
#[derive(Debug, Clone)]
pub struct Table {
    open_tag: Vec<u8>,
    name: Vec<u8>,
    children: SmallVec<[TableChild; 4]>,
}

impl Table {
    /// Parse a table from a reader positioned just past its opening tag.
    pub(crate) fn parse<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart<'_>) -> Result<Self> {
        let mut open_tag = Vec::with_capacity(64);
        write_open_tag(&mut open_tag, start, false);
        let name = start.name().as_ref().to_vec();

        let mut children: SmallVec<[TableChild; 4]> = SmallVec::new();
        let mut raw: Vec<u8> = Vec::new();
        let mut buf = Vec::with_capacity(512);

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"tr" {
                        if !raw.is_empty() {
                            children.push(TableChild::Raw(std::mem::take(&mut raw)));
                        }
                        let row = Row::parse(reader, e)?;
                        children.push(TableChild::Row(row));
                    } else {
                        capture_element(reader, e, &mut raw)?;
                    }
                },
                Ok(Event::End(_)) => {
                    if !raw.is_empty() {
                        children.push(TableChild::Raw(raw));
                    }
                    return Ok(Self {
                        open_tag,
                        name,
                        children,
                    });
                },
                Ok(Event::Eof) => {
                    return Err(DocxError::Xml("unexpected end of XML inside table".into()));
                },
                Ok(ref event) => write_event(&mut raw, event),
                Err(e) => return Err(DocxError::Xml(e.to_string())),
            }
            buf.clear();
        }
    }

    /// Append this table's XML to `out`.
    pub(crate) fn to_xml(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.open_tag);
        for child in &self.children {
            match child {
                TableChild::Row(row) => row.to_xml(out),
                TableChild::Raw(bytes) => out.extend_from_slice(bytes),
            }
        }
        out.extend_from_slice(b"</");
        out.extend_from_slice(&self.name);
        out.push(b'>');
    }

    /// Iterate over the rows of this table, in order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.children.iter().filter_map(|child| match child {
            TableChild::Row(row) => Some(row),
            TableChild::Raw(_) => None,
        })
    }

    /// Iterate mutably over the rows of this table, in order.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut Row> {
        self.children.iter_mut().filter_map(|child| match child {
            TableChild::Row(row) => Some(row),
            TableChild::Raw(_) => None,
        })
    }

    /// Get the number of rows in this table.
    pub fn row_count(&self) -> usize {
        self.rows().count()
    }
}

/// A row in a table.
///
/// Represents a `<w:tr>` element.
#[derive(Debug, Clone)]
pub struct Row {
    open_tag: Vec<u8>,
    name: Vec<u8>,
    children: SmallVec<[RowChild; 16]>,
}

impl Row {
    pub(crate) fn parse<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart<'_>) -> Result<Self> {
        let mut open_tag = Vec::with_capacity(64);
        write_open_tag(&mut open_tag, start, false);
        let name = start.name().as_ref().to_vec();

        let mut children: SmallVec<[RowChild; 16]> = SmallVec::new();
        let mut raw: Vec<u8> = Vec::new();
        let mut buf = Vec::with_capacity(512);

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"tc" {
                        if !raw.is_empty() {
                            children.push(RowChild::Raw(std::mem::take(&mut raw)));
                        }
                        let cell = Cell::parse(reader, e)?;
                        children.push(RowChild::Cell(cell));
                    } else {
                        capture_element(reader, e, &mut raw)?;
                    }
                },
                Ok(Event::End(_)) => {
                    if !raw.is_empty() {
                        children.push(RowChild::Raw(raw));
                    }
                    return Ok(Self {
                        open_tag,
                        name,
                        children,
                    });
                },
                Ok(Event::Eof) => {
                    return Err(DocxError::Xml("unexpected end of XML inside table row".into()));
                },
                Ok(ref event) => write_event(&mut raw, event),
                Err(e) => return Err(DocxError::Xml(e.to_string())),
            }
            buf.clear();
        }
    }

    pub(crate) fn to_xml(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.open_tag);
        for child in &self.children {
            match child {
                RowChild::Cell(cell) => cell.to_xml(out),
                RowChild::Raw(bytes) => out.extend_from_slice(bytes),
            }
        }
        out.extend_from_slice(b"</");
        out.extend_from_slice(&self.name);
        out.push(b'>');
    }

    /// Iterate over the cells of this row, in order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.children.iter().filter_map(|child| match child {
            RowChild::Cell(cell) => Some(cell),
            RowChild::Raw(_) => None,
        })
    }

    /// Iterate mutably over the cells of this row, in order.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.children.iter_mut().filter_map(|child| match child {
            RowChild::Cell(cell) => Some(cell),
            RowChild::Raw(_) => None,
        })
    }

    /// Get the number of cells in this row.
    pub fn cell_count(&self) -> usize {
        self.cells().count()
    }
}

/// A cell in a table.
///
/// Represents a `<w:tc>` element. Cells contain paragraphs; a table nested
/// inside a cell is preserved but not descended into.
#[derive(Debug, Clone)]
pub struct Cell {
    open_tag: Vec<u8>,
    name: Vec<u8>,
    children: SmallVec<[CellChild; 4]>,
}

impl Cell {
    pub(crate) fn parse<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart<'_>) -> Result<Self> {
        let mut open_tag = Vec::with_capacity(64);
        write_open_tag(&mut open_tag, start, false);
        let name = start.name().as_ref().to_vec();

        let mut children: SmallVec<[CellChild; 4]> = SmallVec::new();
        let mut raw: Vec<u8> = Vec::new();
        let mut buf = Vec::with_capacity(512);

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"p" {
                        if !raw.is_empty() {
                            children.push(CellChild::Raw(std::mem::take(&mut raw)));
                        }
                        let paragraph = Paragraph::parse(reader, e)?;
                        children.push(CellChild::Paragraph(paragraph));
                    } else {
                        // tcPr, and crucially nested <w:tbl>: kept whole, not traversed
                        capture_element(reader, e, &mut raw)?;
                    }
                },
                Ok(Event::Empty(ref e)) => {
                    if e.local_name().as_ref() == b"p" {
                        if !raw.is_empty() {
                            children.push(CellChild::Raw(std::mem::take(&mut raw)));
                        }
                        children.push(CellChild::Paragraph(Paragraph::from_empty(e)));
                    } else {
                        write_open_tag(&mut raw, e, true);
                    }
                },
                Ok(Event::End(_)) => {
                    if !raw.is_empty() {
                        children.push(CellChild::Raw(raw));
                    }
                    return Ok(Self {
                        open_tag,
                        name,
                        children,
                    });
                },
                Ok(Event::Eof) => {
                    return Err(DocxError::Xml("unexpected end of XML inside table cell".into()));
                },
                Ok(ref event) => write_event(&mut raw, event),
                Err(e) => return Err(DocxError::Xml(e.to_string())),
            }
            buf.clear();
        }
    }

    pub(crate) fn to_xml(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.open_tag);
        for child in &self.children {
            match child {
                CellChild::Paragraph(paragraph) => paragraph.to_xml(out),
                CellChild::Raw(bytes) => out.extend_from_slice(bytes),
            }
        }
        out.extend_from_slice(b"</");
        out.extend_from_slice(&self.name);
        out.push(b'>');
    }

    /// Iterate over the paragraphs of this cell, in order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.children.iter().filter_map(|child| match child {
            CellChild::Paragraph(paragraph) => Some(paragraph),
            CellChild::Raw(_) => None,
        })
    }

    /// Iterate mutably over the paragraphs of this cell, in order.
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.children.iter_mut().filter_map(|child| match child {
            CellChild::Paragraph(paragraph) => Some(paragraph),
            CellChild::Raw(_) => None,
        })
    }

    /// Get the number of paragraphs in this cell.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    /// Get the text content of this cell.
    pub fn text(&self) -> Result<String> {
        let mut result = String::new();
        for paragraph in self.paragraphs() {
            result.push_str(&paragraph.text()?);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_table(xml: &str) -> Table {
        let mut reader = Reader::from_reader(xml.as_bytes());
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"tbl" => {
                    return Table::parse(&mut reader, e).unwrap();
                },
                Ok(Event::Eof) => panic!("no table in fixture"),
                _ => {},
            }
            buf.clear();
        }
    }

    fn table_xml(table: &Table) -> String {
        let mut out = Vec::new();
        table.to_xml(&mut out);
        String::from_utf8(out).unwrap()
    }

    const SIMPLE_TABLE: &str = r#"<w:tbl><w:tblPr><w:tblW w:w="0" w:type="auto"/></w:tblPr><w:tr><w:tc><w:tcPr><w:tcW w:w="4675" w:type="dxa"/></w:tcPr><w:p><w:r><w:t>a</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>b</w:t></w:r></w:p></w:tc></w:tr><w:tr><w:tc><w:p><w:r><w:t>c</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>d</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#;

    #[test]
    fn test_table_structure() {
        let table = parse_table(SIMPLE_TABLE);
        assert_eq!(table.row_count(), 2);
        for row in table.rows() {
            assert_eq!(row.cell_count(), 2);
            for cell in row.cells() {
                assert_eq!(cell.paragraph_count(), 1);
            }
        }
        let texts: Vec<String> = table
            .rows()
            .flat_map(|row| row.cells())
            .map(|cell| cell.text().unwrap())
            .collect();
        assert_eq!(texts, ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_table_round_trip() {
        let table = parse_table(SIMPLE_TABLE);
        assert_eq!(table_xml(&table), SIMPLE_TABLE);
    }

    #[test]
    fn test_nested_table_is_not_traversed() {
        let xml = r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>outer</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:tc></w:tr></w:tbl></w:tc></w:tr></w:tbl>"#;
        let table = parse_table(xml);
        assert_eq!(table.row_count(), 1);
        let cell = table.rows().next().unwrap().cells().next().unwrap();
        // only the direct paragraph is visible; the nested table is raw
        assert_eq!(cell.paragraph_count(), 1);
        assert_eq!(cell.text().unwrap(), "outer");
        // and it still round-trips
        assert_eq!(table_xml(&table), xml);
    }
}
