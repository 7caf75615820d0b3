//! Package implementation for Word documents.
use crate::docx::error::{DocxError, Result};
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

/// Name of the main document part inside the package.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// A Word (.docx) package.
///
/// A .docx file is a ZIP archive of XML parts and media. The package holds
/// every entry in archive order; only the main document part is ever
/// rewritten, and every other entry is copied through byte-for-byte on save.
///
/// # Examples
///
/// ```rust,no_run
/// use nusx2geo::docx::Package;
///
/// let pkg = Package::open("document.docx")?;
/// let document_xml = pkg.document_xml()?.to_vec();
/// # drop(document_xml);
/// # Ok::<(), nusx2geo::docx::DocxError>(())
/// ```
pub struct Package {
    /// All archive entries as (name, bytes), in archive order
    entries: Vec<(String, Vec<u8>)>,
}

impl Package {
    /// Open a .docx package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Open a .docx package from a reader.
    ///
    /// Fails with `PartNotFound` when the archive has no main document part.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            entries.push((name, data));
        }

        let package = Self { entries };
        if package.entry(DOCUMENT_PART).is_none() {
            return Err(DocxError::PartNotFound(DOCUMENT_PART.to_string()));
        }
        log::debug!("opened package with {} entries", package.entries.len());
        Ok(package)
    }

    /// Get the XML bytes of the main document part.
    pub fn document_xml(&self) -> Result<&[u8]> {
        self.entry(DOCUMENT_PART)
            .map(Vec::as_slice)
            .ok_or_else(|| DocxError::PartNotFound(DOCUMENT_PART.to_string()))
    }

    /// Replace the XML bytes of the main document part.
    pub fn set_document_xml(&mut self, xml: Vec<u8>) -> Result<()> {
        for (name, data) in &mut self.entries {
            if name == DOCUMENT_PART {
                *data = xml;
                return Ok(());
            }
        }
        Err(DocxError::PartNotFound(DOCUMENT_PART.to_string()))
    }

    /// Iterate over the entry names, in archive order.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Get an entry's bytes by name.
    pub fn entry(&self, name: &str) -> Option<&Vec<u8>> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, data)| data)
    }

    /// Write the package to a file path.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Write the package to a writer.
    ///
    /// Entries are written in their original order, Stored for media files
    /// and Deflated for everything else, matching the typical .docx layout.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = zip::ZipWriter::new(writer);
        let deflated = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        let stored = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);

        for (name, data) in &self.entries {
            let options = if name.starts_with("word/media/") {
                stored
            } else {
                deflated
            };
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }
        zip.finish()?;
        Ok(())
    }
}
