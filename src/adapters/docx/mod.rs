//! Minimal `.docx` package handling: the zip container plus a text view of
//! `word/document.xml` that can be edited run by run without touching formatting.

pub mod model;
pub mod parse;
pub mod render;

pub use model::{Document, Paragraph, Row, Run, RunEdits, RunId, Table};
pub use parse::parse_document_xml;
pub use render::render_document_xml;

use crate::utils::error::{DeclError, Result};
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Clone)]
struct PackageEntry {
    name: String,
    compression: CompressionMethod,
    data: Vec<u8>,
    is_dir: bool,
}

/// An opened `.docx` file: every zip entry kept in its original order.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    entries: Vec<PackageEntry>,
}

impl DocxPackage {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.push(PackageEntry {
                name: file.name().to_string(),
                compression: file.compression(),
                is_dir: file.is_dir(),
                data,
            });
        }

        let package = Self { entries };
        if package.entry(DOCUMENT_PART).is_none() {
            return Err(DeclError::document(format!(
                "missing {} (not a word-processor document?)",
                DOCUMENT_PART
            )));
        }

        tracing::debug!("Opened package with {} entries", package.entries.len());
        Ok(package)
    }

    fn entry(&self, name: &str) -> Option<&PackageEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn document_xml(&self) -> Result<String> {
        let entry = self
            .entry(DOCUMENT_PART)
            .ok_or_else(|| DeclError::document(format!("missing {}", DOCUMENT_PART)))?;
        String::from_utf8(entry.data.clone())
            .map_err(|e| DeclError::document(format!("{} is not UTF-8: {}", DOCUMENT_PART, e)))
    }

    pub fn document(&self) -> Result<Document> {
        parse_document_xml(&self.document_xml()?)
    }

    /// Returns a copy of this package with `edits` applied to the document part.
    pub fn with_run_edits(&self, edits: &RunEdits) -> Result<Self> {
        let rendered = render_document_xml(&self.document_xml()?, edits)?;
        let mut package = self.clone();
        if let Some(entry) = package
            .entries
            .iter_mut()
            .find(|entry| entry.name == DOCUMENT_PART)
        {
            entry.data = rendered.into_bytes();
        }
        Ok(package)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            let options = SimpleFileOptions::default().compression_method(match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            });
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
            } else {
                zip.start_file(entry.name.as_str(), options)?;
                zip.write_all(&entry.data)?;
            }
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}
