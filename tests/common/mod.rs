#![allow(dead_code)]

use declgen::adapters::docx::{DocxPackage, DOCUMENT_PART};
use declgen::domain::ports::{FileFilter, Interaction};
use declgen::{DeclError, Result};
use std::collections::VecDeque;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

pub fn run(text: &str) -> String {
    format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, escape(text))
}

pub fn bold_run(text: &str) -> String {
    format!(
        r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        escape(text)
    )
}

pub fn paragraph(runs: &[String]) -> String {
    format!("<w:p>{}</w:p>", runs.concat())
}

pub fn table(rows: &[&[&str]]) -> String {
    let rows: String = rows
        .iter()
        .map(|cells| {
            let cells: String = cells
                .iter()
                .map(|cell| format!("<w:tc>{}</w:tc>", paragraph(&[run(cell)])))
                .collect();
            format!("<w:tr>{}</w:tr>", cells)
        })
        .collect();
    format!("<w:tbl><w:tblPr/>{}</w:tbl>", rows)
}

pub fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr/></w:body></w:document>"#,
        body
    )
}

pub fn docx_bytes(body: &str) -> Vec<u8> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();
    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(ROOT_RELS.as_bytes()).unwrap();
    zip.start_file(DOCUMENT_PART, options).unwrap();
    zip.write_all(document_xml(body).as_bytes()).unwrap();

    zip.finish().unwrap().into_inner()
}

pub fn write_docx(path: &Path, body: &str) {
    std::fs::write(path, docx_bytes(body)).unwrap();
}

pub fn read_package(path: &Path) -> DocxPackage {
    DocxPackage::from_bytes(&std::fs::read(path).unwrap()).unwrap()
}

pub fn paragraph_texts(path: &Path) -> Vec<String> {
    read_package(path)
        .document()
        .unwrap()
        .paragraphs
        .iter()
        .map(|p| p.text())
        .collect()
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[derive(Debug, Default)]
pub struct Script {
    pub files: VecDeque<Option<PathBuf>>,
    pub answers: VecDeque<String>,
    pub prompts: Vec<String>,
    pub messages: Vec<String>,
    pub opened: Vec<PathBuf>,
}

/// Interaction driven by pre-recorded answers; clones share the same script.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInteraction {
    pub script: Arc<Mutex<Script>>,
}

impl ScriptedInteraction {
    pub fn with_answers(answers: &[&str]) -> Self {
        let interaction = Self::default();
        interaction
            .script
            .lock()
            .unwrap()
            .answers
            .extend(answers.iter().map(|a| a.to_string()));
        interaction
    }

    pub fn messages(&self) -> Vec<String> {
        self.script.lock().unwrap().messages.clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.script.lock().unwrap().prompts.clone()
    }
}

impl Interaction for ScriptedInteraction {
    fn select_file(&self, _title: &str, _filter: &FileFilter) -> Option<PathBuf> {
        self.script.lock().unwrap().files.pop_front().flatten()
    }

    fn prompt_line(&self, prompt: &str) -> Result<String> {
        let mut script = self.script.lock().unwrap();
        script.prompts.push(prompt.to_string());
        script.answers.pop_front().ok_or(DeclError::InputClosed)
    }

    fn message(&self, text: &str) {
        self.script.lock().unwrap().messages.push(text.to_string());
    }

    fn open_folder(&self, path: &Path) -> Result<()> {
        self.script.lock().unwrap().opened.push(path.to_path_buf());
        Ok(())
    }
}
