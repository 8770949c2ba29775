use super::model::{Document, Paragraph, Row, Run, RunId, Table};
use crate::utils::error::{DeclError, Result};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

// Local names of the WordprocessingML elements read here. Matching ignores the
// prefix, so documents that bind the namespace to something other than `w:` parse too.
pub(crate) const BODY: &[u8] = b"body";
pub(crate) const PARAGRAPH: &[u8] = b"p";
pub(crate) const RUN: &[u8] = b"r";
pub(crate) const TEXT: &[u8] = b"t";
pub(crate) const TAB: &[u8] = b"tab";
pub(crate) const BREAK: &[u8] = b"br";
pub(crate) const CARRIAGE_RETURN: &[u8] = b"cr";
const TABLE: &[u8] = b"tbl";
const TABLE_ROW: &[u8] = b"tr";
const TABLE_CELL: &[u8] = b"tc";
const CELL_PROPERTIES: &[u8] = b"tcPr";
const GRID_SPAN: &[u8] = b"gridSpan";
const VERTICAL_MERGE: &[u8] = b"vMerge";

/// Open-element stack shared by the parser and the renderer so both number runs the same way.
#[derive(Debug, Default)]
pub(crate) struct ElementStack {
    names: Vec<Vec<u8>>,
}

impl ElementStack {
    pub fn push(&mut self, name: &[u8]) {
        self.names.push(name.to_vec());
    }

    pub fn pop(&mut self) {
        self.names.pop();
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn ends_with(&self, suffix: &[&[u8]]) -> bool {
        self.names.len() >= suffix.len()
            && self.names[self.names.len() - suffix.len()..]
                .iter()
                .zip(suffix)
                .all(|(open, expected)| open.as_slice() == *expected)
    }

    pub fn at(&self, depth: usize) -> Option<&[u8]> {
        self.names.get(depth).map(Vec::as_slice)
    }

    /// Opening `name` here starts a body-level paragraph.
    pub fn opens_body_paragraph(&self, name: &[u8]) -> bool {
        name == PARAGRAPH && self.ends_with(&[BODY])
    }

    /// Opening `name` here starts a run directly inside a body-level paragraph.
    pub fn opens_body_run(&self, name: &[u8]) -> bool {
        name == RUN && self.ends_with(&[BODY, PARAGRAPH])
    }

    pub fn in_body_run(&self) -> bool {
        self.ends_with(&[BODY, PARAGRAPH, RUN])
    }
}

/// Value of the attribute whose local name is `key`, e.g. `val` for `w:val`.
fn attribute_value(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Text contributed by a run-level text element; `None` for anything else.
pub(crate) fn run_content_text(name: &[u8], element: &BytesStart<'_>) -> Option<&'static str> {
    match name {
        TEXT => Some(""),
        TAB => Some("\t"),
        CARRIAGE_RETURN => Some("\n"),
        BREAK => {
            let page_or_column = matches!(
                attribute_value(element, b"type").as_deref(),
                Some("page" | "column")
            );
            Some(if page_or_column { "" } else { "\n" })
        }
        _ => None,
    }
}

#[derive(Debug)]
struct CellBuilder {
    paragraphs: Vec<String>,
    span: usize,
    /// Continuation of a vertical merge: takes the text of the cell above.
    continues_merge: bool,
}

#[derive(Debug)]
struct TableBuilder {
    /// Stack depth of the top-level `w:tbl` element.
    depth: usize,
    table: Table,
    cell: Option<CellBuilder>,
    /// Last text seen in each grid column.
    column_text: Vec<String>,
}

impl TableBuilder {
    fn cell_paragraph_open(&self, stack: &ElementStack) -> bool {
        stack.len() > self.depth + 3 && stack.at(self.depth + 3) == Some(PARAGRAPH)
    }

    fn push_text(&mut self, text: &str) {
        if let Some(paragraph) = self.cell.as_mut().and_then(|cell| cell.paragraphs.last_mut()) {
            paragraph.push_str(text);
        }
    }

    fn finish_cell(&mut self) {
        let Some(cell) = self.cell.take() else {
            return;
        };
        let Some(row) = self.table.rows.last_mut() else {
            return;
        };

        let column = row.cells.len();
        let text = if cell.continues_merge {
            self.column_text.get(column).cloned().unwrap_or_default()
        } else {
            cell.paragraphs.join("\n")
        };

        let end = column + cell.span;
        if self.column_text.len() < end {
            self.column_text.resize(end, String::new());
        }
        for slot in &mut self.column_text[column..end] {
            slot.clone_from(&text);
        }
        row.cells.extend(std::iter::repeat(text).take(cell.span));
    }
}

#[derive(Debug, Default)]
struct DocumentParser {
    stack: ElementStack,
    document: Document,
    run: Option<Run>,
    in_run_text: bool,
    table: Option<TableBuilder>,
    in_cell_text: bool,
}

impl DocumentParser {
    fn open(&mut self, element: &BytesStart<'_>) {
        let local = element.local_name();
        let name = local.as_ref();

        if self.stack.opens_body_paragraph(name) {
            self.document.paragraphs.push(Paragraph::default());
        } else if self.stack.opens_body_run(name) {
            let paragraph = self.document.paragraphs.len() - 1;
            let run = self.document.paragraphs[paragraph].runs.len();
            self.run = Some(Run {
                id: RunId { paragraph, run },
                text: String::new(),
            });
        } else if self.stack.in_body_run() {
            if let (Some(run), Some(text)) = (self.run.as_mut(), run_content_text(name, element)) {
                run.text.push_str(text);
                self.in_run_text = name == TEXT;
            }
        }

        if name == TABLE && self.stack.ends_with(&[BODY]) {
            self.table = Some(TableBuilder {
                depth: self.stack.len(),
                table: Table::default(),
                cell: None,
                column_text: Vec::new(),
            });
        } else if let Some(table) = self.table.as_mut() {
            let relative = self.stack.len() - table.depth;
            match (relative, name) {
                (1, TABLE_ROW) => table.table.rows.push(Row::default()),
                (2, TABLE_CELL) => {
                    table.cell = Some(CellBuilder {
                        paragraphs: Vec::new(),
                        span: 1,
                        continues_merge: false,
                    })
                }
                (3, PARAGRAPH) => {
                    if let Some(cell) = table.cell.as_mut() {
                        cell.paragraphs.push(String::new());
                    }
                }
                (4, GRID_SPAN) if self.stack.ends_with(&[TABLE_CELL, CELL_PROPERTIES]) => {
                    let span = attribute_value(element, b"val").and_then(|val| val.parse::<usize>().ok());
                    if let (Some(cell), Some(span)) = (table.cell.as_mut(), span) {
                        cell.span = span.max(1);
                    }
                }
                (4, VERTICAL_MERGE) if self.stack.ends_with(&[TABLE_CELL, CELL_PROPERTIES]) => {
                    // A bare `w:vMerge` (or `w:val="continue"`) continues the merge above.
                    let restart = attribute_value(element, b"val").as_deref() == Some("restart");
                    if let Some(cell) = table.cell.as_mut() {
                        cell.continues_merge = !restart;
                    }
                }
                _ if table.cell_paragraph_open(&self.stack) && self.stack.ends_with(&[RUN]) => {
                    if let Some(text) = run_content_text(name, element) {
                        table.push_text(text);
                        self.in_cell_text = name == TEXT;
                    }
                }
                _ => {}
            }
        }
    }

    /// Called after the element has been popped from the stack.
    fn close(&mut self, name: &[u8]) {
        if name == TEXT {
            self.in_run_text = false;
            self.in_cell_text = false;
        }

        if name == RUN && self.stack.ends_with(&[BODY, PARAGRAPH]) {
            if let Some(run) = self.run.take() {
                self.document.paragraphs[run.id.paragraph].runs.push(run);
            }
        }

        let Some(table) = self.table.as_mut() else {
            return;
        };
        let relative = self.stack.len() - table.depth.min(self.stack.len());
        match (relative, name) {
            (0, TABLE) if self.stack.len() == table.depth => {
                if let Some(finished) = self.table.take() {
                    self.document.tables.push(finished.table);
                }
            }
            (2, TABLE_CELL) => table.finish_cell(),
            _ => {}
        }
    }

    fn text(&mut self, text: &BytesText<'_>) -> Result<()> {
        if !self.in_run_text && !self.in_cell_text {
            return Ok(());
        }
        let text = text
            .unescape()
            .map_err(|e| DeclError::document(format!("invalid text content: {}", e)))?;
        self.push_text(&text);
        Ok(())
    }

    fn push_text(&mut self, text: &str) {
        if self.in_run_text {
            if let Some(run) = self.run.as_mut() {
                run.text.push_str(text);
            }
        }
        if self.in_cell_text {
            if let Some(table) = self.table.as_mut() {
                table.push_text(text);
            }
        }
    }
}

/// Parses `word/document.xml` into body paragraphs and top-level tables.
pub fn parse_document_xml(xml: &str) -> Result<Document> {
    let mut reader = Reader::from_str(xml);
    let mut parser = DocumentParser::default();

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                parser.open(&element);
                parser.stack.push(element.local_name().as_ref());
            }
            Event::Empty(element) => {
                parser.open(&element);
                let local = element.local_name();
                parser.close(local.as_ref());
            }
            Event::End(element) => {
                parser.stack.pop();
                parser.close(element.local_name().as_ref());
            }
            Event::Text(text) => parser.text(&text)?,
            Event::CData(data) => {
                let data = String::from_utf8_lossy(&data).into_owned();
                parser.push_text(&data);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(parser.document)
}
