use super::model::{RunEdits, RunId};
use super::parse::{run_content_text, ElementStack, BODY, PARAGRAPH, RUN};
use crate::utils::error::{DeclError, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

#[derive(Debug)]
struct PendingEdit {
    replacement: String,
    /// Namespace prefix of the run, reused for the text elements written into it.
    prefix: Option<String>,
    written: bool,
}

impl PendingEdit {
    fn tag(&self, local: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        }
    }
}

/// Text elements of an edited run, with a `w:t` per text segment the way Word writes them.
fn write_run_text(writer: &mut Writer<Vec<u8>>, edit: &PendingEdit) -> Result<()> {
    let mut segment = String::new();
    for c in edit.replacement.chars() {
        match c {
            '\t' | '\n' => {
                write_text_segment(writer, edit, &segment)?;
                segment.clear();
                let tag = edit.tag(if c == '\t' { "tab" } else { "br" });
                writer.write_event(Event::Empty(BytesStart::new(tag)))?;
            }
            '\r' => {}
            _ => segment.push(c),
        }
    }
    write_text_segment(writer, edit, &segment)
}

fn write_text_segment(writer: &mut Writer<Vec<u8>>, edit: &PendingEdit, segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Ok(());
    }
    let tag = edit.tag("t");
    let mut start = BytesStart::new(tag.as_str());
    start.push_attribute(("xml:space", "preserve"));
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(segment)))?;
    writer.write_event(Event::End(BytesEnd::new(tag.as_str())))?;
    Ok(())
}

/// Re-serializes `word/document.xml`, swapping the text of every run listed in `edits`.
///
/// Run properties and every other element are copied through untouched; only the
/// text-bearing children (`w:t`, `w:tab`, `w:br`, `w:cr`) of an edited run are replaced.
pub fn render_document_xml(xml: &str, edits: &RunEdits) -> Result<String> {
    if edits.is_empty() {
        return Ok(xml.to_string());
    }

    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut stack = ElementStack::default();
    let mut paragraphs = 0usize;
    let mut runs_in_paragraph = 0usize;
    let mut pending: Option<PendingEdit> = None;
    // Depth of a dropped element whose subtree is being skipped.
    let mut skip_from: Option<usize> = None;
    let mut applied = 0usize;

    loop {
        let event = reader.read_event()?;
        match event {
            Event::Eof => break,
            Event::Start(ref element) | Event::Empty(ref element) => {
                let is_start = matches!(event, Event::Start(_));
                let name = element.local_name().as_ref().to_vec();

                if skip_from.is_some() {
                    if is_start {
                        stack.push(&name);
                    }
                    continue;
                }

                if stack.opens_body_paragraph(&name) {
                    paragraphs += 1;
                    runs_in_paragraph = 0;
                } else if stack.opens_body_run(&name) {
                    let id = RunId {
                        paragraph: paragraphs - 1,
                        run: runs_in_paragraph,
                    };
                    runs_in_paragraph += 1;
                    pending = edits.get(&id).map(|replacement| PendingEdit {
                        replacement: replacement.clone(),
                        prefix: element
                            .name()
                            .prefix()
                            .map(|prefix| String::from_utf8_lossy(prefix.as_ref()).into_owned()),
                        written: false,
                    });
                } else if stack.in_body_run() && run_content_text(&name, element).is_some() {
                    if let Some(edit) = pending.as_mut() {
                        if !edit.written {
                            write_run_text(&mut writer, edit)?;
                            edit.written = true;
                            applied += 1;
                        }
                        if is_start {
                            skip_from = Some(stack.len());
                            stack.push(&name);
                        }
                        continue;
                    }
                }

                let closes_empty_run = !is_start && name == RUN && stack.ends_with(&[BODY, PARAGRAPH]);
                writer.write_event(event)?;
                if is_start {
                    stack.push(&name);
                } else if closes_empty_run {
                    pending = None;
                }
            }
            Event::End(element) => {
                stack.pop();
                if let Some(depth) = skip_from {
                    if stack.len() == depth {
                        skip_from = None;
                    }
                    continue;
                }
                if element.local_name().as_ref() == RUN && stack.ends_with(&[BODY, PARAGRAPH]) {
                    pending = None;
                }
                writer.write_event(Event::End(element))?;
            }
            other => {
                if skip_from.is_none() {
                    writer.write_event(other)?;
                }
            }
        }
    }

    tracing::debug!("Applied {} of {} run edits", applied, edits.len());

    String::from_utf8(writer.into_inner())
        .map_err(|e| DeclError::document(format!("rendered XML is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::docx::parse::parse_document_xml;

    const PARAGRAPH_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Declaro que </w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>xxxxx</w:t><w:t>!</w:t></w:r></w:p><w:sectPr/></w:body></w:document>"#;

    #[test]
    fn test_render_without_edits_is_identity() {
        let rendered = render_document_xml(PARAGRAPH_XML, &RunEdits::new()).unwrap();
        assert_eq!(rendered, PARAGRAPH_XML);
    }

    #[test]
    fn test_render_replaces_only_edited_run() {
        let mut edits = RunEdits::new();
        edits.insert(RunId { paragraph: 0, run: 1 }, "2024 & co!".to_string());

        let rendered = render_document_xml(PARAGRAPH_XML, &edits).unwrap();

        assert!(rendered.contains(r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Declaro que </w:t></w:r>"#));
        assert!(rendered.contains(r#"<w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve">2024 &amp; co!</w:t></w:r>"#));
        assert!(!rendered.contains("xxxxx"));
        assert!(rendered.contains("<w:sectPr/>"));

        let document = parse_document_xml(&rendered).unwrap();
        assert_eq!(document.paragraphs[0].text(), "Declaro que 2024 & co!");
    }

    #[test]
    fn test_render_keeps_document_prefix() {
        let xml = r#"<ns0:document xmlns:ns0="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><ns0:body><ns0:p><ns0:r><ns0:rPr><ns0:b/></ns0:rPr><ns0:t>xxxxx</ns0:t></ns0:r></ns0:p></ns0:body></ns0:document>"#;
        let mut edits = RunEdits::new();
        edits.insert(RunId { paragraph: 0, run: 0 }, "42\t!".to_string());

        let rendered = render_document_xml(xml, &edits).unwrap();

        assert!(rendered.contains(r#"<ns0:r><ns0:rPr><ns0:b/></ns0:rPr><ns0:t xml:space="preserve">42</ns0:t><ns0:tab/><ns0:t xml:space="preserve">!</ns0:t></ns0:r>"#));
        let document = parse_document_xml(&rendered).unwrap();
        assert_eq!(document.paragraphs[0].text(), "42\t!");
    }

    #[test]
    fn test_render_writes_tabs_and_breaks() {
        let mut edits = RunEdits::new();
        edits.insert(RunId { paragraph: 0, run: 1 }, "a\tb\nc".to_string());

        let rendered = render_document_xml(PARAGRAPH_XML, &edits).unwrap();
        assert!(rendered.contains(r#"<w:t xml:space="preserve">a</w:t><w:tab/><w:t xml:space="preserve">b</w:t><w:br/><w:t xml:space="preserve">c</w:t>"#));

        let document = parse_document_xml(&rendered).unwrap();
        assert_eq!(document.paragraphs[0].runs[1].text, "a\tb\nc");
    }
}
