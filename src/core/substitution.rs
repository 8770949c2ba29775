//! Placeholder replacement inside runs.
//!
//! Tokens are matched inside a single run only. A placeholder whose characters
//! are split across runs (for example because part of it is bold) is left as is,
//! so templates must keep each placeholder in one uniformly formatted span.

use crate::adapters::docx::{Document, Paragraph, RunEdits};
use crate::domain::model::StudentRecord;

pub const NAME_TOKEN: &str = "xxxxxxxxxxxxxxxxxxxxx";
pub const IDENTIFIER_TOKEN: &str = "xxxxxxxxxxxxxx";
pub const ID_TOKEN: &str = "xxxxx";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub token: &'static str,
    pub value: String,
}

/// The three replacements for one student, longest token first so the
/// shorter tokens never eat into a longer one.
pub fn replacements_for(student: &StudentRecord) -> Vec<Replacement> {
    vec![
        Replacement {
            token: NAME_TOKEN,
            value: student.name.clone(),
        },
        Replacement {
            token: IDENTIFIER_TOKEN,
            value: student
                .identifier
                .as_ref()
                .map(|identifier| identifier.as_str().to_string())
                .unwrap_or_default(),
        },
        Replacement {
            token: ID_TOKEN,
            value: student.id.clone(),
        },
    ]
}

/// Replaces `old` with `new` in each run of `paragraph` independently.
///
/// Does nothing when either side is empty or `old` is absent from the paragraph text.
pub fn substitute_preserving_formatting(paragraph: &Paragraph, old: &str, new: &str) -> Paragraph {
    let mut result = paragraph.clone();
    if old.is_empty() || new.is_empty() || !paragraph.text().contains(old) {
        return result;
    }

    for run in result.runs.iter_mut().filter(|run| run.text.contains(old)) {
        run.text = run.text.replace(old, new);
    }
    result
}

/// Applies every replacement to every body paragraph and collects the runs whose text changed.
pub fn plan_edits(document: &Document, replacements: &[Replacement]) -> RunEdits {
    let mut edits = RunEdits::new();

    for original in &document.paragraphs {
        let substituted = replacements.iter().fold(original.clone(), |paragraph, replacement| {
            substitute_preserving_formatting(&paragraph, replacement.token, &replacement.value)
        });

        for (before, after) in original.runs.iter().zip(&substituted.runs) {
            if before.text != after.text {
                edits.insert(after.id, after.text.clone());
            }
        }
    }

    edits
}
