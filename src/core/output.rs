use crate::core::normalize::sanitize_filename;
use crate::domain::model::StudentRecord;
use crate::domain::ports::Storage;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

pub const DEFAULT_GROUP_NAME: &str = "Turma Sem Nome";
pub const OUTPUT_EXTENSION: &str = "docx";

static DOCX_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.docx$").expect("valid regex"));
static ROSTER_KEYWORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(rela[çc][aã]o|lista|alunos|turma)").expect("valid regex"));

/// Class label taken from the roster file name.
///
/// Removes a trailing `.docx` and every occurrence of the roster keywords, then
/// trims the ends. Spacing inside the name is left exactly as the removal leaves it.
pub fn derive_group_name(roster_path: &Path, fallback: &str) -> String {
    let Some(file_name) = roster_path.file_name().and_then(|name| name.to_str()) else {
        tracing::warn!("Roster path has no usable file name: {}", roster_path.display());
        return fallback.to_string();
    };

    let composed: String = file_name.nfc().collect();
    let stem = DOCX_SUFFIX.replace(&composed, "");
    let group = ROSTER_KEYWORDS.replace_all(&stem, "");
    let group = group.trim();

    if group.is_empty() {
        fallback.to_string()
    } else {
        group.to_string()
    }
}

/// `<base>/<group name>`.
pub fn output_directory(base: &Path, group_name: &str) -> PathBuf {
    base.join(group_name)
}

/// `"<id> - <sanitized name>.docx"`.
pub fn output_file_name(student: &StudentRecord) -> String {
    format!(
        "{} - {}.{}",
        student.id,
        sanitize_filename(&student.name),
        OUTPUT_EXTENSION
    )
}

/// First free path for `file_name` in `dir`, appending `_1`, `_2`, … before the extension.
///
/// Probe and write are not atomic; a file created in between is overwritten.
pub async fn resolve_output_path<S: Storage>(storage: &S, dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !storage.exists(&candidate).await {
        return candidate;
    }

    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((stem, extension)) => (stem, format!(".{}", extension)),
        None => (file_name, String::new()),
    };

    let mut suffix = 1usize;
    loop {
        let candidate = dir.join(format!("{}_{}{}", stem, suffix, extension));
        if !storage.exists(&candidate).await {
            tracing::debug!("{} taken, using suffix _{}", file_name, suffix);
            return candidate;
        }
        suffix += 1;
    }
}
