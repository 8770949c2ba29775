use crate::core::identifier::{format_identifier, is_valid_identifier};
use std::fmt;
use std::path::PathBuf;

/// National personal identifier (CPF), stored only in its canonical `ddd.ddd.ddd-dd` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier(String);

impl Identifier {
    /// Returns `None` unless exactly 11 digits remain after stripping everything else.
    pub fn parse(raw: &str) -> Option<Self> {
        if is_valid_identifier(raw) {
            Some(Self(format_identifier(raw)))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    pub identifier: Option<Identifier>,
}

impl StudentRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            identifier: None,
        }
    }

    pub fn with_identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }
}

/// Everything resolved before the roster is read.
#[derive(Debug, Clone)]
pub struct RunInputs {
    pub template_path: PathBuf,
    pub roster_path: PathBuf,
    pub group_name: String,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct GenerationSummary {
    pub succeeded: usize,
    pub total: usize,
    pub output_dir: PathBuf,
    pub written: Vec<PathBuf>,
    pub failures: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// A file selection was dismissed; nothing was generated.
    Cancelled,
    Completed(GenerationSummary),
}
