use crate::domain::model::{GenerationSummary, RunInputs, StudentRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &Path) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &Path,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &Path) -> impl std::future::Future<Output = bool> + Send;
    fn create_dir_all(&self, path: &Path) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// File-picker filter: a label and the accepted extensions, without the dot.
#[derive(Debug, Clone, Copy)]
pub struct FileFilter {
    pub label: &'static str,
    pub extensions: &'static [&'static str],
}

pub const DOCX_FILTER: FileFilter = FileFilter {
    label: "Arquivos Word",
    extensions: &["docx"],
};

/// The interactive boundary: dialogs, console prompts, and the system file browser.
pub trait Interaction: Send + Sync {
    /// `None` means the user dismissed the selection.
    fn select_file(&self, title: &str, filter: &FileFilter) -> Option<PathBuf>;
    /// Reads one line without its terminator. Fails with `InputClosed` at end of input.
    fn prompt_line(&self, prompt: &str) -> Result<String>;
    fn message(&self, text: &str);
    fn open_folder(&self, path: &Path) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn template_path(&self) -> Option<&Path>;
    fn roster_path(&self) -> Option<&Path>;
    fn identifiers_path(&self) -> Option<&Path>;
    /// Base directory for the group folder; the template's directory when unset.
    fn output_root(&self) -> Option<&Path>;
    fn open_output_folder(&self) -> bool;
    fn fallback_group_name(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Template and roster selection plus group-name derivation. `None` when cancelled.
    async fn select_inputs(&self) -> Result<Option<RunInputs>>;
    async fn extract(&self, inputs: &RunInputs) -> Result<Vec<StudentRecord>>;
    async fn transform(&self, records: Vec<StudentRecord>) -> Result<Vec<StudentRecord>>;
    async fn load(&self, inputs: &RunInputs, records: Vec<StudentRecord>) -> Result<GenerationSummary>;
    async fn report(&self, summary: &GenerationSummary) -> Result<()>;
}
