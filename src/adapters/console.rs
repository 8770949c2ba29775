use crate::domain::ports::{FileFilter, Interaction};
use crate::utils::error::{DeclError, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Native dialogs for file selection, stdin/stdout for everything else.
#[derive(Debug, Clone, Default)]
pub struct ConsoleInteraction;

impl ConsoleInteraction {
    pub fn new() -> Self {
        Self
    }

    #[cfg(feature = "dialogs")]
    fn pick_file(&self, title: &str, filter: &FileFilter) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title(title)
            .add_filter(filter.label, filter.extensions)
            .pick_file()
    }

    /// Without native dialogs the path is typed in; an empty line cancels.
    #[cfg(not(feature = "dialogs"))]
    fn pick_file(&self, title: &str, filter: &FileFilter) -> Option<PathBuf> {
        let prompt = format!("{} (*.{}): ", title, filter.extensions.join(", *."));
        match self.prompt_line(&prompt) {
            Ok(line) if !line.trim().is_empty() => Some(PathBuf::from(line.trim())),
            _ => None,
        }
    }
}

impl Interaction for ConsoleInteraction {
    fn select_file(&self, title: &str, filter: &FileFilter) -> Option<PathBuf> {
        tracing::debug!("Selecting file: {}", title);
        self.pick_file(title, filter)
    }

    fn prompt_line(&self, prompt: &str) -> Result<String> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;
        drop(stdout);

        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(DeclError::InputClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn message(&self, text: &str) {
        println!("{}", text);
    }

    fn open_folder(&self, path: &Path) -> Result<()> {
        let program = if cfg!(target_os = "windows") {
            "explorer"
        } else if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };

        tracing::debug!("Opening {} with {}", path.display(), program);
        Command::new(program).arg(path).spawn()?;
        Ok(())
    }
}
