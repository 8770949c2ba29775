pub mod toml_config;

use crate::core::output::DEFAULT_GROUP_NAME;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extension, validate_path, Validate};
use clap::Parser;
use std::path::{Path, PathBuf};
use toml_config::TomlConfig;

#[derive(Debug, Clone, Parser)]
#[command(name = "declgen")]
#[command(about = "Gera declarações individuais a partir de um modelo e de uma relação de alunos")]
pub struct CliConfig {
    /// Template document (.docx); a file dialog opens when omitted
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Roster document (.docx); a file dialog opens when omitted
    #[arg(long)]
    pub roster: Option<PathBuf>,

    /// CSV with enrollment id and CPF per line, used instead of prompting
    #[arg(long)]
    pub identifiers: Option<PathBuf>,

    /// Base directory for the class folder (defaults to the template's directory)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// TOML configuration file (defaults to ./declgen.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Do not open the output folder when done
    #[arg(long)]
    pub no_open: bool,

    #[arg(skip)]
    pub fallback_group_name: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Fills every option not given on the command line from the TOML file.
    pub fn merge_toml(&mut self, toml: TomlConfig) {
        let TomlConfig { input, output } = toml;
        self.template = self.template.take().or(input.template);
        self.roster = self.roster.take().or(input.roster);
        self.identifiers = self.identifiers.take().or(input.identifiers);
        self.output_dir = self.output_dir.take().or(output.directory);
        if output.open_folder == Some(false) {
            self.no_open = true;
        }
        self.fallback_group_name = self.fallback_group_name.take().or(output.fallback_group_name);
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(template) = &self.template {
            validate_file_extension("template", template, &["docx"])?;
        }
        if let Some(roster) = &self.roster {
            validate_file_extension("roster", roster, &["docx"])?;
        }
        if let Some(identifiers) = &self.identifiers {
            validate_file_extension("identifiers", identifiers, &["csv"])?;
        }
        if let Some(output_dir) = &self.output_dir {
            validate_path("output_dir", output_dir)?;
        }
        Ok(())
    }
}

impl ConfigProvider for CliConfig {
    fn template_path(&self) -> Option<&Path> {
        self.template.as_deref()
    }

    fn roster_path(&self) -> Option<&Path> {
        self.roster.as_deref()
    }

    fn identifiers_path(&self) -> Option<&Path> {
        self.identifiers.as_deref()
    }

    fn output_root(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    fn open_output_folder(&self) -> bool {
        !self.no_open
    }

    fn fallback_group_name(&self) -> &str {
        self.fallback_group_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_GROUP_NAME)
    }
}
