use crate::core::output::DEFAULT_GROUP_NAME;
use crate::utils::error::{DeclError, Result};
use crate::utils::validation::{validate_file_extension, validate_non_empty_string, validate_path, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const DEFAULT_CONFIG_FILE: &str = "declgen.toml";

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    pub template: Option<PathBuf>,
    pub roster: Option<PathBuf>,
    /// CSV with enrollment id and CPF columns.
    pub identifiers: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub directory: Option<PathBuf>,
    pub open_folder: Option<bool>,
    pub fallback_group_name: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DeclError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` when given, otherwise `declgen.toml` from the working directory if it exists.
    pub fn discover(path: Option<&Path>) -> Result<Option<Self>> {
        match path {
            Some(path) => Self::from_file(path).map(Some),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                tracing::debug!("Using {}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE).map(Some)
            }
            None => Ok(None),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| DeclError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HOME})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn fallback_group_name(&self) -> &str {
        self.output
            .fallback_group_name
            .as_deref()
            .unwrap_or(DEFAULT_GROUP_NAME)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(template) = &self.input.template {
            validate_file_extension("input.template", template, &["docx"])?;
        }
        if let Some(roster) = &self.input.roster {
            validate_file_extension("input.roster", roster, &["docx"])?;
        }
        if let Some(identifiers) = &self.input.identifiers {
            validate_file_extension("input.identifiers", identifiers, &["csv"])?;
        }
        if let Some(directory) = &self.output.directory {
            validate_path("output.directory", directory)?;
        }
        validate_non_empty_string("output.fallback_group_name", self.fallback_group_name())?;
        Ok(())
    }
}
