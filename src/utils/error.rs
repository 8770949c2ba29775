use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeclError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Document error: {message}")]
    DocumentError { message: String },

    #[error("Roster error: {message}")]
    RosterError { message: String },

    #[error("Nenhum aluno encontrado na relação. Verifique se o arquivo contém uma tabela com matrículas e nomes.")]
    EmptyRoster,

    #[error("Standard input closed before all identifiers were collected")]
    InputClosed,

    #[error("Student {id} has no validated identifier")]
    MissingIdentifier { id: String },

    #[error("File name '{name}' would be written outside the output folder")]
    UnsafeFileName { name: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Roster,
    Document,
    Input,
    FileSystem,
}

impl DeclError {
    pub fn document(message: impl Into<String>) -> Self {
        Self::DocumentError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::RosterError { .. } | Self::EmptyRoster => ErrorCategory::Roster,
            Self::ZipError(_) | Self::XmlError(_) | Self::DocumentError { .. } => {
                ErrorCategory::Document
            }
            Self::CsvError(_) | Self::InputClosed | Self::MissingIdentifier { .. } => {
                ErrorCategory::Input
            }
            Self::IoError(_) | Self::UnsafeFileName { .. } => ErrorCategory::FileSystem,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::EmptyRoster => self.to_string(),
            Self::RosterError { message } => format!("Erro ao ler relação de alunos: {}", message),
            Self::InputClosed => "Entrada encerrada antes de todos os CPFs serem informados.".to_string(),
            Self::ZipError(_) | Self::XmlError(_) | Self::DocumentError { .. } => {
                format!("Documento inválido ou corrompido: {}", self)
            }
            Self::IoError(e) => format!("Erro de arquivo: {}", e),
            Self::UnsafeFileName { name } => {
                format!("Nome de arquivo inválido (a matrícula contém separadores de pasta): {}", name)
            }
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Roster => {
                "Verifique se o arquivo contém uma tabela com:\n\
                 - Matrículas na primeira coluna\n\
                 - Nomes dos alunos na segunda coluna"
            }
            ErrorCategory::Configuration => {
                "Revise os argumentos da linha de comando e o arquivo de configuração TOML"
            }
            ErrorCategory::Input => "Informe os CPFs novamente ou revise o arquivo CSV de CPFs",
            ErrorCategory::Document | ErrorCategory::FileSystem => GENERIC_REMEDIATION,
        }
    }
}

/// Shown for failures nothing more specific can be said about.
pub const GENERIC_REMEDIATION: &str = "1. Verifique se os arquivos selecionados estão no formato correto\n\
2. Feche todos os arquivos Word antes de executar\n\
3. Verifique as permissões da pasta";

pub type Result<T> = std::result::Result<T, DeclError>;
