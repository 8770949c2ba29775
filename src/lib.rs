pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{ConsoleInteraction, LocalStorage};
pub use app::pipelines::declaration_pipeline::DeclarationPipeline;
pub use config::{toml_config::TomlConfig, CliConfig};
pub use core::engine::DeclarationEngine;
pub use domain::model::{GenerationSummary, Identifier, RunOutcome, StudentRecord};
pub use utils::error::{DeclError, Result};
