use anyhow::Context;
use clap::Parser;
use declgen::utils::error::{ErrorCategory, GENERIC_REMEDIATION};
use declgen::utils::{logger, validation::Validate};
use declgen::{
    CliConfig, ConsoleInteraction, DeclError, DeclarationEngine, DeclarationPipeline, LocalStorage,
    RunOutcome, TomlConfig,
};

#[tokio::main]
async fn main() {
    let mut config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    println!("=== GERADOR DE DECLARAÇÕES ===");

    if let Err(e) = load_config(&mut config) {
        tracing::error!("❌ Configuration failed: {:#}", e);
        eprintln!("❌ {:#}", e);
        return;
    }
    tracing::debug!("Config: {:?}", config);

    let pipeline = DeclarationPipeline::new(LocalStorage::new(), ConsoleInteraction::new(), config);
    let engine = DeclarationEngine::new(pipeline);

    match engine.run().await {
        Ok(RunOutcome::Completed(summary)) => {
            for (student, error) in &summary.failures {
                tracing::debug!("Failed: {} ({})", student, error);
            }
        }
        Ok(RunOutcome::Cancelled) => {}
        Err(e) => report_failure(&e),
    }
}

fn load_config(config: &mut CliConfig) -> anyhow::Result<()> {
    if let Some(toml) = TomlConfig::discover(config.config.as_deref()).context("failed to load TOML configuration")? {
        toml.validate().context("invalid TOML configuration")?;
        config.merge_toml(toml);
    }
    config.validate().context("invalid command-line arguments")?;
    Ok(())
}

fn report_failure(e: &DeclError) {
    tracing::error!("❌ Run failed: {} (Category: {:?})", e, e.category());

    match e {
        DeclError::EmptyRoster | DeclError::RosterError { .. } => {
            println!("\n❌ {}", e.user_friendly_message());
            println!("{}", e.recovery_suggestion());
        }
        _ => {
            println!("\n❌ ERRO CRÍTICO: {}", e.user_friendly_message());
            println!("Recomendações:");
            println!("{}", GENERIC_REMEDIATION);
            if !matches!(e.category(), ErrorCategory::Document | ErrorCategory::FileSystem) {
                println!("💡 {}", e.recovery_suggestion());
            }
        }
    }
}
