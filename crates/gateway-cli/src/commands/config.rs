//! Config command - inspect gateway configuration.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use gateway_config::{load_config, load_from_file, GatewayConfig};
use std::path::PathBuf;

use crate::output::{self, CommandResult, OutputFormat};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Load and validate configuration, then print a redacted summary
    Check(CheckArgs),
}

/// Arguments for config check.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Configuration file; defaults to $GATEWAY_CONFIG, then built-in defaults
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Execute the config command.
pub async fn execute(args: &ConfigArgs, format: OutputFormat) -> Result<()> {
    match &args.command {
        ConfigCommand::Check(check) => execute_check(check, format).await,
    }
}

async fn execute_check(args: &CheckArgs, format: OutputFormat) -> Result<()> {
    let config = load(args.file.as_ref()).await?;
    let summary = config.summary();

    match format {
        OutputFormat::Json => CommandResult::success(&summary).print(format)?,
        OutputFormat::Text => {
            output::success("Configuration is valid");
            output::section("Server");
            output::key_value("Listen", &summary.listen);
            output::key_value("CORS origin", &summary.cors_allow_origin);

            output::section("Providers");
            output::key_value("Doubao", &summary.doubao_base_url);
            output::status("API key", summary.doubao_api_key);
            output::key_value("Qianfan", &summary.qianfan_base_url);
            output::status(
                &format!("Credential: {}", summary.qianfan_credential),
                summary.qianfan_credential != "none",
            );
            output::key_value("TTS", &summary.tts_url);
            output::status("Token", summary.tts_api_key);
        }
    }

    Ok(())
}

async fn load(file: Option<&PathBuf>) -> Result<GatewayConfig> {
    let Some(path) = file else {
        return load_config().await.context("Failed to load configuration");
    };

    let mut config = load_from_file(path)
        .await
        .with_context(|| format!("Failed to load {}", path.display()))?;
    config.apply_env()?;
    config.validate()?;
    Ok(config)
}
