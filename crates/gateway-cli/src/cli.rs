//! CLI argument definitions using clap.

use anyhow::Result;
use clap::{Parser, Subcommand};
use gateway_sdk::{Client, Vendor};
use std::time::Duration;
use tracing::debug;

use crate::commands;
use crate::output::OutputFormat;

/// Generation gateway client: chat, images, video tasks and speech
#[derive(Parser, Debug)]
#[command(name = "genctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Gateway server URL
    #[arg(short = 'u', long, env = "GATEWAY_URL", default_value = "http://localhost:8080", global = true)]
    pub url: String,

    /// Bearer key for gateways behind an authenticating proxy
    #[arg(short = 'k', long, env = "GATEWAY_API_KEY", global = true)]
    pub api_key: Option<String>,

    /// Vendor to route to (doubao, qianfan, volc-tts); gateway defaults otherwise
    #[arg(short, long, global = true)]
    pub provider: Option<Vendor>,

    /// Request timeout
    #[arg(long, value_parser = humantime::parse_duration, default_value = "180s", global = true)]
    pub timeout: Duration,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a chat completion request
    Chat(commands::chat::ChatArgs),

    /// Generate images from a prompt
    Image(commands::image::ImageArgs),

    /// Create and inspect video generation tasks
    Video(commands::video::VideoArgs),

    /// Synthesize speech to an audio file
    Speech(commands::speech::SpeechArgs),

    /// Inspect gateway configuration
    Config(commands::config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        let format = OutputFormat::from_json_flag(self.json);
        match self.command {
            Commands::Config(ref args) => commands::config::execute(args, format).await,
            Commands::Chat(ref args) => commands::chat::execute(args, &self.client()?, format).await,
            Commands::Image(ref args) => commands::image::execute(args, &self.client()?, format).await,
            Commands::Video(ref args) => commands::video::execute(args, &self.client()?, format).await,
            Commands::Speech(ref args) => {
                commands::speech::execute(args, &self.client()?, format).await
            }
        }
    }

    /// Build the SDK client from the global flags.
    fn client(&self) -> Result<Client> {
        debug!(url = %self.url, provider = ?self.provider, timeout = ?self.timeout, "Building gateway client");
        let mut builder = Client::builder().base_url(&self.url).timeout(self.timeout);
        if let Some(key) = &self.api_key {
            builder = builder.api_key(key);
        }
        if let Some(vendor) = self.provider {
            builder = builder.provider(vendor);
        }
        Ok(builder.build()?)
    }
}
