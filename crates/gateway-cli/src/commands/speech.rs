//! Speech command - synthesize text to an audio file.

use anyhow::{Context, Result};
use clap::Args;
use gateway_sdk::{Client, SpeechRequest};
use serde::Serialize;
use serde_json::Number;
use std::path::PathBuf;

use crate::output::{self, CommandResult, OutputFormat};

/// Arguments for the speech command.
#[derive(Args, Debug)]
pub struct SpeechArgs {
    /// Text to synthesize
    pub text: String,

    /// Output audio file
    #[arg(short, long)]
    pub out: PathBuf,

    /// Voice identifier
    #[arg(long)]
    pub voice: Option<String>,

    /// Speaking rate multiplier
    #[arg(long)]
    pub speed: Option<f64>,

    /// Pitch multiplier
    #[arg(long)]
    pub pitch: Option<f64>,

    /// Audio container, e.g. mp3
    #[arg(short, long)]
    pub format: Option<String>,
}

/// Speech output.
#[derive(Debug, Serialize)]
pub struct SpeechOutput {
    pub path: String,
    pub bytes: usize,
    pub content_type: String,
}

/// Execute the speech command.
pub async fn execute(args: &SpeechArgs, client: &Client, format: OutputFormat) -> Result<()> {
    let mut request = SpeechRequest::new(args.text.clone());
    request.voice = args.voice.clone();
    request.speed = args.speed.and_then(Number::from_f64);
    request.pitch = args.pitch.and_then(Number::from_f64);
    request.format = args.format.clone();

    let audio = client.speech(&request).await?;
    tokio::fs::write(&args.out, &audio.bytes)
        .await
        .with_context(|| format!("Failed to write {}", args.out.display()))?;

    let result = SpeechOutput {
        path: args.out.display().to_string(),
        bytes: audio.bytes.len(),
        content_type: audio.content_type,
    };

    match format {
        OutputFormat::Json => CommandResult::success(result).print(format)?,
        OutputFormat::Text => output::success(&format!(
            "Wrote {} bytes of {} to {}",
            result.bytes, result.content_type, result.path
        )),
    }

    Ok(())
}
