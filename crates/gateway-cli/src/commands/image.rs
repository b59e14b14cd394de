//! Image command - generate images from a prompt.

use anyhow::Result;
use clap::Args;
use gateway_sdk::{Client, ImageRequest};
use serde::Serialize;

use crate::output::{self, CommandResult, OutputFormat};

/// Arguments for the image command.
#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Text prompt
    pub prompt: String,

    /// Model override
    #[arg(short = 'M', long)]
    pub model: Option<String>,

    /// Output size, e.g. 1024x1024
    #[arg(short, long)]
    pub size: Option<String>,

    /// Number of images
    #[arg(short, long)]
    pub n: Option<u32>,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<i64>,

    /// Disable the provider watermark
    #[arg(long)]
    pub no_watermark: bool,
}

/// Image generation output.
#[derive(Debug, Serialize)]
pub struct ImageOutput {
    pub urls: Vec<String>,
    pub inline: usize,
}

/// Execute the image command.
pub async fn execute(args: &ImageArgs, client: &Client, format: OutputFormat) -> Result<()> {
    let request = build_request(args);

    let images = if format == OutputFormat::Text {
        let spinner = output::spinner("Generating image...");
        let result = client.image(&request).await;
        spinner.finish_and_clear();
        result?
    } else {
        client.image(&request).await?
    };

    let result = ImageOutput {
        urls: images.urls().map(String::from).collect(),
        inline: images.data.iter().filter(|i| i.b64_json.is_some()).count(),
    };

    match format {
        OutputFormat::Json => CommandResult::success(result).print(format)?,
        OutputFormat::Text => {
            if result.urls.is_empty() && result.inline == 0 {
                output::warning("Provider returned no images");
            }
            for url in &result.urls {
                println!("{url}");
            }
            if result.inline > 0 {
                output::key_value("Inline images", &result.inline.to_string());
            }
        }
    }

    Ok(())
}

fn build_request(args: &ImageArgs) -> ImageRequest {
    let mut request = ImageRequest::new(args.prompt.clone());
    request.model = args.model.clone();
    request.size = args.size.clone();
    request.n = args.n.map(Into::into);
    request.seed = args.seed.map(Into::into);
    if args.no_watermark {
        request.watermark = Some(false);
    }
    request
}
