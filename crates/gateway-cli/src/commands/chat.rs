//! Chat command - send chat completion requests.

use anyhow::{bail, Result};
use clap::Args;
use gateway_sdk::{ChatMessage, ChatRequest, Client, Usage};
use serde::Serialize;
use std::io::{self, Read};

use crate::output::{self, CommandResult, OutputFormat};

/// Arguments for the chat command.
#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Message to send (if not provided, reads from stdin)
    pub message: Option<String>,

    /// Model override
    #[arg(short = 'M', long)]
    pub model: Option<String>,

    /// System prompt
    #[arg(short, long)]
    pub system: Option<String>,

    /// Temperature
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Maximum tokens to generate
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Top-p sampling parameter
    #[arg(long)]
    pub top_p: Option<f64>,

    /// Show token usage
    #[arg(long)]
    pub show_usage: bool,
}

/// Chat response for output.
#[derive(Debug, Serialize)]
pub struct ChatOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageOutput>,
}

/// Token usage output.
#[derive(Debug, Serialize)]
pub struct UsageOutput {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl From<Usage> for UsageOutput {
    fn from(u: Usage) -> Self {
        Self {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}

/// Execute the chat command.
pub async fn execute(args: &ChatArgs, client: &Client, format: OutputFormat) -> Result<()> {
    let message = match &args.message {
        Some(message) => message.clone(),
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            input.trim().to_string()
        }
    };
    if message.is_empty() {
        bail!("No message provided");
    }

    let request = build_request(args, message);

    let completion = if format == OutputFormat::Text {
        let spinner = output::spinner("Generating response...");
        let result = client.chat(&request).await;
        spinner.finish_and_clear();
        result?
    } else {
        client.chat(&request).await?
    };

    match format {
        OutputFormat::Json => {
            let first = completion.choices.first();
            CommandResult::success(ChatOutput {
                model: completion.model.clone(),
                content: completion.content().to_string(),
                finish_reason: first.and_then(|c| c.finish_reason.clone()),
                usage: completion.usage.map(UsageOutput::from),
            })
            .print(format)?;
        }
        OutputFormat::Text => {
            println!("{}", completion.content());
            if args.show_usage {
                if let Some(usage) = completion.usage {
                    output::section("Token Usage");
                    output::key_value("Prompt", &usage.prompt_tokens.to_string());
                    output::key_value("Completion", &usage.completion_tokens.to_string());
                    output::key_value("Total", &usage.total_tokens.to_string());
                }
            }
        }
    }

    Ok(())
}

fn build_request(args: &ChatArgs, message: String) -> ChatRequest {
    let mut builder = ChatRequest::builder();
    if let Some(system) = &args.system {
        builder = builder.message(ChatMessage::system(system.clone()));
    }
    builder = builder.message(ChatMessage::user(message));
    if let Some(model) = &args.model {
        builder = builder.model(model.clone());
    }
    if let Some(temperature) = args.temperature {
        builder = builder.temperature(temperature);
    }
    if let Some(top_p) = args.top_p {
        builder = builder.top_p(top_p);
    }
    if let Some(max_tokens) = args.max_tokens {
        builder = builder.max_tokens(max_tokens);
    }
    builder.build()
}
