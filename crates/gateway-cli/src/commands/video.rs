//! Video commands - create generation tasks and follow them to completion.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use gateway_sdk::{
    Client, ContentPart, PollOutcome, PollerConfig, TaskStatus, VideoCreateRequest, VideoTask,
};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::output::{self, CommandResult, OutputFormat};

/// Arguments for the video command.
#[derive(Args, Debug)]
pub struct VideoArgs {
    #[command(subcommand)]
    pub command: VideoCommand,
}

/// Video subcommands.
#[derive(Subcommand, Debug)]
pub enum VideoCommand {
    /// Create a video generation task
    Create(CreateArgs),

    /// Look up a task once
    Status(StatusArgs),
}

/// Arguments for video create.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Text prompt
    pub prompt: String,

    /// Reference image URL (repeatable)
    #[arg(short, long = "image")]
    pub images: Vec<String>,

    /// Model override
    #[arg(short = 'M', long)]
    pub model: Option<String>,

    /// Poll until the task reaches a terminal status
    #[arg(short, long)]
    pub wait: bool,

    /// Delay between status lookups
    #[arg(long, value_parser = humantime::parse_duration, default_value = "10s")]
    pub interval: Duration,

    /// Give up waiting after this long
    #[arg(long, value_parser = humantime::parse_duration, default_value = "600s")]
    pub wait_timeout: Duration,
}

/// Arguments for video status.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Task identifier
    pub id: String,
}

/// Task summary output.
#[derive(Debug, Serialize)]
pub struct TaskOutput {
    pub id: String,
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polls: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed: Option<String>,
}

impl TaskOutput {
    fn from_task(task: &VideoTask) -> Self {
        Self {
            id: task.id.clone(),
            status: task.status.as_ref().map(|s| s.as_str().to_string()),
            video_url: task.video_url().map(String::from),
            polls: None,
            elapsed: None,
        }
    }
}

/// Execute the video command.
pub async fn execute(args: &VideoArgs, client: &Client, format: OutputFormat) -> Result<()> {
    match &args.command {
        VideoCommand::Create(create) => execute_create(create, client, format).await,
        VideoCommand::Status(status) => execute_status(status, client, format).await,
    }
}

async fn execute_create(args: &CreateArgs, client: &Client, format: OutputFormat) -> Result<()> {
    let task = client.create_video(&build_request(args)).await?;

    if !args.wait {
        let result = TaskOutput::from_task(&task);
        return match format {
            OutputFormat::Json => CommandResult::success(result).print(format),
            OutputFormat::Text => {
                output::success(&format!("Created task {}", result.id));
                Ok(())
            }
        };
    }

    if format == OutputFormat::Text {
        output::key_value("Task", &task.id);
    }
    wait_for(client, &task.id, args, format).await
}

async fn wait_for(client: &Client, id: &str, args: &CreateArgs, format: OutputFormat) -> Result<()> {
    let config = PollerConfig::default()
        .with_interval(args.interval)
        .with_timeout(args.wait_timeout);
    let mut poller = client.task_poller().with_config(config);

    let spinner = (format == OutputFormat::Text).then(|| output::spinner("Waiting for task..."));
    let progress = spinner.clone();
    poller = poller.on_status(move |task| {
        let status = task.status.as_ref().map_or("unknown", TaskStatus::as_str);
        debug!(id = %task.id, status, "Task status");
        if let Some(spinner) = &progress {
            spinner.set_message(format!("Task {status}..."));
        }
    });

    let start = Instant::now();
    let outcome = poller.run(id).await;
    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }
    let elapsed = output::format_duration(start.elapsed());

    match outcome? {
        PollOutcome::TimedOut { polls, last_status } => {
            let last = last_status.map_or("unknown", |s| s.as_str());
            bail!("TIMEOUT: task {id} still {last} after {polls} lookups ({elapsed})");
        }
        PollOutcome::Finished { task, polls } => {
            let mut result = TaskOutput::from_task(&task);
            result.polls = Some(polls);
            result.elapsed = Some(elapsed);

            if task.status != Some(TaskStatus::Succeeded) {
                let status = result.status.as_deref().unwrap_or("unknown");
                let detail = task.error.as_ref().map(ToString::to_string).unwrap_or_default();
                bail!("Task {id} ended {status} {detail}");
            }

            match format {
                OutputFormat::Json => CommandResult::success(result).print(format)?,
                OutputFormat::Text => {
                    output::success(&format!("Task {id} succeeded"));
                    if let Some(url) = &result.video_url {
                        output::key_value("Video", url);
                    }
                    if let Some(elapsed) = &result.elapsed {
                        output::key_value("Elapsed", elapsed);
                    }
                }
            }
            Ok(())
        }
    }
}

async fn execute_status(args: &StatusArgs, client: &Client, format: OutputFormat) -> Result<()> {
    let task = client.video_status(&args.id).await?;
    let result = TaskOutput::from_task(&task);

    match format {
        OutputFormat::Json => CommandResult::success(result).print(format)?,
        OutputFormat::Text => {
            output::key_value("Task", &result.id);
            output::key_value("Status", &output::task_status(task.status.as_ref()).to_string());
            if let Some(url) = &result.video_url {
                output::key_value("Video", url);
            }
            if let Some(error) = &task.error {
                output::warning(&error.to_string());
            }
        }
    }

    Ok(())
}

fn build_request(args: &CreateArgs) -> VideoCreateRequest {
    let mut content = vec![ContentPart::text(args.prompt.clone())];
    content.extend(args.images.iter().cloned().map(ContentPart::image_url));

    let mut request = VideoCreateRequest::new(content);
    request.model = args.model.clone();
    request
}
