//! Output formatting utilities for the CLI.

use colored::{ColoredString, Colorize};
use gateway_sdk::TaskStatus;
use serde::Serialize;
use std::time::Duration;

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Create an output format from a JSON flag.
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Print a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Print a key-value pair.
pub fn key_value(key: &str, value: &str) {
    println!("  {}: {}", key.bold(), value);
}

/// Print a section header.
pub fn section(title: &str) {
    println!("\n{}", title.bold().underline());
}

/// Print a status indicator.
pub fn status(label: &str, ok: bool) {
    let indicator = if ok { "●".green() } else { "●".red() };
    println!("  {} {}", indicator, label);
}

/// Render a task status, colored by outcome.
pub fn task_status(status: Option<&TaskStatus>) -> ColoredString {
    let Some(status) = status else {
        return "unknown".dimmed();
    };
    let label = status.as_str();
    match status {
        TaskStatus::Succeeded => label.green().bold(),
        TaskStatus::Failed | TaskStatus::Cancelled => label.red().bold(),
        TaskStatus::Queued | TaskStatus::Running => label.yellow(),
        TaskStatus::Unknown => label.dimmed(),
    }
}

/// Print JSON output.
pub fn json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let output = serde_json::to_string_pretty(value)?;
    println!("{}", output);
    Ok(())
}

/// Create a spinner for long-running operations.
pub fn spinner(message: &str) -> indicatif::ProgressBar {
    let spinner = indicatif::ProgressBar::new_spinner();
    let style = indicatif::ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Format a duration to whole seconds, e.g. `1m 10s`.
pub fn format_duration(duration: Duration) -> String {
    humantime::format_duration(Duration::from_secs(duration.as_secs())).to_string()
}

/// Result output that can be formatted as text or JSON.
#[derive(Debug, Serialize)]
pub struct CommandResult<T: Serialize> {
    /// Whether the command succeeded.
    pub success: bool,
    /// Result data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message if failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    /// Create a successful result with data.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create a failed result.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Print the result in the specified format.
    ///
    /// Text output covers failures only; commands render their own data.
    pub fn print(&self, format: OutputFormat) -> anyhow::Result<()> {
        match format {
            OutputFormat::Json => json(self),
            OutputFormat::Text => {
                if let Some(ref err) = self.error {
                    error(err);
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_result_json_shape() {
        let value = serde_json::to_value(CommandResult::success(vec!["a"])).unwrap();
        assert_eq!(value, serde_json::json!({"success": true, "data": ["a"]}));

        let value = serde_json::to_value(CommandResult::<()>::failure("boom")).unwrap();
        assert_eq!(value, serde_json::json!({"success": false, "error": "boom"}));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(70)), "1m 10s");
        assert_eq!(format_duration(Duration::from_millis(12_345)), "12s");
    }
}
