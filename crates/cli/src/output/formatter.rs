//! Human-readable and JSON output
//!
//! Results go to stdout, diagnostics to stderr. In JSON mode stdout carries
//! exactly one JSON document and status lines are suppressed.

use serde::Serialize;

use super::OutputConfig;

/// Kind of a one-line status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Success,
    Warning,
    Error,
}

impl Status {
    fn symbol(self) -> &'static str {
        match self {
            Status::Success => "✓",
            Status::Warning => "⚠",
            Status::Error => "✗",
        }
    }

    /// ANSI color code for the symbol
    fn color(self) -> u8 {
        match self {
            Status::Success => 32,
            Status::Warning => 33,
            Status::Error => 31,
        }
    }
}

/// Formatter for CLI output
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
    no_color_env: bool,
}

impl Formatter {
    /// Create a formatter; the `NO_COLOR` environment variable disables colors
    pub fn new(config: OutputConfig) -> Self {
        let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            config,
            no_color_env,
        }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json && !self.no_color_env
    }

    /// Print a result, as JSON or through its `Display` impl
    pub fn output<T: Serialize + std::fmt::Display>(&self, value: &T) {
        if self.config.quiet {
            return;
        }

        if self.config.json {
            self.json(value);
        } else {
            println!("{value}");
        }
    }

    /// Success line on stdout; silent in quiet and JSON mode
    pub fn success(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        println!("{}", self.status_line(Status::Success, message));
    }

    /// Error on stderr, printed even in quiet mode
    pub fn error(&self, message: &str) {
        if self.config.json {
            let error = serde_json::json!({ "error": message });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&error).unwrap_or_else(|_| message.to_string())
            );
        } else {
            eprintln!("{}", self.status_line(Status::Error, message));
        }
    }

    /// Warning on stderr; silent in quiet and JSON mode
    pub fn warning(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        eprintln!("{}", self.status_line(Status::Warning, message));
    }

    /// Print any serializable value as pretty JSON
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    fn status_line(&self, status: Status, message: &str) -> String {
        if self.colors_enabled() {
            format!("\x1b[{}m{}\x1b[0m {message}", status.color(), status.symbol())
        } else {
            format!("{} {message}", status.symbol())
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}
