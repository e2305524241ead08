//! Configuration commands
//!
//! Remote connection settings (endpoint and HMAC keys) and sink settings
//! are stored in the gsw configuration file.

use std::fmt;

use clap::Subcommand;
use gsw_core::{Config, ConfigManager, RemoteConfig, Result, SinkConfig, TimeoutConfig};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration with secrets masked
    Show,

    /// Update configuration values
    Set(SetArgs),
}

/// Arguments for the `config set` command
#[derive(clap::Args, Debug, Default)]
pub struct SetArgs {
    /// Cloud Storage XML API endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Signing region
    #[arg(long)]
    pub region: Option<String>,

    /// HMAC access key ID
    #[arg(long)]
    pub access_key: Option<String>,

    /// HMAC secret
    #[arg(long)]
    pub secret_key: Option<String>,

    /// Connection timeout in milliseconds
    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,

    /// Read timeout in milliseconds
    #[arg(long)]
    pub read_timeout_ms: Option<u64>,

    /// Pending buffer size in bytes
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub buffer_size: Option<u64>,
}

impl SetArgs {
    fn apply(self, config: &mut Config) {
        let remote = &mut config.remote;
        if let Some(endpoint) = self.endpoint {
            remote.endpoint = endpoint;
        }
        if let Some(region) = self.region {
            remote.region = region;
        }
        if self.access_key.is_some() {
            remote.access_key = self.access_key;
        }
        if self.secret_key.is_some() {
            remote.secret_key = self.secret_key;
        }
        if self.connect_timeout_ms.is_some() || self.read_timeout_ms.is_some() {
            let timeout = remote.timeout.get_or_insert_with(TimeoutConfig::default);
            if let Some(ms) = self.connect_timeout_ms {
                timeout.connect_ms = ms;
            }
            if let Some(ms) = self.read_timeout_ms {
                timeout.read_ms = ms;
            }
        }
        if let Some(size) = self.buffer_size {
            config.sink.buffer_size = usize::try_from(size).unwrap_or(usize::MAX);
        }
    }
}

/// Configuration as shown to the user
#[derive(Debug, Serialize)]
struct ConfigView {
    path: String,
    remote: RemoteConfig,
    sink: SinkConfig,
}

impl fmt::Display for ConfigView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Config file: {}", self.path)?;
        writeln!(f, "Endpoint:    {}", self.remote.endpoint)?;
        writeln!(f, "Region:      {}", self.remote.region)?;
        writeln!(
            f,
            "Access key:  {}",
            self.remote.access_key.as_deref().unwrap_or("(not set)")
        )?;
        writeln!(
            f,
            "Secret key:  {}",
            self.remote.secret_key.as_deref().unwrap_or("(not set)")
        )?;
        if let Some(timeout) = &self.remote.timeout {
            writeln!(
                f,
                "Timeouts:    connect {}ms, read {}ms",
                timeout.connect_ms, timeout.read_ms
            )?;
        }
        write!(f, "Buffer size: {} bytes", self.sink.buffer_size)
    }
}

/// Execute a config subcommand
pub fn execute(cmd: ConfigCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let result = ConfigManager::new().and_then(|manager| match cmd {
        ConfigCommands::Show => execute_show(&manager, &formatter),
        ConfigCommands::Set(args) => execute_set(args, &manager, &formatter),
    });

    match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from_error(&e)
        }
    }
}

fn execute_show(manager: &ConfigManager, formatter: &Formatter) -> Result<()> {
    let config = manager.load()?;
    formatter.output(&ConfigView {
        path: manager.config_path().display().to_string(),
        remote: config.remote.redacted(),
        sink: config.sink,
    });
    Ok(())
}

fn execute_set(args: SetArgs, manager: &ConfigManager, formatter: &Formatter) -> Result<()> {
    let mut config = manager.load()?;
    args.apply(&mut config);

    if config.remote.endpoint.starts_with("http://") {
        formatter.warning("Endpoint is not HTTPS; credentials will be sent unencrypted");
    }

    manager.save(&config)?;

    if formatter.is_json() {
        formatter.json(&serde_json::json!({
            "success": true,
            "path": manager.config_path().display().to_string(),
        }));
    } else {
        formatter.success(&format!(
            "Configuration saved to {}",
            manager.config_path().display()
        ));
    }
    Ok(())
}
