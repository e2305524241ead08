//! write command - Write lines to a destination
//!
//! Resolves the destination, opens the matching backend, writes every line
//! through a buffered sink and closes it. Lines come from the command line,
//! or from stdin when none are given.

use clap::Args;
use gsw_core::{
    BufferedSink, ConfigManager, Destination, Error, Opener, RemoteConfig, Result, resolve,
};
use gsw_s3::S3Connector;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Sample payload written by `--demo`
pub const DEMO_LINES: [&str; 2] = ["The quick brown fox", "jumped over the lazy dog"];

/// Write lines to a destination
#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Path to where the output will be written (gs://bucket/key or a local path)
    #[arg(short = 'f', long)]
    pub filepath: String,

    /// Lines to write; read from stdin when omitted
    #[arg(conflicts_with = "demo")]
    pub lines: Vec<String>,

    /// Write the two sample lines
    #[arg(long)]
    pub demo: bool,

    /// Pending buffer size in bytes (overrides the config file)
    #[arg(long, value_parser = parse_buffer_size)]
    pub buffer_size: Option<usize>,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

/// Remote connection overrides
#[derive(Args, Debug, Default)]
pub struct RemoteArgs {
    /// Cloud Storage XML API endpoint
    #[arg(long, env = "GSW_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Signing region
    #[arg(long, env = "GSW_REGION")]
    pub region: Option<String>,

    /// HMAC access key ID
    #[arg(long, env = "GSW_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// HMAC secret
    #[arg(long, env = "GSW_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,
}

impl RemoteArgs {
    /// Overlay the flags that were given onto `config`
    pub fn apply(self, config: &mut RemoteConfig) {
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(region) = self.region {
            config.region = region;
        }
        if self.access_key.is_some() {
            config.access_key = self.access_key;
        }
        if self.secret_key.is_some() {
            config.secret_key = self.secret_key;
        }
    }
}

fn parse_buffer_size(s: &str) -> std::result::Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("buffer size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Where the payload comes from
#[derive(Debug)]
enum Input {
    Lines(Vec<String>),
    Stdin,
}

impl Input {
    fn from_args(lines: Vec<String>, demo: bool) -> Self {
        if demo {
            Input::Lines(DEMO_LINES.iter().map(|l| l.to_string()).collect())
        } else if lines.is_empty() {
            Input::Stdin
        } else {
            Input::Lines(lines)
        }
    }
}

#[derive(Debug, Serialize)]
struct WriteOutput {
    status: &'static str,
    destination: Destination,
    lines: u64,
    size_bytes: u64,
    size_human: String,
}

/// Execute the write command
pub async fn execute(args: WriteArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    match run(args, &formatter).await {
        Ok(output) => {
            if formatter.is_json() {
                formatter.json(&output);
            } else {
                formatter.success(&format!(
                    "Wrote {} line{} ({}) to {}",
                    output.lines,
                    if output.lines == 1 { "" } else { "s" },
                    output.size_human,
                    output.destination
                ));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to write: {e}"));
            ExitCode::from_error(&e)
        }
    }
}

async fn run(args: WriteArgs, formatter: &Formatter) -> Result<WriteOutput> {
    let destination = resolve(&args.filepath)?;

    let mut config = ConfigManager::new()?.load()?;
    args.remote.apply(&mut config.remote);
    let buffer_size = args.buffer_size.unwrap_or(config.sink.buffer_size);
    tracing::debug!(%destination, buffer_size, "opening destination");

    let opener = Opener::new(S3Connector::new(config.remote)).with_buffer_size(buffer_size);
    let mut sink = opener.open_sink(&destination).await?;

    let input = Input::from_args(args.lines, args.demo);
    let output_config = formatter.config();
    let dest = &destination;
    sink.scoped(async move |sink| {
        match input {
            Input::Lines(lines) => sink.write_lines(lines).await?,
            Input::Stdin => copy_stdin(sink).await?,
        }

        let spinner = close_spinner(output_config, dest);
        let closed = sink.close().await;
        spinner.finish_and_clear();
        closed
    })
    .await?;

    let stats = sink.stats();
    Ok(WriteOutput {
        status: "success",
        destination,
        lines: stats.lines,
        size_bytes: stats.bytes,
        size_human: humansize::format_size(stats.bytes, humansize::BINARY),
    })
}

/// Spinner shown while a remote object is uploaded on close
fn close_spinner(config: &OutputConfig, destination: &Destination) -> ProgressBar {
    if destination.is_remote() {
        ProgressBar::spinner(config, &format!("Uploading to {destination}"))
    } else {
        ProgressBar::hidden()
    }
}

/// Forward stdin to the sink one line at a time
async fn copy_stdin(sink: &mut BufferedSink) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).split(b'\n');
    while let Some(line) = lines
        .next_segment()
        .await
        .map_err(|e| Error::General(format!("Failed to read from stdin: {e}")))?
    {
        sink.write(&line).await?;
    }
    Ok(())
}
