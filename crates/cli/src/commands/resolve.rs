//! resolve command - Show how a destination string is interpreted

use std::fmt;

use clap::Args;
use gsw_core::{Destination, resolve};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Show how a destination string is interpreted
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Destination (gs://bucket/key or a local path)
    pub destination: String,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct ResolveOutput(Destination);

impl fmt::Display for ResolveOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dest = &self.0;
        writeln!(f, "Kind:   {}", dest.kind())?;
        if let Some(container) = dest.container() {
            writeln!(f, "Bucket: {container}")?;
        }
        write!(f, "Key:    {}", dest.key())
    }
}

/// Execute the resolve command
pub fn execute(args: ResolveArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    match resolve(&args.destination) {
        Ok(destination) => {
            formatter.output(&ResolveOutput(destination));
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from_error(&e)
        }
    }
}
