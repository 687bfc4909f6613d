//! TaskShare command-line tool
//!
//! Usage:
//!   taskshare user add alice alice@example.com
//!   taskshare project create --as alice Garden
//!   taskshare task share --as alice <TASK_ID> --user-name bob --edit true
//!
//! Logging honours `RUST_LOG`; `--verbose` raises the default to debug.

use anyhow::Result;
use clap::Parser;
use serde_json::json;
use std::process::ExitCode;
use taskshare_access::AccessError;
use taskshare_cli::{run, Cli};
use tracing::warn;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(&cli) {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => match err.downcast_ref::<AccessError>() {
            Some(access) => {
                warn!(error = %access, "Command failed");
                let body = json!({ "error": access.public_message(), "status": access.status() });
                eprintln!("{}", serde_json::to_string_pretty(&body)?);
                Ok(ExitCode::FAILURE)
            }
            None => Err(err),
        },
    }
}
