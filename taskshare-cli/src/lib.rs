//! Command-line front end for TaskShare.
//!
//! The CLI stands in for the session layer: `--as <name>` picks the acting
//! user, and every command prints its result as JSON.

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::Cli;
pub use commands::execute;
pub use config::CliConfig;

use anyhow::Result;
use serde_json::Value;
use taskshare_access::AccessEngine;
use tracing::debug;

/// Loads configuration, opens the engine and runs the parsed command.
pub fn run(cli: &Cli) -> Result<Value> {
    let config = CliConfig::load(cli.config.as_deref())?.with_db(cli.db.as_deref());
    debug!(path = %config.store.path, "Opening store");
    let engine = AccessEngine::open(&config.store)?;
    execute(&engine, &cli.command)
}
