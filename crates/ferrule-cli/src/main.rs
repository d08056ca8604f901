//! `ferrule`: issue and decode Snowflake primary keys from the shell.
//!
//! ```bash
//! SNOWFLAKE_WORKER_ID=3 ferrule generate -n 10
//! ferrule decode 1234567890123456789
//! ```

mod commands;
mod config;
mod telemetry;

use std::io;

use clap::Parser;
use config::{CliArgs, CliConfig, Command};
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::try_from(args)?;

    init_telemetry()?;

    if cfg!(debug_assertions) {
        tracing::debug!("Starting with full config: {:#?}", config);
    }

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    match config.command {
        Command::Generate {
            count,
            threads,
            padded,
        } => commands::generate(&config.allocator, count, threads, padded, &mut out),
        Command::Decode { ids } => commands::decode(&ids, config.allocator.epoch_ms(), &mut out),
    }
}
