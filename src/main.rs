//! assetrev - cache-busting asset versioner.
//!
//! Copies built assets into a build directory under content-hashed names,
//! writes `rev-manifest.json`, and removes stale and intermediate files.

#![allow(dead_code)]

mod asset;
mod cli;
mod config;
mod logger;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::RevConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    logger::set_verbose(cli.version_args().verbose);

    let config = RevConfig::load(&cli)?;
    if let Some(path) = &config.config_path {
        debug!("config"; "using {}", path.display());
    }

    match &cli.command {
        Commands::Version { .. } => cli::version::run_version(&config).map(|_| ()),
        Commands::Watch { .. } => cli::watch::watch(&config),
    }
}
