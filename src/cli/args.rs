//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Cache-busting asset versioner
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: assetrev.toml)
    #[arg(short = 'C', long, global = true, default_value = "assetrev.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Hash assets into the build directory and write the manifest
    #[command(visible_alias = "v")]
    Version {
        #[command(flatten)]
        args: VersionArgs,
    },

    /// Version once, then again whenever a source changes
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        args: VersionArgs,
    },
}

/// Shared arguments for Version and Watch commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct VersionArgs {
    /// Source files or glob patterns, relative to the public directory.
    /// Replaces `sources` from the config file when given.
    #[arg(value_name = "SOURCE")]
    pub sources: Vec<PathBuf>,

    /// Public assets directory (default: public)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub public: Option<PathBuf>,

    /// Build directory (default: <public>/build)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub build: Option<PathBuf>,

    /// Length of the content hash in filenames
    #[arg(long = "hash-length", value_name = "N")]
    pub hash_length: Option<usize>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    /// Arguments of whichever subcommand was given.
    pub const fn version_args(&self) -> &VersionArgs {
        match &self.command {
            Commands::Version { args } | Commands::Watch { args } => args,
        }
    }

    pub const fn is_watch(&self) -> bool {
        matches!(self.command, Commands::Watch { .. })
    }
}
