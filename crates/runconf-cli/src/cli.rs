//! CLI argument parsing using clap derive

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// runconf - Build, freeze and inspect run settings
#[derive(Parser, Debug)]
#[command(name = "runconf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Build settings from a file, --set pairs and the environment, then print them
    ///
    /// Layers are applied in order: defaults, settings file, --set pairs,
    /// environment variables. The result is frozen before printing.
    ///
    /// Examples:
    ///   runconf show
    ///   runconf show --config run.toml --set mode=offline
    ///   runconf show --set heartbeat_seconds=10 --format toml --no-env
    ///   runconf show --sources
    Show(ShowArgs),

    /// List every setting with its default
    Keys,

    /// List the environment variables that map to settings
    EnvMap,
}

/// Arguments for `runconf show`
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ShowArgs {
    /// Settings file (TOML, JSON or YAML)
    #[arg(short, long, env = "RUNCONF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override a setting, as KEY=VALUE (repeatable)
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Ignore environment variables
    #[arg(long)]
    pub no_env: bool,

    /// Print which layer set each value instead of the values
    #[arg(long)]
    pub sources: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

/// Rendering of a settings store
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Toml,
}
