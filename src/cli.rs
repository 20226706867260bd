// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::protocol::ExecutionId;

/// Command-line arguments for `execvisor`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "execvisor",
    version,
    about = "Run a command under the execution supervisor and stream its output.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If omitted, `Execvisor.toml` is used when present, built-in defaults
    /// otherwise.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `EXECVISOR_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Execution id to run the command under.
    #[arg(long, default_value_t = 1)]
    pub id: ExecutionId,

    /// How often to check for new output, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 100)]
    pub poll: u64,

    /// Command to run, followed by its arguments.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
