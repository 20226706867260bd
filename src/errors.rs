// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::protocol::ExecutionId;

#[derive(Error, Debug)]
pub enum ExecvisorError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The supervisor has no record of this execution id (never started or
    /// already removed).
    #[error("Unknown execution id: {0}")]
    UnknownExecution(ExecutionId),

    #[error("Failed to launch execution {id}: {reason}")]
    LaunchFailed { id: ExecutionId, reason: String },

    /// The supervisor loop went away while a request was in flight.
    #[error("Supervisor unavailable: {0}")]
    SupervisorUnavailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ExecvisorError>;
