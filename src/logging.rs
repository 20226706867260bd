// src/logging.rs

//! Diagnostics for the `execvisor` binary.
//!
//! `--log-level` wins over `EXECVISOR_LOG`. The variable takes full
//! `EnvFilter` directives, e.g. `execvisor::supervisor=debug,warn`.
//! Everything is written to stderr so stdout stays the child's output.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

const LOG_ENV: &str = "EXECVISOR_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, env.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("log subscriber already installed: {e}"))
}

/// An empty or unset variable means the default; a malformed one is an error
/// rather than silently logging at the wrong level.
fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> Result<EnvFilter> {
    let directives = match (cli_level, env.map(str::trim)) {
        (Some(level), _) => level_directive(level),
        (None, Some(from_env)) if !from_env.is_empty() => from_env,
        _ => DEFAULT_DIRECTIVE,
    };

    EnvFilter::try_new(directives).with_context(|| {
        format!("invalid log filter {directives:?} (from --log-level or {LOG_ENV})")
    })
}

fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_overrides_environment() {
        let filter = build_filter(Some(LogLevel::Trace), Some("error")).unwrap();
        assert_eq!(filter.to_string(), "trace");
    }

    #[test]
    fn environment_accepts_per_module_directives() {
        let filter = build_filter(None, Some(" execvisor::supervisor=debug,warn ")).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("execvisor::supervisor=debug"), "{rendered}");
        assert!(rendered.contains("warn"), "{rendered}");
    }

    #[test]
    fn unset_or_blank_environment_falls_back_to_info() {
        assert_eq!(build_filter(None, None).unwrap().to_string(), "info");
        assert_eq!(build_filter(None, Some("  ")).unwrap().to_string(), "info");
    }

    #[test]
    fn malformed_environment_is_rejected() {
        let err = build_filter(None, Some("execvisor=loudest")).unwrap_err();
        assert!(err.to_string().contains(LOG_ENV));
    }
}
