// src/config/validate.rs

use std::time::Duration;

use regex::Regex;

use crate::config::duration::parse_duration;
use crate::config::model::{ConfigFile, OutputSection, RawConfigFile};
use crate::errors::{ExecvisorError, Result};
use crate::types::FilterKind;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::ExecvisorError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let poll_interval = nonzero_duration("poll_interval", &raw.supervisor.poll_interval)?;
        let listener_join_timeout = nonzero_duration(
            "listener_join_timeout",
            &raw.supervisor.listener_join_timeout,
        )?;
        let terminate_timeout = raw
            .supervisor
            .terminate_timeout
            .as_deref()
            .map(|s| nonzero_duration("terminate_timeout", s))
            .transpose()?;
        let drop_pattern = validate_output(&raw.output)?;

        Ok(ConfigFile::new_unchecked(
            poll_interval,
            listener_join_timeout,
            terminate_timeout,
            raw.output.filter,
            drop_pattern,
        ))
    }
}

fn nonzero_duration(key: &str, value: &str) -> Result<Duration> {
    let duration = parse_duration(value).map_err(|e| {
        ExecvisorError::ConfigError(format!("[supervisor].{key}: {e}"))
    })?;

    if duration.is_zero() {
        return Err(ExecvisorError::ConfigError(format!(
            "[supervisor].{key} must be greater than zero (got '{value}')"
        )));
    }

    Ok(duration)
}

fn validate_output(output: &OutputSection) -> Result<Option<Regex>> {
    match (output.filter, output.drop_pattern.as_deref()) {
        (FilterKind::Regex, Some(pattern)) => Regex::new(pattern).map(Some).map_err(|e| {
            ExecvisorError::ConfigError(format!(
                "[output].drop_pattern is not a valid regex: {e}"
            ))
        }),
        (FilterKind::Regex, None) => Err(ExecvisorError::ConfigError(
            "[output].filter = \"regex\" requires [output].drop_pattern".to_string(),
        )),
        (_, Some(_)) => Err(ExecvisorError::ConfigError(
            "[output].drop_pattern is only allowed with filter = \"regex\"".to_string(),
        )),
        (_, None) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<ConfigFile> {
        let raw: RawConfigFile = toml::from_str(text)?;
        ConfigFile::try_from(raw)
    }

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.poll_interval, Duration::from_millis(200));
        assert_eq!(cfg.listener_join_timeout, Duration::from_secs(1));
        assert_eq!(cfg.terminate_timeout, None);
        assert_eq!(cfg.filter, FilterKind::Ansi);
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let err = parse("[supervisor]\npoll_interval = \"0ms\"\n").unwrap_err();
        assert!(matches!(err, ExecvisorError::ConfigError(msg) if msg.contains("poll_interval")));
    }

    #[test]
    fn regex_filter_needs_a_pattern() {
        let err = parse("[output]\nfilter = \"regex\"\n").unwrap_err();
        assert!(matches!(err, ExecvisorError::ConfigError(msg) if msg.contains("drop_pattern")));
    }

    #[test]
    fn pattern_without_regex_filter_is_rejected() {
        let err = parse("[output]\ndrop_pattern = \"x\"\n").unwrap_err();
        assert!(matches!(err, ExecvisorError::ConfigError(_)));
    }

    #[test]
    fn bad_regex_is_rejected() {
        let err = parse("[output]\nfilter = \"regex\"\ndrop_pattern = \"(\"\n").unwrap_err();
        assert!(matches!(err, ExecvisorError::ConfigError(msg) if msg.contains("valid regex")));
    }

    #[test]
    fn terminate_timeout_is_parsed() {
        let cfg = parse("[supervisor]\nterminate_timeout = \"5s\"\n").unwrap();
        assert_eq!(cfg.terminate_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn unknown_filter_kind_fails_deserialization() {
        let err = parse("[output]\nfilter = \"fancy\"\n").unwrap_err();
        assert!(matches!(err, ExecvisorError::TomlError(_)));
    }
}
