// src/config/model.rs

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::process::{AcceptAll, AnsiEscapeFilter, LineFilter, RegexDropFilter};
use crate::supervisor::SupervisorSettings;
use crate::types::FilterKind;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [supervisor]
/// poll_interval = "200ms"
/// listener_join_timeout = "1s"
/// terminate_timeout = "10s"
///
/// [output]
/// filter = "regex"
/// drop_pattern = "^DEBUG"
/// ```
///
/// Every section and key is optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub supervisor: SupervisorSection,

    #[serde(default)]
    pub output: OutputSection,
}

/// `[supervisor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorSection {
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    #[serde(default = "default_listener_join_timeout")]
    pub listener_join_timeout: String,

    /// Unset means terminate requests are never escalated to a kill.
    #[serde(default)]
    pub terminate_timeout: Option<String>,
}

fn default_poll_interval() -> String {
    "200ms".to_string()
}

fn default_listener_join_timeout() -> String {
    "1s".to_string()
}

impl Default for SupervisorSection {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            listener_join_timeout: default_listener_join_timeout(),
            terminate_timeout: None,
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OutputSection {
    #[serde(default)]
    pub filter: FilterKind,

    /// Only meaningful with `filter = "regex"`.
    #[serde(default)]
    pub drop_pattern: Option<String>,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub poll_interval: Duration,
    pub listener_join_timeout: Duration,
    pub terminate_timeout: Option<Duration>,
    pub filter: FilterKind,
    pub drop_pattern: Option<Regex>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        poll_interval: Duration,
        listener_join_timeout: Duration,
        terminate_timeout: Option<Duration>,
        filter: FilterKind,
        drop_pattern: Option<Regex>,
    ) -> Self {
        Self {
            poll_interval,
            listener_join_timeout,
            terminate_timeout,
            filter,
            drop_pattern,
        }
    }

    /// Settings for a supervisor built from this configuration.
    pub fn supervisor_settings(&self) -> SupervisorSettings {
        let line_filter: Arc<dyn LineFilter> = match (self.filter, &self.drop_pattern) {
            (FilterKind::Regex, Some(pattern)) => Arc::new(RegexDropFilter::new(pattern.clone())),
            (FilterKind::KeepAll, _) | (FilterKind::Regex, None) => Arc::new(AcceptAll),
            (FilterKind::Ansi, _) => Arc::new(AnsiEscapeFilter),
        };

        SupervisorSettings {
            poll_interval: self.poll_interval,
            listener_join_timeout: self.listener_join_timeout,
            terminate_timeout: self.terminate_timeout,
            line_filter,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        let defaults = SupervisorSettings::default();
        Self::new_unchecked(
            defaults.poll_interval,
            defaults.listener_join_timeout,
            defaults.terminate_timeout,
            FilterKind::default(),
            None,
        )
    }
}
