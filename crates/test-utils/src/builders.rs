#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use execvisor::process::{AcceptAll, LineFilter};
use execvisor::{Executor, SupervisorSettings};

/// Builder for `SupervisorSettings` tuned for fast tests.
pub struct SettingsBuilder {
    settings: SupervisorSettings,
}

impl SettingsBuilder {
    /// Defaults with a 20ms poll interval.
    pub fn new() -> Self {
        Self {
            settings: SupervisorSettings {
                poll_interval: Duration::from_millis(20),
                ..SupervisorSettings::default()
            },
        }
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.settings.poll_interval = interval;
        self
    }

    pub fn terminate_timeout(mut self, timeout: Duration) -> Self {
        self.settings.terminate_timeout = Some(timeout);
        self
    }

    pub fn line_filter(mut self, filter: Arc<dyn LineFilter>) -> Self {
        self.settings.line_filter = filter;
        self
    }

    pub fn keep_all_lines(self) -> Self {
        self.line_filter(Arc::new(AcceptAll))
    }

    pub fn build(self) -> SupervisorSettings {
        self.settings
    }

    pub fn executor(self) -> Executor {
        Executor::new(self.build())
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `sh -c <script>` as a (command, args) pair.
pub fn sh(script: &str) -> (String, Vec<String>) {
    ("sh".to_string(), vec!["-c".to_string(), script.to_string()])
}
