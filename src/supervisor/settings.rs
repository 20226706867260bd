// src/supervisor/settings.rs

use std::sync::Arc;
use std::time::Duration;

use crate::process::{AnsiEscapeFilter, LineFilter};

/// Runtime knobs of a supervisor loop.
#[derive(Debug, Clone)]
pub struct SupervisorSettings {
    /// How long the loop waits for a command before polling running
    /// processes for exit.
    pub poll_interval: Duration,
    /// Upper bound on waiting for a listener to reach EOF once its process
    /// has exited.
    pub listener_join_timeout: Duration,
    /// Force-kill a process that ignores a terminate request for this long.
    /// `None` waits indefinitely.
    pub terminate_timeout: Option<Duration>,
    pub line_filter: Arc<dyn LineFilter>,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(200),
            listener_join_timeout: Duration::from_secs(1),
            terminate_timeout: None,
            line_filter: Arc::new(AnsiEscapeFilter),
        }
    }
}
