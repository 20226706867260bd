// src/supervisor/thread.rs

//! Hosting a supervisor loop on its own OS thread.

use std::thread::JoinHandle;

use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::protocol::{Command, Request};
use crate::supervisor::run_loop::Supervisor;
use crate::supervisor::settings::SupervisorSettings;

/// A supervisor loop running on a dedicated thread with its own
/// single-threaded Tokio runtime.
#[derive(Debug)]
pub struct SupervisorThread {
    requests: mpsc::UnboundedSender<Request>,
    thread: JoinHandle<()>,
}

impl SupervisorThread {
    pub fn spawn(settings: SupervisorSettings) -> std::io::Result<Self> {
        let (requests, rx) = mpsc::unbounded_channel();

        let thread = std::thread::Builder::new()
            .name("execvisor-supervisor".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(err) => {
                        error!(error = %err, "failed to build supervisor runtime");
                        return;
                    }
                };
                runtime.block_on(Supervisor::new(settings, rx).run());
            })?;

        Ok(Self { requests, thread })
    }

    /// Whether the loop can still accept requests.
    pub fn is_alive(&self) -> bool {
        !self.thread.is_finished() && !self.requests.is_closed()
    }

    /// Queue a request. Returns it back if the loop is gone.
    pub fn send(&self, request: Request) -> Result<(), Request> {
        self.requests.send(request).map_err(|e| e.0)
    }

    /// Ask the loop to quit and wait for it (and its children) to stop.
    pub fn quit_and_join(self) {
        if self.send(Request::fire_and_forget(Command::Quit)).is_err() {
            warn!("supervisor loop already gone at shutdown");
        }
        self.join();
    }

    /// Wait for a loop that has already stopped accepting requests.
    pub fn join(self) {
        if self.thread.join().is_err() {
            error!("supervisor thread panicked");
        }
    }
}
