// src/supervisor/run_loop.rs

//! The supervisor loop: single owner of every child process and log.

use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::protocol::{Command, Request};
use crate::supervisor::dispatch::{
    handle_abort, handle_remove, handle_start, poll_processes, terminate_all,
};
use crate::supervisor::settings::SupervisorSettings;
use crate::supervisor::table::ExecutionTable;

/// Command-dispatch loop.
///
/// Requests are handled strictly in arrival order. While at least one process
/// is running the loop wakes up every `poll_interval` even without requests,
/// so exits are noticed promptly; otherwise it sleeps until the next request.
#[derive(Debug)]
pub struct Supervisor {
    settings: SupervisorSettings,
    requests: mpsc::UnboundedReceiver<Request>,
    table: ExecutionTable,
}

impl Supervisor {
    pub fn new(settings: SupervisorSettings, requests: mpsc::UnboundedReceiver<Request>) -> Self {
        Self {
            settings,
            requests,
            table: ExecutionTable::new(),
        }
    }

    /// Run until a `Quit` arrives or every sender is dropped. Processes still
    /// running at that point are terminated before this returns.
    pub async fn run(mut self) {
        info!("supervisor loop started");

        loop {
            let next = if self.table.has_live_processes() {
                match timeout(self.settings.poll_interval, self.requests.recv()).await {
                    Ok(next) => next,
                    Err(_) => {
                        poll_processes(&mut self.table, &self.settings).await;
                        continue;
                    }
                }
            } else {
                self.requests.recv().await
            };

            let Some(request) = next else {
                info!("supervisor request channel closed");
                break;
            };

            let keep_running = self.dispatch(request).await;
            poll_processes(&mut self.table, &self.settings).await;

            if !keep_running {
                info!("quit requested; stopping supervisor loop");
                break;
            }
        }

        terminate_all(&mut self.table, &self.settings).await;
        info!("supervisor loop finished");
    }

    /// Handle one request. Returns `false` when the loop should stop.
    async fn dispatch(&mut self, mut request: Request) -> bool {
        debug!(command = ?request.command, "supervisor received command");

        let response = match &request.command {
            Command::Start { id, command, args } => Some(handle_start(
                &mut self.table,
                &self.settings,
                *id,
                command,
                args,
            )),
            Command::Abort { id } => {
                handle_abort(&mut self.table, &self.settings, *id).await;
                None
            }
            Command::Remove { id } => {
                handle_remove(&mut self.table, &self.settings, *id).await;
                None
            }
            Command::FetchOutput { id } => Some(self.table.fetch_output(*id)),
            Command::FetchStatus { id } => Some(self.table.fetch_status(*id)),
            Command::FetchReturnCode { id } => Some(self.table.fetch_return_code(*id)),
            Command::FetchCount => Some(self.table.fetch_count()),
            Command::Quit => return false,
        };

        if let Some(response) = response {
            request.respond(response);
        }
        true
    }
}
