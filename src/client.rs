// src/client.rs

//! Synchronous facade over a supervisor loop.
//!
//! [`Executor`] is the handle applications hold. The first call boots a
//! supervisor thread; a later call after that thread died boots a fresh one
//! (previous executions are lost). Every query carries its own reply channel,
//! so an `Executor` can be cloned and used from many threads at once.
//!
//! All methods block the calling thread until the loop answers. Do not call
//! them directly from async code; wrap them in `tokio::task::spawn_blocking`.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::anyhow;
use tracing::{debug, info, warn};

use crate::errors::{ExecvisorError, Result};
use crate::protocol::{Command, ExecutionId, ExecutionStatus, Request, Response};
use crate::supervisor::{SupervisorSettings, SupervisorThread};

/// Shared handle to one supervisor loop and the processes it owns.
///
/// Dropping the last clone quits the loop and terminates any process that is
/// still running.
#[derive(Debug, Clone)]
pub struct Executor {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    settings: SupervisorSettings,
    supervisor: Mutex<Option<SupervisorThread>>,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(SupervisorSettings::default())
    }
}

impl Executor {
    /// Create a handle. The supervisor thread is started on first use.
    pub fn new(settings: SupervisorSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings,
                supervisor: Mutex::new(None),
            }),
        }
    }

    /// Launch `command args...` under `id`.
    ///
    /// Starting an id whose process is still running does nothing. An id whose
    /// previous run already ended is started afresh.
    pub fn start<I, S>(&self, id: ExecutionId, command: impl Into<String>, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let command = Command::Start {
            id,
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        };

        match self.query(command)? {
            Response::Started => Ok(()),
            Response::LaunchFailed(reason) => Err(ExecvisorError::LaunchFailed { id, reason }),
            other => Err(unexpected(other)),
        }
    }

    /// Terminate the process of `id`; its output and status stay queryable.
    /// Unknown ids are ignored.
    pub fn abort(&self, id: ExecutionId) -> Result<()> {
        self.submit(Request::fire_and_forget(Command::Abort { id }))
    }

    /// Terminate `id` if needed and discard everything about it.
    /// Unknown ids are ignored.
    pub fn remove(&self, id: ExecutionId) -> Result<()> {
        self.submit(Request::fire_and_forget(Command::Remove { id }))
    }

    /// Output lines produced since the previous call.
    pub fn read_lines(&self, id: ExecutionId) -> Result<Vec<String>> {
        match self.query(Command::FetchOutput { id })? {
            Response::Lines(lines) => Ok(lines),
            Response::UnknownExecutionId => Err(ExecvisorError::UnknownExecution(id)),
            other => Err(unexpected(other)),
        }
    }

    pub fn execution_status(&self, id: ExecutionId) -> Result<ExecutionStatus> {
        match self.query(Command::FetchStatus { id })? {
            Response::Status(status) => Ok(status),
            Response::UnknownExecutionId => Err(ExecvisorError::UnknownExecution(id)),
            other => Err(unexpected(other)),
        }
    }

    /// Exit code of `id`, or `None` while it is still running.
    pub fn execution_return_code(&self, id: ExecutionId) -> Result<Option<i32>> {
        match self.query(Command::FetchReturnCode { id })? {
            Response::ReturnCode(code) => Ok(code),
            Response::UnknownExecutionId => Err(ExecvisorError::UnknownExecution(id)),
            other => Err(unexpected(other)),
        }
    }

    /// Number of tracked executions (running, finished or aborted).
    pub fn execution_count(&self) -> Result<usize> {
        match self.query(Command::FetchCount)? {
            Response::Count(count) => Ok(count),
            other => Err(unexpected(other)),
        }
    }

    /// Whether a supervisor loop is currently up.
    pub fn is_running(&self) -> bool {
        self.inner
            .lock()
            .as_ref()
            .is_some_and(SupervisorThread::is_alive)
    }

    /// Quit the supervisor loop and wait until every child it owned is gone.
    ///
    /// A later call on this handle boots a new, empty loop.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }

    fn query(&self, command: Command) -> Result<Response> {
        let (request, reply) = Request::with_reply(command);
        self.submit(request)?;
        reply.blocking_recv().map_err(|_| {
            ExecvisorError::SupervisorUnavailable(
                "supervisor stopped before replying".to_string(),
            )
        })
    }

    fn submit(&self, request: Request) -> Result<()> {
        let mut guard = self.inner.lock();

        if !guard.as_ref().is_some_and(SupervisorThread::is_alive) {
            if let Some(dead) = guard.take() {
                warn!("supervisor loop is gone; booting a fresh one");
                dead.join();
            }
            *guard = Some(SupervisorThread::spawn(self.inner.settings.clone())?);
            info!("supervisor loop booted");
        }

        let supervisor = guard.as_ref().ok_or_else(|| {
            ExecvisorError::SupervisorUnavailable("supervisor not running".to_string())
        })?;

        debug!(command = ?request.command, "submitting command");
        supervisor.send(request).map_err(|_| {
            ExecvisorError::SupervisorUnavailable("supervisor stopped accepting commands".to_string())
        })
    }
}

impl Inner {
    fn lock(&self) -> std::sync::MutexGuard<'_, Option<SupervisorThread>> {
        self.supervisor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn shutdown(&self) {
        let supervisor = self.lock().take();
        if let Some(supervisor) = supervisor {
            info!("shutting down supervisor loop");
            supervisor.quit_and_join();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn unexpected(response: Response) -> ExecvisorError {
    ExecvisorError::Other(anyhow!("unexpected supervisor response: {response:?}"))
}
