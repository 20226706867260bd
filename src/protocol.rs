// src/protocol.rs

//! Messages exchanged between the client facade and the supervisor loop.
//!
//! This is an in-process protocol: commands travel over a Tokio mpsc channel
//! and every request that expects an answer carries its own oneshot reply
//! sender, so concurrent callers can never read each other's responses.

use std::fmt;

use tokio::sync::oneshot;

/// Caller-supplied key of a tracked execution (e.g. a database row id).
pub type ExecutionId = i64;

/// Lifecycle state of an execution as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionStatus {
    Running,
    Finished,
    Aborted,
}

impl ExecutionStatus {
    /// `true` once the execution can no longer change state (except by removal).
    pub fn is_terminal(self) -> bool {
        !matches!(self, ExecutionStatus::Running)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStatus::Running => "running",
            ExecutionStatus::Finished => "finished",
            ExecutionStatus::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// Instructions understood by the supervisor loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Launch `command args...` under `id` unless a process is already live there.
    Start {
        id: ExecutionId,
        command: String,
        args: Vec<String>,
    },
    /// Terminate the process but keep its log queryable.
    Abort { id: ExecutionId },
    /// Terminate (if needed) and forget everything about `id`.
    Remove { id: ExecutionId },
    FetchOutput { id: ExecutionId },
    FetchStatus { id: ExecutionId },
    FetchReturnCode { id: ExecutionId },
    FetchCount,
    /// Stop the loop; every live process is terminated first.
    Quit,
}

impl Command {
    /// Whether the facade waits for a [`Response`] to this command.
    ///
    /// Abort, Remove and Quit are fire-and-forget; commands are processed in
    /// FIFO order so a later query still observes their effect.
    pub fn expects_reply(&self) -> bool {
        !matches!(
            self,
            Command::Abort { .. } | Command::Remove { .. } | Command::Quit
        )
    }
}

/// Answers produced by the supervisor loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Start was accepted (a duplicate Start on a live id is also `Started`).
    Started,
    /// The OS refused to launch the process.
    LaunchFailed(String),
    Lines(Vec<String>),
    Status(ExecutionStatus),
    /// `None` while the execution is still running.
    ReturnCode(Option<i32>),
    Count(usize),
    UnknownExecutionId,
}

/// A command together with the channel its response must be sent on.
#[derive(Debug)]
pub struct Request {
    pub command: Command,
    pub reply: Option<oneshot::Sender<Response>>,
}

impl Request {
    /// Request that expects no answer.
    pub fn fire_and_forget(command: Command) -> Self {
        Self {
            command,
            reply: None,
        }
    }

    /// Request paired with the receiver the caller should wait on.
    pub fn with_reply(command: Command) -> (Self, oneshot::Receiver<Response>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                command,
                reply: Some(tx),
            },
            rx,
        )
    }

    /// Deliver `response` if anyone is still waiting for it.
    pub fn respond(&mut self, response: Response) {
        if let Some(reply) = self.reply.take() {
            // The caller may have given up; nothing to do then.
            let _ = reply.send(response);
        }
    }
}
