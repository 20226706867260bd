// src/process/log.rs

//! Per-execution output buffer plus terminal status.

use std::time::Duration;

use tracing::debug;

use crate::process::listener::OutputListener;
use crate::protocol::{ExecutionId, ExecutionStatus};

/// Output and status of one execution.
///
/// `unmerged` holds lines read from the listener but not yet handed to a
/// caller; [`ProcessLog::merge`] moves them into `lines` once they have been
/// delivered. `return_code` is `None` exactly while the status is `Running`.
#[derive(Debug)]
pub struct ProcessLog {
    id: ExecutionId,
    lines: Vec<String>,
    unmerged: Vec<String>,
    status: ExecutionStatus,
    return_code: Option<i32>,
    listener: Option<OutputListener>,
}

impl ProcessLog {
    pub fn new(id: ExecutionId, listener: OutputListener) -> Self {
        Self {
            id,
            lines: Vec::new(),
            unmerged: Vec::new(),
            status: ExecutionStatus::Running,
            return_code: None,
            listener: Some(listener),
        }
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn return_code(&self) -> Option<i32> {
        self.return_code
    }

    /// Lines already delivered to callers.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines buffered but not yet delivered.
    pub fn unmerged(&self) -> &[String] {
        &self.unmerged
    }

    /// Pull whatever the listener has queued into `unmerged`. Never blocks.
    pub fn read_to_unmerged(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            listener.drain_into(&mut self.unmerged);
        }
    }

    /// Mark all buffered lines as delivered.
    pub fn merge(&mut self) {
        self.lines.append(&mut self.unmerged);
    }

    /// Record a natural exit and stop listening.
    pub async fn finish(&mut self, return_code: i32, join_within: Duration) {
        self.close(ExecutionStatus::Finished, return_code, join_within)
            .await;
    }

    /// Record a termination requested by a caller and stop listening.
    pub async fn abort(&mut self, return_code: i32, join_within: Duration) {
        self.close(ExecutionStatus::Aborted, return_code, join_within)
            .await;
    }

    async fn close(&mut self, status: ExecutionStatus, return_code: i32, join_within: Duration) {
        if self.status.is_terminal() {
            return;
        }

        self.status = status;
        self.return_code = Some(return_code);

        if let Some(listener) = self.listener.take() {
            listener.join(join_within, &mut self.unmerged).await;
        }

        debug!(
            execution_id = self.id,
            status = %status,
            exit_code = return_code,
            buffered = self.unmerged.len(),
            "process log closed"
        );
    }
}
