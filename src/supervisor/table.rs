// src/supervisor/table.rs

//! The execution map owned by the supervisor loop.
//!
//! Only the loop touches this table, so it needs no locking. Query answers
//! are computed here synchronously; anything that waits on a process lives
//! in [`super::dispatch`].

use std::collections::HashMap;

use crate::process::{ManagedProcess, ProcessLog};
use crate::protocol::{ExecutionId, Response};

/// One tracked execution.
///
/// `process` is `Some` exactly while the log status is `Running`; it is
/// dropped on exit, abort or removal while the log stays until removal.
#[derive(Debug)]
pub struct Execution {
    pub process: Option<ManagedProcess>,
    pub log: ProcessLog,
}

#[derive(Debug, Default)]
pub struct ExecutionTable {
    executions: HashMap<ExecutionId, Execution>,
}

impl ExecutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any execution still owns an OS process.
    pub fn has_live_processes(&self) -> bool {
        self.executions.values().any(|e| e.process.is_some())
    }

    pub fn is_live(&self, id: ExecutionId) -> bool {
        self.executions
            .get(&id)
            .is_some_and(|e| e.process.is_some())
    }

    /// Start tracking `id`, replacing any finished record under the same id.
    pub fn track(&mut self, id: ExecutionId, execution: Execution) {
        self.executions.insert(id, execution);
    }

    pub fn get_mut(&mut self, id: ExecutionId) -> Option<&mut Execution> {
        self.executions.get_mut(&id)
    }

    /// Stop tracking `id` entirely.
    pub fn take(&mut self, id: ExecutionId) -> Option<Execution> {
        self.executions.remove(&id)
    }

    /// Executions that still own a process.
    pub fn live_mut(&mut self) -> impl Iterator<Item = (ExecutionId, &mut Execution)> {
        self.executions
            .iter_mut()
            .filter(|(_, e)| e.process.is_some())
            .map(|(id, e)| (*id, e))
    }

    /// Hand out buffered output and mark it delivered.
    pub fn fetch_output(&mut self, id: ExecutionId) -> Response {
        match self.executions.get_mut(&id) {
            Some(execution) => {
                let snapshot = execution.log.unmerged().to_vec();
                execution.log.merge();
                Response::Lines(snapshot)
            }
            None => Response::UnknownExecutionId,
        }
    }

    pub fn fetch_status(&self, id: ExecutionId) -> Response {
        self.executions
            .get(&id)
            .map_or(Response::UnknownExecutionId, |e| Response::Status(e.log.status()))
    }

    pub fn fetch_return_code(&self, id: ExecutionId) -> Response {
        self.executions
            .get(&id)
            .map_or(Response::UnknownExecutionId, |e| {
                Response::ReturnCode(e.log.return_code())
            })
    }

    pub fn fetch_count(&self) -> Response {
        Response::Count(self.executions.len())
    }
}
