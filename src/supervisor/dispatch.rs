// src/supervisor/dispatch.rs

//! Command handlers that launch, stop or poll processes.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::process::{ManagedProcess, OutputListener, ProcessLog};
use crate::protocol::{ExecutionId, Response};
use crate::supervisor::settings::SupervisorSettings;
use crate::supervisor::table::{Execution, ExecutionTable};

/// Launch a process under `id` unless one is already live there.
///
/// A duplicate Start on a live id is acknowledged without launching anything.
/// A previous finished or aborted record under the same id is replaced.
pub fn handle_start(
    table: &mut ExecutionTable,
    settings: &SupervisorSettings,
    id: ExecutionId,
    command: &str,
    args: &[String],
) -> Response {
    if table.is_live(id) {
        debug!(
            execution_id = id,
            "execution already running; ignoring duplicate start"
        );
        return Response::Started;
    }

    match ManagedProcess::launch(id, command, args) {
        Ok((process, streams)) => {
            let listener =
                OutputListener::spawn(id, streams, Arc::clone(&settings.line_filter));
            table.track(
                id,
                Execution {
                    process: Some(process),
                    log: ProcessLog::new(id, listener),
                },
            );
            Response::Started
        }
        Err(err) => {
            error!(
                execution_id = id,
                command = %command,
                error = %err,
                "failed to launch execution process"
            );
            Response::LaunchFailed(err.to_string())
        }
    }
}

/// Terminate the process of `id` and mark its log aborted. The log stays.
pub async fn handle_abort(table: &mut ExecutionTable, settings: &SupervisorSettings, id: ExecutionId) {
    let Some(execution) = table.get_mut(id) else {
        debug!(execution_id = id, "abort for unknown execution; ignoring");
        return;
    };

    let Some(mut process) = execution.process.take() else {
        debug!(execution_id = id, "abort for execution that already ended; ignoring");
        return;
    };

    info!(execution_id = id, "aborting execution");
    let code = process.terminate(settings.terminate_timeout).await;
    drop(process);

    execution.log.read_to_unmerged();
    execution
        .log
        .abort(code, settings.listener_join_timeout)
        .await;
}

/// Terminate `id` if still running and forget it.
pub async fn handle_remove(table: &mut ExecutionTable, settings: &SupervisorSettings, id: ExecutionId) {
    let Some(execution) = table.take(id) else {
        debug!(execution_id = id, "remove for unknown execution; ignoring");
        return;
    };

    if let Some(mut process) = execution.process {
        info!(execution_id = id, "removing running execution; terminating it");
        process.terminate(settings.terminate_timeout).await;
    } else {
        debug!(execution_id = id, "execution removed");
    }
    // Dropping the log aborts any reader that is still attached.
}

/// Pull fresh output for every live execution and finish those that exited.
pub async fn poll_processes(table: &mut ExecutionTable, settings: &SupervisorSettings) {
    for (id, execution) in table.live_mut() {
        execution.log.read_to_unmerged();

        let exited = execution
            .process
            .as_mut()
            .and_then(|process| process.try_exit_code());

        if let Some(code) = exited {
            execution.process = None;
            info!(execution_id = id, exit_code = code, "execution finished");
            execution
                .log
                .finish(code, settings.listener_join_timeout)
                .await;
        }
    }
}

/// Terminate and wait for every process that is still running.
pub async fn terminate_all(table: &mut ExecutionTable, settings: &SupervisorSettings) {
    for (id, execution) in table.live_mut() {
        if let Some(mut process) = execution.process.take() {
            info!(execution_id = id, "terminating execution on supervisor shutdown");
            let code = process.terminate(settings.terminate_timeout).await;
            execution
                .log
                .abort(code, settings.listener_join_timeout)
                .await;
        }
    }
}
