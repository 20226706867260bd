// src/process/managed.rs

//! OS process handles owned by the supervisor loop.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::process::listener::OutputStream;
use crate::protocol::ExecutionId;

/// A launched child process. Never handed out to callers.
#[derive(Debug)]
pub struct ManagedProcess {
    id: ExecutionId,
    child: Child,
}

impl ManagedProcess {
    /// Launch `command args...` with stdout and stderr sent to one pipe.
    ///
    /// Returns the process together with its output streams, which the
    /// caller wires to an output listener.
    pub fn launch(
        id: ExecutionId,
        command: &str,
        args: &[String],
    ) -> std::io::Result<(Self, Vec<OutputStream>)> {
        let mut cmd = Command::new(command);
        cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);

        let (child, streams) = spawn_with_output(cmd)?;

        info!(
            execution_id = id,
            command = %command,
            pid = child.id(),
            "execution process started"
        );

        Ok((Self { id, child }, streams))
    }

    /// Exit code if the process has already exited, without blocking.
    pub fn try_exit_code(&mut self) -> Option<i32> {
        match self.child.try_wait() {
            Ok(Some(status)) => Some(exit_code(status)),
            Ok(None) => None,
            Err(err) => {
                warn!(
                    execution_id = self.id,
                    error = %err,
                    "failed to poll execution process; treating it as exited"
                );
                Some(-1)
            }
        }
    }

    /// Ask the process to stop and wait for it to exit.
    ///
    /// With `kill_after` set, a process that ignores the terminate request for
    /// that long is force-killed.
    pub async fn terminate(&mut self, kill_after: Option<Duration>) -> i32 {
        if let Some(code) = self.try_exit_code() {
            return code;
        }

        self.send_terminate();

        let waited = match kill_after {
            Some(grace) => match tokio::time::timeout(grace, self.child.wait()).await {
                Ok(res) => res,
                Err(_) => {
                    warn!(
                        execution_id = self.id,
                        grace_ms = grace.as_millis() as u64,
                        "execution ignored terminate request; killing it"
                    );
                    if let Err(err) = self.child.start_kill() {
                        warn!(execution_id = self.id, error = %err, "failed to kill execution process");
                    }
                    self.child.wait().await
                }
            },
            None => self.child.wait().await,
        };

        match waited {
            Ok(status) => {
                let code = exit_code(status);
                debug!(execution_id = self.id, exit_code = code, "execution process terminated");
                code
            }
            Err(err) => {
                warn!(execution_id = self.id, error = %err, "failed to wait for execution process");
                -1
            }
        }
    }

    #[cfg(unix)]
    fn send_terminate(&mut self) {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = self.child.id() {
            if let Err(err) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                warn!(execution_id = self.id, error = %err, "failed to send SIGTERM");
            }
        }
    }

    #[cfg(not(unix))]
    fn send_terminate(&mut self) {
        if let Err(err) = self.child.start_kill() {
            warn!(execution_id = self.id, error = %err, "failed to terminate execution process");
        }
    }
}

/// Spawn with stdout and stderr both writing into a single pipe, so the
/// reader sees lines in the order the child wrote them.
///
/// Must be called inside a Tokio runtime.
#[cfg(unix)]
fn spawn_with_output(mut cmd: Command) -> std::io::Result<(Child, Vec<OutputStream>)> {
    use std::os::fd::OwnedFd;
    use tokio::net::unix::pipe::Receiver;

    let (reader, writer) = std::io::pipe()?;
    cmd.stdout(Stdio::from(writer.try_clone()?))
        .stderr(Stdio::from(writer));

    let child = cmd.spawn()?;
    // The command still owns the parent's write ends; EOF only arrives once
    // they are closed.
    drop(cmd);

    let receiver = Receiver::from_owned_fd(OwnedFd::from(reader))?;
    Ok((child, vec![Box::new(receiver)]))
}

/// Without unix pipes the two streams are read separately; their relative
/// order is not kept.
#[cfg(not(unix))]
fn spawn_with_output(mut cmd: Command) -> std::io::Result<(Child, Vec<OutputStream>)> {
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    let mut child = cmd.spawn()?;

    let mut streams: Vec<OutputStream> = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        streams.push(Box::new(stdout));
    }
    if let Some(stderr) = child.stderr.take() {
        streams.push(Box::new(stderr));
    }
    Ok((child, streams))
}

/// Map an exit status to the integer callers see.
///
/// Processes ended by a signal report the negated signal number.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}
