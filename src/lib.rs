// src/lib.rs

pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod logging;
pub mod process;
pub mod protocol;
pub mod supervisor;
pub mod types;

pub use client::Executor;
pub use errors::{ExecvisorError, Result};
pub use protocol::{ExecutionId, ExecutionStatus};
pub use supervisor::SupervisorSettings;

use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{default_config_path, load_and_validate, ConfigFile};

/// High-level entry point used by `main.rs`.
///
/// Starts the command under a fresh [`Executor`], copies its output to stdout
/// as it arrives and returns its exit code once it ends. Ctrl-C aborts the
/// execution; the abort code is returned in that case.
pub async fn run(args: CliArgs) -> anyhow::Result<i32> {
    let cfg = resolve_config(args.config.as_deref())?;
    let executor = Executor::new(cfg.supervisor_settings());

    let id = args.id;
    let (program, program_args) = args
        .command
        .split_first()
        .map(|(p, rest)| (p.clone(), rest.to_vec()))
        .context("no command given")?;

    info!(execution_id = id, command = %program, "starting execution");
    on_executor(&executor, move |ex| ex.start(id, program, program_args)).await?;

    let code = follow_execution(&executor, id, Duration::from_millis(args.poll.max(1))).await;

    // Teardown regardless of how following ended.
    let cleanup = executor.clone();
    tokio::task::spawn_blocking(move || {
        if let Err(err) = cleanup.remove(id) {
            warn!(execution_id = id, error = %err, "failed to remove execution");
        }
        cleanup.shutdown();
    })
    .await
    .context("supervisor shutdown task failed")?;

    code
}

async fn follow_execution(executor: &Executor, id: ExecutionId, poll: Duration) -> anyhow::Result<i32> {
    let mut ticker = tokio::time::interval(poll);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut abort_sent = false;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            res = &mut ctrl_c, if !abort_sent => {
                res.context("listening for Ctrl-C")?;
                warn!(execution_id = id, "Ctrl-C received; aborting execution");
                on_executor(executor, move |ex| ex.abort(id)).await?;
                abort_sent = true;
            }
        }

        // Status before lines: once a terminal status is seen, the following
        // read returns everything the process ever wrote.
        let status = on_executor(executor, move |ex| ex.execution_status(id)).await?;
        let lines = on_executor(executor, move |ex| ex.read_lines(id)).await?;
        emit(&lines)?;

        if status.is_terminal() {
            let code = on_executor(executor, move |ex| ex.execution_return_code(id)).await?;
            info!(execution_id = id, %status, exit_code = ?code, "execution ended");
            return Ok(code.unwrap_or(-1));
        }
    }
}

/// Run a blocking facade call off the async runtime.
async fn on_executor<T, F>(executor: &Executor, f: F) -> anyhow::Result<T>
where
    F: FnOnce(&Executor) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let executor = executor.clone();
    let value = tokio::task::spawn_blocking(move || f(&executor))
        .await
        .context("executor call panicked")??;
    Ok(value)
}

fn emit(lines: &[String]) -> anyhow::Result<()> {
    if lines.is_empty() {
        return Ok(());
    }
    let mut stdout = std::io::stdout().lock();
    for line in lines {
        stdout.write_all(line.as_bytes())?;
    }
    stdout.flush()?;
    Ok(())
}

/// Explicit `--config`, else `Execvisor.toml` if present, else defaults.
fn resolve_config(explicit: Option<&str>) -> anyhow::Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_and_validate(path).with_context(|| format!("loading config '{path}'"));
    }

    let default_path = default_config_path();
    if default_path.is_file() {
        debug!(path = %default_path.display(), "using default config file");
        return load_and_validate(&default_path)
            .with_context(|| format!("loading config '{}'", default_path.display()));
    }

    Ok(ConfigFile::default())
}
