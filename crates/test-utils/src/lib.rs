pub mod builders;

use std::sync::Once;
use std::thread::sleep;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use execvisor::{ExecutionId, ExecutionStatus, Executor};
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Poll `f` every 10ms until it yields `Some`, failing after `within`.
pub fn wait_until<T>(within: Duration, mut f: impl FnMut() -> Result<Option<T>>) -> Result<T> {
    let deadline = Instant::now() + within;
    loop {
        if let Some(value) = f()? {
            return Ok(value);
        }
        if Instant::now() >= deadline {
            bail!("condition not met within {within:?}");
        }
        sleep(Duration::from_millis(10));
    }
}

/// Wait (at most 5 seconds) until `id` leaves the `Running` state.
pub fn wait_for_end(executor: &Executor, id: ExecutionId) -> Result<ExecutionStatus> {
    wait_until(Duration::from_secs(5), || {
        let status = executor.execution_status(id)?;
        Ok(status.is_terminal().then_some(status))
    })
}

/// Collect output of `id` until at least `n` lines have arrived.
pub fn read_at_least(executor: &Executor, id: ExecutionId, n: usize) -> Result<Vec<String>> {
    let mut seen = Vec::new();
    wait_until(Duration::from_secs(5), || {
        seen.extend(executor.read_lines(id)?);
        Ok((seen.len() >= n).then(|| seen.clone()))
    })
}

/// Whether a process with this pid still exists (unix only).
pub fn pid_alive(pid: u32) -> bool {
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
