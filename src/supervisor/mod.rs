// src/supervisor/mod.rs

//! The execution supervisor.
//!
//! - [`table`] is the execution map and its query answers.
//! - [`dispatch`] handles commands that launch, stop or poll processes.
//! - [`run_loop`] is the command-dispatch loop itself.
//! - [`thread`] hosts a loop on a dedicated OS thread.
//! - [`settings`] holds the loop's runtime knobs.

pub mod dispatch;
pub mod run_loop;
pub mod settings;
pub mod table;
pub mod thread;

pub use run_loop::Supervisor;
pub use settings::SupervisorSettings;
pub use table::{Execution, ExecutionTable};
pub use thread::SupervisorThread;
