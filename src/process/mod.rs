// src/process/mod.rs

//! Child process plumbing used by the supervisor loop.
//!
//! - [`managed`] launches, polls and terminates OS processes.
//! - [`listener`] reads a child's output pipes on background tasks.
//! - [`log`] buffers that output and records the terminal status.
//! - [`filter`] decides which output lines are kept.

pub mod filter;
pub mod listener;
pub mod log;
pub mod managed;

pub use filter::{AcceptAll, AnsiEscapeFilter, LineFilter, RegexDropFilter};
pub use listener::{OutputListener, OutputStream};
pub use log::ProcessLog;
pub use managed::{exit_code, ManagedProcess};
