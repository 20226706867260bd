#![allow(dead_code)]

pub use execvisor_test_utils::builders;
pub use execvisor_test_utils::{init_tracing, pid_alive, read_at_least, wait_for_end, wait_until};
