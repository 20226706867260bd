// tests/executor_lifecycle.rs
#![cfg(unix)]

mod common;
use crate::common::builders::{sh, SettingsBuilder};
use crate::common::{init_tracing, pid_alive, read_at_least, wait_for_end};

use std::error::Error;
use std::thread::sleep;
use std::time::Duration;

use execvisor::{ExecutionStatus, ExecvisorError};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn never_started_ids_are_unknown() -> TestResult {
    init_tracing();
    let executor = SettingsBuilder::new().executor();

    assert!(matches!(
        executor.execution_status(42),
        Err(ExecvisorError::UnknownExecution(42))
    ));
    assert!(matches!(
        executor.read_lines(42),
        Err(ExecvisorError::UnknownExecution(42))
    ));
    assert!(matches!(
        executor.execution_return_code(42),
        Err(ExecvisorError::UnknownExecution(42))
    ));
    Ok(())
}

#[test]
fn echo_output_is_delivered_exactly_once() -> TestResult {
    init_tracing();
    let executor = SettingsBuilder::new().executor();

    executor.start(1, "echo", ["A"])?;

    assert_eq!(wait_for_end(&executor, 1)?, ExecutionStatus::Finished);
    assert_eq!(executor.execution_return_code(1)?, Some(0));
    assert_eq!(executor.read_lines(1)?, vec!["A\n".to_string()]);
    assert!(executor.read_lines(1)?.is_empty());
    assert!(executor.read_lines(1)?.is_empty());
    Ok(())
}

#[test]
fn non_zero_exit_codes_are_reported() -> TestResult {
    init_tracing();
    let executor = SettingsBuilder::new().executor();

    let (cmd, args) = sh("exit 23");
    executor.start(3, cmd, args)?;

    assert_eq!(wait_for_end(&executor, 3)?, ExecutionStatus::Finished);
    assert_eq!(executor.execution_return_code(3)?, Some(23));
    Ok(())
}

#[test]
fn running_execution_has_no_return_code() -> TestResult {
    init_tracing();
    let executor = SettingsBuilder::new().executor();

    executor.start(4, "sleep", ["1000"])?;

    assert_eq!(executor.execution_status(4)?, ExecutionStatus::Running);
    assert_eq!(executor.execution_return_code(4)?, None);
    executor.remove(4)?;
    Ok(())
}

#[test]
fn abort_marks_execution_aborted_with_non_zero_code() -> TestResult {
    init_tracing();
    let executor = SettingsBuilder::new().executor();

    executor.start(2, "sleep", ["1000"])?;
    executor.abort(2)?;

    assert_eq!(executor.execution_status(2)?, ExecutionStatus::Aborted);
    let code = executor.execution_return_code(2)?;
    assert!(matches!(code, Some(c) if c != 0), "got {code:?}");
    // The log survives the abort until removed.
    assert_eq!(executor.execution_count()?, 1);
    Ok(())
}

#[test]
fn abort_of_finished_or_unknown_execution_changes_nothing() -> TestResult {
    init_tracing();
    let executor = SettingsBuilder::new().executor();

    executor.abort(99)?;
    assert_eq!(executor.execution_count()?, 0);

    executor.start(5, "true", Vec::<String>::new())?;
    assert_eq!(wait_for_end(&executor, 5)?, ExecutionStatus::Finished);
    executor.abort(5)?;
    assert_eq!(executor.execution_status(5)?, ExecutionStatus::Finished);
    assert_eq!(executor.execution_return_code(5)?, Some(0));
    Ok(())
}

#[test]
fn remove_forgets_execution_and_terminates_process() -> TestResult {
    init_tracing();
    let executor = SettingsBuilder::new().executor();

    let (cmd, args) = sh("echo $$; exec sleep 1000");
    executor.start(6, cmd, args)?;
    let lines = read_at_least(&executor, 6, 1)?;
    let pid: u32 = lines[0].trim().parse()?;
    assert!(pid_alive(pid));

    executor.remove(6)?;

    assert!(matches!(
        executor.execution_status(6),
        Err(ExecvisorError::UnknownExecution(6))
    ));
    assert!(matches!(
        executor.read_lines(6),
        Err(ExecvisorError::UnknownExecution(6))
    ));
    assert!(matches!(
        executor.execution_return_code(6),
        Err(ExecvisorError::UnknownExecution(6))
    ));
    assert!(!pid_alive(pid), "process {pid} survived removal");
    Ok(())
}

#[test]
fn remove_of_unknown_id_is_ignored() -> TestResult {
    init_tracing();
    let executor = SettingsBuilder::new().executor();

    executor.remove(1234)?;
    assert_eq!(executor.execution_count()?, 0);
    Ok(())
}

#[test]
fn count_includes_running_finished_and_aborted() -> TestResult {
    init_tracing();
    let executor = SettingsBuilder::new().executor();

    assert_eq!(executor.execution_count()?, 0);

    executor.start(1, "true", Vec::<String>::new())?;
    wait_for_end(&executor, 1)?;
    executor.start(2, "sleep", ["1000"])?;
    executor.abort(2)?;
    executor.start(3, "sleep", ["1000"])?;

    assert_eq!(executor.execution_count()?, 3);

    executor.remove(2)?;
    assert_eq!(executor.execution_count()?, 2);
    executor.remove(3)?;
    assert_eq!(executor.execution_count()?, 1);
    Ok(())
}

#[test]
fn duplicate_start_launches_one_process() -> TestResult {
    init_tracing();
    let executor = SettingsBuilder::new().executor();

    let (cmd, args) = sh("echo $$; exec sleep 1000");
    executor.start(7, cmd.clone(), args.clone())?;
    executor.start(7, cmd, args)?;

    let lines = read_at_least(&executor, 7, 1)?;
    sleep(Duration::from_millis(300));
    let more = executor.read_lines(7)?;

    assert_eq!(lines.len(), 1);
    assert!(more.is_empty(), "second process wrote {more:?}");
    assert_eq!(executor.execution_count()?, 1);
    executor.remove(7)?;
    Ok(())
}

#[test]
fn an_ended_id_can_be_started_again() -> TestResult {
    init_tracing();
    let executor = SettingsBuilder::new().executor();

    executor.start(8, "echo", ["first"])?;
    wait_for_end(&executor, 8)?;
    executor.start(8, "echo", ["second"])?;
    wait_for_end(&executor, 8)?;

    assert_eq!(executor.read_lines(8)?, vec!["second\n".to_string()]);
    Ok(())
}

#[test]
fn stderr_is_merged_into_output() -> TestResult {
    init_tracing();
    let executor = SettingsBuilder::new().executor();

    let (cmd, args) = sh("echo oops >&2; exit 1");
    executor.start(9, cmd, args)?;

    wait_for_end(&executor, 9)?;
    assert_eq!(executor.read_lines(9)?, vec!["oops\n".to_string()]);
    assert_eq!(executor.execution_return_code(9)?, Some(1));
    Ok(())
}

#[test]
fn output_arriving_over_time_is_delivered_incrementally() -> TestResult {
    init_tracing();
    let executor = SettingsBuilder::new().executor();

    let (cmd, args) = sh("echo one; sleep 0.3; echo two");
    executor.start(10, cmd, args)?;

    let first = read_at_least(&executor, 10, 1)?;
    assert_eq!(first, vec!["one\n".to_string()]);

    wait_for_end(&executor, 10)?;
    assert_eq!(executor.read_lines(10)?, vec!["two\n".to_string()]);
    assert!(executor.read_lines(10)?.is_empty());
    Ok(())
}

#[test]
fn launch_failure_is_an_error_for_the_start_call() -> TestResult {
    init_tracing();
    let executor = SettingsBuilder::new().executor();

    let res = executor.start(11, "/no/such/program", Vec::<String>::new());
    assert!(matches!(res, Err(ExecvisorError::LaunchFailed { id: 11, .. })));
    assert_eq!(executor.execution_count()?, 0);
    Ok(())
}

#[test]
fn stubborn_process_is_killed_after_terminate_timeout() -> TestResult {
    init_tracing();
    let executor = SettingsBuilder::new()
        .terminate_timeout(Duration::from_millis(200))
        .executor();

    let (cmd, args) = sh("trap '' TERM; echo ready; while :; do sleep 1; done");
    executor.start(12, cmd, args)?;
    read_at_least(&executor, 12, 1)?;

    executor.abort(12)?;
    assert_eq!(executor.execution_status(12)?, ExecutionStatus::Aborted);
    assert_eq!(executor.execution_return_code(12)?, Some(-9));
    Ok(())
}

#[test]
fn interleaved_stdout_and_stderr_keep_write_order() -> TestResult {
    init_tracing();
    let executor = SettingsBuilder::new().executor();

    // A single run can happen to come back in order; repeat to catch races.
    for id in 20..30 {
        let (cmd, args) = sh("echo 1; echo 2 >&2; echo 3; echo 4 >&2");
        executor.start(id, cmd, args)?;
        assert_eq!(wait_for_end(&executor, id)?, ExecutionStatus::Finished);
        assert_eq!(executor.read_lines(id)?, vec!["1\n", "2\n", "3\n", "4\n"]);
    }
    Ok(())
}
