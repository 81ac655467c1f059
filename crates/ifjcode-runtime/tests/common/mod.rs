//! Shared test utilities
//!
//! Helpers that load a source program, run it against in-memory sinks and
//! hand back everything it wrote.

#![allow(dead_code)]

use ifjcode_runtime::runtime::{self, RunReport};
use ifjcode_runtime::{load, Fault, LineReader, RuntimeError, SharedBuffer, VM};
use std::io::Cursor;

pub use pretty_assertions::{assert_eq, assert_ne};

/// Everything observable about one run
#[derive(Debug)]
pub struct Execution {
    pub stdout: String,
    pub stderr: String,
    pub result: Result<RunReport, Fault>,
}

impl Execution {
    /// The fault, panicking if the run succeeded
    pub fn fault(&self) -> &Fault {
        match &self.result {
            Err(fault) => fault,
            Ok(report) => panic!("Expected a fault, got {:?}\nstdout: {}", report, self.stdout),
        }
    }

    /// The report, panicking if the run faulted
    pub fn report(&self) -> &RunReport {
        match &self.result {
            Ok(report) => report,
            Err(fault) => panic!("Expected success, got fault: {}", fault),
        }
    }
}

/// Run `source` with the given stdin contents and optional step limit
pub fn execute_with(source: &str, input: &str, max_steps: Option<u64>) -> Execution {
    let program = load(source).unwrap_or_else(|err| panic!("Failed to load program: {}", err));
    let stdout = SharedBuffer::new();
    let stderr = SharedBuffer::new();
    let mut vm = VM::new(program)
        .with_stdout(stdout.clone())
        .with_stderr(stderr.clone())
        .with_input(LineReader::new(Cursor::new(input.to_string())));
    let result = runtime::run(&mut vm, max_steps);
    Execution {
        stdout: stdout.contents(),
        stderr: stderr.contents(),
        result,
    }
}

/// Run `source` with empty input and no step limit
pub fn execute(source: &str) -> Execution {
    execute_with(source, "", None)
}

/// Assert that `source` runs to completion and writes `expected` to stdout
pub fn assert_output(source: &str, expected: &str) {
    let execution = execute(source);
    execution.report();
    assert_eq!(execution.stdout, expected, "program:\n{}", source);
}

/// Assert that `source` faults with `expected`, returning the fault
pub fn assert_fault(source: &str, expected: RuntimeError) -> Fault {
    let execution = execute(source);
    let fault = execution.fault().clone();
    assert_eq!(fault.error, expected, "program:\n{}", source);
    fault
}

/// Assert that `source` faults with the given exit code
pub fn assert_exit_code(source: &str, code: i32) {
    let execution = execute(source);
    assert_eq!(
        execution.fault().exit_code(),
        code,
        "fault: {}",
        execution.fault()
    );
}
