//! CLI command implementations

pub mod check;
pub mod disasm;
pub mod run;

use anyhow::{Context, Result};
use ifjcode_runtime::{load, Program};
use std::fs;
use std::process::ExitCode;

/// Read a source file from disk
pub fn read_source(file_path: &str) -> Result<String> {
    fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read source file: {}", file_path))
}

/// Read and load a program, reporting load errors on stderr
///
/// Returns the exit code of the load error when the source is rejected.
pub fn load_program(file_path: &str) -> Result<Result<Program, ExitCode>> {
    let source = read_source(file_path)?;
    match load(&source) {
        Ok(program) => Ok(Ok(program)),
        Err(err) => {
            eprintln!("{}: {}", file_path, err);
            Ok(Err(exit_code(err.exit_code())))
        }
    }
}

/// Convert an interpreter exit code into a process exit code
pub fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(exit_status(code))
}

/// Status byte for an interpreter exit code; out-of-range codes become 1
fn exit_status(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}
