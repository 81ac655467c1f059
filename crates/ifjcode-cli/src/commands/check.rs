//! Check command - parse and validate labels without running

use super::load_program;
use anyhow::Result;
use std::process::ExitCode;

/// Check an IFJcode source file
///
/// Parses the file and builds the label table. Nothing is executed.
pub fn run(file_path: &str) -> Result<ExitCode> {
    let program = match load_program(file_path)? {
        Ok(program) => program,
        Err(code) => return Ok(code),
    };

    println!(
        "{}: ok ({} instructions, {} labels)",
        file_path,
        program.len(),
        program.labels().len()
    );
    Ok(ExitCode::SUCCESS)
}
