//! Disasm command - print a numbered program listing

use super::load_program;
use anyhow::Result;
use ifjcode_runtime::bytecode::disasm::disassemble;
use std::process::ExitCode;

/// Print the listing of an IFJcode source file
pub fn run(file_path: &str) -> Result<ExitCode> {
    match load_program(file_path)? {
        Ok(program) => {
            print!("{}", disassemble(&program));
            Ok(ExitCode::SUCCESS)
        }
        Err(code) => Ok(code),
    }
}
