//! Run command - execute IFJcode programs

use super::{exit_code, load_program};
use anyhow::{Context, Result};
use ifjcode_runtime::runtime::{self, Outcome};
use ifjcode_runtime::{LineReader, Profiler, VM};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::process::ExitCode;

/// Options for a single run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// File supplying `READ` input instead of stdin
    pub input: Option<String>,
    /// Stop after this many executed instructions
    pub max_steps: Option<u64>,
    /// Print execution statistics to stderr
    pub stats: bool,
}

/// Run an IFJcode source file
///
/// Program output goes to stdout; faults, statistics and the step-limit
/// notice go to stderr. The returned exit code is 0 on success and the
/// fault's code otherwise.
pub fn run(file_path: &str, options: &RunOptions) -> Result<ExitCode> {
    let program = match load_program(file_path)? {
        Ok(program) => program,
        Err(code) => return Ok(code),
    };

    let profiler = if options.stats {
        Profiler::detailed()
    } else {
        Profiler::new()
    };

    let vm = VM::new(program)
        .with_stdout(BufWriter::new(io::stdout()))
        .with_profiler(profiler);
    let mut vm = match &options.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path))?;
            vm.with_input(LineReader::new(BufReader::new(file)))
        }
        None => vm,
    };

    let result = runtime::run(&mut vm, options.max_steps);
    vm.flush().context("Failed to flush program output")?;

    let code = match result {
        Ok(report) => {
            if report.outcome == Outcome::StepLimit {
                eprintln!(
                    "Step limit reached after {} instructions",
                    report.executed_instructions
                );
            }
            ExitCode::SUCCESS
        }
        Err(fault) => {
            eprintln!("{}: {}", file_path, fault);
            exit_code(fault.exit_code())
        }
    };

    if options.stats {
        eprint!("{}", vm.state().profiler().report());
    }

    Ok(code)
}
