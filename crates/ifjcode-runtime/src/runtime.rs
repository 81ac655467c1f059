//! IFJcode runtime API for embedding
//!
//! Thin driver layer over the parser and the VM: load source text into a
//! validated [`Program`], then run it with an optional step budget.

use crate::bytecode::Program;
use crate::parser::{self, ParseError};
use crate::value::Fault;
use crate::vm::{StepOutcome, VM};
use thiserror::Error;

/// Error raised while turning source text into a program
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Duplicate label or jump to an undefined label
    #[error(transparent)]
    Label(#[from] Fault),
}

impl LoadError {
    /// Process exit code reported for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::Parse(err) => err.exit_code(),
            LoadError::Label(fault) => fault.exit_code(),
        }
    }
}

/// Parse and validate a program
///
/// # Examples
///
/// ```
/// use ifjcode_runtime::runtime::load;
///
/// let program = load(".IFJcode17\nLABEL start\nJUMP start\n").unwrap();
/// assert_eq!(program.len(), 2);
/// assert!(load("JUMP nowhere").is_err());
/// ```
pub fn load(source: &str) -> Result<Program, LoadError> {
    let instructions = parser::parse(source)?;
    Ok(Program::new(instructions)?)
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The instruction pointer ran past the last instruction
    Finished,
    /// The step budget ran out first
    StepLimit,
}

/// Summary of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: Outcome,
    pub executed_instructions: u64,
    pub instruction_price: u64,
}

/// Run a VM to completion, or until `max_steps` instructions have executed
///
/// Output sinks are not flushed; call [`VM::flush`] afterwards.
pub fn run(vm: &mut VM, max_steps: Option<u64>) -> Result<RunReport, Fault> {
    let outcome = loop {
        if let Some(limit) = max_steps {
            if vm.state().executed_instructions() >= limit && !vm.is_halted() {
                tracing::warn!(limit, "step limit reached");
                break Outcome::StepLimit;
            }
        }
        if vm.step()? == StepOutcome::Halted {
            break Outcome::Finished;
        }
    };

    Ok(RunReport {
        outcome,
        executed_instructions: vm.state().executed_instructions(),
        instruction_price: vm.state().instruction_price(),
    })
}
