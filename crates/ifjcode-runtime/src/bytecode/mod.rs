//! Instruction records and programs
//!
//! A [`Program`] is the validated instruction sequence handed to the VM:
//! every instruction carries its resolved [`Opcode`] (or `None` for an
//! unknown mnemonic) and the label table is built before execution starts.

pub mod disasm;
mod opcode;
pub mod validator;

pub use opcode::Opcode;

use crate::operand::Operand;
use crate::value::{Fault, RuntimeError};
use std::collections::HashMap;
use std::fmt;

/// Maximum number of operands an instruction can carry
pub const MAX_OPERANDS: usize = 3;

/// Label name → instruction index
pub type LabelTable = HashMap<String, usize>;

/// A single parsed instruction
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Upper-cased mnemonic as written in the source
    pub name: String,
    /// Resolved opcode, `None` when the mnemonic is unknown
    pub opcode: Option<Opcode>,
    /// Operands in source order
    pub operands: Vec<Operand>,
    /// 1-based source line (0 for instructions built in code)
    pub line: usize,
}

impl Instruction {
    /// Build an instruction from a mnemonic and its operands
    pub fn new(name: &str, operands: Vec<Operand>) -> Self {
        let name = name.to_ascii_uppercase();
        Self {
            opcode: Opcode::from_mnemonic(&name),
            name,
            operands,
            line: 0,
        }
    }

    /// Attach the source line
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Wrap an error raised by this instruction
    pub(crate) fn fault(&self, ip: usize, error: RuntimeError) -> Fault {
        Fault {
            ip,
            line: self.line,
            instruction: self.to_string(),
            error,
        }
    }

    /// Label name, for `LABEL` instructions
    pub fn label_name(&self) -> Option<&str> {
        match self.opcode {
            Some(Opcode::Label) => self.operands.first().and_then(Operand::as_symbol),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for operand in &self.operands {
            write!(f, " {}", operand)?;
        }
        Ok(())
    }
}

/// A validated instruction sequence with its label table
#[derive(Debug, Clone, Default)]
pub struct Program {
    instructions: Vec<Instruction>,
    labels: LabelTable,
}

impl Program {
    /// Validate an instruction sequence and build its label table
    ///
    /// Fails on duplicate labels and on jumps or calls to undefined labels.
    pub fn new(instructions: Vec<Instruction>) -> Result<Self, Fault> {
        let labels = validator::build_label_table(&instructions)?;
        validator::check_label_references(&instructions, &labels)?;
        Ok(Self {
            instructions,
            labels,
        })
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
