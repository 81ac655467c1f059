//! Program listing
//!
//! Renders a validated program as a numbered, human-readable listing.
//! Used for debugging, testing, and `ifjcode disasm` output.

use super::{Instruction, Program};
use std::fmt::Write;

/// Disassemble a program to human-readable format
///
/// # Format
/// ```text
/// === Labels ===
/// loop -> 0001
///
/// === Instructions ===
/// 0000  DEFVAR GF@x
/// 0001  LABEL loop
/// 0002  JUMP loop  ; -> 0001
/// ```
pub fn disassemble(program: &Program) -> String {
    let mut output = String::new();

    if !program.labels().is_empty() {
        writeln!(output, "=== Labels ===").unwrap();
        let mut labels: Vec<_> = program.labels().iter().collect();
        labels.sort_by_key(|(_, index)| **index);
        for (name, index) in labels {
            writeln!(output, "{} -> {:04}", name, index).unwrap();
        }
        writeln!(output).unwrap();
    }

    writeln!(output, "=== Instructions ===").unwrap();
    for (index, instr) in program.instructions().iter().enumerate() {
        writeln!(output, "{}", disassemble_instruction(program, index, instr)).unwrap();
    }

    output
}

fn disassemble_instruction(program: &Program, index: usize, instr: &Instruction) -> String {
    let mut line = format!("{:04}  {}", index, instr);

    match instr.opcode {
        None => line.push_str("  ; unknown instruction"),
        Some(op) if op.targets_label() => {
            let target = instr
                .operands
                .first()
                .and_then(|o| o.as_symbol())
                .and_then(|name| program.labels().get(name));
            if let Some(target) = target {
                write!(line, "  ; -> {:04}", target).unwrap();
            }
        }
        Some(_) => {}
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand::{FrameKind, Operand};

    #[test]
    fn test_disassemble_resolves_targets() {
        let program = Program::new(vec![
            Instruction::new("DEFVAR", vec![Operand::var(FrameKind::Global, "x")]),
            Instruction::new("LABEL", vec![Operand::Symbol("loop".into())]),
            Instruction::new("JUMP", vec![Operand::Symbol("loop".into())]),
            Instruction::new("NOPE", vec![]),
        ])
        .unwrap();

        let listing = disassemble(&program);
        assert!(listing.contains("loop -> 0001"));
        assert!(listing.contains("0002  JUMP loop  ; -> 0001"));
        assert!(listing.contains("0003  NOPE  ; unknown instruction"));
    }
}
