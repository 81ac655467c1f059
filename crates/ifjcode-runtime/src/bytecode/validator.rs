//! Label validation: static analysis before VM execution
//!
//! Performs two checks:
//! 1. **Label table**: every `LABEL` name is defined exactly once
//! 2. **Jump targets**: every `JUMP*`/`CALL` names a defined label
//!
//! Both run before the first instruction executes, so a program with a
//! dangling jump never produces partial output.

use crate::bytecode::{Instruction, LabelTable};
use crate::value::{Fault, RuntimeError};
use tracing::debug;

/// Scan all `LABEL` instructions into a label table
pub fn build_label_table(instructions: &[Instruction]) -> Result<LabelTable, Fault> {
    let mut labels = LabelTable::new();

    for (index, instr) in instructions.iter().enumerate() {
        let Some(name) = instr.label_name() else {
            continue;
        };
        if labels.insert(name.to_string(), index).is_some() {
            return Err(instr.fault(
                index,
                RuntimeError::DuplicateLabel {
                    label: name.to_string(),
                },
            ));
        }
    }

    debug!(labels = labels.len(), "built label table");
    Ok(labels)
}

/// Check that every jump and call names a label from the table
///
/// Operands that are not symbols are left to the VM, which reports them as
/// type mismatches when the instruction executes.
pub fn check_label_references(
    instructions: &[Instruction],
    labels: &LabelTable,
) -> Result<(), Fault> {
    for (index, instr) in instructions.iter().enumerate() {
        let Some(opcode) = instr.opcode else {
            continue;
        };
        if !opcode.targets_label() {
            continue;
        }
        let Some(target) = instr.operands.first().and_then(|op| op.as_symbol()) else {
            continue;
        };
        if !labels.contains_key(target) {
            return Err(instr.fault(
                index,
                RuntimeError::UndefinedLabel {
                    label: target.to_string(),
                },
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand::Operand;

    fn label(name: &str) -> Instruction {
        Instruction::new("LABEL", vec![Operand::Symbol(name.to_string())])
    }

    fn jump(name: &str) -> Instruction {
        Instruction::new("JUMP", vec![Operand::Symbol(name.to_string())])
    }

    #[test]
    fn test_label_table_indices() {
        let program = vec![label("start"), jump("end"), label("end")];
        let labels = build_label_table(&program).unwrap();
        assert_eq!(labels.get("start"), Some(&0));
        assert_eq!(labels.get("end"), Some(&2));
    }

    #[test]
    fn test_duplicate_label() {
        let program = vec![label("a"), label("b"), label("a")];
        let fault = build_label_table(&program).unwrap_err();
        assert_eq!(fault.ip, 2);
        assert_eq!(
            fault.error,
            RuntimeError::DuplicateLabel {
                label: "a".to_string()
            }
        );
    }

    #[test]
    fn test_undefined_jump_target() {
        let program = vec![label("a"), jump("missing")];
        let labels = build_label_table(&program).unwrap();
        let fault = check_label_references(&program, &labels).unwrap_err();
        assert_eq!(fault.ip, 1);
        assert_eq!(fault.exit_code(), 52);
    }
}
