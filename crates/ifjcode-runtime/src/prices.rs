//! Instruction price table
//!
//! Static cost of each mnemonic, summed by the profiler for the statistics
//! report. Prices never affect execution.

/// Price of one execution of `mnemonic`; unknown mnemonics cost nothing
pub fn price(mnemonic: &str) -> u64 {
    match mnemonic {
        "LABEL" | "BREAK" | "DPRINT" => 0,

        "MOVE" | "DEFVAR" | "TYPE" | "PUSHS" | "POPS" | "JUMP" => 1,
        "CLEARS" | "CREATEFRAME" => 1,

        "PUSHFRAME" | "POPFRAME" => 2,
        "CALL" | "RETURN" => 3,
        "JUMPIFEQ" | "JUMPIFNEQ" | "JUMPIFEQS" | "JUMPIFNEQS" => 2,

        "ADD" | "SUB" | "ADDS" | "SUBS" => 2,
        "MUL" | "MULS" => 3,
        "DIV" | "DIVS" => 4,

        "LT" | "GT" | "EQ" | "LTS" | "GTS" | "EQS" => 2,
        "AND" | "OR" | "NOT" | "ANDS" | "ORS" | "NOTS" => 1,

        "INT2FLOAT" | "FLOAT2INT" | "FLOAT2R2EINT" | "FLOAT2R2OINT" => 2,
        "INT2FLOATS" | "FLOAT2INTS" | "FLOAT2R2EINTS" | "FLOAT2R2OINTS" => 2,
        "INT2CHAR" | "STRI2INT" | "INT2CHARS" | "STRI2INTS" => 2,

        "CONCAT" | "SETCHAR" => 3,
        "STRLEN" | "GETCHAR" => 2,

        "READ" | "WRITE" => 10,

        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Opcode;

    #[test]
    fn test_unknown_mnemonic_is_free() {
        assert_eq!(price("HALT"), 0);
        assert_eq!(price(""), 0);
    }

    #[test]
    fn test_every_executable_opcode_is_priced() {
        let free = [Opcode::Label, Opcode::Break, Opcode::DPrint];
        for op in Opcode::ALL {
            if free.contains(&op) {
                assert_eq!(price(op.mnemonic()), 0);
            } else {
                assert!(price(op.mnemonic()) > 0, "{} has no price", op.mnemonic());
            }
        }
    }
}
