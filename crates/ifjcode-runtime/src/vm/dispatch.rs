//! Instruction dispatch for the VM
//!
//! Uses a static table indexed by `Opcode as usize` for O(1) lookup of the
//! semantics function and declared arity, instead of a match in the hot loop.
//! The table is built at compile time and never mutated.

use super::ops;
use super::state::State;
use crate::bytecode::Opcode;
use crate::operand::Operand;
use crate::value::RuntimeError;

/// Semantics function signature
pub type OpFn = fn(&mut State, &[Operand]) -> Result<(), RuntimeError>;

/// Dispatch table entry
#[derive(Clone, Copy)]
pub struct Handler {
    pub opcode: Opcode,
    /// Number of operands the instruction takes
    pub arity: usize,
    pub run: OpFn,
}

const fn entry(opcode: Opcode, arity: usize, run: OpFn) -> Handler {
    Handler { opcode, arity, run }
}

static HANDLER_TABLE: [Handler; Opcode::COUNT] = {
    let mut table = [entry(Opcode::Label, 1, ops::op_label); Opcode::COUNT];

    // Frames & data movement
    table[Opcode::Move as usize] = entry(Opcode::Move, 2, ops::op_move);
    table[Opcode::CreateFrame as usize] = entry(Opcode::CreateFrame, 0, ops::op_createframe);
    table[Opcode::PushFrame as usize] = entry(Opcode::PushFrame, 0, ops::op_pushframe);
    table[Opcode::PopFrame as usize] = entry(Opcode::PopFrame, 0, ops::op_popframe);
    table[Opcode::DefVar as usize] = entry(Opcode::DefVar, 1, ops::op_defvar);

    // Calls
    table[Opcode::Call as usize] = entry(Opcode::Call, 1, ops::op_call);
    table[Opcode::Return as usize] = entry(Opcode::Return, 0, ops::op_return);

    // Value stack
    table[Opcode::PushS as usize] = entry(Opcode::PushS, 1, ops::op_pushs);
    table[Opcode::PopS as usize] = entry(Opcode::PopS, 1, ops::op_pops);
    table[Opcode::ClearS as usize] = entry(Opcode::ClearS, 0, ops::op_clears);

    // Arithmetic
    table[Opcode::Add as usize] = entry(Opcode::Add, 3, ops::op_add);
    table[Opcode::Sub as usize] = entry(Opcode::Sub, 3, ops::op_sub);
    table[Opcode::Mul as usize] = entry(Opcode::Mul, 3, ops::op_mul);
    table[Opcode::Div as usize] = entry(Opcode::Div, 3, ops::op_div);
    table[Opcode::AddS as usize] = entry(Opcode::AddS, 0, ops::op_adds);
    table[Opcode::SubS as usize] = entry(Opcode::SubS, 0, ops::op_subs);
    table[Opcode::MulS as usize] = entry(Opcode::MulS, 0, ops::op_muls);
    table[Opcode::DivS as usize] = entry(Opcode::DivS, 0, ops::op_divs);

    // Relational
    table[Opcode::Lt as usize] = entry(Opcode::Lt, 3, ops::op_lt);
    table[Opcode::Gt as usize] = entry(Opcode::Gt, 3, ops::op_gt);
    table[Opcode::Eq as usize] = entry(Opcode::Eq, 3, ops::op_eq);
    table[Opcode::LtS as usize] = entry(Opcode::LtS, 0, ops::op_lts);
    table[Opcode::GtS as usize] = entry(Opcode::GtS, 0, ops::op_gts);
    table[Opcode::EqS as usize] = entry(Opcode::EqS, 0, ops::op_eqs);

    // Logical
    table[Opcode::And as usize] = entry(Opcode::And, 3, ops::op_and);
    table[Opcode::Or as usize] = entry(Opcode::Or, 3, ops::op_or);
    table[Opcode::Not as usize] = entry(Opcode::Not, 2, ops::op_not);
    table[Opcode::AndS as usize] = entry(Opcode::AndS, 0, ops::op_ands);
    table[Opcode::OrS as usize] = entry(Opcode::OrS, 0, ops::op_ors);
    table[Opcode::NotS as usize] = entry(Opcode::NotS, 0, ops::op_nots);

    // Conversions
    table[Opcode::Int2Float as usize] = entry(Opcode::Int2Float, 2, ops::op_int2float);
    table[Opcode::Float2Int as usize] = entry(Opcode::Float2Int, 2, ops::op_float2int);
    table[Opcode::Float2R2EInt as usize] = entry(Opcode::Float2R2EInt, 2, ops::op_float2r2eint);
    table[Opcode::Float2R2OInt as usize] = entry(Opcode::Float2R2OInt, 2, ops::op_float2r2oint);
    table[Opcode::Int2Char as usize] = entry(Opcode::Int2Char, 2, ops::op_int2char);
    table[Opcode::Stri2Int as usize] = entry(Opcode::Stri2Int, 3, ops::op_stri2int);
    table[Opcode::Int2FloatS as usize] = entry(Opcode::Int2FloatS, 0, ops::op_int2floats);
    table[Opcode::Float2IntS as usize] = entry(Opcode::Float2IntS, 0, ops::op_float2ints);
    table[Opcode::Float2R2EIntS as usize] =
        entry(Opcode::Float2R2EIntS, 0, ops::op_float2r2eints);
    table[Opcode::Float2R2OIntS as usize] =
        entry(Opcode::Float2R2OIntS, 0, ops::op_float2r2oints);
    table[Opcode::Int2CharS as usize] = entry(Opcode::Int2CharS, 0, ops::op_int2chars);
    table[Opcode::Stri2IntS as usize] = entry(Opcode::Stri2IntS, 0, ops::op_stri2ints);

    // I/O
    table[Opcode::Read as usize] = entry(Opcode::Read, 2, ops::op_read);
    table[Opcode::Write as usize] = entry(Opcode::Write, 1, ops::op_write);

    // Strings
    table[Opcode::Concat as usize] = entry(Opcode::Concat, 3, ops::op_concat);
    table[Opcode::Strlen as usize] = entry(Opcode::Strlen, 2, ops::op_strlen);
    table[Opcode::GetChar as usize] = entry(Opcode::GetChar, 3, ops::op_getchar);
    table[Opcode::SetChar as usize] = entry(Opcode::SetChar, 3, ops::op_setchar);
    table[Opcode::Type as usize] = entry(Opcode::Type, 2, ops::op_type);

    // Control flow
    table[Opcode::Label as usize] = entry(Opcode::Label, 1, ops::op_label);
    table[Opcode::Jump as usize] = entry(Opcode::Jump, 1, ops::op_jump);
    table[Opcode::JumpIfEq as usize] = entry(Opcode::JumpIfEq, 3, ops::op_jumpifeq);
    table[Opcode::JumpIfNeq as usize] = entry(Opcode::JumpIfNeq, 3, ops::op_jumpifneq);
    table[Opcode::JumpIfEqS as usize] = entry(Opcode::JumpIfEqS, 1, ops::op_jumpifeqs);
    table[Opcode::JumpIfNeqS as usize] = entry(Opcode::JumpIfNeqS, 1, ops::op_jumpifneqs);

    // Debugging
    table[Opcode::Break as usize] = entry(Opcode::Break, 0, ops::op_break);
    table[Opcode::DPrint as usize] = entry(Opcode::DPrint, 1, ops::op_dprint);

    table
};

/// Look up the handler for an opcode
#[inline(always)]
pub fn lookup(opcode: Opcode) -> &'static Handler {
    &HANDLER_TABLE[opcode as usize]
}

/// Declared operand count of an opcode
#[inline]
pub fn arity(opcode: Opcode) -> usize {
    lookup(opcode).arity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_slot_is_filled() {
        for op in Opcode::ALL {
            assert_eq!(lookup(op).opcode, op, "slot {} holds the wrong entry", op as usize);
        }
    }

    #[test]
    fn test_declared_arities() {
        assert_eq!(arity(Opcode::Add), 3);
        assert_eq!(arity(Opcode::AddS), 0);
        assert_eq!(arity(Opcode::Not), 2);
        assert_eq!(arity(Opcode::Int2CharS), 0);
        assert_eq!(arity(Opcode::JumpIfEqS), 1);
        assert_eq!(arity(Opcode::Return), 0);
    }

    #[test]
    fn test_arity_never_exceeds_operand_limit() {
        for op in Opcode::ALL {
            assert!(arity(op) <= crate::bytecode::MAX_OPERANDS);
        }
    }
}
