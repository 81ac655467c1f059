//! Instruction semantics
//!
//! One function per opcode. Every function receives the execution state and
//! the instruction's operands, already checked against the declared arity by
//! the loop. Functions never log and never advance `ip` themselves; only the
//! control-flow family redirects it.
//!
//! Stack forms pop the right operand first, then the left one, so
//! `PUSHS a; PUSHS b; SUBS` computes `a - b`.

use super::arith::{self, BinaryOp, UnaryOp};
use super::state::State;
use crate::escape;
use crate::operand::Operand;
use crate::value::{RuntimeError, Value, ValueKind};
use std::io::Write;

type OpResult = Result<(), RuntimeError>;

// ===== Helpers =====

/// `OP var a b`
fn named_binary(state: &mut State, args: &[Operand], op: BinaryOp) -> OpResult {
    let left = state.get_value(&args[1])?;
    let right = state.get_value(&args[2])?;
    state.set_value(&args[0], op(left, right)?)
}

/// `OPS`: pop right, pop left, push `left OP right`
fn stack_binary(state: &mut State, op: BinaryOp) -> OpResult {
    let right = state.pop_stack()?;
    let left = state.pop_stack()?;
    state.push_stack(op(left, right)?);
    Ok(())
}

/// `OP var a`
fn named_unary(state: &mut State, args: &[Operand], op: UnaryOp) -> OpResult {
    let value = state.get_value(&args[1])?;
    state.set_value(&args[0], op(value)?)
}

/// `OPS`: pop one, push the result
fn stack_unary(state: &mut State, op: UnaryOp) -> OpResult {
    let value = state.pop_stack()?;
    state.push_stack(op(value)?);
    Ok(())
}

/// Jump to `label` when the equality of `left` and `right` equals `when`
fn jump_if(state: &mut State, label: &Operand, left: Value, right: Value, when: bool) -> OpResult {
    // Resolve the label first so a bad target faults regardless of the outcome
    let target = state.label_target(label)?;
    if arith::values_equal(&left, &right)? == when {
        state.jump_to(target);
    }
    Ok(())
}

fn jump_if_named(state: &mut State, args: &[Operand], when: bool) -> OpResult {
    let left = state.get_value(&args[1])?;
    let right = state.get_value(&args[2])?;
    jump_if(state, &args[0], left, right, when)
}

fn jump_if_stack(state: &mut State, args: &[Operand], when: bool) -> OpResult {
    let right = state.pop_stack()?;
    let left = state.pop_stack()?;
    jump_if(state, &args[0], left, right, when)
}

// ===== Data movement & frames =====

pub(super) fn op_move(state: &mut State, args: &[Operand]) -> OpResult {
    let value = state.get_value(&args[1])?;
    state.set_value(&args[0], value)
}

pub(super) fn op_createframe(state: &mut State, _args: &[Operand]) -> OpResult {
    state.create_frame();
    Ok(())
}

pub(super) fn op_pushframe(state: &mut State, _args: &[Operand]) -> OpResult {
    state.push_frame();
    Ok(())
}

pub(super) fn op_popframe(state: &mut State, _args: &[Operand]) -> OpResult {
    state.pop_frame()
}

pub(super) fn op_defvar(state: &mut State, args: &[Operand]) -> OpResult {
    state.declare(&args[0])
}

// ===== Calls =====

pub(super) fn op_call(state: &mut State, args: &[Operand]) -> OpResult {
    state.call(&args[0])
}

pub(super) fn op_return(state: &mut State, _args: &[Operand]) -> OpResult {
    state.return_()
}

// ===== Value stack =====

pub(super) fn op_pushs(state: &mut State, args: &[Operand]) -> OpResult {
    let value = state.get_value(&args[0])?;
    state.push_stack(value);
    Ok(())
}

pub(super) fn op_pops(state: &mut State, args: &[Operand]) -> OpResult {
    let value = state.pop_stack()?;
    state.set_value(&args[0], value)
}

pub(super) fn op_clears(state: &mut State, _args: &[Operand]) -> OpResult {
    state.clear_stack();
    Ok(())
}

// ===== Arithmetic =====

pub(super) fn op_add(state: &mut State, args: &[Operand]) -> OpResult {
    named_binary(state, args, arith::add)
}

pub(super) fn op_sub(state: &mut State, args: &[Operand]) -> OpResult {
    named_binary(state, args, arith::sub)
}

pub(super) fn op_mul(state: &mut State, args: &[Operand]) -> OpResult {
    named_binary(state, args, arith::mul)
}

pub(super) fn op_div(state: &mut State, args: &[Operand]) -> OpResult {
    named_binary(state, args, arith::div)
}

pub(super) fn op_adds(state: &mut State, _args: &[Operand]) -> OpResult {
    stack_binary(state, arith::add)
}

pub(super) fn op_subs(state: &mut State, _args: &[Operand]) -> OpResult {
    stack_binary(state, arith::sub)
}

pub(super) fn op_muls(state: &mut State, _args: &[Operand]) -> OpResult {
    stack_binary(state, arith::mul)
}

pub(super) fn op_divs(state: &mut State, _args: &[Operand]) -> OpResult {
    stack_binary(state, arith::div)
}

// ===== Relational =====

pub(super) fn op_lt(state: &mut State, args: &[Operand]) -> OpResult {
    named_binary(state, args, arith::less)
}

pub(super) fn op_gt(state: &mut State, args: &[Operand]) -> OpResult {
    named_binary(state, args, arith::greater)
}

pub(super) fn op_eq(state: &mut State, args: &[Operand]) -> OpResult {
    named_binary(state, args, arith::equal)
}

pub(super) fn op_lts(state: &mut State, _args: &[Operand]) -> OpResult {
    stack_binary(state, arith::less)
}

pub(super) fn op_gts(state: &mut State, _args: &[Operand]) -> OpResult {
    stack_binary(state, arith::greater)
}

pub(super) fn op_eqs(state: &mut State, _args: &[Operand]) -> OpResult {
    stack_binary(state, arith::equal)
}

// ===== Logical =====

pub(super) fn op_and(state: &mut State, args: &[Operand]) -> OpResult {
    named_binary(state, args, arith::and)
}

pub(super) fn op_or(state: &mut State, args: &[Operand]) -> OpResult {
    named_binary(state, args, arith::or)
}

pub(super) fn op_not(state: &mut State, args: &[Operand]) -> OpResult {
    named_unary(state, args, arith::not)
}

pub(super) fn op_ands(state: &mut State, _args: &[Operand]) -> OpResult {
    stack_binary(state, arith::and)
}

pub(super) fn op_ors(state: &mut State, _args: &[Operand]) -> OpResult {
    stack_binary(state, arith::or)
}

pub(super) fn op_nots(state: &mut State, _args: &[Operand]) -> OpResult {
    stack_unary(state, arith::not)
}

// ===== Conversions =====

pub(super) fn op_int2float(state: &mut State, args: &[Operand]) -> OpResult {
    named_unary(state, args, arith::int2float)
}

pub(super) fn op_float2int(state: &mut State, args: &[Operand]) -> OpResult {
    named_unary(state, args, arith::float2int)
}

pub(super) fn op_float2r2eint(state: &mut State, args: &[Operand]) -> OpResult {
    named_unary(state, args, arith::float2r2eint)
}

pub(super) fn op_float2r2oint(state: &mut State, args: &[Operand]) -> OpResult {
    named_unary(state, args, arith::float2r2oint)
}

pub(super) fn op_int2char(state: &mut State, args: &[Operand]) -> OpResult {
    named_unary(state, args, arith::int2char)
}

pub(super) fn op_stri2int(state: &mut State, args: &[Operand]) -> OpResult {
    named_binary(state, args, arith::stri2int)
}

pub(super) fn op_int2floats(state: &mut State, _args: &[Operand]) -> OpResult {
    stack_unary(state, arith::int2float)
}

pub(super) fn op_float2ints(state: &mut State, _args: &[Operand]) -> OpResult {
    stack_unary(state, arith::float2int)
}

pub(super) fn op_float2r2eints(state: &mut State, _args: &[Operand]) -> OpResult {
    stack_unary(state, arith::float2r2eint)
}

pub(super) fn op_float2r2oints(state: &mut State, _args: &[Operand]) -> OpResult {
    stack_unary(state, arith::float2r2oint)
}

pub(super) fn op_int2chars(state: &mut State, _args: &[Operand]) -> OpResult {
    stack_unary(state, arith::int2char)
}

pub(super) fn op_stri2ints(state: &mut State, _args: &[Operand]) -> OpResult {
    stack_binary(state, arith::stri2int)
}

// ===== I/O =====

pub(super) fn op_read(state: &mut State, args: &[Operand]) -> OpResult {
    let type_name = args[1].as_symbol().unwrap_or_default();
    let kind = ValueKind::from_name(type_name).ok_or_else(|| {
        RuntimeError::type_mismatch(format!("READ: unknown type '{}'", args[1]))
    })?;
    let value = state.read(kind);
    state.set_value(&args[0], value)
}

pub(super) fn op_write(state: &mut State, args: &[Operand]) -> OpResult {
    let value = state.get_value(&args[0])?;
    let text = escape::unescape(&value.to_display_string());
    state.stdout().write_all(text.as_bytes())?;
    Ok(())
}

// ===== Strings =====

pub(super) fn op_concat(state: &mut State, args: &[Operand]) -> OpResult {
    named_binary(state, args, arith::concat)
}

pub(super) fn op_strlen(state: &mut State, args: &[Operand]) -> OpResult {
    named_unary(state, args, arith::strlen)
}

pub(super) fn op_getchar(state: &mut State, args: &[Operand]) -> OpResult {
    named_binary(state, args, arith::get_char)
}

pub(super) fn op_setchar(state: &mut State, args: &[Operand]) -> OpResult {
    let target = state.get_value(&args[0])?;
    let index = state.get_value(&args[1])?;
    let replacement = state.get_value(&args[2])?;
    state.set_value(&args[0], arith::set_char(target, index, replacement)?)
}

pub(super) fn op_type(state: &mut State, args: &[Operand]) -> OpResult {
    let value = state.get_value(&args[1])?;
    state.set_value(&args[0], Value::string(value.type_name()))
}

// ===== Control flow =====

pub(super) fn op_label(_state: &mut State, _args: &[Operand]) -> OpResult {
    Ok(())
}

pub(super) fn op_jump(state: &mut State, args: &[Operand]) -> OpResult {
    state.jump(&args[0])
}

pub(super) fn op_jumpifeq(state: &mut State, args: &[Operand]) -> OpResult {
    jump_if_named(state, args, true)
}

pub(super) fn op_jumpifneq(state: &mut State, args: &[Operand]) -> OpResult {
    jump_if_named(state, args, false)
}

pub(super) fn op_jumpifeqs(state: &mut State, args: &[Operand]) -> OpResult {
    jump_if_stack(state, args, true)
}

pub(super) fn op_jumpifneqs(state: &mut State, args: &[Operand]) -> OpResult {
    jump_if_stack(state, args, false)
}

// ===== Debugging =====

pub(super) fn op_break(state: &mut State, _args: &[Operand]) -> OpResult {
    let snapshot = state.to_string();
    writeln!(state.stderr(), "{}", snapshot)?;
    Ok(())
}

pub(super) fn op_dprint(state: &mut State, args: &[Operand]) -> OpResult {
    let value = state.get_value(&args[0])?;
    writeln!(state.stderr(), "{}", value.to_literal())?;
    Ok(())
}
