//! IFJcode virtual machine
//!
//! Executes a validated [`Program`] against an execution [`State`]:
//! - every instruction is looked up in the static dispatch table
//! - operand counts are checked against the declared arity before dispatch
//! - unknown mnemonics are logged and skipped, never fatal
//! - the instruction pointer advances unless the instruction redirected it
//!
//! The VM has no notion of a step budget; drivers bound execution by calling
//! [`VM::step`] themselves.

mod arith;
pub mod dispatch;
mod frame;
mod ops;
mod profiler;
mod state;

pub use frame::Frame;
pub use profiler::Profiler;
pub use state::State;

use crate::bytecode::{Instruction, Program};
use crate::io::InputSource;
use crate::operand::Operand;
use crate::value::{Fault, RuntimeError};
use std::io::Write;

/// Observer invoked once before every instruction
pub trait ExecutionHook {
    fn before_instruction(&mut self, ip: usize, instruction: &Instruction, state: &State);
}

/// Result of a single [`VM::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// An instruction was executed (or skipped) and more may follow
    Continue,
    /// The instruction pointer is past the end of the program
    Halted,
}

/// Virtual machine
pub struct VM {
    /// Program being executed
    program: Program,
    /// Frames, stacks, sinks and counters
    state: State,
    /// Optional per-instruction observer
    hook: Option<Box<dyn ExecutionHook>>,
}

impl VM {
    /// Create a VM wired to the process' standard streams
    pub fn new(program: Program) -> Self {
        let state = State::new(program.labels().clone());
        Self {
            program,
            state,
            hook: None,
        }
    }

    /// Replace the standard output sink
    pub fn with_stdout(mut self, writer: impl Write + 'static) -> Self {
        self.state = self.state.with_stdout(writer);
        self
    }

    /// Replace the diagnostic output sink
    pub fn with_stderr(mut self, writer: impl Write + 'static) -> Self {
        self.state = self.state.with_stderr(writer);
        self
    }

    /// Replace the input source used by `READ`
    pub fn with_input(mut self, input: impl InputSource + 'static) -> Self {
        self.state = self.state.with_input(input);
        self
    }

    /// Replace the profiler
    pub fn with_profiler(mut self, profiler: Profiler) -> Self {
        self.state = self.state.with_profiler(profiler);
        self
    }

    /// Install an execution hook
    pub fn with_hook(mut self, hook: impl ExecutionHook + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    /// Consume the VM, keeping its final state
    pub fn into_state(self) -> State {
        self.state
    }

    /// Whether execution has run past the last instruction
    pub fn is_halted(&self) -> bool {
        self.state.ip() >= self.program.len()
    }

    /// Execute until the instruction pointer runs past the end
    pub fn run(&mut self) -> Result<(), Fault> {
        tracing::debug!(instructions = self.program.len(), "run started");
        while self.step()? == StepOutcome::Continue {}
        tracing::debug!(
            executed = self.state.executed_instructions(),
            price = self.state.instruction_price(),
            "run finished"
        );
        Ok(())
    }

    /// Execute the instruction at the current pointer
    pub fn step(&mut self) -> Result<StepOutcome, Fault> {
        let ip = self.state.ip();
        let Some(instruction) = self.program.get(ip) else {
            return Ok(StepOutcome::Halted);
        };

        tracing::trace!(ip, line = instruction.line, "{}", instruction);
        if let Some(hook) = self.hook.as_mut() {
            hook.before_instruction(ip, instruction, &self.state);
        }

        let Some(opcode) = instruction.opcode else {
            let error = RuntimeError::UnknownInstruction {
                name: instruction.name.clone(),
            };
            tracing::error!(ip, line = instruction.line, "{}", error);
            self.state.begin_instruction();
            self.state.finish_instruction();
            self.state.profiler_mut().record(&instruction.name);
            return Ok(StepOutcome::Continue);
        };

        let handler = dispatch::lookup(opcode);
        if instruction.operands.len() != handler.arity {
            let error = RuntimeError::ArityMismatch {
                mnemonic: opcode.mnemonic(),
                expected: handler.arity,
                found: instruction.operands.len(),
            };
            return Err(fault(&self.state, ip, instruction, error));
        }

        self.state.begin_instruction();
        let result = (handler.run)(&mut self.state, &instruction.operands);
        // A faulting instruction still counts as executed
        self.state.profiler_mut().record(opcode.mnemonic());
        if let Err(error) = result {
            return Err(fault(&self.state, ip, instruction, error));
        }
        self.state.finish_instruction();

        Ok(StepOutcome::Continue)
    }

    /// Flush both output sinks
    pub fn flush(&mut self) -> Result<(), RuntimeError> {
        self.state.flush()
    }
}

/// Build a fault whose rendering shows the current value of each variable
/// operand, e.g. `ADD GF@x GF@a=int@1 GF@b=string@x`
fn fault(state: &State, ip: usize, instruction: &Instruction, error: RuntimeError) -> Fault {
    let mut rendered = instruction.name.clone();
    for operand in &instruction.operands {
        rendered.push(' ');
        rendered.push_str(&operand.to_string());
        if let (Operand::Variable { .. }, Ok(value)) = (operand, state.get_value(operand)) {
            rendered.push('=');
            rendered.push_str(&value.to_literal());
        }
    }
    Fault {
        ip,
        line: instruction.line,
        instruction: rendered,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{EmptyInput, SharedBuffer};
    use crate::operand::FrameKind;
    use crate::value::Value;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn vm(instructions: Vec<Instruction>) -> (VM, SharedBuffer) {
        let out = SharedBuffer::new();
        let program = Program::new(instructions).unwrap();
        let vm = VM::new(program)
            .with_stdout(out.clone())
            .with_stderr(SharedBuffer::new())
            .with_input(EmptyInput);
        (vm, out)
    }

    fn gf(name: &str) -> Operand {
        Operand::var(FrameKind::Global, name)
    }

    #[test]
    fn test_unknown_mnemonic_is_skipped() {
        let (mut vm, out) = vm(vec![
            Instruction::new("HALT", vec![]),
            Instruction::new("WRITE", vec![Operand::Constant(Value::string("ok"))]),
        ]);
        vm.run().unwrap();
        assert_eq!(out.contents(), "ok");
        assert_eq!(vm.state().executed_instructions(), 2);
    }

    #[test]
    fn test_arity_mismatch_is_fatal() {
        let (mut vm, _) = vm(vec![Instruction::new("ADDS", vec![gf("x")])]);
        let fault = vm.run().unwrap_err();
        assert_eq!(
            fault.error,
            RuntimeError::ArityMismatch {
                mnemonic: "ADDS",
                expected: 0,
                found: 1
            }
        );
        assert_eq!(fault.ip, 0);
    }

    #[test]
    fn test_fault_shows_operand_values() {
        let (mut vm, _) = vm(vec![
            Instruction::new("DEFVAR", vec![gf("a")]),
            Instruction::new(
                "ADD",
                vec![gf("a"), gf("a"), Operand::Constant(Value::Int(1))],
            )
            .at_line(7),
        ]);
        let fault = vm.run().unwrap_err();
        assert_eq!(fault.line, 7);
        assert_eq!(fault.instruction, "ADD GF@a=nil@nil GF@a=nil@nil int@1");
        assert_eq!(fault.exit_code(), 53);
    }

    #[test]
    fn test_faulting_instruction_is_counted() {
        let (mut vm, _) = vm(vec![
            Instruction::new("DEFVAR", vec![gf("a")]),
            Instruction::new(
                "DIV",
                vec![
                    gf("a"),
                    Operand::Constant(Value::Int(1)),
                    Operand::Constant(Value::Int(0)),
                ],
            ),
        ]);
        let fault = vm.run().unwrap_err();
        assert_eq!(fault.error, RuntimeError::DivideByZero);
        assert_eq!(vm.state().executed_instructions(), 2);
        assert_eq!(
            vm.state().instruction_price(),
            crate::prices::price("DEFVAR") + crate::prices::price("DIV")
        );
    }

    #[test]
    fn test_state_prepared_before_run() {
        let (mut vm, out) = vm(vec![
            Instruction::new("MOVE", vec![gf("n"), Operand::Constant(Value::Int(4))]),
            Instruction::new("WRITE", vec![gf("n")]),
        ]);
        vm.state_mut().declare(&gf("n")).unwrap();
        vm.run().unwrap();
        assert_eq!(out.contents(), "4");

        let state = vm.into_state();
        assert!(state.global_frame().is_declared("n"));
        assert_eq!(state.global_frame().get("n"), Some(&Value::Int(4)));
    }

    #[test]
    fn test_step_reports_halt() {
        let (mut vm, _) = vm(vec![Instruction::new("CLEARS", vec![])]);
        assert_eq!(vm.step().unwrap(), StepOutcome::Continue);
        assert!(vm.is_halted());
        assert_eq!(vm.step().unwrap(), StepOutcome::Halted);
    }

    struct Recorder(Rc<RefCell<Vec<usize>>>);

    impl ExecutionHook for Recorder {
        fn before_instruction(&mut self, ip: usize, _instruction: &Instruction, _state: &State) {
            self.0.borrow_mut().push(ip);
        }
    }

    #[test]
    fn test_hook_fires_once_per_instruction() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (vm, _) = vm(vec![
            Instruction::new("JUMP", vec![Operand::Symbol("end".into())]),
            Instruction::new("CLEARS", vec![]),
            Instruction::new("LABEL", vec![Operand::Symbol("end".into())]),
        ]);
        let mut vm = vm.with_hook(Recorder(seen.clone()));
        vm.run().unwrap();
        assert_eq!(*seen.borrow(), vec![0, 2]);
    }
}
