//! Execution state
//!
//! Owns every piece of mutable runtime data for one run: frames, the value
//! stack, the call stack, the label table, the instruction pointer, the
//! output sinks and the input source. Semantics functions only ever see a
//! `&mut State`.

use super::frame::Frame;
use super::profiler::Profiler;
use crate::bytecode::LabelTable;
use crate::io::{InputSource, LineReader, OutputWriter};
use crate::operand::{FrameKind, Operand};
use crate::value::{RuntimeError, StackKind, Value, ValueKind};
use std::fmt;
use std::io::{self, Write};

/// Mutable runtime state of one program run
pub struct State {
    /// `GF`
    global: Frame,
    /// `TF`
    temporary: Frame,
    /// `LF` is the last element
    locals: Vec<Frame>,
    /// Value stack (`PUSHS`/`POPS` and stack-form operators)
    stack: Vec<Value>,
    /// Return addresses pushed by `CALL`
    calls: Vec<usize>,
    /// Label name → instruction index
    labels: LabelTable,
    /// Index of the instruction being executed
    ip: usize,
    /// Set when the current instruction moved `ip` itself
    redirected: bool,
    stdout: OutputWriter,
    stderr: OutputWriter,
    input: Box<dyn InputSource>,
    profiler: Profiler,
}

impl State {
    /// Create a state wired to the process' standard streams
    pub fn new(labels: LabelTable) -> Self {
        Self {
            global: Frame::new(),
            temporary: Frame::new(),
            locals: Vec::new(),
            stack: Vec::with_capacity(64),
            calls: Vec::new(),
            labels,
            ip: 0,
            redirected: false,
            stdout: Box::new(io::stdout()),
            stderr: Box::new(io::stderr()),
            input: Box::new(LineReader::stdin()),
            profiler: Profiler::new(),
        }
    }

    /// Replace the standard output sink
    pub fn with_stdout(mut self, writer: impl Write + 'static) -> Self {
        self.stdout = Box::new(writer);
        self
    }

    /// Replace the diagnostic output sink
    pub fn with_stderr(mut self, writer: impl Write + 'static) -> Self {
        self.stderr = Box::new(writer);
        self
    }

    /// Replace the input source used by `READ`
    pub fn with_input(mut self, input: impl InputSource + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    /// Replace the profiler
    pub fn with_profiler(mut self, profiler: Profiler) -> Self {
        self.profiler = profiler;
        self
    }

    // ── Frames ───────────────────────────────────────────────────────────────

    pub fn global_frame(&self) -> &Frame {
        &self.global
    }

    pub fn temporary_frame(&self) -> &Frame {
        &self.temporary
    }

    /// Local-frame stack, bottom first
    pub fn local_frames(&self) -> &[Frame] {
        &self.locals
    }

    /// Frame addressed by a qualifier
    pub fn frame(&self, kind: FrameKind) -> Result<&Frame, RuntimeError> {
        match kind {
            FrameKind::Global => Ok(&self.global),
            FrameKind::Temporary => Ok(&self.temporary),
            FrameKind::Local => self.locals.last().ok_or(RuntimeError::NoLocalFrame),
        }
    }

    fn frame_mut(&mut self, kind: FrameKind) -> Result<&mut Frame, RuntimeError> {
        match kind {
            FrameKind::Global => Ok(&mut self.global),
            FrameKind::Temporary => Ok(&mut self.temporary),
            FrameKind::Local => self.locals.last_mut().ok_or(RuntimeError::NoLocalFrame),
        }
    }

    /// `CREATEFRAME`: reset the temporary frame to empty
    pub fn create_frame(&mut self) {
        self.temporary.clear();
    }

    /// `PUSHFRAME`: push a copy of the temporary frame as the new local frame
    pub fn push_frame(&mut self) {
        self.locals.push(self.temporary.clone());
    }

    /// `POPFRAME`: the top local frame becomes the temporary frame
    pub fn pop_frame(&mut self) -> Result<(), RuntimeError> {
        self.temporary = self.locals.pop().ok_or(RuntimeError::StackUnderflow {
            stack: StackKind::Frame,
        })?;
        Ok(())
    }

    // ── Variables ────────────────────────────────────────────────────────────

    /// `DEFVAR`: declare the variable named by `operand` with a Nil value
    pub fn declare(&mut self, operand: &Operand) -> Result<(), RuntimeError> {
        match operand {
            Operand::Variable { frame, name } => {
                self.frame_mut(*frame)?.declare(name);
                Ok(())
            }
            other => Err(RuntimeError::InvalidWriteTarget {
                operand: other.to_string(),
            }),
        }
    }

    /// Resolve an operand to its current value
    ///
    /// Constants resolve to themselves; variables are looked up in their frame.
    /// A declared variable that was never written yields Nil.
    pub fn get_value(&self, operand: &Operand) -> Result<Value, RuntimeError> {
        match operand {
            Operand::Constant(value) => Ok(value.clone()),
            Operand::Variable { frame, name } => self
                .frame(*frame)?
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeError::UndeclaredVariable {
                    frame: *frame,
                    name: name.clone(),
                }),
            Operand::Symbol(symbol) => Err(RuntimeError::type_mismatch(format!(
                "expected a variable or constant, found '{}'",
                symbol
            ))),
        }
    }

    /// Store a value into the variable named by `operand`
    pub fn set_value(&mut self, operand: &Operand, value: Value) -> Result<(), RuntimeError> {
        match operand {
            Operand::Variable { frame, name } => {
                let slot = self.frame_mut(*frame)?.get_mut(name).ok_or_else(|| {
                    RuntimeError::UndeclaredVariable {
                        frame: *frame,
                        name: name.clone(),
                    }
                })?;
                *slot = value;
                Ok(())
            }
            other => Err(RuntimeError::InvalidWriteTarget {
                operand: other.to_string(),
            }),
        }
    }

    // ── Value stack ──────────────────────────────────────────────────────────

    pub fn push_stack(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub fn pop_stack(&mut self) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow {
            stack: StackKind::Value,
        })
    }

    pub fn clear_stack(&mut self) {
        self.stack.clear();
    }

    /// Value stack, bottom first
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    // ── Control flow ─────────────────────────────────────────────────────────

    pub fn ip(&self) -> usize {
        self.ip
    }

    /// Return addresses, bottom first
    pub fn call_stack(&self) -> &[usize] {
        &self.calls
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Instruction index of a label operand
    pub fn label_target(&self, operand: &Operand) -> Result<usize, RuntimeError> {
        let name = operand.as_symbol().ok_or_else(|| {
            RuntimeError::type_mismatch(format!("expected a label, found '{}'", operand))
        })?;
        self.labels
            .get(name)
            .copied()
            .ok_or_else(|| RuntimeError::UndefinedLabel {
                label: name.to_string(),
            })
    }

    /// Redirect execution to `target`; the loop will not advance `ip`
    pub fn jump_to(&mut self, target: usize) {
        self.ip = target;
        self.redirected = true;
    }

    /// `JUMP label`
    pub fn jump(&mut self, label: &Operand) -> Result<(), RuntimeError> {
        let target = self.label_target(label)?;
        self.jump_to(target);
        Ok(())
    }

    /// `CALL label`: push the return address, then jump
    pub fn call(&mut self, label: &Operand) -> Result<(), RuntimeError> {
        let target = self.label_target(label)?;
        self.calls.push(self.ip + 1);
        self.jump_to(target);
        Ok(())
    }

    /// `RETURN`: pop a return address and jump there
    pub fn return_(&mut self) -> Result<(), RuntimeError> {
        let target = self.calls.pop().ok_or(RuntimeError::StackUnderflow {
            stack: StackKind::Call,
        })?;
        self.jump_to(target);
        Ok(())
    }

    /// Prepare for the instruction at `ip`
    pub(crate) fn begin_instruction(&mut self) {
        self.redirected = false;
    }

    /// Advance past the current instruction unless it redirected
    pub(crate) fn finish_instruction(&mut self) {
        if !self.redirected {
            self.ip += 1;
        }
    }

    // ── I/O ──────────────────────────────────────────────────────────────────

    pub fn stdout(&mut self) -> &mut dyn Write {
        self.stdout.as_mut()
    }

    pub fn stderr(&mut self) -> &mut dyn Write {
        self.stderr.as_mut()
    }

    /// Read one value of `kind` from the input source
    pub fn read(&mut self, kind: ValueKind) -> Value {
        self.input.read_value(kind)
    }

    /// Flush both output sinks
    pub fn flush(&mut self) -> Result<(), RuntimeError> {
        self.stdout.flush()?;
        self.stderr.flush()?;
        Ok(())
    }

    // ── Accounting ───────────────────────────────────────────────────────────

    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }

    pub(crate) fn profiler_mut(&mut self) -> &mut Profiler {
        &mut self.profiler
    }

    pub fn executed_instructions(&self) -> u64 {
        self.profiler.executed_instructions()
    }

    pub fn instruction_price(&self) -> u64 {
        self.profiler.instruction_price()
    }
}

fn write_frame(f: &mut fmt::Formatter<'_>, title: &str, frame: &Frame) -> fmt::Result {
    write!(f, "{}:", title)?;
    if frame.is_empty() {
        return writeln!(f, " (empty)");
    }
    writeln!(f)?;
    for (name, value) in frame.sorted_bindings() {
        writeln!(f, "  {} = {}", name, value.to_literal())?;
    }
    Ok(())
}

/// Snapshot written by `BREAK`
impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== State ===")?;
        writeln!(f, "Instruction pointer: {}", self.ip)?;
        writeln!(
            f,
            "Executed instructions: {}",
            self.profiler.executed_instructions()
        )?;
        writeln!(
            f,
            "Instruction price: {}",
            self.profiler.instruction_price()
        )?;
        write_frame(f, "Global frame", &self.global)?;
        write_frame(f, "Temporary frame", &self.temporary)?;
        if self.locals.is_empty() {
            writeln!(f, "Local frames: (none)")?;
        }
        for (depth, frame) in self.locals.iter().enumerate().rev() {
            write_frame(f, &format!("Local frame #{}", depth), frame)?;
        }
        let stack: Vec<String> = self.stack.iter().map(Value::to_literal).collect();
        writeln!(f, "Value stack: [{}]", stack.join(", "))?;
        let calls: Vec<String> = self.calls.iter().map(usize::to_string).collect();
        write!(f, "Call stack: [{}]", calls.join(", "))
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("ip", &self.ip)
            .field("global", &self.global)
            .field("temporary", &self.temporary)
            .field("locals", &self.locals)
            .field("stack", &self.stack)
            .field("calls", &self.calls)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{EmptyInput, SharedBuffer};
    use pretty_assertions::assert_eq;

    fn state() -> State {
        State::new(LabelTable::new())
            .with_stdout(SharedBuffer::new())
            .with_stderr(SharedBuffer::new())
            .with_input(EmptyInput)
    }

    fn gf(name: &str) -> Operand {
        Operand::var(FrameKind::Global, name)
    }

    #[test]
    fn test_declared_variable_reads_nil() {
        let mut state = state();
        state.declare(&gf("x")).unwrap();
        assert_eq!(state.get_value(&gf("x")).unwrap(), Value::Nil);
    }

    #[test]
    fn test_undeclared_variable_faults_on_read_and_write() {
        let mut state = state();
        assert!(matches!(
            state.get_value(&gf("x")),
            Err(RuntimeError::UndeclaredVariable { .. })
        ));
        assert!(matches!(
            state.set_value(&gf("x"), Value::Int(1)),
            Err(RuntimeError::UndeclaredVariable { .. })
        ));
    }

    #[test]
    fn test_constant_is_not_a_write_target() {
        let mut state = state();
        let err = state
            .set_value(&Operand::Constant(Value::Int(1)), Value::Int(2))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidWriteTarget { .. }));
    }

    #[test]
    fn test_local_frame_requires_push() {
        let mut state = state();
        let lf = Operand::var(FrameKind::Local, "a");
        assert_eq!(state.declare(&lf), Err(RuntimeError::NoLocalFrame));

        state.declare(&Operand::var(FrameKind::Temporary, "a")).unwrap();
        assert_eq!(state.get_value(&lf), Err(RuntimeError::NoLocalFrame));

        state.push_frame();
        assert_eq!(state.get_value(&lf).unwrap(), Value::Nil);
    }

    #[test]
    fn test_push_frame_copies() {
        let mut state = state();
        let tf = Operand::var(FrameKind::Temporary, "a");
        let lf = Operand::var(FrameKind::Local, "a");
        state.declare(&tf).unwrap();
        state.push_frame();
        state.set_value(&lf, Value::Int(9)).unwrap();
        assert_eq!(state.get_value(&tf).unwrap(), Value::Nil);
    }

    #[test]
    fn test_pop_frame_underflow() {
        let mut state = state();
        assert_eq!(
            state.pop_frame(),
            Err(RuntimeError::StackUnderflow {
                stack: StackKind::Frame
            })
        );
    }

    #[test]
    fn test_value_stack_underflow() {
        let mut state = state();
        state.push_stack(Value::Int(1));
        assert_eq!(state.pop_stack().unwrap(), Value::Int(1));
        assert!(state.pop_stack().is_err());
    }

    #[test]
    fn test_return_without_call() {
        let mut state = state();
        assert_eq!(
            state.return_(),
            Err(RuntimeError::StackUnderflow {
                stack: StackKind::Call
            })
        );
    }

    #[test]
    fn test_call_pushes_successor() {
        let mut labels = LabelTable::new();
        labels.insert("f".to_string(), 7);
        let mut state = State::new(labels).with_input(EmptyInput);
        state.begin_instruction();
        state.call(&Operand::Symbol("f".into())).unwrap();
        state.finish_instruction();
        assert_eq!(state.ip(), 7);
        assert_eq!(state.call_stack(), &[1]);
    }
}
