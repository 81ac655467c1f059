//! IFJcode Runtime - bytecode interpreter for the IFJcode instruction format
//!
//! This library provides:
//! - Parsing of IFJcode source into instruction records
//! - Label validation before execution
//! - The virtual machine: frames, stacks, dispatch table and semantics
//! - Instruction pricing and execution statistics

/// IFJcode runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod bytecode;
pub mod escape;
pub mod io;
pub mod operand;
pub mod parser;
pub mod prices;
pub mod runtime;
pub mod value;
pub mod vm;

// Re-export commonly used types
pub use bytecode::{Instruction, Opcode, Program};
pub use io::{EmptyInput, InputSource, LineReader, SharedBuffer};
pub use operand::{FrameKind, Operand};
pub use parser::{parse, ParseError};
pub use runtime::{load, LoadError, Outcome, RunReport};
pub use value::{Fault, RuntimeError, Value, ValueKind};
pub use vm::{ExecutionHook, Profiler, State, StepOutcome, VM};
