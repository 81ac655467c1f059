//! Runtime values and errors

use crate::operand::FrameKind;
use std::fmt;
use thiserror::Error;

/// Runtime value
///
/// Every variable slot and every value-stack cell holds exactly one of these.
/// There is no implicit coercion between variants: operators match on the
/// discriminant and fault on unsupported combinations.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 64-bit signed integer (`int@`)
    Int(i64),
    /// Double precision float (`float@`)
    Float(f64),
    /// Unicode string (`string@`)
    String(String),
    /// Boolean (`bool@`)
    Bool(bool),
    /// Absent value (`nil@nil`), also the content of a freshly declared variable
    Nil,
}

/// Types a value can be read as (`READ var <type>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Float,
    String,
    Bool,
}

impl ValueKind {
    /// Parse a type name as written in the instruction stream
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(ValueKind::Int),
            "float" => Some(ValueKind::Float),
            "string" => Some(ValueKind::String),
            "bool" => Some(ValueKind::Bool),
            _ => None,
        }
    }

    /// The type name as written in the instruction stream
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Bool => "bool",
        }
    }

    /// Value produced when input for this type is missing or malformed
    pub fn default_value(self) -> Value {
        match self {
            ValueKind::Int => Value::Int(0),
            ValueKind::Float => Value::Float(0.0),
            ValueKind::String => Value::String(String::new()),
            ValueKind::Bool => Value::Bool(false),
        }
    }
}

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Kind of the value, `None` for Nil
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Int(_) => Some(ValueKind::Int),
            Value::Float(_) => Some(ValueKind::Float),
            Value::String(_) => Some(ValueKind::String),
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::Nil => None,
        }
    }

    /// Type name as reported by `TYPE` (empty for Nil)
    pub fn type_name(&self) -> &'static str {
        self.kind().map(ValueKind::name).unwrap_or("")
    }

    /// Type name used in error messages
    pub fn describe_type(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            other => other.type_name(),
        }
    }

    /// Textual form written by `WRITE` (before escape decoding)
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Int(n) => n.to_string(),
            Value::Float(f) => format!("{:?}", f),
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Nil => String::new(),
        }
    }

    /// Literal form (`int@8`, `string@abc`, `nil@nil`) used by diagnostics
    pub fn to_literal(&self) -> String {
        match self {
            Value::Nil => "nil@nil".to_string(),
            other => format!("{}@{}", other.type_name(), other.to_display_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

/// Which LIFO structure underflowed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    /// The value stack (`POPS`, stack-form operators)
    Value,
    /// The call stack (`RETURN`)
    Call,
    /// The local-frame stack (`POPFRAME`)
    Frame,
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackKind::Value => f.write_str("value stack"),
            StackKind::Call => f.write_str("call stack"),
            StackKind::Frame => f.write_str("frame stack"),
        }
    }
}

/// Runtime error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// Mnemonic missing from the dispatch table (logged, never fatal)
    #[error("Unknown instruction: {name}")]
    UnknownInstruction { name: String },
    /// Operand count does not match the declared arity
    #[error("{mnemonic} expects {expected} operand(s), got {found}")]
    ArityMismatch {
        mnemonic: &'static str,
        expected: usize,
        found: usize,
    },
    /// Pop from an empty stack
    #[error("Stack underflow: {stack} is empty")]
    StackUnderflow { stack: StackKind },
    /// `LF@` addressed while no local frame exists
    #[error("Local frame does not exist")]
    NoLocalFrame,
    /// Read or write of a variable never declared in the addressed frame
    #[error("Undeclared variable: {frame}@{name}")]
    UndeclaredVariable { frame: FrameKind, name: String },
    /// Operator applied to incompatible values
    #[error("Type mismatch: {msg}")]
    TypeMismatch { msg: String },
    /// Constant or symbol used as a destination
    #[error("Cannot write to {operand}")]
    InvalidWriteTarget { operand: String },
    /// String position outside the string
    #[error("Index {index} out of range for string of length {len}")]
    IndexOutOfRange { index: i64, len: usize },
    /// `SETCHAR` with an empty replacement string
    #[error("Replacement string is empty")]
    EmptyReplacement,
    /// Division by zero
    #[error("Division by zero")]
    DivideByZero,
    /// Integer arithmetic left the i64 range
    #[error("Integer overflow")]
    IntegerOverflow,
    /// Invalid numeric result (NaN, Infinity, unrepresentable integer)
    #[error("Invalid numeric result")]
    InvalidNumericResult,
    /// `INT2CHAR` with a value that is not a Unicode scalar value
    #[error("Invalid code point: {code}")]
    InvalidCodePoint { code: i64 },
    /// Jump or call to a label that was never defined
    #[error("Undefined label: {label}")]
    UndefinedLabel { label: String },
    /// The same label defined twice
    #[error("Duplicate label: {label}")]
    DuplicateLabel { label: String },
    /// Writing to an output sink failed
    #[error("I/O error: {message}")]
    Io { message: String },
}

impl RuntimeError {
    pub(crate) fn type_mismatch(msg: impl Into<String>) -> Self {
        RuntimeError::TypeMismatch { msg: msg.into() }
    }

    /// Process exit code reported for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RuntimeError::UndefinedLabel { .. } | RuntimeError::DuplicateLabel { .. } => 52,
            RuntimeError::TypeMismatch { .. }
            | RuntimeError::ArityMismatch { .. }
            | RuntimeError::InvalidWriteTarget { .. } => 53,
            RuntimeError::UndeclaredVariable { .. } => 54,
            RuntimeError::NoLocalFrame
            | RuntimeError::StackUnderflow {
                stack: StackKind::Frame,
            } => 55,
            RuntimeError::StackUnderflow { .. } => 56,
            RuntimeError::DivideByZero
            | RuntimeError::IntegerOverflow
            | RuntimeError::InvalidNumericResult => 57,
            RuntimeError::IndexOutOfRange { .. }
            | RuntimeError::EmptyReplacement
            | RuntimeError::InvalidCodePoint { .. } => 58,
            RuntimeError::UnknownInstruction { .. } | RuntimeError::Io { .. } => 99,
        }
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(err: std::io::Error) -> Self {
        RuntimeError::Io {
            message: err.to_string(),
        }
    }
}

/// A fatal runtime error with the context of the instruction that raised it
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error} (instruction {ip}, line {line}: {instruction})")]
pub struct Fault {
    /// Index of the faulting instruction
    pub ip: usize,
    /// Source line of the faulting instruction (0 when unknown)
    pub line: usize,
    /// The instruction with its operands and their current values
    pub instruction: String,
    /// The underlying error
    pub error: RuntimeError,
}

impl Fault {
    /// Process exit code reported for this fault
    pub fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_strings() {
        assert_eq!(Value::Int(-42).to_display_string(), "-42");
        assert_eq!(Value::Float(8.0).to_display_string(), "8.0");
        assert_eq!(Value::Float(0.1).to_display_string(), "0.1");
        assert_eq!(Value::string("hi").to_display_string(), "hi");
        assert_eq!(Value::Bool(true).to_display_string(), "true");
        assert_eq!(Value::Nil.to_display_string(), "");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Int(1).type_name(), "int");
        assert_eq!(Value::Float(1.0).type_name(), "float");
        assert_eq!(Value::string("").type_name(), "string");
        assert_eq!(Value::Bool(false).type_name(), "bool");
        assert_eq!(Value::Nil.type_name(), "");
        assert_eq!(Value::Nil.describe_type(), "nil");
    }

    #[test]
    fn test_literals() {
        assert_eq!(Value::Int(8).to_literal(), "int@8");
        assert_eq!(Value::Nil.to_literal(), "nil@nil");
    }

    #[test]
    fn test_value_kind_round_trip_names() {
        for name in ["int", "float", "string", "bool"] {
            assert_eq!(ValueKind::from_name(name).map(ValueKind::name), Some(name));
        }
        assert_eq!(ValueKind::from_name("nil"), None);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(RuntimeError::DivideByZero.exit_code(), 57);
        assert_eq!(
            RuntimeError::StackUnderflow {
                stack: StackKind::Frame
            }
            .exit_code(),
            55
        );
        assert_eq!(
            RuntimeError::StackUnderflow {
                stack: StackKind::Call
            }
            .exit_code(),
            56
        );
    }
}
