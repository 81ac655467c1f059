//! Instruction operands
//!
//! A token is classified once, when the instruction is parsed:
//! - `GF@x`, `LF@x`, `TF@x` address a variable;
//! - `int@5`, `float@1.5`, `string@a\032b`, `bool@true`, `nil@nil` are constants;
//! - anything without `@` is a symbol (label names, `READ` type names).
//!
//! Resolution to a value is lazy and happens in the execution state.

use crate::escape::decode_decimal_escapes;
use crate::value::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Frame qualifier of a variable operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// `GF@`: the global frame
    Global,
    /// `LF@`: the top of the local-frame stack
    Local,
    /// `TF@`: the temporary (staging) frame
    Temporary,
}

impl FrameKind {
    /// Parse a frame prefix (`GF`, `LF`, `TF`)
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "GF" => Some(FrameKind::Global),
            "LF" => Some(FrameKind::Local),
            "TF" => Some(FrameKind::Temporary),
            _ => None,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            FrameKind::Global => "GF",
            FrameKind::Local => "LF",
            FrameKind::Temporary => "TF",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Errors raised while classifying an operand token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperandError {
    #[error("invalid integer literal '{0}'")]
    InvalidInteger(String),
    #[error("invalid float literal '{0}'")]
    InvalidFloat(String),
    #[error("invalid bool literal '{0}' (expected true or false)")]
    InvalidBool(String),
    #[error("invalid nil literal '{0}'")]
    InvalidNil(String),
    #[error("invalid escape sequence '{0}'")]
    InvalidEscape(String),
    #[error("unknown operand prefix '{0}'")]
    UnknownPrefix(String),
    #[error("missing variable name in '{0}'")]
    MissingName(String),
}

/// A parsed operand
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Literal value
    Constant(Value),
    /// Variable address
    Variable { frame: FrameKind, name: String },
    /// Bare identifier: a label or a type name
    Symbol(String),
}

impl Operand {
    /// Classify a raw token
    pub fn parse(token: &str) -> Result<Self, OperandError> {
        let Some((prefix, rest)) = token.split_once('@') else {
            return Ok(Operand::Symbol(token.to_string()));
        };

        if let Some(frame) = FrameKind::from_prefix(prefix) {
            if rest.is_empty() {
                return Err(OperandError::MissingName(token.to_string()));
            }
            return Ok(Operand::Variable {
                frame,
                name: rest.to_string(),
            });
        }

        let value = match prefix {
            "int" => rest
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| OperandError::InvalidInteger(rest.to_string()))?,
            "float" => Value::Float(parse_float(rest)?),
            "string" => Value::String(
                decode_decimal_escapes(rest).map_err(OperandError::InvalidEscape)?,
            ),
            "bool" => match rest {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return Err(OperandError::InvalidBool(rest.to_string())),
            },
            "nil" => match rest {
                "nil" | "" => Value::Nil,
                _ => return Err(OperandError::InvalidNil(rest.to_string())),
            },
            _ => return Err(OperandError::UnknownPrefix(prefix.to_string())),
        };

        Ok(Operand::Constant(value))
    }

    /// Create a variable operand
    pub fn var(frame: FrameKind, name: impl Into<String>) -> Self {
        Operand::Variable {
            frame,
            name: name.into(),
        }
    }

    /// Symbol text, if this operand is a bare identifier
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Operand::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Operand::Variable { .. })
    }
}

/// Decimal or exponent literal; `inf`/`nan` spellings are rejected
fn parse_float(text: &str) -> Result<f64, OperandError> {
    let well_formed = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        && text.chars().any(|c| c.is_ascii_digit());
    if !well_formed {
        return Err(OperandError::InvalidFloat(text.to_string()));
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .ok_or_else(|| OperandError::InvalidFloat(text.to_string()))
}

impl FromStr for Operand {
    type Err = OperandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operand::parse(s)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Constant(value) => f.write_str(&value.to_literal()),
            Operand::Variable { frame, name } => write!(f, "{}@{}", frame, name),
            Operand::Symbol(s) => f.write_str(s),
        }
    }
}
