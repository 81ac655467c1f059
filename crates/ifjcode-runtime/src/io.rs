//! Input sources and output sinks
//!
//! `READ` pulls typed values from an [`InputSource`]; `WRITE`, `BREAK` and
//! `DPRINT` write to plain `std::io::Write` sinks owned by the state.

use crate::value::{Value, ValueKind};
use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

/// Boxed output sink
pub type OutputWriter = Box<dyn Write>;

/// Supplies one typed value per `READ`
pub trait InputSource {
    /// Produce the next value of the requested type
    fn read_value(&mut self, kind: ValueKind) -> Value;
}

/// Line-oriented input: one line per `READ`
///
/// Malformed or exhausted input yields the default value of the requested
/// type. Booleans are `true` only for a case-insensitive `true` line.
pub struct LineReader<R> {
    reader: R,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    fn next_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                Some(line)
            }
        }
    }
}

impl LineReader<io::BufReader<io::Stdin>> {
    /// Read from the process' standard input
    pub fn stdin() -> Self {
        Self::new(io::BufReader::new(io::stdin()))
    }
}

impl<R: BufRead> InputSource for LineReader<R> {
    fn read_value(&mut self, kind: ValueKind) -> Value {
        let Some(line) = self.next_line() else {
            return kind.default_value();
        };
        let text = line.trim();
        match kind {
            ValueKind::Int => text.parse().map(Value::Int).unwrap_or(Value::Int(0)),
            ValueKind::Float => text
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::Float)
                .unwrap_or(Value::Float(0.0)),
            ValueKind::String => Value::String(line),
            ValueKind::Bool => Value::Bool(text.eq_ignore_ascii_case("true")),
        }
    }
}

/// Input source with no data; every `READ` yields the type's default
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyInput;

impl InputSource for EmptyInput {
    fn read_value(&mut self, kind: ValueKind) -> Value {
        kind.default_value()
    }
}

/// Cloneable in-memory sink, for capturing program output
#[derive(Debug, Default, Clone)]
pub struct SharedBuffer {
    inner: Rc<RefCell<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
