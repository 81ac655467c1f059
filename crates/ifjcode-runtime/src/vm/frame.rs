//! Variable frame implementation
//!
//! A frame maps variable names to values. Names enter a frame only through
//! `DEFVAR`; every other write must target an already declared name.
//!
//! ## Frame roles
//!
//! ```text
//! GF  global frame          one instance, whole run
//! TF  temporary frame       staging area: CREATEFRAME / PUSHFRAME / POPFRAME
//! LF  local-frame stack     top frame is the active local scope
//!
//! CREATEFRAME; DEFVAR TF@a; PUSHFRAME
//!
//!   TF {a}      locals [.., {a}]      (PUSHFRAME copies, no aliasing)
//! ```

use crate::value::Value;
use std::collections::HashMap;

/// A single variable scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    vars: HashMap<String, Value>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` with a Nil value, replacing any previous binding
    pub fn declare(&mut self, name: &str) {
        self.vars.insert(name.to_string(), Value::Nil);
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Value of a declared variable
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Mutable slot of a declared variable
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.vars.get_mut(name)
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Bindings sorted by name, for stable diagnostic output
    pub fn sorted_bindings(&self) -> Vec<(&str, &Value)> {
        let mut bindings: Vec<_> = self.vars.iter().map(|(k, v)| (k.as_str(), v)).collect();
        bindings.sort_by(|a, b| a.0.cmp(b.0));
        bindings
    }
}
