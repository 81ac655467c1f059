//! Execution accounting
//!
//! Counts executed instructions and sums their static prices. The counters
//! are always on; per-mnemonic counts are only kept when detailed
//! profiling is enabled.

use crate::prices;
use std::collections::HashMap;
use std::fmt::Write;

/// Instruction counters and price accumulator
#[derive(Debug, Clone, Default)]
pub struct Profiler {
    /// Whether per-mnemonic counts are recorded
    detailed: bool,
    /// Total instructions executed (unknown mnemonics included)
    executed_instructions: u64,
    /// Sum of the prices of executed instructions
    instruction_price: u64,
    /// Executions per mnemonic
    instruction_counts: HashMap<String, u64>,
}

impl Profiler {
    /// Create a profiler recording totals only
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a profiler that also records per-mnemonic counts
    pub fn detailed() -> Self {
        Self {
            detailed: true,
            ..Self::default()
        }
    }

    pub fn is_detailed(&self) -> bool {
        self.detailed
    }

    /// Record one executed instruction
    pub fn record(&mut self, mnemonic: &str) {
        self.executed_instructions += 1;
        self.instruction_price += prices::price(mnemonic);
        if self.detailed {
            *self
                .instruction_counts
                .entry(mnemonic.to_string())
                .or_insert(0) += 1;
        }
    }

    pub fn executed_instructions(&self) -> u64 {
        self.executed_instructions
    }

    pub fn instruction_price(&self) -> u64 {
        self.instruction_price
    }

    /// Executions of one mnemonic (0 unless detailed)
    pub fn instruction_count(&self, mnemonic: &str) -> u64 {
        self.instruction_counts.get(mnemonic).copied().unwrap_or(0)
    }

    /// Reset all counters
    pub fn reset(&mut self) {
        self.executed_instructions = 0;
        self.instruction_price = 0;
        self.instruction_counts.clear();
    }

    /// Generate a statistics report
    pub fn report(&self) -> String {
        let mut report = String::new();
        writeln!(
            report,
            "Executed instructions: {}",
            self.executed_instructions
        )
        .unwrap();
        writeln!(report, "Instruction price: {}", self.instruction_price).unwrap();

        if self.detailed && !self.instruction_counts.is_empty() {
            writeln!(report, "\nInstruction counts:").unwrap();
            let mut counts: Vec<_> = self.instruction_counts.iter().collect();
            counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            for (mnemonic, count) in counts {
                writeln!(report, "  {:<14} {:>10}", mnemonic, count).unwrap();
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates_price() {
        let mut profiler = Profiler::new();
        profiler.record("WRITE");
        profiler.record("DIV");
        profiler.record("NOPE");
        assert_eq!(profiler.executed_instructions(), 3);
        assert_eq!(profiler.instruction_price(), 14);
        assert_eq!(profiler.instruction_count("WRITE"), 0);
    }

    #[test]
    fn test_detailed_counts() {
        let mut profiler = Profiler::detailed();
        assert!(profiler.is_detailed());
        assert!(!Profiler::new().is_detailed());
        profiler.record("ADD");
        profiler.record("ADD");
        assert_eq!(profiler.instruction_count("ADD"), 2);
        assert!(profiler.report().contains("ADD"));
        profiler.reset();
        assert_eq!(profiler.executed_instructions(), 0);
    }
}
