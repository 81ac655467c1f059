//! Property-based checks of the interpreter's algebraic guarantees

mod common;

use common::*;
use ifjcode_runtime::runtime::Outcome;
use proptest::prelude::*;

/// Characters that survive `string@` literal encoding without escapes
fn plain_string() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_.,!?-]{0,12}"
}

fn small_int() -> impl Strategy<Value = i64> {
    -1_000_000i64..1_000_000
}

proptest! {
    #[test]
    fn prop_stack_and_named_forms_agree(a in small_int(), b in small_int(), op in 0usize..3) {
        let (named, stack) = [("ADD", "ADDS"), ("SUB", "SUBS"), ("MUL", "MULS")][op];
        let named_source = format!(
            "DEFVAR GF@r\n{} GF@r int@{} int@{}\nWRITE GF@r",
            named, a, b
        );
        let stack_source = format!(
            "DEFVAR GF@r\nPUSHS int@{}\nPUSHS int@{}\n{}\nPOPS GF@r\nWRITE GF@r",
            a, b, stack
        );
        let named_out = execute(&named_source);
        let stack_out = execute(&stack_source);
        named_out.report();
        stack_out.report();
        prop_assert_eq!(named_out.stdout, stack_out.stdout);
    }

    #[test]
    fn prop_concat_is_associative(a in plain_string(), b in plain_string(), c in plain_string()) {
        let source = format!(
            "DEFVAR GF@l
             DEFVAR GF@r
             CONCAT GF@l string@{a} string@{b}
             CONCAT GF@l GF@l string@{c}
             CONCAT GF@r string@{b} string@{c}
             CONCAT GF@r string@{a} GF@r
             JUMPIFNEQ differ GF@l GF@r
             WRITE GF@l
             LABEL differ",
        );
        let execution = execute(&source);
        execution.report();
        prop_assert_eq!(execution.stdout, format!("{a}{b}{c}"));
    }

    #[test]
    fn prop_push_pop_frame_restores_temporary(values in prop::collection::vec(small_int(), 1..6)) {
        let mut source = String::from("CREATEFRAME\n");
        for (i, v) in values.iter().enumerate() {
            source.push_str(&format!("DEFVAR TF@v{i}\nMOVE TF@v{i} int@{v}\n"));
        }
        source.push_str("PUSHFRAME\nCREATEFRAME\nPOPFRAME\n");
        for i in 0..values.len() {
            source.push_str(&format!("WRITE TF@v{i}\nWRITE string@,\n"));
        }
        let expected: String = values.iter().map(|v| format!("{v},")).collect();
        let execution = execute(&source);
        execution.report();
        prop_assert_eq!(execution.stdout, expected);
    }

    #[test]
    fn prop_division_by_zero_never_yields_a_value(a in small_int()) {
        let source = format!("DEFVAR GF@r\nDIV GF@r int@{} int@0\nWRITE GF@r", a);
        let execution = execute(&source);
        prop_assert_eq!(execution.stdout.as_str(), "");
        prop_assert_eq!(execution.fault().exit_code(), 57);
    }

    #[test]
    fn prop_step_limit_is_exact(limit in 1u64..2_000) {
        let execution = execute_with("LABEL l\nJUMP l", "", Some(limit));
        let report = execution.report();
        prop_assert_eq!(report.outcome, Outcome::StepLimit);
        prop_assert_eq!(report.executed_instructions, limit);
    }
}
