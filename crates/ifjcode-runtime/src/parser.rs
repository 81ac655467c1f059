//! Source parser
//!
//! Turns IFJcode source text into instruction records. The format is line
//! oriented: one instruction per line, a mnemonic followed by at most three
//! whitespace-separated operand tokens. `#` starts a comment that runs to the
//! end of the line, and blank lines are ignored. The first meaningful line may
//! be a `.IFJcode<NN>` header.
//!
//! Unknown mnemonics are not a parse error; the VM skips them at run time.

use crate::bytecode::{Instruction, MAX_OPERANDS};
use crate::operand::{Operand, OperandError};
use thiserror::Error;

/// Exit code reported for malformed source
pub const PARSE_EXIT_CODE: i32 = 51;

/// Parse error kinds
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("{mnemonic} has {found} operands, at most 3 are allowed")]
    TooManyOperands { mnemonic: String, found: usize },
    #[error("invalid operand '{token}': {source}")]
    InvalidOperand {
        token: String,
        #[source]
        source: OperandError,
    },
    #[error("header '{0}' must be the first line of the program")]
    MisplacedHeader(String),
}

/// A parse error with the 1-based line it occurred on
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error on line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Process exit code reported for this error
    pub fn exit_code(&self) -> i32 {
        PARSE_EXIT_CODE
    }
}

/// Parse a whole program
pub fn parse(source: &str) -> Result<Vec<Instruction>, ParseError> {
    let mut instructions = Vec::new();
    let mut seen_code = false;

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let code = strip_comment(raw);
        let mut tokens = code.split_whitespace();
        let Some(mnemonic) = tokens.next() else {
            continue;
        };

        if is_header(mnemonic) {
            if seen_code {
                return Err(ParseError {
                    line,
                    kind: ParseErrorKind::MisplacedHeader(mnemonic.to_string()),
                });
            }
            seen_code = true;
            continue;
        }
        seen_code = true;

        let tokens: Vec<&str> = tokens.collect();
        if tokens.len() > MAX_OPERANDS {
            return Err(ParseError {
                line,
                kind: ParseErrorKind::TooManyOperands {
                    mnemonic: mnemonic.to_ascii_uppercase(),
                    found: tokens.len(),
                },
            });
        }

        let operands = tokens
            .into_iter()
            .map(|token| {
                Operand::parse(token).map_err(|source| ParseError {
                    line,
                    kind: ParseErrorKind::InvalidOperand {
                        token: token.to_string(),
                        source,
                    },
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        instructions.push(Instruction::new(mnemonic, operands).at_line(line));
    }

    Ok(instructions)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// `.IFJcode` followed by an optional version number, case-insensitive
fn is_header(token: &str) -> bool {
    let Some(rest) = token.strip_prefix('.') else {
        return false;
    };
    rest.len() >= 7
        && rest.is_char_boundary(7)
        && rest[..7].eq_ignore_ascii_case("ifjcode")
        && rest[7..].chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Opcode;
    use crate::operand::FrameKind;
    use crate::value::Value;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_parse_simple_program() {
        let source = ".IFJcode17\n\
                      DEFVAR GF@x   # declare\n\
                      \n\
                      move GF@x int@5\n";
        let program = parse(source).unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program[0].opcode, Some(Opcode::DefVar));
        assert_eq!(program[0].line, 2);
        assert_eq!(program[1].name, "MOVE");
        assert_eq!(
            program[1].operands,
            vec![
                Operand::var(FrameKind::Global, "x"),
                Operand::Constant(Value::Int(5))
            ]
        );
        assert_eq!(program[1].line, 4);
    }

    #[rstest]
    #[case(".IFJcode17")]
    #[case(".ifjcode20")]
    #[case(".IFJCODE")]
    fn test_header_variants(#[case] header: &str) {
        let source = format!("# leading comment\n{}\nCLEARS\n", header);
        assert_eq!(parse(&source).unwrap().len(), 1);
    }

    #[test]
    fn test_header_after_code() {
        let err = parse("CLEARS\n.IFJcode17\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, ParseErrorKind::MisplacedHeader(_)));
    }

    #[test]
    fn test_too_many_operands() {
        let err = parse("ADD GF@a GF@b GF@c GF@d").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(
            err.kind,
            ParseErrorKind::TooManyOperands {
                mnemonic: "ADD".to_string(),
                found: 4
            }
        );
        assert_eq!(err.exit_code(), 51);
    }

    #[test]
    fn test_invalid_operand_reports_line() {
        let err = parse("\n\nPUSHS int@abc").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.to_string().contains("int@abc"));
    }

    #[test]
    fn test_unknown_mnemonic_is_kept() {
        let program = parse("NOP").unwrap();
        assert_eq!(program[0].opcode, None);
    }

    #[test]
    fn test_comment_inside_line() {
        let program = parse("WRITE string@a#b").unwrap();
        assert_eq!(
            program[0].operands,
            vec![Operand::Constant(Value::string("a"))]
        );
    }
}
