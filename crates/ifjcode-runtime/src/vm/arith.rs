//! Value-level operators
//!
//! Pure functions over [`Value`]s shared by the named and stack forms of each
//! instruction. No implicit coercion happens here: every operator matches on
//! both discriminants and rejects unsupported pairs.

use crate::value::{RuntimeError, Value};
use std::cmp::Ordering;

/// Binary value operator
pub type BinaryOp = fn(Value, Value) -> Result<Value, RuntimeError>;

/// Unary value operator
pub type UnaryOp = fn(Value) -> Result<Value, RuntimeError>;

fn mismatch(op: &str, a: &Value, b: &Value) -> RuntimeError {
    RuntimeError::type_mismatch(format!(
        "{} cannot be applied to {} and {}",
        op,
        a.describe_type(),
        b.describe_type()
    ))
}

fn expected(op: &str, wanted: &str, got: &Value) -> RuntimeError {
    RuntimeError::type_mismatch(format!(
        "{} expects {}, got {}",
        op,
        wanted,
        got.describe_type()
    ))
}

fn finite(result: f64) -> Result<Value, RuntimeError> {
    if result.is_finite() {
        Ok(Value::Float(result))
    } else {
        Err(RuntimeError::InvalidNumericResult)
    }
}

fn numeric(
    op: &str,
    a: Value,
    b: Value,
    int: fn(i64, i64) -> Option<i64>,
    float: fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    match (&a, &b) {
        (Value::Int(x), Value::Int(y)) => int(*x, *y)
            .map(Value::Int)
            .ok_or(RuntimeError::IntegerOverflow),
        (Value::Float(x), Value::Float(y)) => finite(float(*x, *y)),
        _ => Err(mismatch(op, &a, &b)),
    }
}

// ===== Arithmetic =====

pub fn add(a: Value, b: Value) -> Result<Value, RuntimeError> {
    numeric("ADD", a, b, i64::checked_add, |x, y| x + y)
}

pub fn sub(a: Value, b: Value) -> Result<Value, RuntimeError> {
    numeric("SUB", a, b, i64::checked_sub, |x, y| x - y)
}

pub fn mul(a: Value, b: Value) -> Result<Value, RuntimeError> {
    numeric("MUL", a, b, i64::checked_mul, |x, y| x * y)
}

/// True division: the result is always a float
pub fn div(a: Value, b: Value) -> Result<Value, RuntimeError> {
    let (x, y) = match (&a, &b) {
        (Value::Int(x), Value::Int(y)) => (*x as f64, *y as f64),
        (Value::Float(x), Value::Float(y)) => (*x, *y),
        _ => return Err(mismatch("DIV", &a, &b)),
    };
    if y == 0.0 {
        return Err(RuntimeError::DivideByZero);
    }
    finite(x / y)
}

// ===== Relational =====

/// Equality as used by `EQ` and the conditional jumps
///
/// Nil is equal only to Nil and may be compared with anything; other
/// operands must share a type.
pub fn values_equal(a: &Value, b: &Value) -> Result<bool, RuntimeError> {
    match (a, b) {
        (Value::Nil, _) | (_, Value::Nil) => Ok(a == b),
        _ if a.kind() == b.kind() => Ok(a == b),
        _ => Err(mismatch("EQ", a, b)),
    }
}

fn ordering(op: &str, a: &Value, b: &Value) -> Result<Ordering, RuntimeError> {
    let ord = match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => return Err(mismatch(op, a, b)),
    };
    ord.ok_or(RuntimeError::InvalidNumericResult)
}

pub fn less(a: Value, b: Value) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(ordering("LT", &a, &b)? == Ordering::Less))
}

pub fn greater(a: Value, b: Value) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(ordering("GT", &a, &b)? == Ordering::Greater))
}

pub fn equal(a: Value, b: Value) -> Result<Value, RuntimeError> {
    values_equal(&a, &b).map(Value::Bool)
}

// ===== Logical =====

pub fn and(a: Value, b: Value) -> Result<Value, RuntimeError> {
    match (&a, &b) {
        (Value::Bool(x), Value::Bool(y)) => Ok(Value::Bool(*x && *y)),
        _ => Err(mismatch("AND", &a, &b)),
    }
}

pub fn or(a: Value, b: Value) -> Result<Value, RuntimeError> {
    match (&a, &b) {
        (Value::Bool(x), Value::Bool(y)) => Ok(Value::Bool(*x || *y)),
        _ => Err(mismatch("OR", &a, &b)),
    }
}

pub fn not(a: Value) -> Result<Value, RuntimeError> {
    match a {
        Value::Bool(x) => Ok(Value::Bool(!x)),
        other => Err(expected("NOT", "bool", &other)),
    }
}

// ===== Strings =====

pub fn concat(a: Value, b: Value) -> Result<Value, RuntimeError> {
    match (a, b) {
        (Value::String(mut x), Value::String(y)) => {
            x.push_str(&y);
            Ok(Value::String(x))
        }
        (a, b) => Err(mismatch("CONCAT", &a, &b)),
    }
}

pub fn strlen(s: Value) -> Result<Value, RuntimeError> {
    match s {
        Value::String(s) => Ok(Value::Int(s.chars().count() as i64)),
        other => Err(expected("STRLEN", "string", &other)),
    }
}

/// Character at a zero-based position; out-of-range positions fault
fn char_at(op: &str, s: &Value, index: &Value) -> Result<char, RuntimeError> {
    let (Value::String(s), Value::Int(index)) = (s, index) else {
        return Err(mismatch(op, s, index));
    };
    usize::try_from(*index)
        .ok()
        .and_then(|i| s.chars().nth(i))
        .ok_or(RuntimeError::IndexOutOfRange {
            index: *index,
            len: s.chars().count(),
        })
}

pub fn get_char(s: Value, index: Value) -> Result<Value, RuntimeError> {
    char_at("GETCHAR", &s, &index).map(|c| Value::String(c.to_string()))
}

pub fn stri2int(s: Value, index: Value) -> Result<Value, RuntimeError> {
    char_at("STRI2INT", &s, &index).map(|c| Value::Int(c as i64))
}

/// Replace the character at `index` of `target` with the first character of
/// `replacement`
pub fn set_char(target: Value, index: Value, replacement: Value) -> Result<Value, RuntimeError> {
    let Value::String(replacement) = &replacement else {
        return Err(expected("SETCHAR", "string replacement", &replacement));
    };
    char_at("SETCHAR", &target, &index)?;
    let (Value::String(s), Value::Int(position)) = (&target, &index) else {
        return Err(mismatch("SETCHAR", &target, &index));
    };
    let new_char = replacement
        .chars()
        .next()
        .ok_or(RuntimeError::EmptyReplacement)?;
    let position = *position as usize;
    let updated = s
        .chars()
        .enumerate()
        .map(|(i, c)| if i == position { new_char } else { c })
        .collect();
    Ok(Value::String(updated))
}

// ===== Conversions =====

pub fn int2float(a: Value) -> Result<Value, RuntimeError> {
    match a {
        Value::Int(n) => Ok(Value::Float(n as f64)),
        other => Err(expected("INT2FLOAT", "int", &other)),
    }
}

fn float_to_int(op: &str, a: Value, round: fn(f64) -> f64) -> Result<Value, RuntimeError> {
    let Value::Float(f) = a else {
        return Err(expected(op, "float", &a));
    };
    let rounded = round(f);
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    if !rounded.is_finite() || rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return Err(RuntimeError::InvalidNumericResult);
    }
    Ok(Value::Int(rounded as i64))
}

/// Truncate toward zero
pub fn float2int(a: Value) -> Result<Value, RuntimeError> {
    float_to_int("FLOAT2INT", a, f64::trunc)
}

/// Nearest even integer; odd integers go to the neighbour away from zero
pub fn float2r2eint(a: Value) -> Result<Value, RuntimeError> {
    float_to_int("FLOAT2R2EINT", a, |f| (f / 2.0).round() * 2.0)
}

/// Nearest integer, ties to even
pub fn float2r2oint(a: Value) -> Result<Value, RuntimeError> {
    float_to_int("FLOAT2R2OINT", a, f64::round_ties_even)
}

pub fn int2char(a: Value) -> Result<Value, RuntimeError> {
    let Value::Int(code) = a else {
        return Err(expected("INT2CHAR", "int", &a));
    };
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(|c| Value::String(c.to_string()))
        .ok_or(RuntimeError::InvalidCodePoint { code })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn s(text: &str) -> Value {
        Value::string(text)
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(add(Value::Int(5), Value::Int(3)).unwrap(), Value::Int(8));
        assert_eq!(sub(Value::Int(10), Value::Int(3)).unwrap(), Value::Int(7));
        assert_eq!(mul(Value::Int(-4), Value::Int(3)).unwrap(), Value::Int(-12));
    }

    #[test]
    fn test_integer_overflow() {
        assert_eq!(
            add(Value::Int(i64::MAX), Value::Int(1)),
            Err(RuntimeError::IntegerOverflow)
        );
    }

    #[test]
    fn test_mixed_arithmetic_faults() {
        assert!(matches!(
            add(Value::Int(1), Value::Float(1.0)),
            Err(RuntimeError::TypeMismatch { .. })
        ));
        assert!(matches!(
            add(s("a"), s("b")),
            Err(RuntimeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_true_division() {
        assert_eq!(div(Value::Int(7), Value::Int(2)).unwrap(), Value::Float(3.5));
        assert_eq!(
            div(Value::Float(1.0), Value::Float(4.0)).unwrap(),
            Value::Float(0.25)
        );
    }

    #[rstest]
    #[case(Value::Int(1), Value::Int(0))]
    #[case(Value::Float(1.0), Value::Float(0.0))]
    #[case(Value::Float(0.0), Value::Float(-0.0))]
    fn test_division_by_zero(#[case] a: Value, #[case] b: Value) {
        assert_eq!(div(a, b), Err(RuntimeError::DivideByZero));
    }

    #[test]
    fn test_ordering() {
        assert_eq!(less(Value::Int(1), Value::Int(2)).unwrap(), Value::Bool(true));
        assert_eq!(greater(s("b"), s("a")).unwrap(), Value::Bool(true));
        assert_eq!(
            less(Value::Bool(false), Value::Bool(true)).unwrap(),
            Value::Bool(true)
        );
        assert!(less(Value::Nil, Value::Nil).is_err());
        assert!(greater(Value::Int(1), s("1")).is_err());
    }

    #[test]
    fn test_equality_with_nil() {
        assert_eq!(equal(Value::Nil, Value::Nil).unwrap(), Value::Bool(true));
        assert_eq!(equal(Value::Nil, Value::Int(0)).unwrap(), Value::Bool(false));
        assert_eq!(equal(s(""), Value::Nil).unwrap(), Value::Bool(false));
        assert!(equal(Value::Int(1), Value::Float(1.0)).is_err());
    }

    #[test]
    fn test_logical_requires_bool() {
        assert_eq!(
            and(Value::Bool(true), Value::Bool(false)).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            or(Value::Bool(true), Value::Bool(false)).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(not(Value::Bool(true)).unwrap(), Value::Bool(false));
        assert!(and(Value::Int(1), Value::Bool(true)).is_err());
        assert!(not(Value::Nil).is_err());
    }

    #[test]
    fn test_string_operations() {
        assert_eq!(concat(s("ab"), s("cd")).unwrap(), s("abcd"));
        assert!(concat(Value::Int(1), Value::Int(2)).is_err());
        assert_eq!(strlen(s("příliš")).unwrap(), Value::Int(6));
        assert_eq!(get_char(s("abc"), Value::Int(1)).unwrap(), s("b"));
        assert_eq!(stri2int(s("A"), Value::Int(0)).unwrap(), Value::Int(65));
    }

    #[rstest]
    #[case(3)]
    #[case(-1)]
    fn test_index_out_of_range(#[case] index: i64) {
        assert_eq!(
            get_char(s("abc"), Value::Int(index)),
            Err(RuntimeError::IndexOutOfRange { index, len: 3 })
        );
    }

    #[test]
    fn test_set_char() {
        assert_eq!(
            set_char(s("abc"), Value::Int(1), s("XYZ")).unwrap(),
            s("aXc")
        );
        assert_eq!(
            set_char(s("abc"), Value::Int(0), s("")),
            Err(RuntimeError::EmptyReplacement)
        );
        assert!(set_char(s("abc"), Value::Int(5), s("x")).is_err());
    }

    #[rstest]
    #[case(2.5, 2)]
    #[case(3.5, 4)]
    #[case(-2.5, -2)]
    #[case(1.4, 1)]
    fn test_round_half_to_even(#[case] input: f64, #[case] expected: i64) {
        assert_eq!(
            float2r2oint(Value::Float(input)).unwrap(),
            Value::Int(expected)
        );
    }

    #[rstest]
    #[case(2.2, 2)]
    #[case(3.0, 4)]
    #[case(5.0, 6)]
    #[case(-3.0, -4)]
    #[case(6.9, 6)]
    #[case(7.1, 8)]
    fn test_round_to_even_integer(#[case] input: f64, #[case] expected: i64) {
        assert_eq!(
            float2r2eint(Value::Float(input)).unwrap(),
            Value::Int(expected)
        );
    }

    #[test]
    fn test_conversions() {
        assert_eq!(int2float(Value::Int(3)).unwrap(), Value::Float(3.0));
        assert_eq!(float2int(Value::Float(-3.9)).unwrap(), Value::Int(-3));
        assert_eq!(int2char(Value::Int(97)).unwrap(), s("a"));
        assert_eq!(
            int2char(Value::Int(0xD800)),
            Err(RuntimeError::InvalidCodePoint { code: 0xD800 })
        );
        assert!(int2float(Value::Float(1.0)).is_err());
        assert_eq!(
            float2int(Value::Float(1e300)),
            Err(RuntimeError::InvalidNumericResult)
        );
    }
}
