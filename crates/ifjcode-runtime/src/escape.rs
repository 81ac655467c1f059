//! Escape sequence decoding
//!
//! Two layers of escapes exist in IFJcode programs:
//! - `\ddd` (three decimal digits) inside `string@` literals, decoded once when
//!   the operand is parsed;
//! - backslash escapes in the textual form of a value (`\n`, `\t`, `\xHH`, ...),
//!   decoded by `WRITE` right before the text reaches the output sink.

use std::iter::Peekable;
use std::str::Chars;

/// Decode `\ddd` escapes of a `string@` literal
///
/// Returns `Err` with the offending sequence when `ddd` is not a valid
/// Unicode scalar value. A backslash not followed by three digits is kept.
pub fn decode_decimal_escapes(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let digits: String = chars.clone().take(3).collect();
        if digits.len() == 3 && digits.chars().all(|d| d.is_ascii_digit()) {
            let code: u32 = digits.parse().map_err(|_| format!("\\{}", digits))?;
            let decoded = char::from_u32(code).ok_or_else(|| format!("\\{}", digits))?;
            out.push(decoded);
            chars.nth(2);
        } else {
            out.push('\\');
        }
    }

    Ok(out)
}

/// Decode backslash escapes in text written by `WRITE`
///
/// Unknown or malformed sequences are emitted verbatim.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(&next) = chars.peek() else {
            out.push('\\');
            break;
        };

        let simple = match next {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            '\\' => Some('\\'),
            '\'' => Some('\''),
            '"' => Some('"'),
            'a' => Some('\u{07}'),
            'b' => Some('\u{08}'),
            'f' => Some('\u{0C}'),
            'v' => Some('\u{0B}'),
            _ => None,
        };

        if let Some(decoded) = simple {
            chars.next();
            out.push(decoded);
            continue;
        }

        if next.is_digit(8) {
            out.push(read_octal(&mut chars));
            continue;
        }

        let width = match next {
            'x' => 2,
            'u' => 4,
            'U' => 8,
            _ => 0,
        };
        match read_hex(&mut chars, width) {
            Some(decoded) => out.push(decoded),
            None => out.push('\\'),
        }
    }

    out
}

/// Consume one to three octal digits (`\101`, `\12`, `\0`)
fn read_octal(chars: &mut Peekable<Chars<'_>>) -> char {
    let mut code = 0;
    for _ in 0..3 {
        match chars.peek().and_then(|c| c.to_digit(8)) {
            Some(digit) => {
                code = code * 8 + digit;
                chars.next();
            }
            None => break,
        }
    }
    // At most 0o777, always a valid scalar value
    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Consume `x`/`u`/`U` plus `width` hex digits if they form a valid character
fn read_hex(chars: &mut Peekable<Chars<'_>>, width: usize) -> Option<char> {
    if width == 0 {
        return None;
    }
    let lookahead: String = chars.clone().skip(1).take(width).collect();
    if lookahead.len() != width || !lookahead.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let decoded = u32::from_str_radix(&lookahead, 16)
        .ok()
        .and_then(char::from_u32)?;
    for _ in 0..=width {
        chars.next();
    }
    Some(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_escapes() {
        assert_eq!(
            decode_decimal_escapes(r"hello\032world").unwrap(),
            "hello world"
        );
        assert_eq!(decode_decimal_escapes(r"a\035b").unwrap(), "a#b");
        assert_eq!(decode_decimal_escapes(r"\092").unwrap(), "\\");
    }

    #[test]
    fn test_decimal_escape_keeps_other_backslashes() {
        assert_eq!(decode_decimal_escapes(r"line\n").unwrap(), r"line\n");
        assert_eq!(decode_decimal_escapes(r"\12").unwrap(), r"\12");
    }

    #[test]
    fn test_unescape_common_sequences() {
        assert_eq!(unescape(r"a\nb"), "a\nb");
        assert_eq!(unescape(r"tab\there"), "tab\there");
        assert_eq!(unescape(r"back\\slash"), "back\\slash");
        assert_eq!(unescape(r"\x41é"), "Aé");
    }

    #[test]
    fn test_unescape_octal_sequences() {
        assert_eq!(unescape(r"\101"), "A");
        assert_eq!(unescape(r"a\012b"), "a\nb");
        assert_eq!(unescape(r"\0"), "\0");
        assert_eq!(unescape(r"\08"), "\08");
        assert_eq!(unescape(r"\1014"), "A4");
    }

    #[test]
    fn test_unescape_long_unicode() {
        assert_eq!(unescape(r"\U0001F600"), "\u{1F600}");
        assert_eq!(unescape(r"\U0001F6"), r"\U0001F6");
        assert_eq!(unescape(r"\U00110000"), r"\U00110000");
    }

    #[test]
    fn test_unescape_keeps_unknown_sequences() {
        assert_eq!(unescape(r"\q"), r"\q");
        assert_eq!(unescape(r"\xZZ"), r"\xZZ");
        assert_eq!(unescape("end\\"), "end\\");
    }
}
