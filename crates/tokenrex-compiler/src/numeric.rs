//! Custom integer-literal parsing: leading dashes collapse into a single
//! sign rather than being rejected or read as repeated negation. Sign,
//! then digits; overflow short-circuits; `-0` is `0`; `i32::MIN` is
//! representable.

/// Parses the text of a [`crate::lexer::SyntaxKind::Number`] token.
///
/// `text` is `-*[0-9]+`: zero or more dashes, then one or more digits. An
/// odd number of dashes yields a negative value; an even number (including
/// zero) yields a non-negative one. Returns `None` on overflow — the
/// caller turns that into a non-match rather than a compile error when
/// read at match time, but into a [`tokenrex_core::CompileError`] when read
/// from a pattern literal at compile time.
pub fn parse_signed_i32(text: &str) -> Option<i32> {
    let digits_start = text.bytes().position(|b| b != b'-').unwrap_or(text.len());
    let dashes = digits_start;
    let digits = &text[digits_start..];
    if digits.is_empty() {
        return None;
    }

    let negative = dashes % 2 == 1;
    let magnitude: u32 = digits.parse().ok()?;

    if negative {
        if magnitude > i32::MIN.unsigned_abs() {
            return None;
        }
        // `i32::MIN.unsigned_abs()` itself must round-trip exactly.
        if magnitude == i32::MIN.unsigned_abs() {
            return Some(i32::MIN);
        }
        Some(-(magnitude as i32))
    } else {
        i32::try_from(magnitude).ok()
    }
}

#[cfg(test)]
#[path = "numeric_tests.rs"]
mod numeric_tests;
