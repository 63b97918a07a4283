//! Translation of `@PARAM_<n>` markers into the driver's `@P<n>` parameters.
//!
//! tiberius sends bound values as `@P1..@PN` through `sp_executesql`, so the
//! slot named `PARAM_<n>` is carried by the n-th bound value.

use std::borrow::Cow;

mod parsers;
mod scanner;

use parsers::{
    is_block_comment_end, is_block_comment_start, is_identifier_byte, is_line_comment_start,
    starts_marker,
};
use scanner::{State, scan_digits};

const MARKER: &[u8] = b"@PARAM_";

/// Rewrite `@PARAM_<n>` to `@P<n>`.
///
/// Markers inside string literals, quoted or bracketed identifiers, and
/// comments are left alone, as are markers that are only the prefix of a
/// longer variable name. Returns a borrowed `Cow` when nothing changed.
#[must_use]
pub fn translate_placeholders(sql: &str) -> Cow<'_, str> {
    let mut out: Option<String> = None;
    let mut state = State::Normal;
    let mut idx = 0;
    let bytes = sql.as_bytes();
    // Start of the not-yet-copied tail of `sql`.
    let mut copied = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'[' => state = State::Bracketed,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'@' if starts_marker(bytes, idx, MARKER) => {
                    if let Some((digits_end, digits)) = scan_digits(bytes, idx + MARKER.len())
                        && !bytes.get(digits_end).is_some_and(|n| is_identifier_byte(*n))
                    {
                        let buf = out.get_or_insert_with(|| String::with_capacity(sql.len()));
                        buf.push_str(&sql[copied..idx]);
                        buf.push_str("@P");
                        buf.push_str(digits);
                        copied = digits_end;
                        idx = digits_end;
                        continue;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::Bracketed => {
                if b == b']' {
                    if bytes.get(idx + 1) == Some(&b']') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
        }
        idx += 1;
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    }
}
