//! `:name` placeholders rewritten to PostgreSQL `$n` positions.

use super::builder::QueryBuf;
use super::params::Params;
use crate::error::MapError;
use std::collections::HashMap;

/// Rewrite every `:name` in `template` to `$n` and collect the values.
///
/// Names are numbered by first appearance and a repeated name reuses its
/// number. String literals, quoted identifiers, comments and `::type` casts
/// are copied through untouched. Every placeholder must have a value and
/// every value must be referenced.
pub fn rewrite(template: &str, params: &Params) -> Result<QueryBuf, MapError> {
    let bytes = template.as_bytes();
    let mut buf = QueryBuf::new();
    buf.sql.reserve(template.len());
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' if is_escape_prefix(bytes, i) => i = skip_escape_string(bytes, i),
            quote @ (b'\'' | b'"') => i = skip_quoted(bytes, i, quote),
            b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_line_comment(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i),
            b':' if bytes.get(i + 1) == Some(&b':') => i += 2,
            b':' if bytes.get(i + 1).is_some_and(|b| is_name_start(*b)) => {
                let start = i + 1;
                let mut end = start + 1;
                while end < bytes.len() && is_name_char(bytes[end]) {
                    end += 1;
                }
                let name = &template[start..end];
                let position = match positions.get(name) {
                    Some(n) => *n,
                    None => {
                        let value = params
                            .get(name)
                            .ok_or_else(|| MapError::MissingParameter(name.to_string()))?;
                        let n = buf.push_param(value.clone());
                        positions.insert(name, n);
                        n
                    }
                };
                buf.sql.push_str(&template[copied..i]);
                buf.sql.push('$');
                buf.sql.push_str(&position.to_string());
                copied = end;
                i = end;
            }
            _ => i += 1,
        }
    }
    buf.sql.push_str(&template[copied..]);

    if let Some(unused) = params.names().filter(|n| !positions.contains_key(n)).min() {
        return Err(MapError::UnusedParameter(unused.to_string()));
    }
    Ok(buf)
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Index just past the closing quote. A doubled quote closes and reopens,
/// which lands in the same place.
fn skip_quoted(bytes: &[u8], open: usize, quote: u8) -> usize {
    match bytes[open + 1..].iter().position(|b| *b == quote) {
        Some(offset) => open + 1 + offset + 1,
        None => bytes.len(),
    }
}

/// `E'...'` or `e'...'`, where the letter is not the tail of an identifier.
fn is_escape_prefix(bytes: &[u8], quote: usize) -> bool {
    quote >= 1
        && matches!(bytes[quote - 1], b'E' | b'e')
        && (quote < 2 || !is_name_char(bytes[quote - 2]))
}

/// Index just past the closing quote of an escape string, where a backslash
/// escapes the next byte.
fn skip_escape_string(bytes: &[u8], open: usize) -> usize {
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\'' if bytes.get(i + 1) == Some(&b'\'') => i += 2,
            b'\'' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn skip_line_comment(bytes: &[u8], start: usize) -> usize {
    match bytes[start..].iter().position(|b| *b == b'\n') {
        Some(offset) => start + offset + 1,
        None => bytes.len(),
    }
}

fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    match bytes[start + 2..].windows(2).position(|w| w == b"*/") {
        Some(offset) => start + 2 + offset + 2,
        None => bytes.len(),
    }
}
