//! Named-to-positional placeholder rewriting.
//!
//! Rendered queries use `:name` placeholders; `tokio-postgres` expects `$1, $2, ...`.
//! [`to_positional`] rewrites one into the other and lines the bound values up
//! with the new indices.
//!
//! A repeated name reuses its first index. `::` casts, quoted strings and
//! identifiers (including `E'...'` escape strings and `$tag$...$tag$` bodies),
//! and comments are copied through untouched.

use crate::error::QbResult;
use crate::params::Params;
use crate::value::Value;
use tokio_postgres::types::ToSql;

/// A SQL string with `$n` placeholders plus the values in index order.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionalQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl PositionalQuery {
    /// Get parameters as references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
    }
}

/// Rewrite `:name` placeholders in `sql` to `$n`, resolving values from `params`.
///
/// Fails with [`QbError::ParamNotFound`](crate::QbError::ParamNotFound) for a placeholder with no bound value.
/// Bound values that no placeholder references are dropped.
pub fn to_positional(sql: &str, params: &Params) -> QbResult<PositionalQuery> {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut order: Vec<&str> = Vec::new();
    let mut values = Vec::new();
    let mut i = 0;
    let mut copied = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => {
                i = skip_quoted(bytes, i, is_escape_string(bytes, i));
            }
            b'"' => {
                i = skip_quoted(bytes, i, false);
            }
            b'$' if !preceded_by_name_char(bytes, i) && dollar_tag_len(bytes, i).is_some() => {
                i = skip_dollar_quoted(bytes, i);
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = find_from(bytes, i, b"\n").map_or(bytes.len(), |p| p + 1);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = find_from(bytes, i + 2, b"*/").map_or(bytes.len(), |p| p + 2);
            }
            b':' if bytes.get(i + 1) == Some(&b':') => {
                i += 2;
            }
            b':' if bytes.get(i + 1).is_some_and(|b| is_name_start(*b)) => {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && is_name_char(bytes[end]) {
                    end += 1;
                }
                let name = &sql[start..end];
                let index = match order.iter().position(|n| *n == name) {
                    Some(pos) => pos + 1,
                    None => {
                        values.push(params.get_param(name)?.clone());
                        order.push(name);
                        order.len()
                    }
                };
                out.push_str(&sql[copied..i]);
                out.push('$');
                out.push_str(&index.to_string());
                copied = end;
                i = end;
            }
            _ => i += 1,
        }
    }
    out.push_str(&sql[copied..]);

    #[cfg(feature = "tracing")]
    tracing::debug!(
        target: "sqlfluent.sql",
        placeholders = values.len(),
        bound = params.len(),
        "rewrote named placeholders"
    );

    Ok(PositionalQuery { sql: out, params: values })
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn preceded_by_name_char(bytes: &[u8], i: usize) -> bool {
    i > 0 && (is_name_char(bytes[i - 1]) || bytes[i - 1] == b'$')
}

/// `'` at `i` opens an `E'...'` string: a lone `E`/`e` right before it.
fn is_escape_string(bytes: &[u8], i: usize) -> bool {
    i > 0 && matches!(bytes[i - 1], b'E' | b'e') && !preceded_by_name_char(bytes, i - 1)
}

/// Index just past the closing quote. Doubled quotes are escapes, and so is
/// a backslash inside an escape string.
fn skip_quoted(bytes: &[u8], start: usize, backslash_escapes: bool) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        if backslash_escapes && bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

/// Length of the `$tag$` opener at `start` (`$$` included), if there is one.
fn dollar_tag_len(bytes: &[u8], start: usize) -> Option<usize> {
    let mut end = start + 1;
    if bytes.get(end).is_some_and(|b| is_name_start(*b)) {
        while end < bytes.len() && is_name_char(bytes[end]) {
            end += 1;
        }
    }
    (bytes.get(end) == Some(&b'$')).then_some(end + 1 - start)
}

/// Index just past the matching `$tag$`, or the end of input when unclosed.
fn skip_dollar_quoted(bytes: &[u8], start: usize) -> usize {
    let Some(len) = dollar_tag_len(bytes, start) else {
        return start + 1;
    };
    let tag = &bytes[start..start + len];
    find_from(bytes, start + len, tag).map_or(bytes.len(), |p| p + len)
}

fn find_from(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QbError;

    fn params(pairs: &[(&str, i64)]) -> Params {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn numbers_by_first_occurrence() {
        let q = to_positional("a = :x AND b = :y OR c = :x", &params(&[("x", 1), ("y", 2)])).unwrap();
        assert_eq!(q.sql, "a = $1 AND b = $2 OR c = $1");
        assert_eq!(q.params, vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(q.params_ref().len(), 2);
    }

    #[test]
    fn skips_casts_strings_and_comments() {
        let sql = "SELECT ':no', \"a:b\", x::int -- :nope\nFROM t /* :never */ WHERE id = :id";
        let q = to_positional(sql, &params(&[("id", 7)])).unwrap();
        assert_eq!(
            q.sql,
            "SELECT ':no', \"a:b\", x::int -- :nope\nFROM t /* :never */ WHERE id = $1"
        );
        assert_eq!(q.params, vec![Value::Int(7)]);
    }

    #[test]
    fn skips_dollar_quoted_bodies() {
        let q = to_positional("SELECT $$ :x $$ FROM t WHERE a = :v", &params(&[("v", 1)])).unwrap();
        assert_eq!(q.sql, "SELECT $$ :x $$ FROM t WHERE a = $1");

        let sql = "SELECT $fn$ a = :x AND $$ :y $fn$, :v";
        let q = to_positional(sql, &params(&[("v", 1)])).unwrap();
        assert_eq!(q.sql, "SELECT $fn$ a = :x AND $$ :y $fn$, $1");
        assert_eq!(q.params, vec![Value::Int(1)]);
    }

    #[test]
    fn dollar_in_identifier_is_not_a_quote() {
        let q = to_positional("SELECT a$b$ FROM t WHERE a = :v", &params(&[("v", 1)])).unwrap();
        assert_eq!(q.sql, "SELECT a$b$ FROM t WHERE a = $1");
    }

    #[test]
    fn skips_escape_strings() {
        let sql = r"SELECT E'it\'s :x', e'\\' FROM t WHERE a = :v";
        let q = to_positional(sql, &params(&[("v", 1)])).unwrap();
        assert_eq!(q.sql, r"SELECT E'it\'s :x', e'\\' FROM t WHERE a = $1");

        // a plain string ends at the first quote even after a backslash
        let q = to_positional(r"SELECT 'C:\' || :v", &params(&[("v", 1)])).unwrap();
        assert_eq!(q.sql, r"SELECT 'C:\' || $1");
    }

    #[test]
    fn escaped_quotes_stay_inside_literal() {
        let q = to_positional("x = 'it''s :fine' AND y = :y", &params(&[("y", 1)])).unwrap();
        assert_eq!(q.sql, "x = 'it''s :fine' AND y = $1");
    }

    #[test]
    fn unbound_placeholder_is_an_error() {
        let err = to_positional("a = :missing", &Params::new()).unwrap_err();
        assert_eq!(err, QbError::ParamNotFound("missing".into()));
    }

    #[test]
    fn unused_values_are_dropped() {
        let q = to_positional("a = 1", &params(&[("x", 1)])).unwrap();
        assert_eq!(q.sql, "a = 1");
        assert!(q.params.is_empty());
    }
}
