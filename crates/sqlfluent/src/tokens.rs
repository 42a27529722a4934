//! `{token}` expansion for table and join text.
//!
//! Rendering never touches `{name}` substrings. Applications that keep table
//! names as tokens (to apply a per-installation prefix, say) expand them with a
//! [`TokenExpander`], before or after the query is rendered.
//!
//! # Example
//! ```ignore
//! let tokens = TokenExpander::new().with_table_prefix("app_");
//! assert_eq!(tokens.expand("SELECT * FROM {users}"), "SELECT * FROM app_users");
//! ```

use crate::error::{QbError, QbResult};
use std::collections::HashMap;

/// Replaces `{name}` tokens with configured text.
///
/// Explicit tokens take precedence over the table prefix. With no prefix set,
/// tokens without an explicit mapping are left verbatim.
#[derive(Debug, Clone, Default)]
pub struct TokenExpander {
    /// Prepended to the token name when no explicit mapping exists.
    pub table_prefix: Option<String>,
    tokens: HashMap<String, String>,
}

impl TokenExpander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand every otherwise-unmapped `{name}` to `prefix + name`.
    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = Some(prefix.into());
        self
    }

    /// Map `{name}` to `value`.
    ///
    /// The name must be non-empty and consist of ASCII letters, digits or `_`.
    pub fn with_token(mut self, name: &str, value: impl Into<String>) -> QbResult<Self> {
        if name.is_empty() || !name.bytes().all(is_token_char) {
            return Err(QbError::validation(format!("invalid token name '{}'", name)));
        }
        self.tokens.insert(name.to_string(), value.into());
        Ok(self)
    }

    fn resolve(&self, name: &str) -> Option<String> {
        if let Some(value) = self.tokens.get(name) {
            return Some(value.clone());
        }
        self.table_prefix
            .as_ref()
            .map(|prefix| format!("{}{}", prefix, name))
    }

    /// Expand all resolvable tokens in `sql`.
    pub fn expand(&self, sql: &str) -> String {
        let mut out = String::with_capacity(sql.len());
        let mut rest = sql;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}');
            match close {
                Some(close)
                    if close > 0 && after[..close].bytes().all(is_token_char) =>
                {
                    let name = &after[..close];
                    match self.resolve(name) {
                        Some(value) => out.push_str(&value),
                        None => out.push_str(&rest[open..open + close + 2]),
                    }
                    rest = &after[close + 1..];
                }
                _ => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

fn is_token_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_tables() {
        let tokens = TokenExpander::new().with_table_prefix("mybb_");
        assert_eq!(
            tokens.expand("SELECT * FROM {users} u LEFT JOIN {posts} p ON p.uid = u.uid"),
            "SELECT * FROM mybb_users u LEFT JOIN mybb_posts p ON p.uid = u.uid"
        );
    }

    #[test]
    fn explicit_tokens_win() {
        let tokens = TokenExpander::new()
            .with_table_prefix("x_")
            .with_token("users", "accounts")
            .unwrap();
        assert_eq!(tokens.expand("{users} {t}"), "accounts x_t");
    }

    #[test]
    fn unknown_and_malformed_tokens_stay() {
        let tokens = TokenExpander::new();
        assert_eq!(tokens.expand("{users}"), "{users}");
        assert_eq!(tokens.expand("a {} b { c"), "a {} b { c");
        assert_eq!(tokens.expand("{not a token}"), "{not a token}");
    }

    #[test]
    fn rejects_bad_token_names() {
        let err = TokenExpander::new().with_token("a b", "x").unwrap_err();
        assert!(matches!(err, QbError::Validation(_)));
    }
}
