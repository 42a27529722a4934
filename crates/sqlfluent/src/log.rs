use crate::qb::Query;
use tracing::Level;

/// A `tracing`-based logger that emits a query's rendered SQL and bound values.
///
/// Call it right before handing the query to a driver.
///
/// Enable via the crate feature: `sqlfluent = { features = ["tracing"] }` (on by default).
#[derive(Debug, Clone)]
pub struct TracingSqlLogger {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Include parameter values (not just their count).
    pub log_values: bool,
}

impl Default for TracingSqlLogger {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
            log_values: false,
        }
    }
}

impl TracingSqlLogger {
    /// Create a new logger with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Also log parameter values as JSON.
    pub fn with_values(mut self) -> Self {
        self.log_values = true;
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    /// Emit one event describing `query`.
    pub fn log(&self, query: &Query) {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.truncate_sql(&query.to_sql());
        let params = query.params();
        if self.log_values {
            emit_at_level!(
                self.level,
                target: "sqlfluent.sql",
                param_count = params.len(),
                sql = %sql,
                params = %params.to_json(),
            );
        } else {
            emit_at_level!(
                self.level,
                target: "sqlfluent.sql",
                param_count = params.len(),
                sql = %sql,
            );
        }
    }
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_sql_bytes("héllo", 2), "h");
        assert_eq!(truncate_sql_bytes("abc", 10), "abc");
    }

    #[test]
    fn truncation_is_configurable() {
        let logger = TracingSqlLogger::new().max_sql_length(3);
        assert_eq!(logger.truncate_sql("SELECT"), "SEL...");
        assert_eq!(logger.clone().no_truncate().truncate_sql("SELECT"), "SELECT");
    }
}
