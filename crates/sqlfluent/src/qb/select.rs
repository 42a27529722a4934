use super::expr::BoolOp;
use super::where_clause::WhereClause;
use crate::error::{QbError, QbResult};
use crate::naming::NameGenerator;
use crate::params::Params;
use crate::positional::{self, PositionalQuery};
use crate::value::Value;
use std::sync::Arc;

/// Structured SELECT query builder with named (`:name`) placeholders.
///
/// Clause order is fixed: SELECT, FROM, joins, WHERE, GROUP BY, ORDER BY,
/// LIMIT, OFFSET. Empty or unset clauses are omitted.
#[derive(Debug, Clone)]
pub struct Query {
    /// Main table expression (may contain `{token}`s)
    table: String,
    /// SELECT fields (empty renders `*`)
    fields: Vec<String>,
    /// alias -> JOIN text, in registration order
    joins: Vec<(String, String)>,
    /// Params supplied with joins, applied in order
    join_params: Vec<(String, Value)>,
    /// Root WHERE clause, created on first access
    root: Option<WhereClause>,
    group_by: Option<String>,
    order_by: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    names: Arc<NameGenerator>,
}

impl Query {
    /// Create an empty query using the process-wide name generator.
    pub fn new() -> Self {
        Self::with_names(NameGenerator::global())
    }

    /// Create an empty query whose root clause draws names from `names`.
    pub fn with_names(names: Arc<NameGenerator>) -> Self {
        Self {
            table: String::new(),
            fields: Vec::new(),
            joins: Vec::new(),
            join_params: Vec::new(),
            root: None,
            group_by: None,
            order_by: None,
            limit: None,
            offset: None,
            names,
        }
    }

    // ==================== SELECT / FROM ====================

    /// Append one or more SELECT fields.
    pub fn select(&mut self, fields: impl Into<Fields>) -> &mut Self {
        self.fields.extend(fields.into().0);
        self
    }

    /// Replace the SELECT fields.
    pub fn set_select(&mut self, fields: impl Into<Fields>) -> &mut Self {
        self.fields = fields.into().0;
        self
    }

    /// Set the main table.
    pub fn from(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = table.into();
        self
    }

    // ==================== JOIN ====================

    /// Register a JOIN under an alias derived from its text.
    pub fn join(&mut self, join: impl Into<String>) -> &mut Self {
        self.join_with(join, Params::new(), None)
    }

    /// Register a JOIN with its own bound values, optionally under an explicit alias.
    ///
    /// Without an alias, the blake3 hash of the text is used. Two different
    /// texts with the same hash would replace each other; this is not detected.
    /// Registering an existing alias replaces its text in place.
    pub fn join_with<I, K, V>(&mut self, join: impl Into<String>, params: I, alias: Option<&str>) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let join = join.into();
        let alias = match alias {
            Some(alias) => alias.to_string(),
            None => join_alias(&join),
        };
        match self.joins.iter_mut().find(|(a, _)| *a == alias) {
            Some(slot) => slot.1 = join,
            None => self.joins.push((alias, join)),
        }
        self.join_params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Whether a JOIN is registered under `alias`.
    pub fn joined(&self, alias: &str) -> bool {
        self.joins.iter().any(|(a, _)| a == alias)
    }

    // ==================== WHERE ====================

    /// The root clause, created with `AND` on first access.
    pub fn where_clause(&mut self) -> &mut WhereClause {
        self.where_with(BoolOp::And)
    }

    /// The root clause, created with `op` on first access.
    ///
    /// The operator is fixed by whichever call creates the clause; `op` is
    /// ignored on every later call.
    pub fn where_with(&mut self, op: BoolOp) -> &mut WhereClause {
        let names = &self.names;
        self.root
            .get_or_insert_with(|| WhereClause::with_names(op, Arc::clone(names)))
    }

    // ==================== GROUP / ORDER / LIMIT ====================

    /// Set GROUP BY text; empty text removes the clause.
    pub fn group_by(&mut self, value: impl Into<String>) -> &mut Self {
        self.group_by = non_empty(value.into());
        self
    }

    /// Set ORDER BY text; empty text removes the clause.
    pub fn order_by(&mut self, value: impl Into<String>) -> &mut Self {
        self.order_by = non_empty(value.into());
        self
    }

    /// Set LIMIT. Anything but an integer removes the clause.
    pub fn limit(&mut self, value: impl Into<Value>) -> &mut Self {
        self.limit = value.into().as_int();
        self
    }

    /// Set OFFSET. Anything but an integer removes it; it renders only with a LIMIT.
    pub fn offset(&mut self, value: impl Into<Value>) -> &mut Self {
        self.offset = value.into().as_int();
        self
    }

    /// Pagination helper.
    ///
    /// `page` is 1-based (clamped to >= 1).
    /// `per_page` is clamped to >= 1.
    /// The offset saturates at `i64::MAX`.
    pub fn paginate(&mut self, page: i64, per_page: i64) -> &mut Self {
        let p = page.max(1);
        let size = per_page.max(1);
        self.limit = Some(size);
        self.offset = Some((p - 1).saturating_mul(size));
        self
    }

    // ==================== Build ====================

    /// Render the statement with `:name` placeholders.
    pub fn to_sql(&self) -> String {
        let fields = if self.fields.is_empty() {
            "*".to_string()
        } else {
            self.fields.join(",\n\t")
        };

        let mut sql = format!("SELECT\n\t{}\nFROM {}", fields, self.table);

        for (_, join) in &self.joins {
            sql.push('\n');
            sql.push_str(join);
        }

        if let Some(where_sql) = self.root.as_ref().and_then(WhereClause::to_sql) {
            sql.push_str("\nWHERE ");
            sql.push_str(&where_sql);
        }

        if let Some(ref group) = self.group_by {
            sql.push_str("\nGROUP BY ");
            sql.push_str(group);
        }

        if let Some(ref order) = self.order_by {
            sql.push_str("\nORDER BY ");
            sql.push_str(order);
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!("\nLIMIT {}", limit));
            if let Some(offset) = self.offset {
                sql.push_str(&format!("\nOFFSET {}", offset));
            }
        }

        sql
    }

    /// All bound values: the WHERE tree's, then the join values.
    ///
    /// Join values are applied last and win on a name collision.
    pub fn params(&self) -> Params {
        let mut params = self
            .root
            .as_ref()
            .map(WhereClause::params)
            .unwrap_or_default();
        params.extend(self.join_params.iter().cloned());
        params
    }

    /// Read one bound value from [`Query::params`].
    pub fn get_param(&self, name: &str) -> QbResult<Value> {
        self.params()
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
            .ok_or_else(|| QbError::param_not_found(name))
    }

    /// Rewrite to `$n` placeholders for a Postgres driver.
    pub fn to_positional(&self) -> QbResult<PositionalQuery> {
        positional::to_positional(&self.to_sql(), &self.params())
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic alias for a JOIN registered without one.
fn join_alias(join: &str) -> String {
    blake3::hash(join.as_bytes()).to_hex().to_string()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// One or many SELECT fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Vec<String>);

impl From<&str> for Fields {
    fn from(field: &str) -> Self {
        Fields(vec![field.to_string()])
    }
}

impl From<String> for Fields {
    fn from(field: String) -> Self {
        Fields(vec![field])
    }
}

impl<S: Into<String>> From<Vec<S>> for Fields {
    fn from(fields: Vec<S>) -> Self {
        Fields(fields.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Fields {
    fn from(fields: [S; N]) -> Self {
        Fields(fields.into_iter().map(Into::into).collect())
    }
}

impl From<&[&str]> for Fields {
    fn from(fields: &[&str]) -> Self {
        Fields(fields.iter().map(|f| f.to_string()).collect())
    }
}
