//! Expression nodes of a WHERE tree.
//!
//! A [`WhereClause`] holds an ordered list of named [`Expression`]s. Each node
//! knows how to render itself at a nesting depth and how to contribute its
//! bound parameters, so the clause never inspects node types at render time.

use super::select::Query;
use super::where_clause::WhereClause;
use crate::params::Params;
use std::fmt;

/// Boolean operator joining the expressions of one clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoolOp {
    #[default]
    And,
    Or,
}

impl BoolOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoolOp::And => "AND",
            BoolOp::Or => "OR",
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One child of a [`WhereClause`].
#[derive(Debug, Clone)]
pub enum Expression {
    /// Raw SQL fragment, used as-is.
    Leaf(String),
    /// A complete subquery, rendered as its own statement.
    Query(Box<Query>),
    /// A nested clause, rendered in parentheses one level deeper.
    Clause(WhereClause),
}

impl Expression {
    /// Render this node as a child of a clause rendered at `depth`.
    ///
    /// Returns `None` only for an empty nested clause.
    pub(crate) fn render(&self, depth: usize) -> Option<String> {
        match self {
            Expression::Leaf(text) => Some(format!("{}{}", indent(depth), text)),
            Expression::Query(query) => Some(query.to_sql()),
            Expression::Clause(clause) => clause.to_sql_at(depth + 1),
        }
    }

    /// Parameters bound by this node (leaves bind none themselves; their
    /// values live in the owning clause).
    pub(crate) fn collect_params(&self) -> Option<Params> {
        match self {
            Expression::Leaf(_) => None,
            Expression::Query(query) => Some(query.params()),
            Expression::Clause(clause) => Some(clause.params()),
        }
    }
}

impl From<&str> for Expression {
    fn from(text: &str) -> Self {
        Expression::Leaf(text.to_string())
    }
}

impl From<String> for Expression {
    fn from(text: String) -> Self {
        Expression::Leaf(text)
    }
}

impl From<Query> for Expression {
    fn from(query: Query) -> Self {
        Expression::Query(Box::new(query))
    }
}

impl From<WhereClause> for Expression {
    fn from(clause: WhereClause) -> Self {
        Expression::Clause(clause)
    }
}

pub(crate) fn indent(depth: usize) -> String {
    "\t".repeat(depth)
}
