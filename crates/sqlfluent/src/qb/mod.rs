//! SELECT builder and WHERE expression trees.
//!
//! A [`Query`] owns one root [`WhereClause`], created on first access. Clauses
//! nest: a child may be another clause (rendered in parentheses) or a whole
//! [`Query`] (rendered as its own statement). Values are bound by name and
//! referenced as `:name` in the rendered text.
//!
//! # Usage
//!
//! ```ignore
//! use sqlfluent::qb::{self, BoolOp, InOptions};
//!
//! let mut q = qb::select_from("{users} u");
//! q.select(["u.uid", "u.username"])
//!     .join("LEFT JOIN {usergroups} g ON g.gid = u.usergroup")
//!     .order_by("u.username")
//!     .limit(20);
//!
//! q.where_clause()
//!     .add_with("u.regdate > :since", [("since", 1_700_000_000)])
//!     .in_list("u.usergroup", vec![2, 3, 4])
//!     .nested(BoolOp::Or, |c| {
//!         c.add("u.away = 0").add("u.awayreturn < :now").set_param("now", 1_700_100_000);
//!     });
//!
//! let sql = q.to_sql();
//! let params = q.params();
//! ```

mod expr;
mod select;
mod where_clause;

pub use expr::{BoolOp, Expression};
pub use select::{Fields, Query};
pub use where_clause::{InOptions, InValues, Validator, WhereClause};

/// Create a SELECT builder for the given table.
///
/// # Example
/// ```ignore
/// let mut q = sqlfluent::qb::select_from("{users}");
/// q.where_clause().in_list("uid", 1);
/// ```
pub fn select_from(table: &str) -> Query {
    let mut query = Query::new();
    query.from(table);
    query
}
