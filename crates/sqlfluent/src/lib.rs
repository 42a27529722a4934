//! # sqlfluent
//!
//! A fluent SELECT builder with nested boolean WHERE trees and named bound
//! parameters.
//!
//! ## Features
//!
//! - **SQL explicit**: fields, tables, joins and conditions are plain SQL text
//! - **Nested WHERE trees**: AND/OR clauses, subclauses and embedded subqueries
//! - **Named placeholders**: values are bound as `:name` and returned as a map
//! - **IN / equality shortcut**: lists, single values, subqueries, inline literals
//! - **Postgres ready**: rewrite to `$n` placeholders for `tokio-postgres`
//!
//! ## Example
//!
//! ```ignore
//! use sqlfluent::Query;
//!
//! let mut q = Query::new();
//! q.select(["a", "b"]).from("{t}");
//! q.where_clause().add_with("a = :v", [("v", 1)]);
//!
//! assert!(q.to_sql().contains("a = :v"));
//! assert_eq!(q.get_param("v")?, sqlfluent::Value::Int(1));
//!
//! // Hand it to tokio-postgres
//! let pq = q.to_positional()?;
//! let rows = client.query(&pq.sql, &pq.params_ref()).await?;
//! ```

pub mod error;
pub mod naming;
pub mod params;
pub mod positional;
pub mod qb;
pub mod tokens;
pub mod value;

#[cfg(feature = "tracing")]
mod log;

pub use error::{QbError, QbResult};
pub use naming::{NameGenerator, next_name};
pub use params::Params;
pub use positional::{PositionalQuery, to_positional};
pub use qb::{
    BoolOp, Expression, Fields, InOptions, InValues, Query, Validator, WhereClause, select_from,
};
pub use tokens::TokenExpander;
pub use value::Value;

#[cfg(feature = "tracing")]
pub use log::TracingSqlLogger;
