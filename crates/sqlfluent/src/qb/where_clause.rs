//! Nested boolean WHERE clauses with named bound parameters.

use super::expr::{BoolOp, Expression, indent};
use super::select::Query;
use crate::error::QbResult;
use crate::naming::NameGenerator;
use crate::params::Params;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// A boolean expression node: one operator, an ordered list of named child
/// expressions, and the parameters bound at this level.
///
/// Expression names are unique within a clause. Adding under a name that is
/// already taken replaces that expression in place. When no name is given the
/// expression is stored under `count() + 1`, so mixing explicit numeric names
/// with automatic ones can overwrite an earlier entry.
#[derive(Debug, Clone)]
pub struct WhereClause {
    op: BoolOp,
    expressions: Vec<(String, Expression)>,
    params: Params,
    names: Arc<NameGenerator>,
}

impl WhereClause {
    /// Create an empty clause using the process-wide name generator.
    pub fn new(op: BoolOp) -> Self {
        Self::with_names(op, NameGenerator::global())
    }

    pub fn and() -> Self {
        Self::new(BoolOp::And)
    }

    pub fn or() -> Self {
        Self::new(BoolOp::Or)
    }

    /// Create an empty clause drawing placeholder names from `names`.
    pub fn with_names(op: BoolOp, names: Arc<NameGenerator>) -> Self {
        Self {
            op,
            expressions: Vec::new(),
            params: Params::new(),
            names,
        }
    }

    pub fn op(&self) -> BoolOp {
        self.op
    }

    /// Number of top-level expressions.
    pub fn count(&self) -> usize {
        self.expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// Names of the top-level expressions, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.expressions.iter().map(|(name, _)| name.as_str())
    }

    /// Look up a top-level expression by name.
    pub fn expression(&self, name: &str) -> Option<&Expression> {
        self.expressions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, e)| e)
    }

    // ==================== Building ====================

    /// Append an expression under the next automatic name.
    pub fn add(&mut self, expression: impl Into<Expression>) -> &mut Self {
        self.insert(None, expression.into(), Params::new())
    }

    /// Append an expression together with the values its placeholders use.
    ///
    /// # Example
    /// ```ignore
    /// clause.add_with("a = :v", [("v", 1)]);
    /// ```
    pub fn add_with<I, K, V>(&mut self, expression: impl Into<Expression>, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.insert(None, expression.into(), params.into_iter().collect())
    }

    /// Append (or replace) an expression under an explicit name.
    pub fn add_named<I, K, V>(
        &mut self,
        name: impl Into<String>,
        expression: impl Into<Expression>,
        params: I,
    ) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.insert(
            Some(name.into()),
            expression.into(),
            params.into_iter().collect(),
        )
    }

    /// Build a nested clause in place and append it.
    ///
    /// The child shares this clause's name generator.
    ///
    /// # Example
    /// ```ignore
    /// root.nested(BoolOp::Or, |c| {
    ///     c.add("a IS NULL").in_list("a", [1, 2]);
    /// });
    /// ```
    pub fn nested(&mut self, op: BoolOp, build: impl FnOnce(&mut WhereClause)) -> &mut Self {
        let mut child = WhereClause::with_names(op, Arc::clone(&self.names));
        build(&mut child);
        self.add(child)
    }

    fn insert(&mut self, name: Option<String>, expression: Expression, params: Params) -> &mut Self {
        let name = name.unwrap_or_else(|| (self.expressions.len() + 1).to_string());
        match self.expressions.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = expression,
            None => self.expressions.push((name, expression)),
        }
        self.params.merge(params);
        self
    }

    // ==================== IN / equality shortcut ====================

    /// `field IN (...)` for a list, `field = :p` for a single value, or the
    /// subquery's SQL for a [`Query`]. Values are bound under fresh names.
    pub fn in_list(&mut self, field: &str, values: impl Into<InValues>) -> &mut Self {
        self.in_with(field, values, InOptions::new())
    }

    /// Negated form of [`WhereClause::in_list`]: `NOT IN` / `<>`.
    pub fn not_in(&mut self, field: &str, values: impl Into<InValues>) -> &mut Self {
        self.in_with(field, values, InOptions::new().negated())
    }

    /// The general IN / equality shortcut.
    ///
    /// - A [`Query`] is appended as-is: its full SQL is the expression and
    ///   `field` is not used. Wrap it yourself when it must be a subexpression.
    /// - Two or more values render `field IN (t1,t2,...)`. Each token is the
    ///   validator's literal text, or else a placeholder bound under a fresh
    ///   name (prefixed by `param_name` when set).
    /// - One value renders `field = t`, where `t` is the validator's literal
    ///   text or `:param_name` (a fresh name when none is set).
    /// - No values render `1=0` (`1=1` when negated).
    ///
    /// The expression is stored under the parameter name that was used, if
    /// any, and under the automatic name otherwise.
    pub fn in_with(
        &mut self,
        field: &str,
        values: impl Into<InValues>,
        options: InOptions<'_>,
    ) -> &mut Self {
        let InOptions {
            param_name,
            validator,
            positive,
        } = options;

        let (name, expression): (Option<String>, Expression) = match values.into() {
            InValues::Query(query) => (param_name, Expression::Query(query)),
            InValues::List(mut list) if list.len() == 1 => {
                let value = list.remove(0);
                self.equality(field, value, param_name, validator.as_deref(), positive)
            }
            InValues::List(list) if list.is_empty() => {
                let always = if positive { "1=0" } else { "1=1" };
                (param_name, Expression::Leaf(always.to_string()))
            }
            InValues::List(list) => {
                let tokens: Vec<String> = list
                    .into_iter()
                    .map(|value| match validator.as_deref() {
                        Some(validate) => validate(&value),
                        None => {
                            let bound = self.names.next_name(param_name.as_deref());
                            let token = format!(":{}", bound);
                            self.params.set_param(bound, value);
                            token
                        }
                    })
                    .collect();
                let op = if positive { "IN" } else { "NOT IN" };
                let text = format!("{} {} ({})", field, op, tokens.join(","));
                (param_name, Expression::Leaf(text))
            }
            InValues::Scalar(value) => {
                self.equality(field, value, param_name, validator.as_deref(), positive)
            }
        };

        self.insert(name, expression, Params::new())
    }

    fn equality(
        &mut self,
        field: &str,
        value: Value,
        param_name: Option<String>,
        validator: Option<&(dyn Fn(&Value) -> String + '_)>,
        positive: bool,
    ) -> (Option<String>, Expression) {
        let op = if positive { "=" } else { "<>" };
        match validator {
            Some(validate) => {
                let text = format!("{} {} {}", field, op, validate(&value));
                (param_name, Expression::Leaf(text))
            }
            None => {
                let name = param_name.unwrap_or_else(|| self.names.next_name(None));
                let text = format!("{} {} :{}", field, op, name);
                self.params.set_param(name.clone(), value);
                (Some(name), Expression::Leaf(text))
            }
        }
    }

    // ==================== Parameters ====================

    /// Bind (or rebind) a value at this level.
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.params.set_param(name, value);
        self
    }

    /// Read a value bound at this level (nested clauses are not searched).
    pub fn get_param(&self, name: &str) -> QbResult<&Value> {
        self.params.get_param(name)
    }

    /// All parameters of this subtree: the local ones, then each nested
    /// clause's or subquery's, in expression order. Later entries win.
    pub fn params(&self) -> Params {
        let mut merged = self.params.clone();
        for (_, expression) in &self.expressions {
            if let Some(params) = expression.collect_params() {
                merged.merge(params);
            }
        }
        merged
    }

    // ==================== Rendering ====================

    /// Render at depth 0 (no surrounding parentheses). `None` when empty.
    pub fn to_sql(&self) -> Option<String> {
        self.to_sql_at(0)
    }

    /// Render at `depth`.
    ///
    /// Leaves are indented `depth` tabs, the operator line sits at the same
    /// indentation, and any depth above 0 wraps the body in parentheses one
    /// level shallower.
    pub fn to_sql_at(&self, depth: usize) -> Option<String> {
        let parts: Vec<String> = self
            .expressions
            .iter()
            .filter_map(|(_, expression)| expression.render(depth))
            .collect();
        if parts.is_empty() {
            return None;
        }

        let separator = format!("\n{}{}\n", indent(depth), self.op);
        let body = parts.join(&separator);
        if depth == 0 {
            return Some(body);
        }
        let outer = indent(depth - 1);
        Some(format!("{outer}(\n{body}\n{outer})"))
    }
}

impl Default for WhereClause {
    fn default() -> Self {
        Self::new(BoolOp::And)
    }
}

// ==================== IN arguments ====================

/// Right-hand side of [`WhereClause::in_with`].
#[derive(Debug, Clone)]
pub enum InValues {
    Query(Box<Query>),
    List(Vec<Value>),
    Scalar(Value),
}

impl From<Query> for InValues {
    fn from(query: Query) -> Self {
        InValues::Query(Box::new(query))
    }
}

impl<T: Into<Value>> From<Vec<T>> for InValues {
    fn from(values: Vec<T>) -> Self {
        InValues::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for InValues {
    fn from(values: [T; N]) -> Self {
        InValues::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for InValues {
    fn from(values: &[T]) -> Self {
        InValues::List(values.iter().cloned().map(Into::into).collect())
    }
}

macro_rules! impl_scalar_in_values {
    ($($t:ty),*) => {
        $(
            impl From<$t> for InValues {
                fn from(v: $t) -> Self {
                    InValues::Scalar(Value::from(v))
                }
            }
        )*
    };
}

impl_scalar_in_values!(Value, &str, String, &String, bool, i8, i16, i32, i64, u8, u16, u32, f32, f64);

/// Literal renderer used instead of binding a value.
pub type Validator<'a> = Box<dyn Fn(&Value) -> String + 'a>;

/// Options for [`WhereClause::in_with`].
pub struct InOptions<'a> {
    param_name: Option<String>,
    validator: Option<Validator<'a>>,
    positive: bool,
}

impl<'a> InOptions<'a> {
    pub fn new() -> Self {
        Self {
            param_name: None,
            validator: None,
            positive: true,
        }
    }

    /// Name (single value) or name prefix (list) for bound values.
    pub fn param_name(mut self, name: impl Into<String>) -> Self {
        self.param_name = Some(name.into());
        self
    }

    /// Render values inline through `validator` instead of binding them.
    pub fn validator(mut self, validator: impl Fn(&Value) -> String + 'a) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Use `NOT IN` / `<>`.
    pub fn negated(mut self) -> Self {
        self.positive = false;
        self
    }

    pub fn positive(mut self, positive: bool) -> Self {
        self.positive = positive;
        self
    }
}

impl Default for InOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InOptions")
            .field("param_name", &self.param_name)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .field("positive", &self.positive)
            .finish()
    }
}
