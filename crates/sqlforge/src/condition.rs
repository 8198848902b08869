//! WHERE/HAVING condition builder.
//!
//! [`Condition`] accumulates named predicate terms and renders them joined
//! by a boolean operator (AND unless configured otherwise), collecting bind
//! values in the exact order their placeholders appear in the rendered SQL.

use crate::error::{BuildError, BuildResult};
use crate::ident::Quoting;
use crate::value::{Raw, Value};

/// Boolean operator joining the terms of a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    fn joiner(self) -> &'static str {
        match self {
            Logic::And => " AND ",
            Logic::Or => " OR ",
        }
    }
}

/// Comparison operator applied to a column.
///
/// # Example
/// ```
/// use sqlforge::Op;
///
/// Op::gt(5);
/// Op::in_list(["open", "pending"]);
/// Op::is_null();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// column = value
    Eq(Value),
    /// column != value
    Ne(Value),
    /// column > value
    Gt(Value),
    /// column >= value
    Gte(Value),
    /// column < value
    Lt(Value),
    /// column <= value
    Lte(Value),
    /// column LIKE pattern
    Like(Value),
    /// column NOT LIKE pattern
    NotLike(Value),
    /// column IN (values...) — the list must not be empty
    In(Vec<Value>),
    /// column NOT IN (values...) — the list must not be empty
    NotIn(Vec<Value>),
    /// column BETWEEN from AND to
    Between(Value, Value),
    /// column NOT BETWEEN from AND to
    NotBetween(Value, Value),
    /// column IS NULL
    IsNull,
    /// column IS NOT NULL
    IsNotNull,
}

impl Op {
    pub fn eq(value: impl Into<Value>) -> Self {
        Op::Eq(value.into())
    }

    pub fn ne(value: impl Into<Value>) -> Self {
        Op::Ne(value.into())
    }

    pub fn gt(value: impl Into<Value>) -> Self {
        Op::Gt(value.into())
    }

    pub fn gte(value: impl Into<Value>) -> Self {
        Op::Gte(value.into())
    }

    pub fn lt(value: impl Into<Value>) -> Self {
        Op::Lt(value.into())
    }

    pub fn lte(value: impl Into<Value>) -> Self {
        Op::Lte(value.into())
    }

    pub fn like(pattern: impl Into<Value>) -> Self {
        Op::Like(pattern.into())
    }

    pub fn not_like(pattern: impl Into<Value>) -> Self {
        Op::NotLike(pattern.into())
    }

    pub fn in_list<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Op::In(values.into_iter().map(Into::into).collect())
    }

    pub fn not_in<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Op::NotIn(values.into_iter().map(Into::into).collect())
    }

    pub fn between(from: impl Into<Value>, to: impl Into<Value>) -> Self {
        Op::Between(from.into(), to.into())
    }

    pub fn not_between(from: impl Into<Value>, to: impl Into<Value>) -> Self {
        Op::NotBetween(from.into(), to.into())
    }

    pub fn is_null() -> Self {
        Op::IsNull
    }

    pub fn is_not_null() -> Self {
        Op::IsNotNull
    }
}

/// The value side of a WHERE/HAVING term.
///
/// A plain scalar means equality with a placeholder; [`Op`] selects another
/// comparison operator; [`Raw`] splices a literal fragment (optionally
/// parameterized) after `column =`.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Value(Value),
    Cmp(Op),
    Raw(Raw),
}

impl From<Value> for Term {
    fn from(v: Value) -> Self {
        Term::Value(v)
    }
}

impl From<Op> for Term {
    fn from(op: Op) -> Self {
        Term::Cmp(op)
    }
}

impl From<Raw> for Term {
    fn from(raw: Raw) -> Self {
        Term::Raw(raw)
    }
}

impl From<&str> for Term {
    fn from(v: &str) -> Self {
        Term::Value(v.into())
    }
}

impl From<String> for Term {
    fn from(v: String) -> Self {
        Term::Value(v.into())
    }
}

impl From<bool> for Term {
    fn from(v: bool) -> Self {
        Term::Value(v.into())
    }
}

impl From<i32> for Term {
    fn from(v: i32) -> Self {
        Term::Value(v.into())
    }
}

impl From<i64> for Term {
    fn from(v: i64) -> Self {
        Term::Value(v.into())
    }
}

impl From<f64> for Term {
    fn from(v: f64) -> Self {
        Term::Value(v.into())
    }
}

/// Accumulating predicate builder for WHERE and HAVING clauses.
///
/// Terms render eagerly as they are added; bind values queue up in the same
/// order their `?` placeholders appear in the rendered clause. Invalid
/// input (an empty IN list, an empty raw fragment) is recorded and surfaced
/// by [`Condition::as_sql`], so chained `add` calls never fail mid-build.
#[derive(Debug, Clone)]
pub struct Condition {
    quoting: Quoting,
    logic: Logic,
    fragments: Vec<String>,
    bind: Vec<Value>,
    build_error: Option<String>,
}

impl Condition {
    /// Create an AND condition.
    pub fn new(quoting: Quoting) -> Self {
        Self::with_logic(quoting, Logic::And)
    }

    /// Create a condition joined by the given operator.
    pub fn with_logic(quoting: Quoting, logic: Logic) -> Self {
        Self {
            quoting,
            logic,
            fragments: Vec::new(),
            bind: Vec::new(),
            build_error: None,
        }
    }

    /// Check whether any terms have been added.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Get the build error, if any.
    pub fn build_error(&self) -> Option<&str> {
        self.build_error.as_deref()
    }

    fn fail(&mut self, message: impl Into<String>) {
        if self.build_error.is_none() {
            self.build_error = Some(message.into());
        }
    }

    /// Append one predicate term for `column`.
    ///
    /// The column is quoted unless it contains a function call, so aggregate
    /// expressions work in HAVING terms.
    pub fn add(&mut self, column: &str, term: impl Into<Term>) -> &mut Self {
        let col = self.quoting.quote_expr(column);
        match term.into() {
            Term::Value(v) => {
                self.fragments.push(format!("{col} = ?"));
                self.bind.push(v);
            }
            Term::Raw(raw) => {
                if let Err(err) = raw.validate() {
                    self.fail(err.to_string());
                    return self;
                }
                self.fragments.push(format!("{col} = {}", raw.sql()));
                self.bind.extend(raw.bind_values().iter().cloned());
            }
            Term::Cmp(op) => self.add_op(&col, op),
        }
        self
    }

    fn add_op(&mut self, col: &str, op: Op) {
        let (sql, values) = match op {
            Op::Eq(v) => (format!("{col} = ?"), vec![v]),
            Op::Ne(v) => (format!("{col} != ?"), vec![v]),
            Op::Gt(v) => (format!("{col} > ?"), vec![v]),
            Op::Gte(v) => (format!("{col} >= ?"), vec![v]),
            Op::Lt(v) => (format!("{col} < ?"), vec![v]),
            Op::Lte(v) => (format!("{col} <= ?"), vec![v]),
            Op::Like(v) => (format!("{col} LIKE ?"), vec![v]),
            Op::NotLike(v) => (format!("{col} NOT LIKE ?"), vec![v]),
            Op::In(values) | Op::NotIn(values) if values.is_empty() => {
                self.fail(format!("IN list for {col} must not be empty"));
                return;
            }
            Op::In(values) => {
                let placeholders = vec!["?"; values.len()].join(", ");
                (format!("{col} IN ({placeholders})"), values)
            }
            Op::NotIn(values) => {
                let placeholders = vec!["?"; values.len()].join(", ");
                (format!("{col} NOT IN ({placeholders})"), values)
            }
            Op::Between(from, to) => (format!("{col} BETWEEN ? AND ?"), vec![from, to]),
            Op::NotBetween(from, to) => (format!("{col} NOT BETWEEN ? AND ?"), vec![from, to]),
            Op::IsNull => (format!("{col} IS NULL"), Vec::new()),
            Op::IsNotNull => (format!("{col} IS NOT NULL"), Vec::new()),
        };
        self.fragments.push(sql);
        self.bind.extend(values);
    }

    /// Nest a finished condition group.
    ///
    /// An OR group embedded in an AND chain is parenthesized to preserve
    /// precedence; an empty group contributes nothing.
    pub fn add_group(&mut self, group: Condition) -> &mut Self {
        if let Some(err) = group.build_error {
            self.fail(err);
            return self;
        }
        if group.fragments.is_empty() {
            return self;
        }
        let sql = group.fragments.join(group.logic.joiner());
        self.fragments.push(if group.logic == Logic::Or {
            format!("({sql})")
        } else {
            sql
        });
        self.bind.extend(group.bind);
        self
    }

    /// Render the accumulated terms, or an empty string if there are none.
    ///
    /// With `wrap_in_parens`, an OR condition is wrapped in `(...)` so it
    /// can be embedded in an AND chain without changing precedence.
    pub fn as_sql(&self, wrap_in_parens: bool) -> BuildResult<String> {
        if let Some(err) = &self.build_error {
            return Err(BuildError::invalid_argument(err.clone()));
        }
        if self.fragments.is_empty() {
            return Ok(String::new());
        }
        let sql = self.fragments.join(self.logic.joiner());
        if wrap_in_parens && self.logic == Logic::Or {
            Ok(format!("({sql})"))
        } else {
            Ok(sql)
        }
    }

    /// Bind values in the order their placeholders appear in the SQL.
    pub fn bind(&self) -> &[Value] {
        &self.bind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond() -> Condition {
        Condition::new(Quoting::new('`', '.'))
    }

    #[test]
    fn scalar_renders_equality() {
        let mut c = cond();
        c.add("name", "bob");
        assert_eq!(c.as_sql(false).unwrap(), "`name` = ?");
        assert_eq!(c.bind(), &[Value::Text("bob".to_string())]);
    }

    #[test]
    fn terms_join_with_and() {
        let mut c = cond();
        c.add("status", "active").add("role_id", 1i64);
        assert_eq!(c.as_sql(false).unwrap(), "`status` = ? AND `role_id` = ?");
        assert_eq!(c.bind().len(), 2);
    }

    #[test]
    fn dotted_columns_quote_per_segment() {
        let mut c = cond();
        c.add("u.id", 5i64);
        assert_eq!(c.as_sql(false).unwrap(), "`u`.`id` = ?");
    }

    #[test]
    fn operator_forms() {
        let mut c = cond();
        c.add("age", Op::gt(18i64))
            .add("score", Op::between(10i64, 20i64))
            .add("deleted_at", Op::is_null());
        assert_eq!(
            c.as_sql(false).unwrap(),
            "`age` > ? AND `score` BETWEEN ? AND ? AND `deleted_at` IS NULL"
        );
        assert_eq!(c.bind().len(), 3);
    }

    #[test]
    fn in_list_expands_one_placeholder_per_element() {
        let mut c = cond();
        c.add("role_id", Op::in_list([1i64, 2, 3]));
        assert_eq!(c.as_sql(false).unwrap(), "`role_id` IN (?, ?, ?)");
        assert_eq!(c.bind().len(), 3);
    }

    #[test]
    fn empty_in_list_fails() {
        let mut c = cond();
        c.add("role_id", Op::in_list(Vec::<i64>::new()));
        let err = c.as_sql(false).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn raw_fragment_without_binds() {
        let mut c = cond();
        c.add("created_on", Raw::new("NOW()"));
        assert_eq!(c.as_sql(false).unwrap(), "`created_on` = NOW()");
        assert!(c.bind().is_empty());
    }

    #[test]
    fn raw_fragment_with_binds() {
        let mut c = cond();
        c.add("created_on", Raw::new("UNIX_TIMESTAMP(?)").bind("2011-04-12 00:34:12"));
        assert_eq!(c.as_sql(false).unwrap(), "`created_on` = UNIX_TIMESTAMP(?)");
        assert_eq!(c.bind().len(), 1);
    }

    #[test]
    fn empty_raw_fragment_fails() {
        let mut c = cond();
        c.add("created_on", Raw::new(""));
        assert!(c.as_sql(false).is_err());
    }

    #[test]
    fn or_condition_joins_with_or() {
        let mut c = Condition::with_logic(Quoting::new('`', '.'), Logic::Or);
        c.add("role", "admin").add("role", "superuser");
        assert_eq!(c.as_sql(false).unwrap(), "`role` = ? OR `role` = ?");
        assert_eq!(c.as_sql(true).unwrap(), "(`role` = ? OR `role` = ?)");
    }

    #[test]
    fn or_group_nested_in_and_chain_is_parenthesized() {
        let mut inner = Condition::with_logic(Quoting::new('`', '.'), Logic::Or);
        inner.add("role", "admin").add("role", "superuser");

        let mut c = cond();
        c.add("status", "active").add_group(inner);
        assert_eq!(
            c.as_sql(false).unwrap(),
            "`status` = ? AND (`role` = ? OR `role` = ?)"
        );
        assert_eq!(
            c.bind(),
            &[
                Value::Text("active".to_string()),
                Value::Text("admin".to_string()),
                Value::Text("superuser".to_string()),
            ]
        );
    }

    #[test]
    fn bind_count_matches_placeholder_count() {
        let mut c = cond();
        c.add("a", 1i64)
            .add("b", Op::in_list([1i64, 2]))
            .add("c", Raw::new("LEAST(?, ?)").bind(3i64).bind(4i64))
            .add("d", Op::is_not_null());
        let sql = c.as_sql(false).unwrap();
        assert_eq!(sql.matches('?').count(), c.bind().len());
    }

    #[test]
    fn rendering_is_idempotent() {
        let mut c = cond();
        c.add("a", 1i64).add("b", Op::in_list([2i64, 3]));
        let first = c.as_sql(false).unwrap();
        let second = c.as_sql(false).unwrap();
        assert_eq!(first, second);
        assert_eq!(c.bind(), c.bind());
    }

    #[test]
    fn empty_condition_renders_empty_string() {
        let c = cond();
        assert_eq!(c.as_sql(true).unwrap(), "");
    }
}
