//! SELECT statement accumulator.
//!
//! [`SelectBuilder`] collects projection, FROM sources, JOINs, WHERE,
//! GROUP BY, HAVING, ORDER BY and pagination state, then linearizes the
//! whole statement in one pass. Mutators chain on `&mut self`; rendering
//! borrows immutably, so `as_sql`/`bind` can be called any number of times
//! with identical results.

use crate::condition::{Condition, Term};
use crate::error::{BuildError, BuildResult};
use crate::ident::Quoting;
use crate::value::Value;

/// A FROM source: a table name with an optional alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub table: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            alias: None,
        }
    }

    pub fn aliased(table: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            alias: Some(alias.into()),
        }
    }
}

impl From<&str> for TableRef {
    fn from(table: &str) -> Self {
        Self::new(table)
    }
}

impl From<String> for TableRef {
    fn from(table: String) -> Self {
        Self::new(table)
    }
}

impl From<(&str, &str)> for TableRef {
    fn from((table, alias): (&str, &str)) -> Self {
        Self::aliased(table, alias)
    }
}

/// Type of JOIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinType {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
            JoinType::Cross => "CROSS JOIN",
        }
    }
}

/// How a JOIN is constrained.
///
/// `On` text is literal SQL inserted verbatim; join conditions never carry
/// bind values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinConstraint {
    On(String),
    Using(Vec<String>),
}

/// One JOIN clause, attached to a base table via [`SelectBuilder::add_join`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub kind: JoinType,
    pub table: String,
    pub alias: Option<String>,
    pub constraint: Option<JoinConstraint>,
}

impl Join {
    pub fn new(kind: JoinType, table: impl Into<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            alias: None,
            constraint: None,
        }
    }

    pub fn inner(table: impl Into<String>) -> Self {
        Self::new(JoinType::Inner, table)
    }

    pub fn left(table: impl Into<String>) -> Self {
        Self::new(JoinType::Left, table)
    }

    pub fn right(table: impl Into<String>) -> Self {
        Self::new(JoinType::Right, table)
    }

    pub fn full(table: impl Into<String>) -> Self {
        Self::new(JoinType::Full, table)
    }

    pub fn cross(table: impl Into<String>) -> Self {
        Self::new(JoinType::Cross, table)
    }

    /// Alias the joined table.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Constrain with a literal `ON` condition.
    pub fn on(mut self, condition: impl Into<String>) -> Self {
        self.constraint = Some(JoinConstraint::On(condition.into()));
        self
    }

    /// Constrain with `USING (columns...)`.
    pub fn using<T: Into<String>>(mut self, columns: impl IntoIterator<Item = T>) -> Self {
        self.constraint = Some(JoinConstraint::Using(
            columns.into_iter().map(Into::into).collect(),
        ));
        self
    }
}

/// ORDER BY direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One ORDER BY term: either a verbatim `"col DESC"` string or a
/// column/direction pair that gets the column quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderTerm {
    Raw(String),
    Column { column: String, direction: Direction },
}

impl OrderTerm {
    pub fn column(column: impl Into<String>, direction: Direction) -> Self {
        OrderTerm::Column {
            column: column.into(),
            direction,
        }
    }
}

impl From<&str> for OrderTerm {
    fn from(raw: &str) -> Self {
        OrderTerm::Raw(raw.to_string())
    }
}

impl From<String> for OrderTerm {
    fn from(raw: String) -> Self {
        OrderTerm::Raw(raw)
    }
}

/// Render variant selected once per factory by driver name.
///
/// Oracle has no LIMIT clause; its variant wraps the rendered statement in
/// a ROWNUM / ROW_NUMBER() filter instead. Everything else renders the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectRender {
    #[default]
    Standard,
    Oracle,
}

const ORACLE_ROWNUM_COLUMN: &str = "ROW_NUMBER() OVER (ORDER BY 1) R";

/// Accumulator for one SELECT statement.
///
/// # Example
/// ```
/// use sqlforge::{Quoting, SelectBuilder};
///
/// let mut stmt = SelectBuilder::new(Quoting::new('`', '.'));
/// stmt.add_select("*").add_from("foo");
/// assert_eq!(stmt.as_sql().unwrap(), "SELECT *\nFROM `foo`");
/// ```
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    quoting: Quoting,
    new_line: String,
    render: SelectRender,
    prefix: String,
    projection: Vec<String>,
    from: Vec<TableRef>,
    joins: Vec<(String, Join)>,
    where_: Condition,
    group_by: Vec<String>,
    having: Condition,
    order_by: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    for_update: bool,
    build_error: Option<String>,
}

impl SelectBuilder {
    /// Create a standard-rendering accumulator with `"\n"` clause separation.
    pub fn new(quoting: Quoting) -> Self {
        Self {
            quoting,
            new_line: "\n".to_string(),
            render: SelectRender::Standard,
            prefix: "SELECT ".to_string(),
            projection: Vec::new(),
            from: Vec::new(),
            joins: Vec::new(),
            where_: Condition::new(quoting),
            group_by: Vec::new(),
            having: Condition::new(quoting),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            for_update: false,
            build_error: None,
        }
    }

    /// Set the clause separator (`"\n"` by default, `" "` for one-liners).
    pub fn new_line(&mut self, new_line: impl Into<String>) -> &mut Self {
        self.new_line = new_line.into();
        self
    }

    /// Set the render variant.
    pub fn render_with(&mut self, render: SelectRender) -> &mut Self {
        self.render = render;
        self
    }

    fn fail(&mut self, message: impl Into<String>) {
        if self.build_error.is_none() {
            self.build_error = Some(message.into());
        }
    }

    /// Append a projection expression, quoted unless it is `*` or contains
    /// a function call.
    pub fn add_select(&mut self, expr: &str) -> &mut Self {
        let rendered = self.quoting.quote_expr(expr);
        self.projection.push(rendered);
        self
    }

    /// Append an aliased projection expression.
    pub fn add_select_as(&mut self, expr: &str, alias: &str) -> &mut Self {
        let rendered = format!(
            "{} AS {}",
            self.quoting.quote_expr(expr),
            self.quoting.quote(alias)
        );
        self.projection.push(rendered);
        self
    }

    /// Append a FROM source.
    pub fn add_from(&mut self, table: impl Into<TableRef>) -> &mut Self {
        self.from.push(table.into());
        self
    }

    /// Append a JOIN against `base_table`.
    ///
    /// Joins accumulate: two calls against the same base render both
    /// clauses, in call order.
    pub fn add_join(&mut self, base_table: &str, join: Join) -> &mut Self {
        self.joins.push((base_table.to_string(), join));
        self
    }

    /// Append a WHERE term.
    pub fn add_where(&mut self, column: &str, term: impl Into<Term>) -> &mut Self {
        self.where_.add(column, term);
        self
    }

    /// Nest a finished condition group (typically an OR group) into WHERE.
    pub fn add_where_group(&mut self, group: Condition) -> &mut Self {
        self.where_.add_group(group);
        self
    }

    /// Append a GROUP BY expression.
    pub fn add_group_by(&mut self, expr: &str) -> &mut Self {
        let rendered = self.quoting.quote_expr(expr);
        self.group_by.push(rendered);
        self
    }

    /// Append a HAVING term.
    pub fn add_having(&mut self, column: &str, term: impl Into<Term>) -> &mut Self {
        self.having.add(column, term);
        self
    }

    /// Append an ORDER BY term.
    pub fn add_order_by(&mut self, term: impl Into<OrderTerm>) -> &mut Self {
        let rendered = match term.into() {
            OrderTerm::Raw(raw) => raw,
            OrderTerm::Column { column, direction } => {
                format!("{} {}", self.quoting.quote(&column), direction.as_str())
            }
        };
        self.order_by.push(rendered);
        self
    }

    /// Set LIMIT; negative values are rejected.
    pub fn limit(&mut self, n: i64) -> &mut Self {
        if n < 0 {
            self.fail(format!("LIMIT must be non-negative, got {n}"));
        } else {
            self.limit = Some(n);
        }
        self
    }

    /// Set OFFSET; negative values are rejected.
    pub fn offset(&mut self, n: i64) -> &mut Self {
        if n < 0 {
            self.fail(format!("OFFSET must be non-negative, got {n}"));
        } else {
            self.offset = Some(n);
        }
        self
    }

    /// Replace the statement prefix (default `"SELECT "`).
    ///
    /// The projection list is appended directly after it, so include any
    /// trailing space the prefix needs.
    pub fn prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.prefix = prefix.into();
        self
    }

    /// Toggle the `FOR UPDATE` suffix.
    pub fn for_update(&mut self, on: bool) -> &mut Self {
        self.for_update = on;
        self
    }

    /// Render the statement.
    pub fn as_sql(&self) -> BuildResult<String> {
        if let Some(err) = &self.build_error {
            return Err(BuildError::invalid_argument(err.clone()));
        }
        match self.render {
            SelectRender::Standard => self.render_clauses(true, None),
            SelectRender::Oracle => self.render_oracle(),
        }
    }

    /// Bind values in clause-emission order: WHERE binds, then HAVING binds.
    pub fn bind(&self) -> Vec<Value> {
        let mut bind = self.where_.bind().to_vec();
        bind.extend(self.having.bind().iter().cloned());
        bind
    }

    fn render_clauses(
        &self,
        include_limit: bool,
        extra_projection: Option<&str>,
    ) -> BuildResult<String> {
        let mut clauses: Vec<String> = Vec::new();

        let mut projection = self.projection.clone();
        if let Some(extra) = extra_projection {
            if projection.is_empty() {
                projection.push("*".to_string());
            }
            projection.push(extra.to_string());
        }
        if !projection.is_empty() {
            clauses.push(format!("{}{}", self.prefix, projection.join(", ")));
        }

        if !self.from.is_empty() || !self.joins.is_empty() {
            clauses.push(format!("FROM {}", self.render_from()));
        }

        let where_sql = self.where_.as_sql(true)?;
        if !where_sql.is_empty() {
            clauses.push(format!("WHERE {where_sql}"));
        }

        if !self.group_by.is_empty() {
            clauses.push(format!("GROUP BY {}", self.group_by.join(", ")));
        }

        let having_sql = self.having.as_sql(true)?;
        if !having_sql.is_empty() {
            clauses.push(format!("HAVING {having_sql}"));
        }

        if !self.order_by.is_empty() {
            clauses.push(format!("ORDER BY {}", self.order_by.join(", ")));
        }

        if include_limit {
            match (self.limit, self.offset) {
                (Some(limit), Some(offset)) => clauses.push(format!("LIMIT {limit} OFFSET {offset}")),
                (Some(limit), None) => clauses.push(format!("LIMIT {limit}")),
                (None, Some(offset)) => clauses.push(format!("OFFSET {offset}")),
                (None, None) => {}
            }
        }

        if self.for_update {
            clauses.push("FOR UPDATE".to_string());
        }

        Ok(clauses.join(&self.new_line))
    }

    /// Oracle LIMIT/OFFSET emulation: render without a LIMIT clause, then
    /// wrap in a ROWNUM / ROW_NUMBER() filter.
    fn render_oracle(&self) -> BuildResult<String> {
        match (self.limit, self.offset) {
            (None, None) => self.render_clauses(true, None),
            (Some(limit), None) => {
                let inner = self.render_clauses(false, None)?;
                Ok(format!("SELECT * FROM ( {inner} ) WHERE ROWNUM <= {limit}"))
            }
            (Some(limit), Some(offset)) => {
                let inner = self.render_clauses(false, Some(ORACLE_ROWNUM_COLUMN))?;
                Ok(format!(
                    "SELECT * FROM ( {inner} ) WHERE R BETWEEN {} AND {}",
                    offset + 1,
                    limit + offset
                ))
            }
            (None, Some(offset)) => {
                let inner = self.render_clauses(false, Some(ORACLE_ROWNUM_COLUMN))?;
                Ok(format!("SELECT * FROM ( {inner} ) WHERE R > {offset}"))
            }
        }
    }

    fn has_joins(&self, table: &str) -> bool {
        self.joins.iter().any(|(base, _)| base == table)
    }

    fn render_from(&self) -> String {
        let mut segments: Vec<String> = Vec::new();

        // FROM sources that anchor joins come first, with their joins attached.
        for source in self.from.iter().filter(|s| self.has_joins(&s.table)) {
            segments.push(self.render_join_group(&source.table, source.alias.as_deref()));
        }

        // Join groups whose base never appears in the FROM list, in the
        // order their first join was added.
        let mut seen: Vec<&str> = Vec::new();
        for (base, _) in &self.joins {
            let in_from = self.from.iter().any(|s| &s.table == base);
            if !in_from && !seen.contains(&base.as_str()) {
                seen.push(base.as_str());
                segments.push(self.render_join_group(base, None));
            }
        }

        // Plain FROM sources.
        for source in self.from.iter().filter(|s| !self.has_joins(&s.table)) {
            let mut segment = self.quoting.quote(&source.table);
            if let Some(alias) = &source.alias {
                segment.push(' ');
                segment.push_str(&self.quoting.quote(alias));
            }
            segments.push(segment);
        }

        segments.join(", ")
    }

    fn render_join_group(&self, base: &str, alias: Option<&str>) -> String {
        let mut sql = self.quoting.quote(base);
        if let Some(alias) = alias {
            sql.push(' ');
            sql.push_str(&self.quoting.quote(alias));
        }
        for (_, join) in self.joins.iter().filter(|(b, _)| b == base) {
            sql.push(' ');
            sql.push_str(join.kind.as_str());
            sql.push(' ');
            sql.push_str(&self.quoting.quote(&join.table));
            if let Some(alias) = &join.alias {
                sql.push(' ');
                sql.push_str(&self.quoting.quote(alias));
            }
            match &join.constraint {
                Some(JoinConstraint::On(condition)) => {
                    sql.push_str(" ON ");
                    sql.push_str(condition);
                }
                Some(JoinConstraint::Using(columns)) => {
                    let cols: Vec<String> =
                        columns.iter().map(|c| self.quoting.quote(c)).collect();
                    sql.push_str(" USING (");
                    sql.push_str(&cols.join(", "));
                    sql.push(')');
                }
                None => {}
            }
        }
        sql
    }
}
