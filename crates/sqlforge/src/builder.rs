//! Statement factory.
//!
//! [`StatementBuilder`] is the public entry point: it holds the shared
//! quoting/newline configuration selected by driver name and turns
//! structured `insert`/`update`/`delete`/`select` requests into a
//! [`Statement`] — parameterized SQL plus bind values in placeholder order.
//! Each call allocates fresh accumulators, so a factory can be shared
//! freely across threads.

use serde::Serialize;
use tracing::debug;

use crate::condition::{Condition, Term};
use crate::error::{BuildError, BuildResult};
use crate::ident::Quoting;
use crate::select::{OrderTerm, SelectBuilder, SelectRender, TableRef};
use crate::value::{Raw, Value};

/// Factory configuration.
///
/// `driver` is required. Unless overridden, a `mysql` driver quotes with
/// `` ` `` and every other driver with `"`; an `oracle` driver additionally
/// selects the Oracle SELECT render variant.
///
/// # Example
/// ```
/// use sqlforge::{BuilderConfig, StatementBuilder};
///
/// let forge = StatementBuilder::new(
///     BuilderConfig::new("mysql").with_new_line(" "),
/// ).unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct BuilderConfig {
    driver: String,
    quote_char: Option<char>,
    name_sep: Option<char>,
    new_line: Option<String>,
}

impl BuilderConfig {
    /// Create a configuration for the given driver name.
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            ..Self::default()
        }
    }

    /// Override the identifier quote character.
    pub fn with_quote_char(mut self, quote_char: char) -> Self {
        self.quote_char = Some(quote_char);
        self
    }

    /// Override the qualified-name separator (default `.`).
    pub fn with_name_sep(mut self, name_sep: char) -> Self {
        self.name_sep = Some(name_sep);
        self
    }

    /// Override the clause separator (default `"\n"`; use `" "` for
    /// single-line statements).
    pub fn with_new_line(mut self, new_line: impl Into<String>) -> Self {
        self.new_line = Some(new_line.into());
        self
    }
}

/// Value slot for an INSERT or UPDATE column.
#[derive(Debug, Clone, PartialEq)]
pub enum SetField {
    /// Parameterized value: renders `?` and pushes one bind.
    Value(Value),
    /// Raw SQL expression: rendered verbatim, its binds appended in order.
    Raw(Raw),
}

impl From<Value> for SetField {
    fn from(v: Value) -> Self {
        SetField::Value(v)
    }
}

impl From<Raw> for SetField {
    fn from(raw: Raw) -> Self {
        SetField::Raw(raw)
    }
}

impl From<&str> for SetField {
    fn from(v: &str) -> Self {
        SetField::Value(v.into())
    }
}

impl From<String> for SetField {
    fn from(v: String) -> Self {
        SetField::Value(v.into())
    }
}

impl From<bool> for SetField {
    fn from(v: bool) -> Self {
        SetField::Value(v.into())
    }
}

impl From<i32> for SetField {
    fn from(v: i32) -> Self {
        SetField::Value(v.into())
    }
}

impl From<i64> for SetField {
    fn from(v: i64) -> Self {
        SetField::Value(v.into())
    }
}

impl From<f64> for SetField {
    fn from(v: f64) -> Self {
        SetField::Value(v.into())
    }
}

/// Options recognized by [`StatementBuilder::insert`].
#[derive(Debug, Clone, Default)]
pub struct InsertOptions {
    /// Statement prefix, `INSERT INTO` unless set (e.g. `INSERT IGNORE INTO`).
    pub prefix: Option<String>,
}

impl InsertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

/// Options recognized by [`StatementBuilder::select`].
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    /// Statement prefix, `SELECT ` unless set.
    pub prefix: Option<String>,
    pub order_by: Vec<OrderTerm>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// HAVING terms, in the same `(column, term)` form as WHERE.
    pub having: Vec<(String, Term)>,
    pub for_update: bool,
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_order_by(mut self, term: impl Into<OrderTerm>) -> Self {
        self.order_by.push(term.into());
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_having(mut self, column: impl Into<String>, term: impl Into<Term>) -> Self {
        self.having.push((column.into(), term.into()));
        self
    }

    pub fn with_for_update(mut self) -> Self {
        self.for_update = true;
        self
    }
}

/// A rendered statement: SQL text plus bind values.
///
/// Bind values appear in the same left-to-right order as their `?`
/// placeholders in `sql`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub sql: String,
    pub bind: Vec<Value>,
}

impl Statement {
    /// Split into the `(sql, bind)` pair.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.bind)
    }
}

/// The top-level statement builder.
///
/// Immutable once constructed; every operation is a pure function of its
/// arguments and this configuration.
///
/// # Example
/// ```
/// use sqlforge::{InsertOptions, StatementBuilder};
///
/// let forge = StatementBuilder::for_driver("mysql").unwrap();
/// let stmt = forge
///     .insert("user", &[("name", "bob".into())], InsertOptions::new())
///     .unwrap();
/// assert_eq!(stmt.sql, "INSERT INTO `user`\n(`name`)\nVALUES (?)");
/// assert_eq!(stmt.bind.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    quoting: Quoting,
    new_line: String,
    driver: String,
    render: SelectRender,
}

impl StatementBuilder {
    /// Create a factory from a configuration.
    pub fn new(config: BuilderConfig) -> BuildResult<Self> {
        if config.driver.is_empty() {
            return Err(BuildError::configuration(
                "a driver name is required to create a statement builder",
            ));
        }

        let quote_char = config
            .quote_char
            .unwrap_or(if config.driver == "mysql" { '`' } else { '"' });
        let name_sep = config.name_sep.unwrap_or('.');
        let render = if config.driver.eq_ignore_ascii_case("oracle") {
            SelectRender::Oracle
        } else {
            SelectRender::Standard
        };

        Ok(Self {
            quoting: Quoting::new(quote_char, name_sep),
            new_line: config.new_line.unwrap_or_else(|| "\n".to_string()),
            driver: config.driver,
            render,
        })
    }

    /// Create a factory with the driver's default configuration.
    pub fn for_driver(driver: impl Into<String>) -> BuildResult<Self> {
        Self::new(BuilderConfig::new(driver))
    }

    /// The configured driver name.
    pub fn driver(&self) -> &str {
        &self.driver
    }

    /// The quoting configuration shared into every builder this factory
    /// creates.
    pub fn quoting(&self) -> Quoting {
        self.quoting
    }

    /// Create a fresh, pre-configured condition builder.
    pub fn new_condition(&self) -> Condition {
        Condition::new(self.quoting)
    }

    /// Create a fresh, pre-configured SELECT accumulator.
    pub fn new_select(&self) -> SelectBuilder {
        let mut stmt = SelectBuilder::new(self.quoting);
        stmt.new_line(self.new_line.clone()).render_with(self.render);
        stmt
    }

    fn quote(&self, label: &str) -> String {
        self.quoting.quote(label)
    }

    /// Build an INSERT statement.
    ///
    /// Columns, value slots and binds accumulate in pair order; a
    /// [`SetField::Raw`] slot splices its SQL verbatim instead of a `?`.
    pub fn insert(
        &self,
        table: &str,
        pairs: &[(&str, SetField)],
        opts: InsertOptions,
    ) -> BuildResult<Statement> {
        if pairs.is_empty() {
            return Err(BuildError::invalid_argument(
                "INSERT requires at least one column/value pair",
            ));
        }

        let prefix = opts.prefix.as_deref().unwrap_or("INSERT INTO");
        let mut columns: Vec<String> = Vec::with_capacity(pairs.len());
        let mut slots: Vec<String> = Vec::with_capacity(pairs.len());
        let mut bind: Vec<Value> = Vec::new();

        for (column, field) in pairs {
            columns.push(self.quote(column));
            match field {
                SetField::Value(v) => {
                    slots.push("?".to_string());
                    bind.push(v.clone());
                }
                SetField::Raw(raw) => {
                    raw.validate()?;
                    slots.push(raw.sql().to_string());
                    bind.extend(raw.bind_values().iter().cloned());
                }
            }
        }

        let nl = &self.new_line;
        let sql = format!(
            "{prefix} {table}{nl}({columns}){nl}VALUES ({slots})",
            table = self.quote(table),
            columns = columns.join(", "),
            slots = slots.join(", "),
        );
        debug!(target: "sqlforge.sql", statement = "insert", param_count = bind.len(), sql = %sql);
        Ok(Statement { sql, bind })
    }

    /// Build an UPDATE statement.
    ///
    /// SET binds precede WHERE binds, matching their placeholder order.
    pub fn update(
        &self,
        table: &str,
        pairs: &[(&str, SetField)],
        where_: &[(&str, Term)],
    ) -> BuildResult<Statement> {
        if table.is_empty() {
            return Err(BuildError::invalid_argument("UPDATE requires a table name"));
        }
        if pairs.is_empty() {
            return Err(BuildError::invalid_argument(
                "UPDATE requires at least one SET column/value pair",
            ));
        }

        let mut sets: Vec<String> = Vec::with_capacity(pairs.len());
        let mut bind: Vec<Value> = Vec::new();

        for (column, field) in pairs {
            let quoted = self.quote(column);
            match field {
                SetField::Value(v) => {
                    sets.push(format!("{quoted} = ?"));
                    bind.push(v.clone());
                }
                SetField::Raw(raw) => {
                    raw.validate()?;
                    sets.push(format!("{quoted} = {}", raw.sql()));
                    bind.extend(raw.bind_values().iter().cloned());
                }
            }
        }

        let (where_sql, where_bind) = self.make_where_clause(where_)?;
        bind.extend(where_bind);

        let sql = format!(
            "UPDATE {} SET {}{}",
            self.quote(table),
            sets.join(", "),
            where_sql,
        );
        debug!(target: "sqlforge.sql", statement = "update", param_count = bind.len(), sql = %sql);
        Ok(Statement { sql, bind })
    }

    /// Build a DELETE statement. An empty `where_` produces no WHERE clause.
    pub fn delete(&self, table: &str, where_: &[(&str, Term)]) -> BuildResult<Statement> {
        let (where_sql, bind) = self.make_where_clause(where_)?;
        let sql = format!("DELETE FROM {}{}", self.quote(table), where_sql);
        debug!(target: "sqlforge.sql", statement = "delete", param_count = bind.len(), sql = %sql);
        Ok(Statement { sql, bind })
    }

    /// Build a SELECT statement.
    ///
    /// `tables` lists FROM sources (plain or aliased); for joins, use
    /// [`StatementBuilder::new_select`] directly.
    pub fn select(
        &self,
        tables: &[TableRef],
        fields: &[&str],
        where_: &[(&str, Term)],
        opts: SelectOptions,
    ) -> BuildResult<Statement> {
        let mut stmt = self.new_select();

        for field in fields {
            stmt.add_select(field);
        }
        for table in tables {
            stmt.add_from(table.clone());
        }
        if let Some(prefix) = opts.prefix {
            stmt.prefix(prefix);
        }
        for (column, term) in where_ {
            stmt.add_where(column, term.clone());
        }
        for term in opts.order_by {
            stmt.add_order_by(term);
        }
        if let Some(limit) = opts.limit {
            stmt.limit(limit);
        }
        if let Some(offset) = opts.offset {
            stmt.offset(offset);
        }
        for (column, term) in opts.having {
            stmt.add_having(&column, term);
        }
        if opts.for_update {
            stmt.for_update(true);
        }

        let sql = stmt.as_sql()?;
        let bind = stmt.bind();
        debug!(target: "sqlforge.sql", statement = "select", param_count = bind.len(), sql = %sql);
        Ok(Statement { sql, bind })
    }

    fn make_where_clause(&self, terms: &[(&str, Term)]) -> BuildResult<(String, Vec<Value>)> {
        let mut condition = self.new_condition();
        for (column, term) in terms {
            condition.add(column, term.clone());
        }
        let sql = condition.as_sql(true)?;
        let bind = condition.bind().to_vec();
        if sql.is_empty() {
            Ok((String::new(), bind))
        } else {
            Ok((format!(" WHERE {sql}"), bind))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Op;

    fn mysql() -> StatementBuilder {
        StatementBuilder::for_driver("mysql").unwrap()
    }

    #[test]
    fn driver_is_required() {
        let err = StatementBuilder::new(BuilderConfig::default()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn mysql_defaults_to_backtick() {
        let forge = mysql();
        assert_eq!(forge.quoting().quote_char, '`');
    }

    #[test]
    fn other_drivers_default_to_double_quote() {
        let forge = StatementBuilder::for_driver("postgresql").unwrap();
        assert_eq!(forge.quoting().quote_char, '"');
    }

    #[test]
    fn quote_char_override_wins() {
        let forge =
            StatementBuilder::new(BuilderConfig::new("mysql").with_quote_char('"')).unwrap();
        assert_eq!(forge.quoting().quote_char, '"');
    }

    #[test]
    fn insert_simple() {
        let stmt = mysql()
            .insert(
                "user",
                &[("name", "bob".into()), ("age", 30i64.into())],
                InsertOptions::new(),
            )
            .unwrap();
        assert_eq!(stmt.sql, "INSERT INTO `user`\n(`name`, `age`)\nVALUES (?, ?)");
        assert_eq!(
            stmt.bind,
            vec![Value::Text("bob".to_string()), Value::Int(30)]
        );
    }

    #[test]
    fn insert_raw_without_binds() {
        let stmt = mysql()
            .insert(
                "foo",
                &[("created_on", Raw::new("NOW()").into())],
                InsertOptions::new(),
            )
            .unwrap();
        assert_eq!(stmt.sql, "INSERT INTO `foo`\n(`created_on`)\nVALUES (NOW())");
        assert!(stmt.bind.is_empty());
    }

    #[test]
    fn insert_raw_with_binds() {
        let stmt = mysql()
            .insert(
                "foo",
                &[(
                    "created_on",
                    Raw::new("UNIX_TIMESTAMP(?)").bind("2011-04-12 00:34:12").into(),
                )],
                InsertOptions::new(),
            )
            .unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO `foo`\n(`created_on`)\nVALUES (UNIX_TIMESTAMP(?))"
        );
        assert_eq!(
            stmt.bind,
            vec![Value::Text("2011-04-12 00:34:12".to_string())]
        );
    }

    #[test]
    fn insert_prefix_option() {
        let stmt = mysql()
            .insert(
                "foo",
                &[("name", "bob".into())],
                InsertOptions::new().with_prefix("INSERT IGNORE INTO"),
            )
            .unwrap();
        assert!(stmt.sql.starts_with("INSERT IGNORE INTO `foo`"));
    }

    #[test]
    fn insert_empty_pairs_fails() {
        let err = mysql().insert("foo", &[], InsertOptions::new()).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn update_set_binds_precede_where_binds() {
        let stmt = mysql()
            .update("foo", &[("name", "bob".into())], &[("id", 5i64.into())])
            .unwrap();
        assert_eq!(stmt.sql, "UPDATE `foo` SET `name` = ? WHERE `id` = ?");
        assert_eq!(
            stmt.bind,
            vec![Value::Text("bob".to_string()), Value::Int(5)]
        );
    }

    #[test]
    fn update_raw_set_field() {
        let stmt = mysql()
            .update(
                "foo",
                &[("counter", Raw::new("counter + ?").bind(1i64).into())],
                &[("id", 5i64.into())],
            )
            .unwrap();
        assert_eq!(stmt.sql, "UPDATE `foo` SET `counter` = counter + ? WHERE `id` = ?");
        assert_eq!(stmt.bind, vec![Value::Int(1), Value::Int(5)]);
    }

    #[test]
    fn update_empty_pairs_fails() {
        let err = mysql().update("foo", &[], &[]).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn delete_with_where() {
        let stmt = mysql().delete("foo", &[("id", 5i64.into())]).unwrap();
        assert_eq!(stmt.sql, "DELETE FROM `foo` WHERE `id` = ?");
        assert_eq!(stmt.bind, vec![Value::Int(5)]);
    }

    #[test]
    fn delete_without_where() {
        let stmt = mysql().delete("foo", &[]).unwrap();
        assert_eq!(stmt.sql, "DELETE FROM `foo`");
        assert!(stmt.bind.is_empty());
    }

    #[test]
    fn select_with_options() {
        let stmt = mysql()
            .select(
                &["user".into()],
                &["id", "name"],
                &[("status", "active".into())],
                SelectOptions::new()
                    .with_order_by("created_on DESC")
                    .with_limit(10)
                    .with_offset(20),
            )
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT `id`, `name`\nFROM `user`\nWHERE `status` = ?\nORDER BY created_on DESC\nLIMIT 10 OFFSET 20"
        );
        assert_eq!(stmt.bind, vec![Value::Text("active".to_string())]);
    }

    #[test]
    fn select_having_uses_where_term_form() {
        let stmt = StatementBuilder::new(BuilderConfig::new("mysql").with_new_line(" "))
            .unwrap()
            .select(
                &["orders".into()],
                &["user_id", "COUNT(*)"],
                &[],
                SelectOptions::new().with_having("COUNT(*)", Op::gt(5i64)),
            )
            .unwrap();
        assert!(stmt.sql.ends_with("HAVING COUNT(*) > ?"));
        assert_eq!(stmt.bind, vec![Value::Int(5)]);
    }

    #[test]
    fn select_aliased_tables() {
        let stmt = StatementBuilder::new(BuilderConfig::new("mysql").with_new_line(" "))
            .unwrap()
            .select(
                &[TableRef::aliased("user", "u"), "role".into()],
                &["*"],
                &[],
                SelectOptions::new(),
            )
            .unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM `user` `u`, `role`");
    }

    #[test]
    fn oracle_driver_selects_oracle_render() {
        let stmt = StatementBuilder::new(BuilderConfig::new("Oracle").with_new_line(" "))
            .unwrap()
            .select(
                &["foo".into()],
                &["*"],
                &[],
                SelectOptions::new().with_limit(10),
            )
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM ( SELECT * FROM \"foo\" ) WHERE ROWNUM <= 10"
        );
    }

    #[test]
    fn statement_serializes() {
        let stmt = mysql().delete("foo", &[("id", 5i64.into())]).unwrap();
        let json = serde_json::to_value(&stmt).unwrap();
        assert_eq!(json["sql"], "DELETE FROM `foo` WHERE `id` = ?");
        assert_eq!(json["bind"][0], 5);
    }
}
