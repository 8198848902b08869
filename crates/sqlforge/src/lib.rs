//! # sqlforge
//!
//! A driver-aware SQL statement builder for Rust: structured descriptions of
//! tables, columns, values and predicates in; parameterized SQL plus an
//! ordered bind list out. Nothing here touches a database — executing the
//! statement is the caller's business.
//!
//! ## Features
//!
//! - **Parameter-safe**: values travel as `?` binds, never interpolated
//! - **Driver-aware quoting**: `` ` `` for MySQL, `"` elsewhere, overridable
//! - **Accumulating builders**: `&mut self` chaining, one-shot rendering
//! - **Raw escape hatch**: literal fragments (`NOW()`, `UNIX_TIMESTAMP(?)`)
//!   with their own bind values
//!
//! ## Example
//!
//! ```
//! use sqlforge::{Op, SelectOptions, StatementBuilder};
//!
//! let forge = StatementBuilder::for_driver("mysql")?;
//!
//! let stmt = forge.select(
//!     &["user".into()],
//!     &["id", "name"],
//!     &[("status", "active".into()), ("age", Op::gte(18).into())],
//!     SelectOptions::new().with_order_by("id DESC").with_limit(10),
//! )?;
//!
//! assert_eq!(
//!     stmt.sql,
//!     "SELECT `id`, `name`\nFROM `user`\nWHERE `status` = ? AND `age` >= ?\nORDER BY id DESC\nLIMIT 10"
//! );
//! assert_eq!(stmt.bind.len(), 2);
//! # Ok::<(), sqlforge::BuildError>(())
//! ```

pub mod builder;
pub mod condition;
pub mod error;
pub mod ident;
pub mod select;
pub mod value;

pub use builder::{
    BuilderConfig, InsertOptions, SelectOptions, SetField, Statement, StatementBuilder,
};
pub use condition::{Condition, Logic, Op, Term};
pub use error::{BuildError, BuildResult};
pub use ident::{Quoting, quote_identifier};
pub use select::{
    Direction, Join, JoinConstraint, JoinType, OrderTerm, SelectBuilder, SelectRender, TableRef,
};
pub use value::{Raw, Value};
