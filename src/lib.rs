//! Parameterized T-SQL statement templating with async execution via tiberius.
//!
//! The core is a pure statement compiler: literal SQL fragments interleaved
//! with value slots become a single SQL string with `@name` placeholders plus
//! an ordered list of named parameter bindings. Scalars bind as one
//! placeholder, flat lists expand to `@a, @b, @c`, and nested lists expand to
//! parenthesized row groups for multi-row INSERT. Generated names are unique
//! within a statement and a pure function of position.
//!
//! ```rust
//! use tsql_template::prelude::*;
//!
//! let statement = StatementBuilder::new("insert into a (b, c) values ")
//!     .bind(vec![vec![1, 2], vec![3, 4]])
//!     .compile();
//!
//! assert_eq!(
//!     statement.sql,
//!     "insert into a (b, c) values (@p0_0, @p0_1), (@p0_2, @p0_3)"
//! );
//! assert_eq!(statement.parameters.len(), 4);
//! ```
//!
//! Execution is a thin async layer over tiberius: [`mssql::connect`] opens a
//! connection, [`StatementExecutor`] runs compiled statements on it (or on an
//! open [`mssql::Tx`]), and values annotated with [`typed`] control the wire
//! type they bind as.

pub mod builder;
pub mod error;
pub mod executor;
pub mod mssql;
pub mod prelude;
pub mod results;
pub mod statement;
pub mod translation;
pub mod types;

pub use builder::StatementBuilder;
pub use error::TsqlTemplateError;
pub use executor::StatementExecutor;
pub use statement::{Parameter, SlotValue, Statement, compile};
pub use types::{BindOptions, SqlType, SqlValue, TypedValue, typed};
