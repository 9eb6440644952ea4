//! Convenient imports for common functionality.

pub use crate::builder::StatementBuilder;
pub use crate::error::TsqlTemplateError;
pub use crate::executor::StatementExecutor;
pub use crate::mssql::{
    IsolationLevel, MssqlClient, MssqlConfig, Tx, begin_transaction, connect,
};
pub use crate::results::{ResultSet, Row};
pub use crate::statement::{Parameter, SlotValue, Statement, compile};
pub use crate::translation::positional_placeholders;
pub use crate::types::{BindOptions, SqlType, SqlValue, TypedValue, typed};
