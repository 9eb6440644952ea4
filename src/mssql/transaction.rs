use tiberius::Query;
use tracing::debug;

use super::config::MssqlClient;
use super::executor::{bind_statement, convert_affected_rows, execute_select};
use crate::error::TsqlTemplateError;
use crate::results::ResultSet;
use crate::statement::Statement;

/// T-SQL transaction isolation levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Snapshot,
    Serializable,
}

impl IsolationLevel {
    #[must_use]
    fn as_sql(self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Snapshot => "SNAPSHOT",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

/// Lightweight transaction wrapper for SQL Server.
///
/// Dropping a `Tx` without calling [`commit`](Tx::commit) or
/// [`rollback`](Tx::rollback) leaves the connection mid-transaction. Always
/// finish the transaction explicitly.
pub struct Tx<'a> {
    client: &'a mut MssqlClient,
    open: bool,
}

/// Begin a new transaction on the provided connection.
///
/// The optional isolation level is applied first with
/// `SET TRANSACTION ISOLATION LEVEL`; the optional name is spliced into
/// `BEGIN TRANSACTION` and must be a plain identifier.
///
/// # Errors
/// Returns `TsqlTemplateError::ParameterError` for an invalid transaction
/// name, or `TsqlTemplateError::ExecutionError` if issuing the statements
/// fails.
pub async fn begin_transaction<'a>(
    client: &'a mut MssqlClient,
    name: Option<&str>,
    isolation: Option<IsolationLevel>,
) -> Result<Tx<'a>, TsqlTemplateError> {
    if let Some(name) = name {
        if !valid_transaction_name(name) {
            return Err(TsqlTemplateError::ParameterError(format!(
                "invalid transaction name: {name}"
            )));
        }
    }

    if let Some(level) = isolation {
        Query::new(format!("SET TRANSACTION ISOLATION LEVEL {}", level.as_sql()))
            .execute(&mut *client)
            .await
            .map_err(|e| {
                TsqlTemplateError::ExecutionError(format!("MSSQL set isolation level error: {e}"))
            })?;
    }

    let begin_sql = match name {
        Some(name) => format!("BEGIN TRANSACTION {name}"),
        None => "BEGIN TRANSACTION".to_string(),
    };

    debug!(name = name.unwrap_or(""), "beginning transaction");

    Query::new(begin_sql).execute(&mut *client).await.map_err(|e| {
        TsqlTemplateError::ExecutionError(format!("MSSQL begin transaction error: {e}"))
    })?;

    Ok(Tx { client, open: true })
}

// T-SQL transaction names follow identifier rules, at most 32 characters
fn valid_transaction_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    name.len() <= 32
        && (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Tx<'_> {
    /// Execute a SELECT inside the transaction.
    ///
    /// # Errors
    /// Returns `TsqlTemplateError` if execution or result construction fails.
    pub async fn execute_select(
        &mut self,
        statement: &Statement,
    ) -> Result<ResultSet, TsqlTemplateError> {
        execute_select(self.client, statement).await
    }

    /// Execute a DML statement inside the transaction.
    ///
    /// # Errors
    /// Returns `TsqlTemplateError` if parameter conversion or execution fails,
    /// or the affected row count cannot be converted.
    pub async fn execute_dml(
        &mut self,
        statement: &Statement,
    ) -> Result<usize, TsqlTemplateError> {
        let query = bind_statement(statement)?;
        let exec_result = query.execute(&mut *self.client).await.map_err(|e| {
            TsqlTemplateError::ExecutionError(format!("MSSQL tx execute error: {e}"))
        })?;

        let rows_affected: u64 = exec_result.rows_affected().iter().sum();
        convert_affected_rows(rows_affected)
    }

    /// Execute a batch of parameterless SQL statements inside the transaction.
    ///
    /// # Errors
    /// Returns `TsqlTemplateError::ExecutionError` if execution fails.
    pub async fn execute_batch(&mut self, sql: &str) -> Result<(), TsqlTemplateError> {
        Query::new(sql).execute(&mut *self.client).await.map_err(|e| {
            TsqlTemplateError::ExecutionError(format!("MSSQL tx execute_batch error: {e}"))
        })?;
        Ok(())
    }

    /// Commit the transaction. Resolves exactly once.
    ///
    /// # Errors
    /// Returns `TsqlTemplateError::ExecutionError` if commit fails.
    pub async fn commit(mut self) -> Result<(), TsqlTemplateError> {
        if self.open {
            debug!("committing transaction");
            Query::new("COMMIT TRANSACTION")
                .execute(&mut *self.client)
                .await
                .map_err(|e| {
                    TsqlTemplateError::ExecutionError(format!("MSSQL commit error: {e}"))
                })?;
            self.open = false;
        }
        Ok(())
    }

    /// Roll back the transaction. Resolves exactly once.
    ///
    /// # Errors
    /// Returns `TsqlTemplateError::ExecutionError` if rollback fails.
    pub async fn rollback(mut self) -> Result<(), TsqlTemplateError> {
        if self.open {
            debug!("rolling back transaction");
            Query::new("ROLLBACK TRANSACTION")
                .execute(&mut *self.client)
                .await
                .map_err(|e| {
                    TsqlTemplateError::ExecutionError(format!("MSSQL rollback error: {e}"))
                })?;
            self.open = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_names_follow_identifier_rules() {
        assert!(valid_transaction_name("order_import"));
        assert!(valid_transaction_name("_t1"));
        assert!(!valid_transaction_name(""));
        assert!(!valid_transaction_name("1starts_with_digit"));
        assert!(!valid_transaction_name("has space"));
        assert!(!valid_transaction_name("x'; drop table t; --"));
        assert!(!valid_transaction_name(
            "name_longer_than_thirty_two_characters"
        ));
    }

    #[test]
    fn isolation_levels_render_their_sql() {
        assert_eq!(IsolationLevel::ReadCommitted.as_sql(), "READ COMMITTED");
        assert_eq!(IsolationLevel::Snapshot.as_sql(), "SNAPSHOT");
    }
}
