use async_trait::async_trait;

use crate::error::TsqlTemplateError;
use crate::mssql;
use crate::mssql::MssqlClient;
use crate::mssql::transaction::Tx;
use crate::results::ResultSet;
use crate::statement::Statement;

/// Anything that can run a compiled statement.
///
/// Implemented by a bare connection and by an open transaction, so helper
/// code can be written once and run in either context.
#[async_trait]
pub trait StatementExecutor {
    /// Execute a SELECT and return the result set.
    async fn execute_select(
        &mut self,
        statement: &Statement,
    ) -> Result<ResultSet, TsqlTemplateError>;

    /// Execute a DML statement (INSERT, UPDATE, DELETE) and return the number
    /// of rows affected.
    async fn execute_dml(&mut self, statement: &Statement) -> Result<usize, TsqlTemplateError>;

    /// Execute a batch of parameterless SQL statements.
    async fn execute_batch(&mut self, sql: &str) -> Result<(), TsqlTemplateError>;
}

#[async_trait]
impl StatementExecutor for MssqlClient {
    async fn execute_select(
        &mut self,
        statement: &Statement,
    ) -> Result<ResultSet, TsqlTemplateError> {
        mssql::execute_select(self, statement).await
    }

    async fn execute_dml(&mut self, statement: &Statement) -> Result<usize, TsqlTemplateError> {
        mssql::execute_dml(self, statement).await
    }

    async fn execute_batch(&mut self, sql: &str) -> Result<(), TsqlTemplateError> {
        mssql::execute_batch(self, sql).await
    }
}

#[async_trait]
impl<'a> StatementExecutor for Tx<'a> {
    async fn execute_select(
        &mut self,
        statement: &Statement,
    ) -> Result<ResultSet, TsqlTemplateError> {
        Tx::execute_select(self, statement).await
    }

    async fn execute_dml(&mut self, statement: &Statement) -> Result<usize, TsqlTemplateError> {
        Tx::execute_dml(self, statement).await
    }

    async fn execute_batch(&mut self, sql: &str) -> Result<(), TsqlTemplateError> {
        Tx::execute_batch(self, sql).await
    }
}
