use std::sync::Arc;

use chrono::NaiveDateTime;
use futures_util::TryStreamExt;
use tiberius::Query;
use tracing::debug;

use super::config::MssqlClient;
use super::params::bind_value;
use crate::error::TsqlTemplateError;
use crate::results::ResultSet;
use crate::statement::Statement;
use crate::translation::positional_placeholders;
use crate::types::SqlValue;

/// Bind a compiled statement into a tiberius query.
///
/// Placeholders are rewritten to the positional form in binding order; the
/// statement's name-uniqueness guarantee is what makes that rewrite safe.
pub(crate) fn bind_statement(statement: &Statement) -> Result<Query<'_>, TsqlTemplateError> {
    let sql = positional_placeholders(&statement.sql, &statement.parameters);
    let mut query = Query::new(sql.into_owned());

    for parameter in &statement.parameters {
        query.bind(bind_value(parameter)?);
    }

    Ok(query)
}

/// Execute a SELECT and materialize the result set.
///
/// # Errors
/// Returns `TsqlTemplateError` if parameter conversion, execution, or result
/// construction fails. Driver failures are surfaced as-is, never retried.
pub async fn execute_select(
    client: &mut MssqlClient,
    statement: &Statement,
) -> Result<ResultSet, TsqlTemplateError> {
    debug!(params = statement.parameters.len(), "executing select");
    let query = bind_statement(statement)?;

    let mut stream = query.query(client).await.map_err(|e| {
        TsqlTemplateError::ExecutionError(format!("SQL Server query error: {e}"))
    })?;

    let columns_opt = stream.columns().await.map_err(|e| {
        TsqlTemplateError::ExecutionError(format!("SQL Server column fetch error: {e}"))
    })?;

    let columns = columns_opt.ok_or_else(|| {
        TsqlTemplateError::ExecutionError("No columns returned from query".to_string())
    })?;

    let column_names: Vec<String> = columns.iter().map(|col| col.name().to_string()).collect();

    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(Arc::new(column_names));

    let mut rows_stream = stream.into_row_stream();
    while let Some(row) = rows_stream.try_next().await.map_err(|e| {
        TsqlTemplateError::ExecutionError(format!("SQL Server row fetch error: {e}"))
    })? {
        let col_count = result_set.column_count();
        let mut values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            values.push(extract_value(&row, i).unwrap_or(SqlValue::Null));
        }
        result_set.add_row_values(values);
    }

    Ok(result_set)
}

/// Execute a DML statement (INSERT, UPDATE, DELETE) and return affected rows.
///
/// # Errors
/// Returns `TsqlTemplateError` if parameter conversion or execution fails, or
/// the affected row count cannot be converted.
pub async fn execute_dml(
    client: &mut MssqlClient,
    statement: &Statement,
) -> Result<usize, TsqlTemplateError> {
    debug!(params = statement.parameters.len(), "executing dml");
    let query = bind_statement(statement)?;

    let exec_result = query.execute(client).await.map_err(|e| {
        TsqlTemplateError::ExecutionError(format!("SQL Server execution error: {e}"))
    })?;

    let rows_affected: u64 = exec_result.rows_affected().iter().sum();
    convert_affected_rows(rows_affected)
}

/// Execute a batch of parameterless SQL statements.
///
/// # Errors
/// Returns `TsqlTemplateError::ExecutionError` if execution fails.
pub async fn execute_batch(
    client: &mut MssqlClient,
    sql: &str,
) -> Result<(), TsqlTemplateError> {
    Query::new(sql).execute(client).await.map_err(|e| {
        TsqlTemplateError::ExecutionError(format!("SQL Server batch execution error: {e}"))
    })?;
    Ok(())
}

pub(crate) fn convert_affected_rows(rows_affected: u64) -> Result<usize, TsqlTemplateError> {
    usize::try_from(rows_affected).map_err(|e| {
        TsqlTemplateError::ExecutionError(format!("Invalid rows affected count: {e}"))
    })
}

/// Extract a value from a row at a specific index.
///
/// The tiberius row API exposes typed getters rather than a tagged value, so
/// probe the plausible types in order. `None` means NULL or an unsupported
/// column type, which both surface as [`SqlValue::Null`].
fn extract_value(row: &tiberius::Row, idx: usize) -> Option<SqlValue> {
    if let Ok(Some(val)) = row.try_get::<i32, _>(idx) {
        return Some(SqlValue::Int(i64::from(val)));
    }

    if let Ok(Some(val)) = row.try_get::<i64, _>(idx) {
        return Some(SqlValue::Int(val));
    }

    if let Ok(Some(val)) = row.try_get::<f32, _>(idx) {
        return Some(SqlValue::Float(f64::from(val)));
    }

    if let Ok(Some(val)) = row.try_get::<f64, _>(idx) {
        return Some(SqlValue::Float(val));
    }

    if let Ok(Some(val)) = row.try_get::<bool, _>(idx) {
        return Some(SqlValue::Bool(val));
    }

    if let Ok(Some(val)) = row.try_get::<&str, _>(idx) {
        // Values that look like date/times come back as text; re-typed here
        if val.contains('-') && (val.contains(':') || val.contains(' ')) {
            if let Ok(dt) = NaiveDateTime::parse_from_str(val, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(SqlValue::Timestamp(dt));
            } else if let Ok(dt) = NaiveDateTime::parse_from_str(val, "%Y-%m-%d %H:%M:%S") {
                return Some(SqlValue::Timestamp(dt));
            }
        }

        return Some(SqlValue::Text(val.to_string()));
    }

    if let Ok(Some(val)) = row.try_get::<&[u8], _>(idx) {
        return Some(SqlValue::Blob(val.to_vec()));
    }

    None
}
