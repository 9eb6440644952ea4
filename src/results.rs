use std::collections::HashMap;
use std::sync::Arc;

use crate::types::SqlValue;

/// A row from a query result, with access by column name or index.
#[derive(Debug, Clone)]
pub struct Row {
    /// The column names for this row (shared across all rows in a result set)
    column_names: Arc<Vec<String>>,
    /// The values for this row
    values: Vec<SqlValue>,
    // Shared name-to-index map to avoid repeated string comparisons
    column_index: Arc<HashMap<String, usize>>,
}

impl Row {
    /// Get a value from the row by column name.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&SqlValue> {
        self.column_index
            .get(column_name)
            .and_then(|&idx| self.values.get(idx))
    }

    /// Get a value from the row by column index.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// The column names, in result order.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// The values, in column order.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}

/// Rows returned by a query, plus the affected-row count for DML.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub rows: Vec<Row>,
    /// The number of rows affected (for DML statements)
    pub rows_affected: usize,
    // Column names shared by all rows, set once before rows are added
    column_names: Option<Arc<Vec<String>>>,
    column_index: Option<Arc<HashMap<String, usize>>>,
}

impl ResultSet {
    /// Create a new result set with a known capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            rows: Vec::with_capacity(capacity),
            rows_affected: 0,
            column_names: None,
            column_index: None,
        }
    }

    /// Set the column names shared by all rows; builds the lookup map once.
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        let index = column_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect::<HashMap<_, _>>();
        self.column_index = Some(Arc::new(index));
        self.column_names = Some(column_names);
    }

    /// The column names, if set.
    #[must_use]
    pub fn column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Number of columns per row (zero until column names are set).
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_names.as_ref().map_or(0, |names| names.len())
    }

    /// Add a row of values. Rows added before column names are set are
    /// dropped, since they could never be addressed by name.
    pub fn add_row_values(&mut self, values: Vec<SqlValue>) {
        if let (Some(column_names), Some(column_index)) = (&self.column_names, &self.column_index) {
            self.rows.push(Row {
                column_names: column_names.clone(),
                values,
                column_index: column_index.clone(),
            });
            self.rows_affected += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_resolve_columns_by_name_and_index() {
        let mut result_set = ResultSet::with_capacity(1);
        result_set.set_column_names(Arc::new(vec!["id".to_string(), "name".to_string()]));
        result_set.add_row_values(vec![SqlValue::Int(7), SqlValue::Text("alice".into())]);

        assert_eq!(result_set.rows_affected, 1);
        let row = &result_set.rows[0];
        assert_eq!(row.get("id"), Some(&SqlValue::Int(7)));
        assert_eq!(row.get_by_index(1), Some(&SqlValue::Text("alice".into())));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn rows_without_column_names_are_dropped() {
        let mut result_set = ResultSet::with_capacity(1);
        result_set.add_row_values(vec![SqlValue::Int(1)]);
        assert!(result_set.rows.is_empty());
        assert_eq!(result_set.rows_affected, 0);
    }
}
