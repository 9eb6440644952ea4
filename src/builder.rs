use crate::statement::{SlotValue, Statement, compile};

/// Fluent builder that accumulates literal fragments and value slots.
///
/// The shape of the API keeps the fragment/slot interleaving well formed:
/// construction supplies the first literal, every [`bind`](Self::bind) opens a
/// new trailing literal, and [`literal`](Self::literal) appends to it. There
/// is always exactly one more fragment than there are slots.
///
/// ```rust
/// use tsql_template::prelude::*;
///
/// let statement = StatementBuilder::new("select a from b where d = ")
///     .bind(1)
///     .literal(" and e = ")
///     .bind("f")
///     .compile();
/// assert_eq!(
///     statement.sql,
///     "select a from b where d = @p0_0 and e = @p1_0"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    fragments: Vec<String>,
    slots: Vec<SlotValue>,
}

impl StatementBuilder {
    /// Start a statement with its first literal fragment.
    #[must_use]
    pub fn new(first_fragment: impl Into<String>) -> Self {
        Self {
            fragments: vec![first_fragment.into()],
            slots: Vec::new(),
        }
    }

    /// Append SQL text to the current trailing literal fragment.
    #[must_use]
    pub fn literal(mut self, sql: &str) -> Self {
        if let Some(last) = self.fragments.last_mut() {
            last.push_str(sql);
        }
        self
    }

    /// Append a value slot and open a new (empty) trailing literal.
    #[must_use]
    pub fn bind(mut self, value: impl Into<SlotValue>) -> Self {
        self.slots.push(value.into());
        self.fragments.push(String::new());
        self
    }

    /// Compile the accumulated fragments and slots into a [`Statement`].
    #[must_use]
    pub fn compile(self) -> Statement {
        let StatementBuilder { fragments, slots } = self;
        let fragments: Vec<&str> = fragments.iter().map(String::as_str).collect();
        compile(&fragments, slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SqlType, SqlValue, typed};

    #[test]
    fn builder_matches_the_free_function() {
        let built = StatementBuilder::new("select a from b where d = ")
            .bind(1)
            .compile();
        let direct = compile(&["select a from b where d = ", ""], vec![1.into()]);
        assert_eq!(built.sql, direct.sql);
        assert_eq!(built.parameters, direct.parameters);
    }

    #[test]
    fn literal_extends_the_trailing_fragment() {
        let statement = StatementBuilder::new("select a from b")
            .literal(" where c = 1")
            .compile();
        assert_eq!(statement.sql, "select a from b where c = 1");
        assert!(statement.parameters.is_empty());
    }

    #[test]
    fn binds_rows_lists_and_annotated_scalars() {
        let statement = StatementBuilder::new("insert into a (b, c) values ")
            .bind(vec![vec![1, 2], vec![3, 4]])
            .literal(" where d = ")
            .bind(typed(SqlType::Int, 3))
            .compile();
        assert_eq!(
            statement.sql,
            "insert into a (b, c) values (@p0_0, @p0_1), (@p0_2, @p0_3) where d = @p1_0"
        );
        assert_eq!(statement.parameters[4].ty, Some(SqlType::Int));
        assert_eq!(statement.parameters[4].value, SqlValue::Int(3));
    }
}
