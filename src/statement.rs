//! Statement compilation: literal fragments interleaved with value slots
//! become a single SQL string plus an ordered list of named parameters.

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::types::{BindOptions, SqlType, SqlValue, TypedValue};

/// The contents of one value slot in a statement.
///
/// A slot is either a single scalar, a flat list rendered as an unwrapped
/// comma-separated placeholder list (e.g. for `IN (...)`), or a sequence of
/// row groups each rendered parenthesized (e.g. for multi-row
/// `INSERT ... VALUES`).
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    /// One scalar, one placeholder.
    Scalar(TypedValue),
    /// `@a, @b, @c`
    List(Vec<TypedValue>),
    /// `(@a, @b), (@c, @d)`
    Rows(Vec<Vec<TypedValue>>),
}

/// A named parameter binding produced by compilation.
///
/// Names are unique within a statement; the execution side relies on that to
/// resolve placeholders without ambiguity.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Generated placeholder name (without the `@` marker).
    pub name: String,
    /// Explicit binding type carried over from annotation, if any.
    pub ty: Option<SqlType>,
    /// The raw value to bind.
    pub value: SqlValue,
    /// Per-binding options carried over from annotation, if any.
    pub options: Option<BindOptions>,
}

/// A compiled statement: SQL text plus its ordered parameter bindings.
///
/// ```rust
/// use tsql_template::prelude::*;
///
/// let statement = compile(
///     &["select a from b where d = ", ""],
///     vec![SlotValue::from(1)],
/// );
/// assert_eq!(statement.sql, "select a from b where d = @p0_0");
/// assert_eq!(statement.parameters[0].value, SqlValue::Int(1));
/// ```
#[derive(Debug, Clone)]
pub struct Statement {
    /// The SQL text with `@name` placeholders.
    pub sql: String,
    /// Parameter bindings in slot order, then group order, then within-group
    /// order. This is the order they must be bound in.
    pub parameters: Vec<Parameter>,
}

impl Statement {
    /// Start a fluent builder from the first literal fragment.
    #[must_use]
    pub fn builder(first_fragment: impl Into<String>) -> crate::builder::StatementBuilder {
        crate::builder::StatementBuilder::new(first_fragment)
    }
}

/// Compile literal fragments and value slots into a [`Statement`].
///
/// Placeholder names are a pure function of position (`p{slot}_{n}` with a
/// per-slot counter), so compiling the same inputs twice yields identical
/// output and no two parameters can share a name.
///
/// # Panics
///
/// Panics if `fragments.len() != slots.len() + 1`. That invariant cannot be
/// broken through [`StatementBuilder`](crate::builder::StatementBuilder); a
/// mismatch here is a programming error, not a recoverable condition.
#[must_use]
pub fn compile(fragments: &[&str], slots: Vec<SlotValue>) -> Statement {
    assert_eq!(
        fragments.len(),
        slots.len() + 1,
        "statement requires exactly one more literal fragment than value slots"
    );

    let mut sql = String::new();
    let mut parameters = Vec::new();

    for (slot_idx, slot) in slots.into_iter().enumerate() {
        sql.push_str(fragments[slot_idx]);
        render_slot(&mut sql, &mut parameters, slot_idx, slot);
    }
    sql.push_str(fragments[fragments.len() - 1]);

    Statement { sql, parameters }
}

/// Render one slot's placeholders and collect its parameter bindings.
///
/// The per-slot counter runs across all of the slot's groups, so names stay
/// unique even when row groups have unequal sizes.
fn render_slot(
    sql: &mut String,
    parameters: &mut Vec<Parameter>,
    slot_idx: usize,
    slot: SlotValue,
) {
    let groups: Vec<(bool, Vec<TypedValue>)> = match slot {
        SlotValue::Scalar(value) => vec![(false, vec![value])],
        SlotValue::List(values) => vec![(false, values)],
        SlotValue::Rows(rows) => rows.into_iter().map(|row| (true, row)).collect(),
    };

    let mut ordinal = 0usize;
    for (group_idx, (wrap, group)) in groups.into_iter().enumerate() {
        if group_idx > 0 {
            sql.push_str(", ");
        }
        if wrap {
            sql.push('(');
        }
        for (idx, value) in group.into_iter().enumerate() {
            if idx > 0 {
                sql.push_str(", ");
            }
            let name = format!("p{slot_idx}_{ordinal}");
            ordinal += 1;
            sql.push('@');
            sql.push_str(&name);
            parameters.push(Parameter {
                name,
                ty: value.ty,
                value: value.value,
                options: value.options,
            });
        }
        if wrap {
            sql.push(')');
        }
    }
}

impl From<TypedValue> for SlotValue {
    fn from(value: TypedValue) -> Self {
        SlotValue::Scalar(value)
    }
}

impl From<SqlValue> for SlotValue {
    fn from(value: SqlValue) -> Self {
        SlotValue::Scalar(TypedValue::from(value))
    }
}

impl From<Vec<TypedValue>> for SlotValue {
    fn from(values: Vec<TypedValue>) -> Self {
        SlotValue::List(values)
    }
}

impl From<Vec<SqlValue>> for SlotValue {
    fn from(values: Vec<SqlValue>) -> Self {
        SlotValue::List(values.into_iter().map(TypedValue::from).collect())
    }
}

impl From<Vec<Vec<TypedValue>>> for SlotValue {
    fn from(rows: Vec<Vec<TypedValue>>) -> Self {
        SlotValue::Rows(rows)
    }
}

impl From<Vec<Vec<SqlValue>>> for SlotValue {
    fn from(rows: Vec<Vec<SqlValue>>) -> Self {
        SlotValue::Rows(
            rows.into_iter()
                .map(|row| row.into_iter().map(TypedValue::from).collect())
                .collect(),
        )
    }
}

// Binary data is a scalar, not a list of tiny integers.
impl From<Vec<u8>> for SlotValue {
    fn from(bytes: Vec<u8>) -> Self {
        SlotValue::Scalar(TypedValue::from(SqlValue::Blob(bytes)))
    }
}

macro_rules! impl_slot_from_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for SlotValue {
                fn from(value: $t) -> Self {
                    SlotValue::Scalar(TypedValue::from(SqlValue::from(value)))
                }
            }

            impl From<Vec<$t>> for SlotValue {
                fn from(values: Vec<$t>) -> Self {
                    SlotValue::List(
                        values
                            .into_iter()
                            .map(|v| TypedValue::from(SqlValue::from(v)))
                            .collect(),
                    )
                }
            }

            impl From<Vec<Vec<$t>>> for SlotValue {
                fn from(rows: Vec<Vec<$t>>) -> Self {
                    SlotValue::Rows(
                        rows.into_iter()
                            .map(|row| {
                                row.into_iter()
                                    .map(|v| TypedValue::from(SqlValue::from(v)))
                                    .collect()
                            })
                            .collect(),
                    )
                }
            }
        )*
    };
}

impl_slot_from_scalar!(i32, i64, f64, bool, &str, String, NaiveDateTime, JsonValue);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::typed;

    #[test]
    fn zero_slots_passes_the_fragment_through() {
        let statement = compile(&["select a from b where c = 1"], vec![]);
        assert_eq!(statement.sql, "select a from b where c = 1");
        assert!(statement.parameters.is_empty());
    }

    #[test]
    fn scalar_slot_emits_one_named_placeholder() {
        let statement = compile(&["select a from b where d = ", ""], vec![1.into()]);
        assert_eq!(statement.sql, "select a from b where d = @p0_0");
        assert_eq!(statement.parameters.len(), 1);
        assert_eq!(statement.parameters[0].name, "p0_0");
        assert_eq!(statement.parameters[0].value, SqlValue::Int(1));
        assert_eq!(statement.parameters[0].ty, None);
        assert_eq!(statement.parameters[0].options, None);
    }

    #[test]
    fn multiple_slots_are_numbered_independently() {
        let statement = compile(
            &["select a from b where d = ", " and e = ", ""],
            vec![1.into(), "f".into()],
        );
        assert_eq!(
            statement.sql,
            "select a from b where d = @p0_0 and e = @p1_0"
        );
        assert_eq!(statement.parameters[0].name, "p0_0");
        assert_eq!(statement.parameters[1].name, "p1_0");
        assert_eq!(statement.parameters[1].value, SqlValue::Text("f".into()));
    }

    #[test]
    fn flat_list_expands_unwrapped() {
        let statement = compile(
            &["insert into a (b, c, d) values (", ")"],
            vec![vec![1, 2, 3].into()],
        );
        assert_eq!(
            statement.sql,
            "insert into a (b, c, d) values (@p0_0, @p0_1, @p0_2)"
        );
        let values: Vec<_> = statement.parameters.iter().map(|p| &p.value).collect();
        assert_eq!(
            values,
            [&SqlValue::Int(1), &SqlValue::Int(2), &SqlValue::Int(3)]
        );
    }

    #[test]
    fn nested_rows_expand_into_parenthesized_groups() {
        let statement = compile(
            &["insert into a (b, c) values ", ""],
            vec![vec![vec![1, 2], vec![3, 4]].into()],
        );
        assert_eq!(
            statement.sql,
            "insert into a (b, c) values (@p0_0, @p0_1), (@p0_2, @p0_3)"
        );
        assert_eq!(statement.parameters.len(), 4);
        let values: Vec<_> = statement.parameters.iter().map(|p| &p.value).collect();
        assert_eq!(
            values,
            [
                &SqlValue::Int(1),
                &SqlValue::Int(2),
                &SqlValue::Int(3),
                &SqlValue::Int(4)
            ]
        );
    }

    #[test]
    fn rows_and_scalar_slots_mix_in_one_statement() {
        let statement = compile(
            &["insert into a (b, c) values ", " where d = ", ""],
            vec![vec![vec![1, 2], vec![3, 4]].into(), 3.into()],
        );
        assert_eq!(
            statement.sql,
            "insert into a (b, c) values (@p0_0, @p0_1), (@p0_2, @p0_3) where d = @p1_0"
        );
    }

    #[test]
    fn unequal_row_groups_never_collide() {
        let statement = compile(
            &["insert into a (b) values ", ""],
            vec![vec![vec![1], vec![2, 3, 4], vec![5, 6]].into()],
        );
        assert_eq!(
            statement.sql,
            "insert into a (b) values (@p0_0), (@p0_1, @p0_2, @p0_3), (@p0_4, @p0_5)"
        );
        let mut names: Vec<_> = statement
            .parameters
            .iter()
            .map(|p| p.name.clone())
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), statement.parameters.len());
    }

    #[test]
    fn empty_list_renders_nothing() {
        let statement = compile(
            &["insert into a (b) values (", ")"],
            vec![SlotValue::List(vec![])],
        );
        assert_eq!(statement.sql, "insert into a (b) values ()");
        assert!(statement.parameters.is_empty());
    }

    #[test]
    fn annotation_is_carried_onto_the_binding() {
        let statement = compile(
            &["insert into a (b, c) values (", ")"],
            vec![vec![
                typed(SqlType::Int, 1),
                typed(SqlType::NVarChar, "foo")
                    .with_options(BindOptions::default().with_length(16)),
            ]
            .into()],
        );
        assert_eq!(statement.parameters[0].ty, Some(SqlType::Int));
        assert_eq!(statement.parameters[1].ty, Some(SqlType::NVarChar));
        assert_eq!(
            statement.parameters[1].options,
            Some(BindOptions::default().with_length(16))
        );
    }

    #[test]
    fn compilation_is_idempotent() {
        let build = || {
            compile(
                &["insert into a (b, c) values ", " where d = ", ""],
                vec![vec![vec![1, 2], vec![3, 4]].into(), "x".into()],
            )
        };
        let first = build();
        let second = build();
        assert_eq!(first.sql, second.sql);
        assert_eq!(first.parameters, second.parameters);
    }

    #[test]
    #[should_panic(expected = "one more literal fragment")]
    fn fragment_slot_mismatch_fails_loudly() {
        let _ = compile(&["select 1"], vec![1.into()]);
    }
}
