use tsql_template::prelude::*;

#[test]
fn positional_rewrite_follows_binding_order() {
    let statement = StatementBuilder::new("insert into a (b, c) values ")
        .bind(vec![vec![1, 2], vec![3, 4]])
        .literal(" where d = ")
        .bind(5)
        .compile();

    let sql = positional_placeholders(&statement.sql, &statement.parameters);
    assert_eq!(
        sql,
        "insert into a (b, c) values (@P1, @P2), (@P3, @P4) where d = @P5"
    );

    // binding order is slot order, then group order, then within-group order
    let values: Vec<_> = statement
        .parameters
        .iter()
        .map(|p| p.value.clone())
        .collect();
    assert_eq!(
        values,
        [
            SqlValue::Int(1),
            SqlValue::Int(2),
            SqlValue::Int(3),
            SqlValue::Int(4),
            SqlValue::Int(5)
        ]
    );
}

#[test]
fn rewrite_leaves_literal_text_alone() {
    let statement = StatementBuilder::new("select '@p0_0' as odd, [col@x] from t where a = ")
        .bind(1)
        .literal(" -- trailing @p0_0 comment")
        .compile();

    let sql = positional_placeholders(&statement.sql, &statement.parameters);
    assert_eq!(
        sql,
        "select '@p0_0' as odd, [col@x] from t where a = @P1 -- trailing @p0_0 comment"
    );
}

#[test]
fn compiling_twice_rewrites_identically() {
    let build = || {
        StatementBuilder::new("update t set a = ")
            .bind(typed(SqlType::Decimal, 12.5).with_options(
                BindOptions::default().with_scale(2),
            ))
            .literal(" where b in (")
            .bind(vec!["x", "y"])
            .literal(")")
            .compile()
    };

    let first = build();
    let second = build();
    assert_eq!(first.sql, second.sql);
    assert_eq!(first.parameters, second.parameters);
    assert_eq!(
        positional_placeholders(&first.sql, &first.parameters),
        positional_placeholders(&second.sql, &second.parameters)
    );
}
