// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for the lowering layer

use sqldist_ir::{
    BinaryOp, ColumnRef, Dialect, Expr, JoinCondition, JoinType, Literal, Quantifier, SelectItem,
    SetOp, TableSource,
};
use sqldist_lowering::{LoweringError, LoweringOutcome, StatementKind, parse_query, parse_statement};
use sqldist_test_utils::SqlAssertions;

fn where_of(sql: &str) -> Expr {
    let query = parse_query(sql, Dialect::Generic).unwrap();
    query
        .as_select()
        .and_then(|s| s.where_clause.clone())
        .expect("query has a WHERE clause")
}

#[test]
fn test_simple_select() {
    let query = parse_query("SELECT a, b AS bee FROM t WHERE a = 1", Dialect::SQLite).unwrap();
    let select = query.as_select().unwrap();

    assert_eq!(query.dialect, Dialect::SQLite);
    assert_eq!(select.projection.len(), 2);
    assert!(matches!(
        &select.projection[1],
        SelectItem::AliasedExpr { alias, .. } if alias == "bee"
    ));
    assert_eq!(select.from[0].table_name(), Some("t"));
    assert_eq!(
        select.where_clause,
        Some(Expr::binary(
            Expr::column("a"),
            BinaryOp::Eq,
            Expr::Literal(Literal::Integer(1))
        ))
    );
}

#[test]
fn test_qualified_columns_and_aliases() {
    let query = parse_query(
        "SELECT e.name FROM emp AS e WHERE e.salary > 100.5",
        Dialect::Generic,
    )
    .unwrap();
    let select = query.as_select().unwrap();

    assert_eq!(select.from[0].reference_name(), Some("e"));
    assert_eq!(
        select.where_clause,
        Some(Expr::binary(
            Expr::Column(ColumnRef::new("salary").with_table("e")),
            BinaryOp::Gt,
            Expr::Literal(Literal::Float(100.5))
        ))
    );
}

#[test]
fn test_negative_literal_is_folded() {
    assert_eq!(
        where_of("SELECT * FROM t WHERE a > -5"),
        Expr::binary(
            Expr::column("a"),
            BinaryOp::Gt,
            Expr::Literal(Literal::Integer(-5))
        )
    );
}

#[test]
fn test_string_and_integer_operands() {
    let Expr::BinaryOp { left, right, .. } = where_of("SELECT * FROM t WHERE a = 'it''s'") else {
        panic!("expected comparison");
    };
    SqlAssertions::assert_column_ref(&left, "a");
    SqlAssertions::assert_literal_string(&right, "it's");

    let Expr::Between { low, high, .. } = where_of("SELECT * FROM t WHERE a BETWEEN 1 AND 3") else {
        panic!("expected BETWEEN");
    };
    SqlAssertions::assert_literal_int(&low, 1);
    SqlAssertions::assert_literal_int(&high, 3);
}

#[test]
fn test_not_and_predicates() {
    let predicate = where_of(
        "SELECT * FROM t WHERE NOT (a IS NULL) AND b NOT BETWEEN 1 AND 3 AND c NOT LIKE 'x%'",
    );
    SqlAssertions::assert_renders(
        &predicate,
        "NOT (a IS NULL) AND b NOT BETWEEN 1 AND 3 AND c NOT LIKE 'x%'",
    );
}

#[test]
fn test_in_list_and_subqueries() {
    let predicate = where_of(
        "SELECT * FROM t WHERE a IN (1, 2) OR b IN (SELECT x FROM u) OR EXISTS (SELECT 1 FROM v)",
    );
    let Expr::BinaryOp { left, op, right } = predicate else {
        panic!("expected OR chain");
    };
    assert_eq!(op, BinaryOp::Or);
    assert!(matches!(*right, Expr::Exists { negated: false, .. }));
    let Expr::BinaryOp { left, right, .. } = *left else {
        panic!("expected OR chain");
    };
    assert!(matches!(*left, Expr::InList { ref list, negated: false, .. } if list.len() == 2));
    assert!(matches!(*right, Expr::InSubquery { negated: false, .. }));
}

#[test]
fn test_quantified_comparison() {
    let predicate = where_of("SELECT * FROM t WHERE a > ALL (SELECT x FROM u)");
    assert!(matches!(
        predicate,
        Expr::Quantified {
            op: BinaryOp::Gt,
            quantifier: Quantifier::All,
            ..
        }
    ));
}

#[test]
fn test_is_true_variants() {
    assert!(matches!(
        where_of("SELECT * FROM t WHERE flag IS NOT FALSE"),
        Expr::IsBool {
            value: false,
            negated: true,
            ..
        }
    ));
}

#[test]
fn test_function_calls() {
    let predicate = where_of("SELECT * FROM t WHERE LOWER(name) = 'bob'");
    let Expr::BinaryOp { left, .. } = predicate else {
        panic!("expected comparison");
    };
    assert!(matches!(*left, Expr::Function { ref name, ref args, distinct: false }
        if name == "LOWER" && args.len() == 1));
}

#[test]
fn test_joins() {
    let query = parse_query(
        "SELECT * FROM a JOIN b ON a.id = b.id LEFT JOIN c USING (id) CROSS JOIN d",
        Dialect::Generic,
    )
    .unwrap();
    let table = &query.as_select().unwrap().from[0];

    assert_eq!(table.joins.len(), 3);
    assert_eq!(table.joins[0].join_type, JoinType::Inner);
    assert!(matches!(table.joins[0].condition, JoinCondition::On(_)));
    assert_eq!(table.joins[1].join_type, JoinType::Left);
    assert_eq!(
        table.joins[1].condition,
        JoinCondition::Using(vec!["id".to_string()])
    );
    assert_eq!(table.joins[2].join_type, JoinType::Cross);
}

#[test]
fn test_derived_table() {
    let query = parse_query(
        "SELECT s.x FROM (SELECT x FROM t) AS s WHERE s.x = 1",
        Dialect::Generic,
    )
    .unwrap();
    let table = &query.as_select().unwrap().from[0];

    assert!(matches!(table.source, TableSource::Derived(_)));
    assert_eq!(table.reference_name(), Some("s"));
}

#[test]
fn test_union_order_limit() {
    let query = parse_query(
        "SELECT a FROM t UNION ALL SELECT a FROM u ORDER BY a DESC LIMIT 5 OFFSET 2",
        Dialect::PostgreSQL,
    )
    .unwrap();

    assert!(matches!(query.body, SetOp::Union { all: true, .. }));
    assert_eq!(query.order_by.as_ref().map(Vec::len), Some(1));
    assert_eq!(query.limit, Some(Expr::Literal(Literal::Integer(5))));
    assert_eq!(query.offset, Some(Expr::Literal(Literal::Integer(2))));
}

#[test]
fn test_delete_becomes_select() {
    let lowered = parse_statement("DELETE FROM t WHERE a = 1", Dialect::SQLite).unwrap();
    assert_eq!(lowered.kind, StatementKind::Delete);
    assert_eq!(lowered.query.to_string(), "SELECT * FROM t WHERE a = 1");
}

#[test]
fn test_update_becomes_select() {
    let lowered =
        parse_statement("UPDATE t SET b = 2 WHERE a < 10 AND c = 'x'", Dialect::SQLite).unwrap();
    assert_eq!(lowered.kind, StatementKind::Update);
    assert_eq!(
        lowered.query.to_string(),
        "SELECT * FROM t WHERE a < 10 AND c = 'x'"
    );
}

#[test]
fn test_unsupported_expression_is_partial() {
    let lowered = parse_statement(
        "SELECT * FROM t WHERE CASE WHEN a = 1 THEN 1 ELSE 0 END = 1",
        Dialect::Generic,
    )
    .unwrap();

    let LoweringOutcome::Partial(errors) = &lowered.outcome else {
        panic!("expected partial outcome");
    };
    assert!(matches!(errors[0], LoweringError::UnsupportedSyntax { ref feature, .. } if !feature.is_empty()));

    let predicate = lowered.query.as_select().unwrap().where_clause.clone().unwrap();
    let Expr::BinaryOp { left, .. } = predicate else {
        panic!("expected comparison");
    };
    assert!(matches!(*left, Expr::Unsupported(ref text) if text.starts_with("CASE")));
}

#[test]
fn test_parse_error() {
    let err = parse_query("SELEC * FROM", Dialect::Generic).unwrap_err();
    assert!(matches!(err, LoweringError::Parse { .. }));
}

#[test]
fn test_statement_count() {
    let err = parse_query("SELECT 1; SELECT 2", Dialect::Generic).unwrap_err();
    assert_eq!(err, LoweringError::StatementCount { found: 2 });
}

#[test]
fn test_insert_is_rejected() {
    let err = parse_statement("INSERT INTO t VALUES (1)", Dialect::SQLite).unwrap_err();
    assert_eq!(
        err,
        LoweringError::UnsupportedStatement {
            statement: "INSERT".to_string()
        }
    );
}

#[test]
fn test_cte_is_rejected() {
    let err = parse_query(
        "WITH x AS (SELECT 1 AS a) SELECT * FROM x",
        Dialect::Generic,
    )
    .unwrap_err();
    assert!(format!("{}", err).contains("WITH"));
}

#[test]
fn test_out_of_range_number_is_invalid_literal() {
    let lowered = parse_statement("SELECT * FROM t WHERE a = 1e999999", Dialect::Generic).unwrap();

    let LoweringOutcome::Partial(errors) = &lowered.outcome else {
        panic!("expected partial outcome");
    };
    assert!(matches!(
        errors[0],
        LoweringError::InvalidLiteral { ref value, .. } if value == "1e999999"
    ));
}

#[test]
fn test_float_literals_survive_rendering() {
    let query = parse_query(
        "SELECT * FROM t WHERE a IN (SELECT x / 2.0 FROM u) AND b = 3.0",
        Dialect::SQLite,
    )
    .unwrap();
    let rendered = query.to_string();
    assert_eq!(
        rendered,
        "SELECT * FROM t WHERE a IN (SELECT x / 2.0 FROM u) AND b = 3.0"
    );

    let reparsed = parse_query(&rendered, Dialect::SQLite).unwrap();
    assert_eq!(reparsed, query);
}
