// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! End-to-end distance tests against seeded SQLite databases

use sqldist_driver::Driver;
use sqldist_engine::{
    EngineConfig, EngineError, INF_DISTANCE, QueryDistanceCalculator, ZERO_DISTANCE, evaluate_sql,
};
use sqldist_test_utils::{
    SqlFixtures, assert_close, shop_driver, single_column_driver, sqlite_driver,
};

fn raw_distance(driver: &mut dyn Driver, sql: &str) -> f64 {
    QueryDistanceCalculator::new(sql, driver, EngineConfig::default())
        .unwrap()
        .calculate()
        .unwrap()
        .raw()
}

#[test]
fn test_closest_row_wins() {
    let mut driver = single_column_driver(&[1, 5, 10]);
    let distance = QueryDistanceCalculator::new("SELECT * FROM t WHERE a = 7", &mut driver, EngineConfig::default())
        .unwrap()
        .calculate()
        .unwrap();

    assert_close(distance.raw(), 2.0);
    assert_close(distance.value(), 2.0 / 3.0);
}

#[test]
fn test_empty_table_is_infinite() {
    let mut driver = single_column_driver(&[]);
    let mut calculator =
        QueryDistanceCalculator::new("SELECT * FROM t WHERE a = 7", &mut driver, EngineConfig::default())
            .unwrap();

    assert_eq!(calculator.calculate().unwrap(), INF_DISTANCE);
    assert_eq!(calculator.rows_evaluated(), 0);
}

#[test]
fn test_query_without_where_is_infinite() {
    let mut driver = single_column_driver(&[1, 2]);
    let distance = QueryDistanceCalculator::new("SELECT * FROM t", &mut driver, EngineConfig::default())
        .unwrap()
        .calculate()
        .unwrap();
    assert_eq!(distance.value(), 1.0);
}

#[test]
fn test_satisfied_query_is_zero() {
    let mut driver = shop_driver();
    let distance = QueryDistanceCalculator::new(
        SqlFixtures::satisfied_select(),
        &mut driver,
        EngineConfig::default(),
    )
    .unwrap()
    .calculate()
    .unwrap();
    assert_eq!(distance, ZERO_DISTANCE);
}

#[test]
fn test_unsatisfied_select() {
    let mut driver = shop_driver();
    assert_close(raw_distance(&mut driver, SqlFixtures::unsatisfied_select()), 9.5);
}

#[test]
fn test_inner_join_condition_is_scored() {
    let mut driver = shop_driver();
    // Order 11 joins customer 1 and misses total > 95 by 1 - (90.5 - 95)
    assert_close(raw_distance(&mut driver, SqlFixtures::unsatisfied_join()), 5.5);
}

#[test]
fn test_correlated_exists_recurses() {
    let mut driver = shop_driver();
    // Customer 1, order 11: 1 + (100 - 90.5)
    assert_close(raw_distance(&mut driver, SqlFixtures::unsatisfied_exists()), 10.5);
    assert!(driver.cached_queries() > 1);
}

#[test]
fn test_in_subquery() {
    let mut driver = shop_driver();
    assert_eq!(raw_distance(&mut driver, SqlFixtures::in_subquery()), 0.0);
}

#[test]
fn test_delete_and_update_are_scored_as_selects() {
    let mut driver = shop_driver();
    // Closest total is 12.0; 12 < 10 misses by 12 - 10 + 1
    assert_close(raw_distance(&mut driver, "DELETE FROM orders WHERE total < 10"), 3.0);
    // 'paris' vs 'rome': one extra character plus code gaps 2 + 14 + 5 + 4
    assert_close(
        raw_distance(&mut driver, "UPDATE customers SET city = 'rome' WHERE city = 'rome'"),
        65_561.0,
    );
}

#[test]
fn test_union_takes_closest_branch() {
    let mut driver = shop_driver();
    assert_close(
        raw_distance(
            &mut driver,
            "SELECT id FROM customers WHERE id = 9 UNION SELECT id FROM orders WHERE id = 13",
        ),
        1.0,
    );
}

#[test]
fn test_like_distance() {
    let mut driver = shop_driver();
    // 'pl' (plum) is closest to 'ki': 1 + 5 + 3
    assert_close(raw_distance(&mut driver, "SELECT * FROM items WHERE sku LIKE 'ki%'"), 9.0);
}

#[test]
fn test_unknown_column_is_an_error() {
    let mut driver = shop_driver();
    let err = QueryDistanceCalculator::new(
        "SELECT * FROM customers c WHERE EXISTS (SELECT 1 FROM orders o WHERE o.id = x.id)",
        &mut driver,
        EngineConfig::default(),
    )
    .unwrap()
    .calculate()
    .unwrap_err();
    assert!(matches!(err, EngineError::UnresolvedColumn(ref c) if c == "x.id"));
}

#[test]
fn test_failed_evaluation_reports_and_dumps() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig::default().with_diagnostics_dir(dir.path());
    let mut driver = shop_driver();

    let report = QueryDistanceCalculator::new("SELECT * FROM nowhere WHERE a = 1", &mut driver, config)
        .unwrap()
        .evaluate();

    assert!(report.failed);
    assert_eq!(report.distance, INF_DISTANCE);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_evaluate_sql_reports_parse_errors() {
    let mut driver = shop_driver();
    let report = evaluate_sql("SELEC nothing", &mut driver, EngineConfig::default());
    assert!(report.failed);
    assert!(report.distance.is_infinite());
}

#[test]
fn test_successful_report() {
    let mut driver = single_column_driver(&[1, 5, 10]);
    let report = evaluate_sql("SELECT * FROM t WHERE a = 10", &mut driver, EngineConfig::default());
    assert!(!report.failed);
    assert!(report.distance.is_zero());
    assert_eq!(report.rows_evaluated, 3);
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut driver = single_column_driver(&[1]);
    let config = EngineConfig::default().with_max_subquery_depth(0);
    let err = QueryDistanceCalculator::new("SELECT * FROM t WHERE a = 1", &mut driver, config)
        .err()
        .unwrap();
    assert!(matches!(err, EngineError::Config(_)));
}

#[test]
fn test_having_scores_closest_group() {
    let mut driver = single_column_driver(&[1, 2]);
    let raw = raw_distance(
        &mut driver,
        "SELECT a FROM t WHERE a > 0 GROUP BY a HAVING COUNT(*) > 5",
    );
    assert_close(raw, 5.0);
}

#[test]
fn test_having_satisfied_by_a_group() {
    let mut driver = single_column_driver(&[1, 1, 2]);
    let raw = raw_distance(
        &mut driver,
        "SELECT a, COUNT(*) AS n FROM t GROUP BY a HAVING n >= 2",
    );
    assert_eq!(raw, 0.0);
}

#[test]
fn test_having_folds_sums_per_group() {
    let mut driver = single_column_driver(&[2, 2, 3, 3]);
    let raw = raw_distance(&mut driver, "SELECT a FROM t GROUP BY a HAVING SUM(a) = 9");
    assert_close(raw, 3.0);
}

#[test]
fn test_having_waits_for_where() {
    let mut driver = single_column_driver(&[1, 5]);
    let raw = raw_distance(
        &mut driver,
        "SELECT a FROM t WHERE a > 10 GROUP BY a HAVING COUNT(*) > 1",
    );
    assert_close(raw, 6.0);
}

#[test]
fn test_limit_zero_is_infinite() {
    let mut driver = single_column_driver(&[1]);
    let mut calculator = QueryDistanceCalculator::new(
        "SELECT * FROM t WHERE a = 1 LIMIT 0",
        &mut driver,
        EngineConfig::default(),
    )
    .unwrap();
    assert_eq!(calculator.calculate().unwrap(), INF_DISTANCE);
    assert_eq!(calculator.rows_evaluated(), 0);

    let mut driver = single_column_driver(&[1]);
    assert_eq!(raw_distance(&mut driver, "SELECT * FROM t WHERE a = 1 LIMIT 1"), 0.0);
}

#[test]
fn test_float_division_in_subquery_keeps_fraction() {
    let mut driver = sqlite_driver(
        "CREATE TABLE t (a REAL); INSERT INTO t VALUES (3.5);
         CREATE TABLE u (x INTEGER); INSERT INTO u VALUES (7);",
    );
    let raw = raw_distance(
        &mut driver,
        "SELECT * FROM t WHERE a IN (SELECT x / 2.0 FROM u)",
    );
    assert_eq!(raw, 0.0);
}

#[test]
fn test_large_integers_compare_exactly() {
    let mut driver = single_column_driver(&[9_007_199_254_740_993]);
    let raw = raw_distance(&mut driver, "SELECT * FROM t WHERE a = 9007199254740992");
    assert_eq!(raw, 1.0);
}

#[test]
fn test_subquery_over_view() {
    let mut driver = sqlite_driver(
        "CREATE TABLE t (a INTEGER); INSERT INTO t VALUES (1), (2);
         CREATE VIEW v AS SELECT a * 10 AS x FROM t;",
    );
    let raw = raw_distance(
        &mut driver,
        "SELECT * FROM t WHERE EXISTS (SELECT 1 FROM v WHERE v.x = t.a + 100)",
    );
    assert_close(raw, 81.0);
}

#[test]
fn test_malformed_table_name_fails() {
    let mut driver = single_column_driver(&[1]);
    let err = QueryDistanceCalculator::new("SELECT * FROM a.b.c.d WHERE x = 1", &mut driver, EngineConfig::default())
        .unwrap()
        .calculate()
        .unwrap_err();
    assert!(matches!(err, EngineError::Catalog(_)));
}
