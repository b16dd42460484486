// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! SQL-specific test helpers and custom assertions

use sqldist_ir::{Expr, Literal};

/// Tolerance of [`assert_close`]
pub const EPSILON: f64 = 1e-9;

/// Assert that two floats are equal up to [`EPSILON`]
#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= EPSILON,
        "Expected {}, found {}",
        expected,
        actual
    );
}

/// Custom assertion helpers for SQL testing
pub struct SqlAssertions;

impl SqlAssertions {
    /// Assert that an expression is a column reference with the given name
    #[track_caller]
    pub fn assert_column_ref(expr: &Expr, name: &str) {
        match expr {
            Expr::Column(col) => {
                assert_eq!(col.column, name, "Expected column '{}', found '{}'", name, col.column);
            }
            _ => panic!("Expected Column expression, found {:?}", expr),
        }
    }

    /// Assert that an expression is an integer literal
    #[track_caller]
    pub fn assert_literal_int(expr: &Expr, value: i64) {
        match expr {
            Expr::Literal(Literal::Integer(v)) => {
                assert_eq!(*v, value, "Expected integer {}, found {}", value, v);
            }
            _ => panic!("Expected Integer literal, found {:?}", expr),
        }
    }

    /// Assert that an expression is a literal string
    #[track_caller]
    pub fn assert_literal_string(expr: &Expr, value: &str) {
        match expr {
            Expr::Literal(Literal::String(v)) => {
                assert_eq!(v, value, "Expected string '{}', found '{}'", value, v);
            }
            _ => panic!("Expected String literal, found {:?}", expr),
        }
    }

    /// Assert that rendering `expr` yields `sql`
    #[track_caller]
    pub fn assert_renders(expr: &Expr, sql: &str) {
        assert_eq!(expr.to_string(), sql, "Rendered SQL mismatch");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_close() {
        assert_close(2.0 / 3.0, 0.666_666_666_666_666_6);
    }

    #[test]
    #[should_panic(expected = "Expected 1")]
    fn test_assert_close_fails() {
        assert_close(1.1, 1.0);
    }

    #[test]
    fn test_expression_assertions() {
        SqlAssertions::assert_column_ref(&Expr::column("a"), "a");
        SqlAssertions::assert_literal_int(&Expr::Literal(Literal::Integer(3)), 3);
        SqlAssertions::assert_literal_string(&Expr::Literal(Literal::String("x".into())), "x");
        SqlAssertions::assert_renders(&Expr::column("a"), "a");
    }
}
