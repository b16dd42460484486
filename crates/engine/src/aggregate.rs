// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Aggregate functions over the rows of one group
//!
//! Used to fold `HAVING` conditions: each aggregate call is computed over the
//! group's rows and replaced by its result before the condition is scored.

use std::cmp::Ordering;

use sqldist_ir::{BinaryOp, Expr, Value};

use crate::eval::{self, gap};

const AGGREGATES: &[&str] = &["COUNT", "SUM", "TOTAL", "AVG", "MIN", "MAX"];

pub fn is_aggregate(name: &str) -> bool {
    AGGREGATES.iter().any(|a| a.eq_ignore_ascii_case(name))
}

/// `COUNT(*)`, which counts rows rather than values
pub fn is_count_star(name: &str, args: &[Expr]) -> bool {
    name.eq_ignore_ascii_case("COUNT")
        && match args {
            [] => true,
            [Expr::Unsupported(text)] => text.trim() == "*",
            _ => false,
        }
}

/// Applies the aggregate `name` to one value per row.
///
/// NULLs are skipped. With no remaining values `COUNT` is 0, `TOTAL` is 0.0
/// and the others are NULL.
pub fn aggregate(name: &str, distinct: bool, values: Vec<Value>) -> Value {
    if let Some(unsupported) = values.iter().find(|v| matches!(v, Value::Unsupported(_))) {
        return unsupported.clone();
    }
    let mut present: Vec<Value> = Vec::with_capacity(values.len());
    for value in values.into_iter().filter(|v| !v.is_null()) {
        if !distinct || !present.contains(&value) {
            present.push(value);
        }
    }

    match name.to_ascii_uppercase().as_str() {
        "COUNT" => Value::Integer(present.len() as i64),
        "SUM" => sum(&present).unwrap_or(Value::Null),
        "TOTAL" => match sum(&present) {
            Some(Value::Integer(i)) => Value::Float(i as f64),
            Some(other) => other,
            None => Value::Float(0.0),
        },
        "AVG" => match sum(&present).as_ref().map(Value::as_f64) {
            Some(Some(total)) => Value::Float(total / present.len() as f64),
            Some(None) => gap("AVG over non-numeric values"),
            None => Value::Null,
        },
        "MIN" => extreme(present, Ordering::Less),
        "MAX" => extreme(present, Ordering::Greater),
        _ => gap(format!("aggregate {name}")),
    }
}

fn sum(values: &[Value]) -> Option<Value> {
    let mut iter = values.iter();
    let first = iter.next()?.clone();
    Some(iter.fold(first, |acc, v| eval::arithmetic(BinaryOp::Add, &acc, v)))
}

fn extreme(values: Vec<Value>, keep: Ordering) -> Value {
    let mut iter = values.into_iter();
    let Some(mut best) = iter.next() else {
        return Value::Null;
    };
    for value in iter {
        match compare(&value, &best) {
            Some(ordering) if ordering == keep => best = value,
            Some(_) => {}
            None => {
                return gap(format!(
                    "comparing {} with {}",
                    value.type_name(),
                    best.type_name()
                ));
            }
        }
    }
    best
}

fn compare(l: &Value, r: &Value) -> Option<Ordering> {
    match (l, r) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        _ => l.as_f64()?.partial_cmp(&r.as_f64()?),
    }
}
