// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Scalar evaluation over runtime values
//!
//! Results the engine cannot compute are returned as
//! [`Value::Unsupported`] carrying the reason, so callers can score the
//! surrounding predicate as an evaluation gap.

use sqldist_ir::{BinaryOp, Value, format_float};

pub(crate) fn gap(reason: impl Into<String>) -> Value {
    Value::Unsupported(reason.into())
}

fn float_result(f: f64) -> Value {
    if f.is_finite() {
        Value::Float(f)
    } else {
        Value::Float(f64::MAX.copysign(f))
    }
}

/// `l op r` for `+ - * / %`
///
/// Integer arithmetic is checked and falls back to floats on overflow.
/// Division or modulo by zero yields NULL.
pub fn arithmetic(op: BinaryOp, l: &Value, r: &Value) -> Value {
    if let Value::Unsupported(_) = l {
        return l.clone();
    }
    if let Value::Unsupported(_) = r {
        return r.clone();
    }
    if l.is_null() || r.is_null() {
        return Value::Null;
    }

    if let (Value::Integer(a), Value::Integer(b)) = (l, r) {
        let (a, b) = (*a, *b);
        if matches!(op, BinaryOp::Div | BinaryOp::Mod) && b == 0 {
            return Value::Null;
        }
        let checked = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Div => a.checked_div(b),
            BinaryOp::Mod => a.checked_rem(b),
            _ => return gap(format!("{op} is not arithmetic")),
        };
        if let Some(result) = checked {
            return Value::Integer(result);
        }
    }

    let (Some(a), Some(b)) = (l.as_f64(), r.as_f64()) else {
        return gap(format!("{} {op} {}", l.type_name(), r.type_name()));
    };
    match op {
        BinaryOp::Add => float_result(a + b),
        BinaryOp::Sub => float_result(a - b),
        BinaryOp::Mul => float_result(a * b),
        BinaryOp::Div | BinaryOp::Mod if b == 0.0 => Value::Null,
        BinaryOp::Div => float_result(a / b),
        BinaryOp::Mod => float_result(a % b),
        _ => gap(format!("{op} is not arithmetic")),
    }
}

pub fn negate(v: &Value) -> Value {
    match v {
        Value::Null => Value::Null,
        Value::Integer(i) => i
            .checked_neg()
            .map(Value::Integer)
            .unwrap_or_else(|| float_result(-(*i as f64))),
        other => match other.as_f64() {
            Some(f) => float_result(-f),
            None => gap(format!("-{}", other.type_name())),
        },
    }
}

/// Text form used by `||` and the string functions
pub fn text_form(v: &Value) -> Option<String> {
    match v {
        Value::Text(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(format_float(*f)),
        Value::Boolean(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Null | Value::Unsupported(_) => None,
    }
}

pub fn concat(l: &Value, r: &Value) -> Value {
    for v in [l, r] {
        if let Value::Unsupported(_) = v {
            return v.clone();
        }
    }
    match (text_form(l), text_form(r)) {
        (Some(a), Some(b)) => Value::Text(a + &b),
        _ => Value::Null,
    }
}

/// `CAST(v AS type_name)` for the numeric and text target types
pub fn cast(v: Value, type_name: &str) -> Value {
    if v.is_null() {
        return v;
    }
    let target = type_name.to_ascii_uppercase();
    if target.contains("INT") {
        match v.as_f64() {
            Some(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Value::Integer(f.trunc() as i64),
            _ => gap(format!("CAST({} AS {type_name})", v.type_name())),
        }
    } else if ["REAL", "FLOA", "DOUB", "NUMERIC", "DECIMAL"]
        .iter()
        .any(|t| target.contains(t))
    {
        match v.as_f64() {
            Some(f) => Value::Float(f),
            None => gap(format!("CAST({} AS {type_name})", v.type_name())),
        }
    } else if ["CHAR", "TEXT", "CLOB"].iter().any(|t| target.contains(t)) {
        text_form(&v).map(Value::Text).unwrap_or(v)
    } else {
        v
    }
}

/// Evaluates a scalar function call
///
/// Supports `LOWER`, `UPPER`, `LENGTH`, `ABS`, `COALESCE` and `TRIM`.
pub fn call_function(name: &str, args: &[Value]) -> Value {
    if let Some(unsupported) = args.iter().find(|a| matches!(a, Value::Unsupported(_))) {
        return unsupported.clone();
    }
    let upper = name.to_ascii_uppercase();
    match (upper.as_str(), args) {
        ("COALESCE", args) if !args.is_empty() => args
            .iter()
            .find(|a| !a.is_null())
            .cloned()
            .unwrap_or(Value::Null),
        (_, [Value::Null]) if matches!(upper.as_str(), "LOWER" | "UPPER" | "LENGTH" | "ABS" | "TRIM") => {
            Value::Null
        }
        ("LOWER", [v]) => text_form(v).map_or(Value::Null, |s| Value::Text(s.to_lowercase())),
        ("UPPER", [v]) => text_form(v).map_or(Value::Null, |s| Value::Text(s.to_uppercase())),
        ("TRIM", [v]) => text_form(v).map_or(Value::Null, |s| Value::Text(s.trim().to_string())),
        ("LENGTH", [v]) => {
            text_form(v).map_or(Value::Null, |s| Value::Integer(s.chars().count() as i64))
        }
        ("ABS", [Value::Integer(i)]) => i
            .checked_abs()
            .map(Value::Integer)
            .unwrap_or_else(|| float_result((*i as f64).abs())),
        ("ABS", [v]) => match v.as_f64() {
            Some(f) => Value::Float(f.abs()),
            None => gap(format!("ABS({})", v.type_name())),
        },
        _ => gap(format!("{name}/{}", args.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_arithmetic() {
        let v = |i| Value::Integer(i);
        assert_eq!(arithmetic(BinaryOp::Add, &v(2), &v(3)), v(5));
        assert_eq!(arithmetic(BinaryOp::Div, &v(7), &v(2)), v(3));
        assert_eq!(arithmetic(BinaryOp::Mod, &v(7), &v(0)), Value::Null);
        assert_eq!(
            arithmetic(BinaryOp::Add, &v(i64::MAX), &v(1)),
            Value::Float(i64::MAX as f64 + 1.0)
        );
    }

    #[test]
    fn test_mixed_arithmetic() {
        assert_eq!(
            arithmetic(BinaryOp::Mul, &Value::Integer(2), &Value::Float(1.5)),
            Value::Float(3.0)
        );
        assert_eq!(
            arithmetic(BinaryOp::Div, &Value::Float(1.0), &Value::Float(0.0)),
            Value::Null
        );
        assert_eq!(
            arithmetic(BinaryOp::Add, &Value::Null, &Value::Integer(1)),
            Value::Null
        );
        assert!(matches!(
            arithmetic(BinaryOp::Add, &Value::from("abc"), &Value::Integer(1)),
            Value::Unsupported(_)
        ));
        assert_eq!(
            arithmetic(BinaryOp::Mul, &Value::Float(f64::MAX), &Value::Float(2.0)),
            Value::Float(f64::MAX)
        );
    }

    #[test]
    fn test_negate() {
        assert_eq!(negate(&Value::Integer(3)), Value::Integer(-3));
        assert_eq!(negate(&Value::Integer(i64::MIN)), Value::Float(-(i64::MIN as f64)));
        assert_eq!(negate(&Value::Null), Value::Null);
    }

    #[test]
    fn test_concat() {
        assert_eq!(concat(&Value::from("a"), &Value::Integer(1)), Value::from("a1"));
        assert_eq!(concat(&Value::from("a"), &Value::Null), Value::Null);
        assert_eq!(concat(&Value::Float(2.0), &Value::from("x")), Value::from("2.0x"));
    }

    #[test]
    fn test_cast() {
        assert_eq!(cast(Value::from("42"), "INTEGER"), Value::Integer(42));
        assert_eq!(cast(Value::Integer(3), "REAL"), Value::Float(3.0));
        assert_eq!(cast(Value::Integer(3), "TEXT"), Value::from("3"));
        assert_eq!(cast(Value::Null, "INTEGER"), Value::Null);
    }

    #[test]
    fn test_functions() {
        assert_eq!(call_function("lower", &[Value::from("AbC")]), Value::from("abc"));
        assert_eq!(call_function("UPPER", &[Value::from("abc")]), Value::from("ABC"));
        assert_eq!(call_function("length", &[Value::from("héllo")]), Value::Integer(5));
        assert_eq!(call_function("ABS", &[Value::Integer(-4)]), Value::Integer(4));
        assert_eq!(call_function("abs", &[Value::Float(-1.5)]), Value::Float(1.5));
        assert_eq!(call_function("TRIM", &[Value::from("  x ")]), Value::from("x"));
        assert_eq!(
            call_function("COALESCE", &[Value::Null, Value::Integer(2), Value::Integer(3)]),
            Value::Integer(2)
        );
        assert_eq!(call_function("LOWER", &[Value::Null]), Value::Null);
        assert!(matches!(call_function("SUBSTR", &[Value::from("abc")]), Value::Unsupported(_)));
    }
}
