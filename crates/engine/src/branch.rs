// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Branch-distance primitives
//!
//! Raw distances are non-negative `f64`s. Every function here saturates at
//! `f64::MAX` instead of overflowing to infinity.

use sqldist_ir::BinaryOp;

/// Weight of one character of length difference in [`left_alignment_distance`]
pub const CHAR_LENGTH_PENALTY: f64 = 65_536.0;

/// Clamps a raw result into `[0, f64::MAX]`; NaN counts as unreachable
pub fn saturate(raw: f64) -> f64 {
    if raw.is_nan() {
        f64::MAX
    } else {
        raw.clamp(0.0, f64::MAX)
    }
}

pub fn add_distances(a: f64, b: f64) -> f64 {
    saturate(a + b)
}

pub fn distance_to_equality(a: f64, b: f64) -> f64 {
    saturate((a - b).abs())
}

/// Distance for `x op y` over numbers
///
/// With `d = x - y`:
///
/// | op   | satisfied | otherwise |
/// |------|-----------|-----------|
/// | `=`  | `d == 0`  | `abs(d)`  |
/// | `<>` | `d != 0`  | `1`       |
/// | `<`  | `d < 0`   | `d + 1`   |
/// | `<=` | `d <= 0`  | `d`       |
/// | `>`  | `d > 0`   | `1 - d`   |
/// | `>=` | `d >= 0`  | `-d`      |
///
/// Returns `None` for non-comparison operators.
pub fn numeric_comparison(op: BinaryOp, x: f64, y: f64) -> Option<f64> {
    let d = x - y;
    let raw = match op {
        BinaryOp::Eq => d.abs(),
        BinaryOp::NotEq => {
            if d != 0.0 {
                0.0
            } else {
                1.0
            }
        }
        BinaryOp::Lt => {
            if d < 0.0 {
                0.0
            } else {
                d + 1.0
            }
        }
        BinaryOp::LtEq => {
            if d <= 0.0 {
                0.0
            } else {
                d
            }
        }
        BinaryOp::Gt => {
            if d > 0.0 {
                0.0
            } else {
                1.0 - d
            }
        }
        BinaryOp::GtEq => {
            if d >= 0.0 {
                0.0
            } else {
                -d
            }
        }
        _ => return None,
    };
    Some(saturate(raw))
}

/// [`numeric_comparison`] over integers, exact across the whole `i64` range
pub fn integer_comparison(op: BinaryOp, x: i64, y: i64) -> Option<f64> {
    let d = i128::from(x) - i128::from(y);
    let raw = match op {
        BinaryOp::Eq => d.abs(),
        BinaryOp::NotEq => i128::from(d == 0),
        BinaryOp::Lt => {
            if d < 0 {
                0
            } else {
                d + 1
            }
        }
        BinaryOp::LtEq => d.max(0),
        BinaryOp::Gt => {
            if d > 0 {
                0
            } else {
                1 - d
            }
        }
        BinaryOp::GtEq => (-d).max(0),
        _ => return None,
    };
    Some(saturate(raw as f64))
}

/// Distance between two strings aligned at their first character
///
/// The length difference weighs [`CHAR_LENGTH_PENALTY`] per character; each
/// aligned pair adds the gap between its character codes.
pub fn left_alignment_distance(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let length_gap = a.len().abs_diff(b.len()) as f64 * CHAR_LENGTH_PENALTY;
    let char_gap: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as i64 - *y as i64).unsigned_abs() as f64)
        .sum();
    saturate(length_gap + char_gap)
}

/// Signed ordering gap between two strings
///
/// The code gap of the first differing character, or the length difference
/// when one string is a prefix of the other. Negative iff `a < b`.
pub fn string_order_gap(a: &str, b: &str) -> f64 {
    let mut left = a.chars();
    let mut right = b.chars();
    loop {
        match (left.next(), right.next()) {
            (Some(x), Some(y)) if x != y => return x as i64 as f64 - y as i64 as f64,
            (Some(_), Some(_)) => continue,
            (Some(_), None) => return 1.0 + left.count() as f64,
            (None, Some(_)) => return -(1.0 + right.count() as f64),
            (None, None) => return 0.0,
        }
    }
}

/// Distance for `a op b` over strings
pub fn string_comparison(op: BinaryOp, a: &str, b: &str) -> Option<f64> {
    match op {
        BinaryOp::Eq => Some(left_alignment_distance(a, b)),
        BinaryOp::NotEq => Some(if a != b { 0.0 } else { 1.0 }),
        _ => numeric_comparison(op, string_order_gap(a, b), 0.0),
    }
}

/// Distance for `a op b` over booleans; only `=` and `<>` are defined
pub fn boolean_comparison(op: BinaryOp, a: bool, b: bool) -> Option<f64> {
    match op {
        BinaryOp::Eq => Some(if a == b { 0.0 } else { 1.0 }),
        BinaryOp::NotEq => Some(if a != b { 0.0 } else { 1.0 }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_comparison_table() {
        assert_eq!(numeric_comparison(BinaryOp::Eq, 5.0, 7.0), Some(2.0));
        assert_eq!(numeric_comparison(BinaryOp::NotEq, 5.0, 5.0), Some(1.0));
        assert_eq!(numeric_comparison(BinaryOp::NotEq, 5.0, 6.0), Some(0.0));
        assert_eq!(numeric_comparison(BinaryOp::Lt, 5.0, 5.0), Some(1.0));
        assert_eq!(numeric_comparison(BinaryOp::Lt, 7.0, 5.0), Some(3.0));
        assert_eq!(numeric_comparison(BinaryOp::LtEq, 7.0, 5.0), Some(2.0));
        assert_eq!(numeric_comparison(BinaryOp::LtEq, 5.0, 5.0), Some(0.0));
        assert_eq!(numeric_comparison(BinaryOp::Gt, 5.0, 5.0), Some(1.0));
        assert_eq!(numeric_comparison(BinaryOp::Gt, 3.0, 5.0), Some(3.0));
        assert_eq!(numeric_comparison(BinaryOp::GtEq, 3.0, 5.0), Some(2.0));
        assert_eq!(numeric_comparison(BinaryOp::Add, 3.0, 5.0), None);
    }

    #[test]
    fn test_integer_comparison_is_exact() {
        let (big, bigger) = (9_007_199_254_740_992_i64, 9_007_199_254_740_993_i64);
        assert_eq!(big as f64, bigger as f64);
        assert_eq!(integer_comparison(BinaryOp::Eq, bigger, big), Some(1.0));
        assert_eq!(integer_comparison(BinaryOp::NotEq, bigger, big), Some(0.0));
        assert_eq!(integer_comparison(BinaryOp::Lt, bigger, big), Some(2.0));
        assert_eq!(integer_comparison(BinaryOp::GtEq, big, bigger), Some(1.0));
        assert_eq!(integer_comparison(BinaryOp::Gt, 3, 5), Some(3.0));
        assert_eq!(integer_comparison(BinaryOp::LtEq, 5, 5), Some(0.0));
        assert_eq!(integer_comparison(BinaryOp::Eq, i64::MIN, i64::MAX), Some(u64::MAX as f64));
        assert_eq!(integer_comparison(BinaryOp::Mul, 1, 2), None);
    }

    #[test]
    fn test_saturation() {
        assert_eq!(add_distances(f64::MAX, f64::MAX), f64::MAX);
        assert_eq!(distance_to_equality(f64::MAX, -f64::MAX), f64::MAX);
        assert_eq!(numeric_comparison(BinaryOp::Gt, -f64::MAX, f64::MAX), Some(f64::MAX));
        assert_eq!(saturate(f64::NAN), f64::MAX);
    }

    #[test]
    fn test_left_alignment_distance() {
        assert_eq!(left_alignment_distance("abc", "abc"), 0.0);
        assert_eq!(left_alignment_distance("abc", "abd"), 1.0);
        assert_eq!(left_alignment_distance("ab", "abc"), CHAR_LENGTH_PENALTY);
        assert_eq!(left_alignment_distance("", "a"), CHAR_LENGTH_PENALTY);
    }

    #[test]
    fn test_string_ordering() {
        assert!(string_order_gap("abc", "abd") < 0.0);
        assert!(string_order_gap("b", "a") > 0.0);
        assert!(string_order_gap("ab", "abc") < 0.0);
        assert_eq!(string_order_gap("same", "same"), 0.0);

        assert_eq!(string_comparison(BinaryOp::Lt, "a", "b"), Some(0.0));
        assert_eq!(string_comparison(BinaryOp::Lt, "b", "a"), Some(2.0));
        assert_eq!(string_comparison(BinaryOp::NotEq, "a", "a"), Some(1.0));
    }

    #[test]
    fn test_boolean_comparison() {
        assert_eq!(boolean_comparison(BinaryOp::Eq, true, true), Some(0.0));
        assert_eq!(boolean_comparison(BinaryOp::NotEq, true, true), Some(1.0));
        assert_eq!(boolean_comparison(BinaryOp::Lt, false, true), None);
    }
}
