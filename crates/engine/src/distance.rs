// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Distance
//!
//! How far a row is from satisfying a predicate. Lower is better; zero means
//! satisfied.
//!
//! A [`Distance`] keeps the raw, unbounded branch distance and orders by its
//! normalized form `d / (d + 1)`, which lies in `[0, 1)` for every finite
//! distance. [`INF_DISTANCE`] normalizes to exactly `1.0` and marks "no
//! information": the branch could not be evaluated, or nothing could satisfy
//! it.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::branch;

/// Largest `f64` strictly below `1.0`
const MAX_FINITE_NORMALIZED: f64 = 1.0 - f64::EPSILON / 2.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Distance {
    raw: f64,
}

/// The predicate is satisfied
pub const ZERO_DISTANCE: Distance = Distance { raw: 0.0 };

/// The predicate cannot be satisfied or evaluated
pub const INF_DISTANCE: Distance = Distance { raw: f64::MAX };

/// Maps a raw distance into `[0, 1]`.
///
/// Finite distances land strictly below `1.0`, even when `d / (d + 1)` would
/// round up to it; `f64::MAX` and infinity map to `1.0`.
pub fn normalize(raw: f64) -> f64 {
    if raw.is_nan() || raw >= f64::MAX {
        return 1.0;
    }
    let raw = raw.max(0.0);
    (raw / (raw + 1.0)).min(MAX_FINITE_NORMALIZED)
}

impl Distance {
    /// Wraps a raw distance. Negative or NaN input saturates to [`INF_DISTANCE`].
    pub fn new(raw: f64) -> Self {
        if raw.is_nan() || raw < 0.0 {
            tracing::warn!(raw, "invalid raw distance, treating as infinite");
            return INF_DISTANCE;
        }
        Self {
            raw: branch::saturate(raw),
        }
    }

    /// `0` when the condition holds, `1` otherwise
    pub fn from_bool(holds: bool) -> Self {
        if holds { ZERO_DISTANCE } else { Distance::new(1.0) }
    }

    pub fn raw(&self) -> f64 {
        self.raw
    }

    /// The normalized distance in `[0, 1]`
    pub fn value(&self) -> f64 {
        normalize(self.raw)
    }

    pub fn is_zero(&self) -> bool {
        self.raw == 0.0
    }

    pub fn is_infinite(&self) -> bool {
        self.raw >= f64::MAX
    }

    /// Distance of a conjunction: the saturating sum
    pub fn and(self, other: Distance) -> Distance {
        Distance::new(branch::add_distances(self.raw, other.raw))
    }

    /// Distance of a disjunction: the closer side
    pub fn or(self, other: Distance) -> Distance {
        self.min(other)
    }
}

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Distance {}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Distance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value().total_cmp(&other.value())
    }
}

impl Default for Distance {
    fn default() -> Self {
        INF_DISTANCE
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            f.write_str("inf")
        } else {
            write!(f, "{} ({:.6})", self.raw, self.value())
        }
    }
}
