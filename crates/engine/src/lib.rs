// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # sqldist - Distance Engine
//!
//! Measures how close a database came to satisfying a query that returned
//! nothing. The result is a [`Distance`] whose normalized
//! [`value`](Distance::value) lies in `[0, 1]`: `0` means some row
//! satisfies the query, values near `1` mean the data is far away, and
//! exactly `1` means no information could be gathered.
//!
//! ## Architecture
//!
//! ```text
//! SQL → Lowering → QueryDistanceCalculator
//!                     │  unrestricted query via Driver
//!                     ▼
//!                  per row: WhereDistanceCalculator
//!                     │  subqueries: SubQueryContextualizer → Driver
//!                     ▼
//!                  minimum Distance
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use sqldist_driver::{Driver, SqlDriver, SqliteConnection};
//! use sqldist_engine::{EngineConfig, QueryDistanceCalculator};
//!
//! let mut driver = SqlDriver::new(SqliteConnection::open_in_memory().unwrap());
//! driver
//!     .execute("CREATE TABLE t (a INTEGER); INSERT INTO t VALUES (1), (5), (10);")
//!     .unwrap();
//!
//! let mut calculator =
//!     QueryDistanceCalculator::new("SELECT * FROM t WHERE a = 7", &mut driver, EngineConfig::default())
//!         .unwrap();
//! let distance = calculator.calculate().unwrap();
//!
//! // The closest row is 5: raw distance 2
//! assert_eq!(distance.raw(), 2.0);
//! assert!((distance.value() - 2.0 / 3.0).abs() < 1e-12);
//! ```

pub mod aggregate;
pub mod branch;
pub mod config;
pub mod contextualizer;
pub mod diagnostics;
pub mod distance;
pub mod error;
pub mod eval;
pub mod query_distance;
pub mod where_distance;

pub use config::{ConfigError, DEFAULT_MAX_SUBQUERY_DEPTH, EngineConfig};
pub use contextualizer::SubQueryContextualizer;
pub use diagnostics::DiagnosticsSink;
pub use distance::{Distance, INF_DISTANCE, ZERO_DISTANCE, normalize};
pub use error::{EngineError, EngineResult};
pub use query_distance::{DistanceReport, QueryDistanceCalculator, evaluate_sql};
pub use where_distance::WhereDistanceCalculator;
