// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # sqldist - Driver Layer
//!
//! The only part of the workspace that performs I/O:
//!
//! - [`Connection`]: a raw database session with explicit row mapping
//! - [`SqliteConnection`]: the `rusqlite` implementation
//! - [`Driver`] / [`SqlDriver`]: cached query access and schema extraction
//!
//! ```rust
//! use sqldist_driver::{Driver, SqlDriver, SqliteConnection};
//!
//! let mut driver = SqlDriver::new(SqliteConnection::open_in_memory().unwrap());
//! driver.execute("CREATE TABLE t (a INTEGER); INSERT INTO t VALUES (7);").unwrap();
//!
//! let rows = driver.query("SELECT a FROM t").unwrap();
//! assert_eq!(rows.len(), 1);
//! assert_eq!(driver.schema().unwrap().columns("t").unwrap(), vec!["a"]);
//! ```

pub mod connection;
pub mod driver;
pub mod error;
pub mod sqlite;

pub use connection::Connection;
pub use driver::{Driver, SqlDriver};
pub use error::{BoxError, DriverError, DriverResult};
pub use sqlite::SqliteConnection;
