// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Connection
//!
//! The raw database boundary. A [`Connection`] runs SQL text and maps every
//! result cell into the closed [`Value`](sqldist_ir::Value) set; it keeps no
//! state of its own; caching lives in [`SqlDriver`](crate::SqlDriver).

use sqldist_ir::{Row, TableMetadata};

use crate::error::DriverResult;

/// A live database session
pub trait Connection {
    /// Runs one or more statements, discarding any result rows
    fn execute(&self, sql: &str) -> DriverResult<()>;

    /// Runs a query and returns its rows
    ///
    /// Result columns labelled `alias.column` are grouped under `alias` in
    /// the returned [`Row`]; any other label lands in the unqualified
    /// pseudo-table.
    fn query(&self, sql: &str) -> DriverResult<Vec<Row>>;

    /// Describes every user table with its columns in declaration order
    fn tables(&self) -> DriverResult<Vec<TableMetadata>>;
}
