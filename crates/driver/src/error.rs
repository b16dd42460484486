// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Driver error types

use std::error::Error as StdError;

use sqldist_catalog::CatalogError;
use thiserror::Error;

/// Boxed error raised by a connection backend
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Result type alias for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors that can occur while talking to the database
#[derive(Debug, Error)]
pub enum DriverError {
    /// The database could not be opened
    #[error("Failed to open database '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A statement failed to execute
    #[error("Query failed: {sql}: {source}")]
    Query {
        sql: String,
        #[source]
        source: BoxError,
    },

    /// The schema read from the database was invalid
    #[error("Schema extraction failed: {0}")]
    Schema(#[from] CatalogError),
}

impl DriverError {
    /// Wraps a backend error raised while running `sql`
    pub fn query(sql: &str, source: impl Into<BoxError>) -> Self {
        DriverError::Query {
            sql: sql.to_string(),
            source: source.into(),
        }
    }
}
