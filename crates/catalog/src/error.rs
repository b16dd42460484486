// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for Catalog operations
//!
//! This module defines the error types used throughout the catalog layer.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for Catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur during Catalog operations
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum CatalogError {
    /// Dotted identifier with too many (or empty) segments
    #[error("Invalid identifier '{0}': expected name, schema.name or catalog.schema.name")]
    InvalidIdentifier(String),

    /// Requested table was not found
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    /// Failed to serialize or deserialize schema data
    #[error("Failed to serialize schema data: {0}")]
    SerializationError(String),

    /// Failed to read a schema file
    #[error("Failed to read schema file '{path}': {message}")]
    Io { path: String, message: String },
}
