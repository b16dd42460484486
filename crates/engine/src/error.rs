// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Engine errors
//!
//! Only structural problems surface as errors: SQL that cannot be lowered,
//! columns that resolve nowhere or ambiguously, and failing database calls.
//! Constructs the engine merely cannot score are not errors; they evaluate
//! to the infinite distance where they occur.

use sqldist_catalog::CatalogError;
use sqldist_driver::DriverError;
use sqldist_lowering::LoweringError;
use sqldist_semantic::SemanticError;
use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A table's columns could not be looked up in the schema
    #[error("Schema lookup failed: {0}")]
    Catalog(#[from] CatalogError),

    /// The SQL text could not be turned into a query
    #[error("Cannot lower statement: {0}")]
    Lowering(#[from] LoweringError),

    /// A column reference could not be resolved against the row
    #[error("Cannot resolve column: {0}")]
    Semantic(#[from] SemanticError),

    /// The database call failed
    #[error("Database error: {0}")]
    Driver(#[from] DriverError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A subquery references a column that neither its own levels nor the
    /// current row provide
    #[error("Column {0} is not defined by the subquery nor by the enclosing row")]
    UnresolvedColumn(String),
}
