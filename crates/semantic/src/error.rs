// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Error types for semantic resolution
//!
//! This module defines error types raised while resolving table and column
//! references against scopes and row values.

use sqldist_catalog::CatalogError;
use thiserror::Error;

/// Result type alias for semantic operations
pub type SemanticResult<T> = Result<T, SemanticError>;

/// Errors that can occur during semantic resolution
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemanticError {
    /// Column reference is ambiguous (found in multiple tables)
    #[error("Ambiguous column reference: {0} (found in {1:?})")]
    AmbiguousColumn(String, Vec<String>),

    /// The context reports a column as present but holds no value for it
    #[error("Column {0} is in scope but no value was recorded for it")]
    MissingColumnValue(String),

    /// Table identifier could not be resolved against the schema
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_ambiguous_column() {
        let err = SemanticError::AmbiguousColumn(
            "id".to_string(),
            vec!["users".to_string(), "orders".to_string()],
        );
        let msg = format!("{}", err);
        assert!(msg.contains("id"));
        assert!(msg.contains("Ambiguous"));
        assert!(msg.contains("users"));
        assert!(msg.contains("orders"));
    }

    #[test]
    fn test_error_display_missing_value() {
        let err = SemanticError::MissingColumnValue("t.a".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("t.a"));
        assert!(msg.contains("no value"));
    }

    #[test]
    fn test_catalog_error_conversion() {
        let err: SemanticError = CatalogError::InvalidIdentifier("a.b.c.d".to_string()).into();
        assert!(matches!(err, SemanticError::Catalog(_)));
        assert!(format!("{}", err).contains("a.b.c.d"));
    }
}
