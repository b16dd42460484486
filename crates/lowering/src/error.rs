// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Lowering errors
//!
//! Errors fall in two groups:
//!
//! - **Fatal**: the text does not parse, holds the wrong number of
//!   statements, or is a statement kind the engine cannot turn into a
//!   SELECT. Lowering returns `Err`.
//! - **Recoverable**: an expression the IR does not model. Lowering inserts
//!   an `Expr::Unsupported` placeholder, records the error in the context and
//!   carries on.

use serde::Serialize;

/// Result type alias for lowering operations
pub type LoweringResult<T> = Result<T, LoweringError>;

/// Outcome of a lowering operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoweringOutcome {
    /// Complete success - every node converted
    Success,

    /// Partial success - some nodes were replaced by placeholders
    Partial(Vec<LoweringError>),
}

impl LoweringOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoweringOutcome::Success)
    }
}

/// Errors that can occur during SQL → IR lowering
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq, Serialize)]
pub enum LoweringError {
    /// The SQL text could not be parsed
    #[error("Failed to parse SQL: {message}")]
    Parse { message: String },

    /// Exactly one statement was expected
    #[error("Expected exactly one SQL statement, found {found}")]
    StatementCount { found: usize },

    /// Statement kind the engine cannot evaluate
    #[error("Unsupported statement: {statement}")]
    UnsupportedStatement { statement: String },

    /// Invalid literal value
    #[error("Invalid literal value: {value} cannot be parsed as {type_name}")]
    InvalidLiteral { value: String, type_name: String },

    /// Syntax feature not modelled by the IR
    #[error("Syntax not supported by {dialect}: {feature}. {suggestion}")]
    UnsupportedSyntax {
        dialect: String,
        feature: String,
        suggestion: String,
    },

    /// Recursion limit exceeded (e.g., deeply nested subqueries)
    #[error("Recursion limit exceeded: {context} (depth: {depth}, limit: {limit})")]
    RecursionLimitExceeded {
        context: String,
        depth: usize,
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unsupported_syntax() {
        let err = LoweringError::UnsupportedSyntax {
            dialect: "mysql".to_string(),
            feature: "LIKE ... ESCAPE".to_string(),
            suggestion: "Drop the ESCAPE clause".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("mysql"));
        assert!(msg.contains("ESCAPE"));
    }

    #[test]
    fn test_invalid_literal_display() {
        let err = LoweringError::InvalidLiteral {
            value: "1e999999".to_string(),
            type_name: "number".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid literal value: 1e999999 cannot be parsed as number"
        );
    }

    #[test]
    fn test_error_serialization() {
        let err = LoweringError::UnsupportedStatement {
            statement: "INSERT".to_string(),
        };
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("INSERT"));
    }
}
