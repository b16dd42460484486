// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Lowering Context
//!
//! State threaded through one lowering pass: the dialect, the recoverable
//! errors collected so far and the current subquery nesting depth.

use std::fmt::Display;

use sqldist_ir::{Dialect, Expr};

use crate::error::{LoweringError, LoweringOutcome};

/// Default limit on nested queries
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Context for tracking state during SQL → IR lowering
pub struct LoweringContext {
    /// Target SQL dialect
    dialect: Dialect,

    /// Accumulated errors during lowering (for partial success)
    errors: Vec<LoweringError>,

    /// Current recursion depth
    recursion_depth: usize,

    /// Maximum recursion depth allowed
    max_recursion_depth: usize,
}

impl LoweringContext {
    /// Create a new lowering context
    pub fn new(dialect: Dialect) -> Self {
        Self::with_max_depth(dialect, DEFAULT_MAX_DEPTH)
    }

    /// Create a new lowering context with custom max recursion depth
    pub fn with_max_depth(dialect: Dialect, max_depth: usize) -> Self {
        Self {
            dialect,
            errors: Vec::new(),
            recursion_depth: 0,
            max_recursion_depth: max_depth,
        }
    }

    /// Get the target dialect
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Add an error to the context (for partial success mode)
    pub fn add_error(&mut self, error: LoweringError) {
        self.errors.push(error);
    }

    /// Get all accumulated errors
    pub fn errors(&self) -> &[LoweringError] {
        &self.errors
    }

    /// Get the lowering outcome based on accumulated errors
    pub fn outcome(&self) -> LoweringOutcome {
        if self.errors.is_empty() {
            LoweringOutcome::Success
        } else {
            LoweringOutcome::Partial(self.errors.clone())
        }
    }

    /// Records an unsupported construct and returns a placeholder for it.
    ///
    /// The placeholder keeps the construct's SQL text so the rendered query
    /// can still be executed by a database that understands it.
    pub fn unsupported(&mut self, feature: &str, node: &impl Display) -> Expr {
        let text = node.to_string();
        tracing::debug!(feature, sql = %text, "replacing unsupported syntax with placeholder");
        self.add_error(LoweringError::UnsupportedSyntax {
            dialect: self.dialect.to_string(),
            feature: feature.to_string(),
            suggestion: "Distance for this part is treated as unknown".to_string(),
        });
        Expr::Unsupported(text)
    }

    /// Increment recursion depth and check for overflow
    pub fn enter_recursive_context(&mut self) -> Result<(), LoweringError> {
        self.recursion_depth += 1;
        if self.recursion_depth > self.max_recursion_depth {
            let error = LoweringError::RecursionLimitExceeded {
                context: "query lowering".to_string(),
                depth: self.recursion_depth,
                limit: self.max_recursion_depth,
            };
            self.add_error(error.clone());
            Err(error)
        } else {
            Ok(())
        }
    }

    /// Decrement recursion depth when exiting a recursive context
    pub fn exit_recursive_context(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_records_error() {
        let mut ctx = LoweringContext::new(Dialect::PostgreSQL);
        let placeholder = ctx.unsupported("JSON operator", &"data -> 'k'");

        assert_eq!(placeholder, Expr::Unsupported("data -> 'k'".to_string()));
        assert_eq!(ctx.errors().len(), 1);
        assert!(matches!(ctx.outcome(), LoweringOutcome::Partial(ref errs) if errs.len() == 1));
    }

    #[test]
    fn test_recursion_limit() {
        let mut ctx = LoweringContext::with_max_depth(Dialect::Generic, 2);
        assert!(ctx.enter_recursive_context().is_ok());
        assert!(ctx.enter_recursive_context().is_ok());
        assert!(ctx.enter_recursive_context().is_err());
        ctx.exit_recursive_context();
        ctx.exit_recursive_context();
        ctx.exit_recursive_context();
        ctx.exit_recursive_context();
        assert!(ctx.enter_recursive_context().is_ok());
    }

    #[test]
    fn test_fresh_context_succeeds() {
        let ctx = LoweringContext::new(Dialect::SQLite);
        assert_eq!(ctx.dialect(), Dialect::SQLite);
        assert!(ctx.outcome().is_success());
    }
}
