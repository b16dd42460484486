// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # sqldist - Lowering Layer
//!
//! This crate turns SQL text into the unified IR the distance engine works on.
//!
//! ## Overview
//!
//! The lowering layer is responsible for:
//! - Parsing SQL with the dialect-specific `sqlparser` grammar
//! - Converting the parser AST to [`sqldist_ir::Query`]
//! - Rewriting DELETE and UPDATE into the SELECT of their affected rows
//! - Graceful error recovery (partial success mode)
//!
//! ## Lowering Process
//!
//! ```text
//! SQL text → sqlparser AST → Lowering → IR Query → Distance evaluation
//! ```
//!
//! ## Error Handling Strategy
//!
//! - **Success**: every node converted
//! - **Partial**: unsupported expressions were replaced by
//!   [`sqldist_ir::Expr::Unsupported`] placeholders
//!
//! Text that is not a single SELECT, DELETE or UPDATE is an `Err`.
//!
//! ## Usage
//!
//! ```rust
//! use sqldist_ir::Dialect;
//! use sqldist_lowering::{StatementKind, parse_statement};
//!
//! let lowered = parse_statement("DELETE FROM t WHERE a = 1", Dialect::SQLite).unwrap();
//! assert_eq!(lowered.kind, StatementKind::Delete);
//! assert!(lowered.outcome.is_success());
//! assert_eq!(lowered.query.to_string(), "SELECT * FROM t WHERE a = 1");
//! ```

pub mod context;
pub mod dialect;
pub mod error;
mod expr;
mod query;
pub mod statement;

pub use context::{DEFAULT_MAX_DEPTH, LoweringContext};
pub use dialect::parser_dialect;
pub use error::{LoweringError, LoweringOutcome, LoweringResult};
pub use statement::StatementKind;

use sqlparser::parser::Parser;
use sqldist_ir::{Dialect, Query};

/// A statement lowered to a query
#[derive(Debug, Clone, PartialEq)]
pub struct LoweredStatement {
    /// What the source statement was
    pub kind: StatementKind,

    /// The query selecting the rows the statement reads or touches
    pub query: Query,

    /// Whether any part of the statement was replaced by a placeholder
    pub outcome: LoweringOutcome,
}

/// Parses exactly one SQL statement and lowers it.
///
/// Fails when the text does not parse, holds zero or several statements,
/// or is neither a query, a DELETE nor an UPDATE.
pub fn parse_statement(sql: &str, dialect: Dialect) -> LoweringResult<LoweredStatement> {
    let parser = parser_dialect(dialect);
    let statements =
        Parser::parse_sql(parser.as_ref(), sql).map_err(|e| LoweringError::Parse {
            message: e.to_string(),
        })?;

    let [statement] = statements.as_slice() else {
        return Err(LoweringError::StatementCount {
            found: statements.len(),
        });
    };

    let mut ctx = LoweringContext::new(dialect);
    let (kind, query) = statement::lower_statement(&mut ctx, statement)?;
    let outcome = ctx.outcome();
    if let LoweringOutcome::Partial(errors) = &outcome {
        tracing::debug!(count = errors.len(), "statement lowered with placeholders");
    }

    Ok(LoweredStatement {
        kind,
        query,
        outcome,
    })
}

/// Parses and lowers a statement, keeping only the resulting query
pub fn parse_query(sql: &str, dialect: Dialect) -> LoweringResult<Query> {
    parse_statement(sql, dialect).map(|lowered| lowered.query)
}
