// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # sqldist - Intermediate Representation
//!
//! This crate provides the Intermediate Representation (IR) shared by the
//! distance engine. The IR is designed to:
//! - Be dialect-agnostic (the parser front-end lowers into it)
//! - Model the predicate forms branch distances are defined over
//! - Render back to SQL text so rewritten subqueries can be executed
//!
//! It also holds the runtime [`Value`]/[`Row`] types produced by drivers and
//! the table metadata used to build schemas.

pub mod dialect;
pub mod expr;
pub mod metadata;
pub mod query;
pub mod render;
pub mod value;

// Re-export commonly used types
pub use dialect::Dialect;
pub use expr::{BinaryOp, ColumnRef, Expr, Literal, Quantifier, UnaryOp};
pub use metadata::{ColumnMetadata, TableMetadata};
pub use query::{
    Join, JoinCondition, JoinType, OrderBy, Query, SelectItem, SelectStatement, SetOp,
    SortDirection, TableRef, TableSource,
};
pub use render::{format_float, quote_string};
pub use value::{DEFAULT_TABLE, Row, TableValues, Value};
