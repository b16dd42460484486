// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # sqldist - Semantic Layer
//!
//! This crate resolves column references across nested queries.
//!
//! ## Overview
//!
//! Two questions come up for every column in a predicate:
//! - **Is it local?** [`SchemaContext`] answers it from the schema: the
//!   stack of query levels enclosing the column, each listing the tables of
//!   its `FROM` clause and their columns.
//! - **What is its value?** [`EvaluationContext`] answers it from one
//!   fetched row, grouped by the table each value came from.
//!
//! ## Core Concepts
//!
//! ### Tables and columns
//!
//! ```rust
//! use sqldist_semantic::{QueryColumn, QueryTable};
//!
//! let table = QueryTable::new("employees").with_alias("e");
//! assert!(table.matches("e"));
//!
//! let column = QueryColumn::new("salary").with_table("e");
//! assert_eq!(column.qualified(), "e.salary");
//! ```
//!
//! ### Schema context
//!
//! ```rust
//! use sqldist_catalog::Schema;
//! use sqldist_ir::TableRef;
//! use sqldist_semantic::{QueryColumn, SchemaContext, create_schema_context_item};
//!
//! let schema = Schema::from_table_columns(vec![("emp", vec!["id", "salary"])]);
//! let item = create_schema_context_item(&[TableRef::table("emp")], &schema).unwrap();
//!
//! let mut ctx = SchemaContext::new();
//! ctx.add(item);
//! assert!(ctx.includes(&QueryColumn::new("salary")));
//! ```
//!
//! ### Evaluation context
//!
//! ```rust
//! use sqldist_ir::{Row, Value};
//! use sqldist_semantic::{QueryColumn, QueryTable, create_evaluation_context};
//!
//! let row = Row::from_labelled(vec![("emp.salary", Value::Integer(100))]);
//! let ctx = create_evaluation_context(&[QueryTable::new("emp")], &row);
//! assert_eq!(
//!     ctx.get_value(&QueryColumn::new("salary")).unwrap(),
//!     &Value::Integer(100)
//! );
//! ```

pub mod error;
pub mod evaluation;
pub mod schema_context;
pub mod table;

pub use error::{SemanticError, SemanticResult};
pub use evaluation::{EvaluationContext, TableColumnsValues, create_evaluation_context};
pub use schema_context::{
    SchemaContext, SchemaContextItem, create_schema_context_item, output_columns,
};
pub use table::{QueryColumn, QueryTable, from_tables, select_tables};
