// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # sqldist - Catalog Layer
//!
//! This crate provides schema information for the distance engine:
//!
//! - [`Schema`]: the immutable, case-insensitive table → columns map every
//!   calculator consults
//! - [`match_by_name`]: resolution of `name`, `schema.name` and
//!   `catalog.schema.name` identifiers against table descriptors
//! - [`Catalog`]: a source of table definitions, with [`StaticCatalog`] for
//!   file-based (YAML/JSON) schemas
//!
//! ## Usage
//!
//! ```rust
//! use sqldist_catalog::Schema;
//!
//! let schema = Schema::from_table_columns(vec![("Users", vec!["Id", "Email"])]);
//! assert_eq!(schema.columns("users").unwrap(), vec!["id", "email"]);
//! ```

pub mod error;
pub mod name;
pub mod schema;
pub mod r#static;
pub mod r#trait;

// Re-exports
pub use error::{CatalogError, CatalogResult};
pub use name::{DEFAULT_SCHEMA, match_by_name, split_qualified_name};
pub use schema::{Schema, create_schema};
pub use r#static::StaticCatalog;
pub use r#trait::Catalog;
pub use sqldist_ir::{ColumnMetadata, TableMetadata};
