// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog trait
//!
//! Source of table definitions. The engine only needs to enumerate tables
//! and their columns once per connection, so the interface is synchronous.

use sqldist_ir::{ColumnMetadata, TableMetadata};

use crate::error::CatalogResult;

/// Catalog trait for database schema abstraction
///
/// Implementations can read from live databases or static files.
///
/// # Examples
///
/// ```rust,ignore
/// use sqldist_catalog::{Catalog, CatalogError};
///
/// fn table_names(catalog: &impl Catalog) -> Result<Vec<String>, CatalogError> {
///     Ok(catalog.list_tables()?.into_iter().map(|t| t.name).collect())
/// }
/// ```
pub trait Catalog: Send + Sync {
    /// List all tables in the database
    ///
    /// # Errors
    ///
    /// Implementation specific; static catalogs never fail here.
    fn list_tables(&self) -> CatalogResult<Vec<TableMetadata>>;

    /// Get column metadata for a specific table
    ///
    /// # Arguments
    ///
    /// * `table` - Table name (may include a qualifier like "schema.table")
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::TableNotFound` if the table doesn't exist.
    /// Returns `CatalogError::InvalidIdentifier` for malformed names.
    fn get_columns(&self, table: &str) -> CatalogResult<Vec<ColumnMetadata>>;
}
