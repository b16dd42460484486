// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Qualified name matching
//!
//! Matches dotted identifiers (`name`, `schema.name`, `catalog.schema.name`)
//! against a table descriptor. Comparison is case-insensitive.
//!
//! Backends do not always record where a table lives. When a descriptor has
//! neither schema nor catalog, the table is assumed to live in
//! [`DEFAULT_SCHEMA`]. When both are recorded, a two-part name is compared to
//! the schema.

use sqldist_ir::TableMetadata;

use crate::error::{CatalogError, CatalogResult};

/// Schema assumed for descriptors without schema or catalog
pub const DEFAULT_SCHEMA: &str = "public";

/// Splits a dotted identifier into at most three non-empty segments
pub fn split_qualified_name(qualified_name: &str) -> CatalogResult<Vec<&str>> {
    let parts: Vec<&str> = qualified_name.split('.').map(str::trim).collect();
    if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(CatalogError::InvalidIdentifier(qualified_name.to_string()));
    }
    Ok(parts)
}

/// Does `qualified_name` refer to `table`?
///
/// # Errors
///
/// Returns `CatalogError::InvalidIdentifier` for more than three segments or
/// an empty segment.
///
/// # Examples
///
/// ```
/// use sqldist_catalog::match_by_name;
/// use sqldist_ir::TableMetadata;
///
/// let foo = TableMetadata::new("foo");
/// assert!(match_by_name(&foo, "public.foo").unwrap());
/// assert!(!match_by_name(&foo, "other.foo").unwrap());
/// ```
pub fn match_by_name(table: &TableMetadata, qualified_name: &str) -> CatalogResult<bool> {
    let parts = split_qualified_name(qualified_name)?;
    let Some((name, qualifiers)) = parts.split_last() else {
        return Err(CatalogError::InvalidIdentifier(qualified_name.to_string()));
    };

    if !name.eq_ignore_ascii_case(&table.name) {
        return Ok(false);
    }

    Ok(match qualifiers {
        [] => true,
        [qualifier] => {
            let recorded = table
                .schema
                .as_deref()
                .or(table.catalog.as_deref())
                .unwrap_or(DEFAULT_SCHEMA);
            qualifier.eq_ignore_ascii_case(recorded)
        }
        [catalog, schema] => {
            let catalog_matches = table
                .catalog
                .as_deref()
                .is_none_or(|recorded| catalog.eq_ignore_ascii_case(recorded));
            let recorded_schema = table.schema.as_deref().unwrap_or(DEFAULT_SCHEMA);
            catalog_matches && schema.eq_ignore_ascii_case(recorded_schema)
        }
        _ => false,
    })
}
