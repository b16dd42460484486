// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Schema
//!
//! Immutable, case-insensitive map from table name to its ordered columns.
//! Built once per database connection and shared read-only afterwards.
//!
//! Table and column names are stored lowercased; every lookup lowercases its
//! argument first, so identifiers can arrive in any case.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqldist_ir::{ColumnMetadata, TableMetadata};

use crate::error::CatalogResult;
use crate::name::{match_by_name, split_qualified_name};
use crate::r#trait::Catalog;

/// Table name → table descriptor with ordered columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    tables: BTreeMap<String, TableMetadata>,
}

/// Builds a [`Schema`] from table definitions.
///
/// Names are lowercased. If two definitions share a table name the later one
/// wins.
pub fn create_schema(tables: impl IntoIterator<Item = TableMetadata>) -> Schema {
    let mut map = BTreeMap::new();
    for mut table in tables {
        table.name = table.name.to_lowercase();
        for column in &mut table.columns {
            column.name = column.name.to_lowercase();
        }
        if map.contains_key(&table.name) {
            tracing::warn!(table = %table.name, "duplicate table definition, keeping the last one");
        }
        map.insert(table.name.clone(), table);
    }
    Schema { tables: map }
}

impl Schema {
    pub fn new(tables: impl IntoIterator<Item = TableMetadata>) -> Self {
        create_schema(tables)
    }

    /// Convenience constructor from bare `(table, [columns])` pairs
    pub fn from_table_columns<'a, I, C>(tables: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, C)>,
        C: IntoIterator<Item = &'a str>,
    {
        create_schema(tables.into_iter().map(|(name, columns)| {
            TableMetadata::new(name)
                .with_columns(columns.into_iter().map(ColumnMetadata::new).collect())
        }))
    }

    /// Loads every table a catalog exposes
    pub fn from_catalog(catalog: &dyn Catalog) -> CatalogResult<Self> {
        Ok(create_schema(catalog.list_tables()?))
    }

    /// Looks up a table by its bare name
    pub fn table(&self, name: &str) -> Option<&TableMetadata> {
        self.tables.get(&name.to_lowercase())
    }

    /// Looks up a table by a possibly qualified name (`schema.table`)
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidIdentifier` for malformed names.
    pub fn resolve(&self, qualified_name: &str) -> CatalogResult<Option<&TableMetadata>> {
        let parts = split_qualified_name(qualified_name)?;
        let Some(name) = parts.last() else {
            return Ok(None);
        };
        match self.table(name) {
            Some(table) if match_by_name(table, qualified_name)? => Ok(Some(table)),
            _ => Ok(None),
        }
    }

    /// Ordered column names of a (possibly qualified) table, empty when unknown
    pub fn columns(&self, qualified_name: &str) -> CatalogResult<Vec<String>> {
        Ok(self
            .resolve(qualified_name)?
            .map(|table| table.columns.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default())
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableMetadata> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Schema {
        Schema::from_table_columns(vec![("Users", vec!["ID", "Name"]), ("orders", vec!["id"])])
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let schema = sample();
        assert!(schema.contains_table("USERS"));
        assert_eq!(schema.columns("users").unwrap(), vec!["id", "name"]);
        assert_eq!(schema.table_names().collect::<Vec<_>>(), vec!["orders", "users"]);
    }

    #[test]
    fn test_resolve_qualified_names() {
        let schema = sample();
        assert!(schema.resolve("public.users").unwrap().is_some());
        assert!(schema.resolve("other.users").unwrap().is_none());
        assert!(schema.resolve("a.b.c.users").is_err());
        assert!(schema.columns("missing").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_definitions_last_wins() {
        let schema = Schema::from_table_columns(vec![("t", vec!["a"]), ("T", vec!["b"])]);
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.columns("t").unwrap(), vec!["b"]);
    }
}
