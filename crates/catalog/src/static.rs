// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Static Catalog
//!
//! A catalog backed by predefined table definitions, loaded from memory or
//! from a JSON/YAML document of the form:
//!
//! ```yaml
//! tables:
//!   - name: users
//!     schema: public
//!     columns:
//!       - { name: id }
//!       - { name: email }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use sqldist_ir::{ColumnMetadata, TableMetadata};

use crate::name::match_by_name;
use crate::{Catalog, CatalogError, CatalogResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    tables: Vec<TableMetadata>,
}

/// Static catalog with predefined schema data
///
/// Used for offline runs and testing without a live database.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    tables: Vec<TableMetadata>,
}

impl StaticCatalog {
    pub fn new(tables: Vec<TableMetadata>) -> Self {
        Self { tables }
    }

    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        let document: CatalogDocument = serde_json::from_str(json)
            .map_err(|e| CatalogError::SerializationError(e.to_string()))?;
        Ok(Self::new(document.tables))
    }

    pub fn from_yaml_str(yaml: &str) -> CatalogResult<Self> {
        let document: CatalogDocument = serde_yaml::from_str(yaml)
            .map_err(|e| CatalogError::SerializationError(e.to_string()))?;
        Ok(Self::new(document.tables))
    }

    /// Loads a catalog file; `.json` files are read as JSON, anything else
    /// as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Serializes the catalog back into its YAML document form
    pub fn to_yaml_string(&self) -> CatalogResult<String> {
        let document = CatalogDocument {
            tables: self.tables.clone(),
        };
        serde_yaml::to_string(&document).map_err(|e| CatalogError::SerializationError(e.to_string()))
    }
}

impl Catalog for StaticCatalog {
    fn list_tables(&self) -> CatalogResult<Vec<TableMetadata>> {
        Ok(self.tables.clone())
    }

    fn get_columns(&self, table: &str) -> CatalogResult<Vec<ColumnMetadata>> {
        for candidate in &self.tables {
            if match_by_name(candidate, table)? {
                return Ok(candidate.columns.clone());
            }
        }
        Err(CatalogError::TableNotFound(table.to_string()))
    }
}
