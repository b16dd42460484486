// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for the catalog crate

use std::io::Write;

use sqldist_catalog::{
    Catalog, CatalogError, CatalogResult, ColumnMetadata, Schema, StaticCatalog,
    TableMetadata, match_by_name,
};

// Mock catalog implementation for integration testing
struct TestCatalog;

impl Catalog for TestCatalog {
    fn list_tables(&self) -> CatalogResult<Vec<TableMetadata>> {
        Ok(vec![
            TableMetadata::new("Users").with_schema("myapp").with_columns(vec![
                ColumnMetadata::new("ID"),
                ColumnMetadata::new("Email"),
            ]),
            TableMetadata::new("orders").with_columns(vec![
                ColumnMetadata::new("id"),
                ColumnMetadata::new("user_id"),
                ColumnMetadata::new("total"),
            ]),
        ])
    }

    fn get_columns(&self, table: &str) -> CatalogResult<Vec<ColumnMetadata>> {
        self.list_tables()?
            .into_iter()
            .find(|t| t.name.eq_ignore_ascii_case(table))
            .map(|t| t.columns)
            .ok_or_else(|| CatalogError::TableNotFound(table.to_string()))
    }
}

#[test]
fn test_schema_from_catalog_normalizes_case() {
    let schema = Schema::from_catalog(&TestCatalog).unwrap();

    assert_eq!(schema.len(), 2);
    assert_eq!(schema.columns("USERS").unwrap(), vec!["id", "email"]);
    assert_eq!(schema.columns("myapp.users").unwrap(), vec!["id", "email"]);
    assert!(schema.columns("public.users").unwrap().is_empty());
    assert_eq!(schema.columns("public.orders").unwrap().len(), 3);
}

#[test]
fn test_catalog_trait_errors() {
    let err = TestCatalog.get_columns("missing").unwrap_err();
    assert!(format!("{}", err).contains("missing"));
}

#[test]
fn test_static_catalog_from_yaml_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        "tables:\n  - name: t\n    columns:\n      - {{ name: a, data_type: Integer }}\n      - {{ name: b, data_type: Text }}"
    )
    .unwrap();

    let catalog = StaticCatalog::from_file(file.path()).unwrap();
    let schema = Schema::from_catalog(&catalog).unwrap();
    assert_eq!(schema.columns("t").unwrap(), vec!["a", "b"]);
}

#[test]
fn test_static_catalog_from_json_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"tables": [{{"name": "t", "catalog": "shop", "columns": [{{"name": "a", "data_type": "Integer"}}]}}]}}"#
    )
    .unwrap();

    let catalog = StaticCatalog::from_file(file.path()).unwrap();
    assert_eq!(catalog.get_columns("shop.t").unwrap().len(), 1);
    assert!(catalog.get_columns("public.t").is_err());
}

#[test]
fn test_static_catalog_missing_file() {
    let err = StaticCatalog::from_file("/nonexistent/catalog.yaml").unwrap_err();
    assert!(matches!(err, CatalogError::Io { .. }));
}

#[test]
fn test_yaml_roundtrip() {
    let catalog = StaticCatalog::new(vec![
        TableMetadata::new("t").with_columns(vec![ColumnMetadata::new("a")]),
    ]);
    let yaml = catalog.to_yaml_string().unwrap();
    let reloaded = StaticCatalog::from_yaml_str(&yaml).unwrap();
    assert_eq!(reloaded.list_tables().unwrap(), catalog.list_tables().unwrap());
}

#[test]
fn test_match_by_name_public_default() {
    let foo = TableMetadata::new("foo");
    assert!(match_by_name(&foo, "public.foo").unwrap());
    assert!(!match_by_name(&foo, "other.foo").unwrap());
}
