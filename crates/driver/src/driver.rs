// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL driver
//!
//! [`SqlDriver`] wraps a [`Connection`] with the two pieces of state the
//! distance engine needs across calls: a query cache keyed by exact SQL
//! text, and the schema, which is read from the database once.
//!
//! The cache belongs to the driver instance. `execute` may change the data,
//! so it clears the cache.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use sqldist_catalog::Schema;
use sqldist_ir::Row;

use crate::connection::Connection;
use crate::error::DriverResult;

/// Database access as seen by the distance engine
pub trait Driver {
    /// Runs statements that may modify data
    fn execute(&mut self, sql: &str) -> DriverResult<()>;

    /// Runs a query and returns its rows
    fn query(&mut self, sql: &str) -> DriverResult<Vec<Row>>;

    /// The database schema
    fn schema(&mut self) -> DriverResult<Arc<Schema>>;

    /// Cached query results, keyed by SQL text
    fn cache_snapshot(&self) -> BTreeMap<String, Vec<Row>> {
        BTreeMap::new()
    }
}

/// [`Driver`] over any [`Connection`], with a per-instance query cache
pub struct SqlDriver<C> {
    connection: C,
    cache: HashMap<String, Vec<Row>>,
    cache_enabled: bool,
    schema: Option<Arc<Schema>>,
}

impl<C: Connection> SqlDriver<C> {
    pub fn new(connection: C) -> Self {
        Self {
            connection,
            cache: HashMap::new(),
            cache_enabled: true,
            schema: None,
        }
    }

    /// Builder method: turn the query cache on or off
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        if !enabled {
            self.cache.clear();
        }
        self
    }

    /// Builder method: use `schema` instead of reading it from the database
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(Arc::new(schema));
        self
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// Number of cached queries
    pub fn cached_queries(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl<C: Connection> Driver for SqlDriver<C> {
    fn execute(&mut self, sql: &str) -> DriverResult<()> {
        tracing::debug!(sql, "executing statement");
        self.cache.clear();
        self.connection.execute(sql)
    }

    fn query(&mut self, sql: &str) -> DriverResult<Vec<Row>> {
        if self.cache_enabled {
            if let Some(rows) = self.cache.get(sql) {
                tracing::trace!(sql, rows = rows.len(), "query cache hit");
                return Ok(rows.clone());
            }
        }

        tracing::debug!(sql, "running query");
        let rows = self.connection.query(sql)?;
        if self.cache_enabled {
            self.cache.insert(sql.to_string(), rows.clone());
        }
        Ok(rows)
    }

    fn schema(&mut self) -> DriverResult<Arc<Schema>> {
        if let Some(schema) = &self.schema {
            return Ok(Arc::clone(schema));
        }
        let schema = Arc::new(Schema::new(self.connection.tables()?));
        tracing::debug!(tables = schema.len(), "schema extracted");
        self.schema = Some(Arc::clone(&schema));
        Ok(schema)
    }

    fn cache_snapshot(&self) -> BTreeMap<String, Vec<Row>> {
        self.cache
            .iter()
            .map(|(sql, rows)| (sql.clone(), rows.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqliteConnection;

    fn driver() -> SqlDriver<SqliteConnection> {
        let mut driver = SqlDriver::new(SqliteConnection::open_in_memory().unwrap());
        driver
            .execute("CREATE TABLE t (a INTEGER); INSERT INTO t VALUES (1), (2);")
            .unwrap();
        driver
    }

    #[test]
    fn test_query_results_are_cached() {
        let mut driver = driver();
        let sql = "SELECT a FROM t";
        assert_eq!(driver.query(sql).unwrap().len(), 2);

        // Rows added behind the driver's back are not seen until the cache is cleared
        driver.connection().execute("INSERT INTO t VALUES (3)").unwrap();
        assert_eq!(driver.query(sql).unwrap().len(), 2);
        assert_eq!(driver.cache_snapshot().len(), 1);

        driver.clear_cache();
        assert_eq!(driver.query(sql).unwrap().len(), 3);
    }

    #[test]
    fn test_execute_invalidates_cache() {
        let mut driver = driver();
        driver.query("SELECT a FROM t").unwrap();
        driver.execute("INSERT INTO t VALUES (3)").unwrap();
        assert_eq!(driver.cached_queries(), 0);
        assert_eq!(driver.query("SELECT a FROM t").unwrap().len(), 3);
    }

    #[test]
    fn test_cache_disabled() {
        let mut driver = driver().with_cache(false);
        driver.query("SELECT a FROM t").unwrap();
        assert!(driver.cache_snapshot().is_empty());
    }

    #[test]
    fn test_preset_schema_is_not_extracted() {
        let preset = Schema::from_table_columns(vec![("v", vec!["x", "y"])]);
        let mut driver = driver().with_schema(preset);
        let schema = driver.schema().unwrap();
        assert!(!schema.contains_table("t"));
        assert_eq!(schema.columns("v").unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn test_schema_is_extracted_once() {
        let mut driver = driver();
        let first = driver.schema().unwrap();
        driver.execute("CREATE TABLE u (b TEXT)").unwrap();
        let second = driver.schema().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.columns("t").unwrap(), vec!["a"]);
        assert!(!first.contains_table("u"));
    }
}
