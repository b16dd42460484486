// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mock driver implementation for testing
//!
//! Answers queries from a table of canned results keyed by exact SQL text
//! and records every call, so tests can check which statements the engine
//! produced.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use sqldist_catalog::Schema;
use sqldist_driver::{Driver, DriverError, DriverResult};
use sqldist_ir::{DEFAULT_TABLE, Row, Value};

/// In-memory mock driver for testing
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    schema: Arc<Schema>,
    results: HashMap<String, Vec<Row>>,
    queries: Vec<String>,
    executed: Vec<String>,
}

impl MockDriver {
    /// Create a mock with an empty schema and no results
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: schema returned by [`Driver::schema`]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Arc::new(schema);
        self
    }

    /// Builder method: result of `sql`, one unlabelled value list per row
    ///
    /// Values are named `column0`, `column1`, ... in the unqualified
    /// pseudo-table.
    pub fn with_rows(self, sql: &str, rows: Vec<Vec<Value>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|values| {
                values
                    .into_iter()
                    .enumerate()
                    .fold(Row::new(), |row, (i, value)| {
                        row.with_value(DEFAULT_TABLE, &format!("column{i}"), value)
                    })
            })
            .collect();
        self.with_labelled_rows(sql, rows)
    }

    /// Builder method: result of `sql` as fully built rows
    pub fn with_labelled_rows(mut self, sql: &str, rows: Vec<Row>) -> Self {
        self.results.insert(sql.to_string(), rows);
        self
    }

    /// Queries received so far, in order
    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    /// Statements passed to `execute` so far
    pub fn executed(&self) -> &[String] {
        &self.executed
    }
}

impl Driver for MockDriver {
    fn execute(&mut self, sql: &str) -> DriverResult<()> {
        self.executed.push(sql.to_string());
        Ok(())
    }

    fn query(&mut self, sql: &str) -> DriverResult<Vec<Row>> {
        tracing::trace!(sql, "mock query");
        self.queries.push(sql.to_string());
        self.results
            .get(sql)
            .cloned()
            .ok_or_else(|| DriverError::query(sql, format!("no result registered for: {sql}")))
    }

    fn schema(&mut self) -> DriverResult<Arc<Schema>> {
        Ok(Arc::clone(&self.schema))
    }

    fn cache_snapshot(&self) -> BTreeMap<String, Vec<Row>> {
        self.results
            .iter()
            .map(|(sql, rows)| (sql.clone(), rows.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canned_results() {
        let mut driver = MockDriver::new().with_rows(
            "SELECT x FROM u",
            vec![vec![Value::Integer(1)], vec![Value::Integer(2)]],
        );

        let rows = driver.query("SELECT x FROM u").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].first_value(), Some(&Value::Integer(2)));
        assert_eq!(driver.queries(), ["SELECT x FROM u".to_string()]);
    }

    #[test]
    fn test_unknown_query_fails() {
        let mut driver = MockDriver::new();
        let err = driver.query("SELECT 1").unwrap_err();
        assert!(format!("{}", err).contains("no result registered"));
    }

    #[test]
    fn test_schema_and_execute() {
        let mut driver =
            MockDriver::new().with_schema(Schema::from_table_columns(vec![("t", vec!["a"])]));
        driver.execute("DELETE FROM t").unwrap();
        assert_eq!(driver.executed().len(), 1);
        assert!(driver.schema().unwrap().contains_table("t"));
    }
}
