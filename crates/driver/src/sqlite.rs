// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! SQLite connection backed by `rusqlite`

use std::path::Path;

use rusqlite::types::Value as SqliteValue;
use sqldist_ir::{ColumnMetadata, Dialect, Row, TableMetadata, Value};

use crate::connection::Connection;
use crate::error::{DriverError, DriverResult};

// Views are listed with tables since queries can select from either.
const LIST_TABLES: &str = "SELECT name FROM sqlite_master WHERE type IN ('table', 'view') \
     AND name NOT LIKE 'sqlite_%' ORDER BY name";

const TABLE_INFO: &str = "SELECT name FROM pragma_table_info(?1) ORDER BY cid";

/// A SQLite database, on disk or in memory
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    pub fn open(path: impl AsRef<Path>) -> DriverResult<Self> {
        let path = path.as_ref();
        let conn = rusqlite::Connection::open(path).map_err(|source| DriverError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> DriverResult<Self> {
        let conn = rusqlite::Connection::open_in_memory().map_err(|source| DriverError::Open {
            path: ":memory:".to_string(),
            source,
        })?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: rusqlite::Connection) -> Self {
        Self { conn }
    }

    fn table_columns(&self, table: &str) -> DriverResult<Vec<ColumnMetadata>> {
        let mut stmt = self
            .conn
            .prepare(TABLE_INFO)
            .map_err(|e| DriverError::query(TABLE_INFO, e))?;
        let columns = stmt
            .query_map([table], |row| row.get::<_, String>(0).map(ColumnMetadata::new))
            .map_err(|e| DriverError::query(TABLE_INFO, e))?;
        columns
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DriverError::query(TABLE_INFO, e))
    }
}

/// Maps one SQLite cell into the engine's value set
fn map_value(value: SqliteValue) -> Value {
    match value {
        SqliteValue::Null => Value::Null,
        SqliteValue::Integer(i) => Value::Integer(i),
        SqliteValue::Real(f) => Value::Float(f),
        SqliteValue::Text(s) => Value::Text(s),
        SqliteValue::Blob(bytes) => Value::Unsupported(format!("blob({} bytes)", bytes.len())),
    }
}

impl Connection for SqliteConnection {
    fn execute(&self, sql: &str) -> DriverResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| DriverError::query(sql, e))
    }

    fn query(&self, sql: &str) -> DriverResult<Vec<Row>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| DriverError::query(sql, e))?;
        let labels: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let rows = stmt
            .query_map([], |row| {
                let mut cells = Vec::with_capacity(labels.len());
                for (index, label) in labels.iter().enumerate() {
                    let value: SqliteValue = row.get(index)?;
                    cells.push((label.as_str(), map_value(value)));
                }
                Ok(Row::from_labelled(cells))
            })
            .map_err(|e| DriverError::query(sql, e))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DriverError::query(sql, e))
    }

    fn tables(&self) -> DriverResult<Vec<TableMetadata>> {
        let mut stmt = self
            .conn
            .prepare(LIST_TABLES)
            .map_err(|e| DriverError::query(LIST_TABLES, e))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| DriverError::query(LIST_TABLES, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DriverError::query(LIST_TABLES, e))?;

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let columns = self.table_columns(&name)?;
            tables.push(
                TableMetadata::new(name)
                    .with_schema(Dialect::SQLite.default_schema())
                    .with_columns(columns),
            );
        }
        Ok(tables)
    }
}
