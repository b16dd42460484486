// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Table and column references
//!
//! This module defines how tables and columns are named inside a query, and
//! how `FROM` clauses are flattened into the list of tables a level exposes.

use serde::{Deserialize, Serialize};
use sqldist_ir::{ColumnRef, SelectStatement, TableRef, TableSource};

/// A table as referenced in a `FROM` clause
///
/// Two references denote the same physical table when their base names match
/// case-insensitively, whatever their aliases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryTable {
    /// Base table name (for derived tables, the alias)
    pub name: String,

    /// Optional alias (e.g., "e" for "FROM employees e")
    pub alias: Option<String>,
}

impl QueryTable {
    /// Create a new table reference
    ///
    /// # Examples
    ///
    /// ```
    /// use sqldist_semantic::QueryTable;
    ///
    /// let table = QueryTable::new("employees");
    /// assert_eq!(table.name, "employees");
    /// assert!(table.alias.is_none());
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    /// Set an alias for this table
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Check if a qualifier refers to this table
    ///
    /// When an alias is defined only the alias matches; otherwise the base
    /// name does. Comparison is case-insensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqldist_semantic::QueryTable;
    ///
    /// let table = QueryTable::new("employees").with_alias("e");
    /// assert!(table.matches("E"));
    /// assert!(!table.matches("employees"));
    ///
    /// assert!(QueryTable::new("employees").matches("Employees"));
    /// ```
    pub fn matches(&self, qualifier: &str) -> bool {
        self.reference_name().eq_ignore_ascii_case(qualifier)
    }

    /// Check if both references denote the same physical table
    pub fn same_table(&self, other: &QueryTable) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }

    /// The name rows of this table are labelled with (alias if present)
    pub fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Builds the reference for one `FROM` entry, ignoring its joins.
    ///
    /// Derived tables are named by their alias; an unaliased derived table
    /// cannot be referenced and yields `None`.
    pub fn from_table_ref(table: &TableRef) -> Option<Self> {
        let name = match &table.source {
            TableSource::Named(name) => name.clone(),
            TableSource::Derived(_) => table.alias.clone()?,
        };
        Some(Self {
            name,
            alias: table.alias.clone(),
        })
    }
}

/// A column reference, optionally qualified by a table name or alias
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryColumn {
    pub table: Option<String>,
    pub name: String,
}

impl QueryColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// `qualifier.name`, or the bare name
    pub fn qualified(&self) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", table, self.name),
            None => self.name.clone(),
        }
    }
}

impl From<&ColumnRef> for QueryColumn {
    fn from(column: &ColumnRef) -> Self {
        Self {
            table: column.table.clone(),
            name: column.column.clone(),
        }
    }
}

/// Every table a `FROM` list exposes, including joined tables, in order
pub fn from_tables(from: &[TableRef]) -> Vec<QueryTable> {
    let mut tables = Vec::new();
    for table in from {
        collect_table(table, &mut tables);
    }
    tables
}

fn collect_table(table: &TableRef, out: &mut Vec<QueryTable>) {
    if let Some(query_table) = QueryTable::from_table_ref(table) {
        out.push(query_table);
    }
    for join in &table.joins {
        collect_table(&join.table, out);
    }
}

/// Tables exposed by one SELECT level
pub fn select_tables(select: &SelectStatement) -> Vec<QueryTable> {
    from_tables(&select.from)
}
