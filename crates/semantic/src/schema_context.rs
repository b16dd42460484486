// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Schema context
//!
//! A [`SchemaContext`] is the stack of query levels enclosing the expression
//! being rewritten, outermost first. Each level is a [`SchemaContextItem`]:
//! the tables its `FROM` clause exposes and the columns each one provides.
//!
//! A column is *local* to a subquery when some level of the stack resolves
//! it. Columns that no level resolves are correlated references to an
//! enclosing row and get their value from the evaluation context instead.
//!
//! Levels are shared through [`Arc`], so [`SchemaContext::copy`] only
//! duplicates the list. Pushing a level onto a copy never affects the
//! original.

use std::sync::Arc;

use sqldist_catalog::Schema;
use sqldist_ir::{Query, SelectItem, SetOp, TableRef, TableSource};

use crate::error::SemanticResult;
use crate::table::{QueryColumn, QueryTable};

/// Tables of one query level with the columns each one provides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaContextItem {
    tables: Vec<(QueryTable, Vec<String>)>,
}

impl SchemaContextItem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: add a table and its (lowercased) columns
    pub fn with_table(mut self, table: QueryTable, columns: Vec<String>) -> Self {
        let columns = columns.into_iter().map(|c| c.to_lowercase()).collect();
        self.tables.push((table, columns));
        self
    }

    pub fn tables(&self) -> impl Iterator<Item = &QueryTable> {
        self.tables.iter().map(|(table, _)| table)
    }

    /// Columns of the table a qualifier refers to
    pub fn columns_of(&self, qualifier: &str) -> Option<&[String]> {
        self.tables
            .iter()
            .find(|(table, _)| table.matches(qualifier))
            .map(|(_, columns)| columns.as_slice())
    }

    /// Check if this level resolves a column
    ///
    /// A qualified column needs a table matching its qualifier that lists the
    /// column; an unqualified column needs any table listing it.
    pub fn includes(&self, column: &QueryColumn) -> bool {
        let has = |columns: &[String]| columns.iter().any(|c| c.eq_ignore_ascii_case(&column.name));
        match &column.table {
            Some(qualifier) => self
                .tables
                .iter()
                .any(|(table, columns)| table.matches(qualifier) && has(columns)),
            None => self.tables.iter().any(|(_, columns)| has(columns)),
        }
    }
}

/// Builds the level for a `FROM` list.
///
/// Named tables take their columns from the schema; tables the schema does
/// not know contribute no columns. Derived tables expose the output columns
/// of their query.
pub fn create_schema_context_item(
    from: &[TableRef],
    schema: &Schema,
) -> SemanticResult<SchemaContextItem> {
    let mut item = SchemaContextItem::new();
    for table in from {
        add_table(&mut item, table, schema)?;
    }
    Ok(item)
}

fn add_table(item: &mut SchemaContextItem, table: &TableRef, schema: &Schema) -> SemanticResult<()> {
    if let Some(query_table) = QueryTable::from_table_ref(table) {
        let columns = table_columns(table, schema)?;
        item.tables.push((query_table, columns));
    }
    for join in &table.joins {
        add_table(item, &join.table, schema)?;
    }
    Ok(())
}

fn table_columns(table: &TableRef, schema: &Schema) -> SemanticResult<Vec<String>> {
    match &table.source {
        TableSource::Named(name) => Ok(schema.columns(name)?),
        TableSource::Derived(query) => output_columns(query, schema),
    }
}

/// Names of the columns a query returns, lowercased
///
/// Unaliased expressions other than plain columns are named by their SQL
/// text. Set operations are named by their left branch.
pub fn output_columns(query: &Query, schema: &Schema) -> SemanticResult<Vec<String>> {
    let select = match &query.body {
        SetOp::Select(select) => select,
        SetOp::Union { left, .. } | SetOp::Intersect { left, .. } | SetOp::Except { left, .. } => {
            return output_columns(left, schema);
        }
    };

    let mut columns = Vec::new();
    for item in &select.projection {
        match item {
            SelectItem::UnnamedExpr(sqldist_ir::Expr::Column(column)) => {
                columns.push(column.column.to_lowercase())
            }
            SelectItem::UnnamedExpr(expr) => columns.push(expr.to_string().to_lowercase()),
            SelectItem::AliasedExpr { alias, .. } => columns.push(alias.to_lowercase()),
            SelectItem::Wildcard => {
                for table in &select.from {
                    wildcard_columns(table, None, schema, &mut columns)?;
                }
            }
            SelectItem::QualifiedWildcard(qualifier) => {
                for table in &select.from {
                    wildcard_columns(table, Some(qualifier), schema, &mut columns)?;
                }
            }
        }
    }
    Ok(columns)
}

fn wildcard_columns(
    table: &TableRef,
    qualifier: Option<&str>,
    schema: &Schema,
    out: &mut Vec<String>,
) -> SemanticResult<()> {
    let selected = match (qualifier, QueryTable::from_table_ref(table)) {
        (None, _) => true,
        (Some(q), Some(query_table)) => query_table.matches(q),
        (Some(_), None) => false,
    };
    if selected {
        out.extend(table_columns(table, schema)?);
    }
    for join in &table.joins {
        wildcard_columns(&join.table, qualifier, schema, out)?;
    }
    Ok(())
}

/// Outer-to-inner stack of query levels
#[derive(Debug, Clone, Default)]
pub struct SchemaContext {
    items: Vec<Arc<SchemaContextItem>>,
}

impl SchemaContext {
    /// An empty context, which includes nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes an innermost level
    pub fn add(&mut self, item: SchemaContextItem) {
        self.items.push(Arc::new(item));
    }

    /// Check if any level resolves the column
    pub fn includes(&self, column: &QueryColumn) -> bool {
        self.items.iter().any(|item| item.includes(column))
    }

    /// A new context sharing this one's levels
    pub fn copy(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }

    pub fn depth(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> impl Iterator<Item = &SchemaContextItem> {
        self.items.iter().map(|item| item.as_ref())
    }
}
