// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Evaluation context
//!
//! Binds the column references of one query level to the values of one
//! fetched row.
//!
//! Row values are grouped by the label of the table they were fetched from.
//! Each `FROM` table the row holds values for is wrapped in a
//! [`TableColumnsValues`], followed by the unqualified pseudo-table when the
//! row has one. Named tables are always consulted before the pseudo-table.

use sqldist_ir::{DEFAULT_TABLE, Row, TableValues, Value};

use crate::error::{SemanticError, SemanticResult};
use crate::table::{QueryColumn, QueryTable};

/// One table's slice of a row
#[derive(Debug, Clone, PartialEq)]
pub struct TableColumnsValues {
    /// The `FROM` table these values belong to; `None` for the pseudo-table
    pub table: Option<QueryTable>,
    pub values: TableValues,
}

impl TableColumnsValues {
    pub fn matches(&self, qualifier: &str) -> bool {
        self.table.as_ref().is_some_and(|t| t.matches(qualifier))
    }

    pub fn includes_column(&self, column: &str) -> bool {
        self.values.contains(column)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    fn is_pseudo_table(&self) -> bool {
        self.table.is_none()
    }
}

/// Column values visible while evaluating one row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationContext {
    tables: Vec<TableColumnsValues>,
}

/// Wraps the parts of `row` that belong to `tables`, plus its pseudo-table
pub fn create_evaluation_context(tables: &[QueryTable], row: &Row) -> EvaluationContext {
    let mut wrapped: Vec<TableColumnsValues> = Vec::new();
    for table in tables {
        let reference = table.reference_name();
        if wrapped.iter().any(|t| t.matches(reference)) {
            continue;
        }
        match row.table(reference) {
            Some(values) => wrapped.push(TableColumnsValues {
                table: Some(table.clone()),
                values: values.clone(),
            }),
            None => tracing::trace!(table = reference, "row holds no values for table"),
        }
    }
    if let Some(values) = row.table(DEFAULT_TABLE) {
        wrapped.push(TableColumnsValues {
            table: None,
            values: values.clone(),
        });
    }
    EvaluationContext { tables: wrapped }
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> &[TableColumnsValues] {
        &self.tables
    }

    fn named(&self) -> impl Iterator<Item = &TableColumnsValues> {
        self.tables.iter().filter(|t| !t.is_pseudo_table())
    }

    fn pseudo(&self) -> Option<&TableColumnsValues> {
        self.tables.iter().find(|t| t.is_pseudo_table())
    }

    /// Check if the row can supply a value for the column
    ///
    /// A qualified column is included when a wrapped table matches its
    /// qualifier. When none does, the pseudo-table may still hold the bare
    /// column, as it does for tables fetched without a schema.
    pub fn includes(&self, column: &QueryColumn) -> bool {
        match &column.table {
            Some(qualifier) => {
                self.named().any(|t| t.matches(qualifier))
                    || self.pseudo().is_some_and(|t| t.includes_column(&column.name))
            }
            None => self.tables.iter().any(|t| t.includes_column(&column.name)),
        }
    }

    /// Value of a column in this row
    ///
    /// # Errors
    ///
    /// - [`SemanticError::AmbiguousColumn`] if an unqualified column is held
    ///   by more than one named table
    /// - [`SemanticError::MissingColumnValue`] if no value is found
    pub fn get_value(&self, column: &QueryColumn) -> SemanticResult<&Value> {
        let found = match &column.table {
            Some(qualifier) => match self.named().find(|t| t.matches(qualifier)) {
                Some(table) => table.get(&column.name),
                None => self.pseudo().and_then(|t| t.get(&column.name)),
            },
            None => {
                let holders: Vec<&TableColumnsValues> = self
                    .named()
                    .filter(|t| t.includes_column(&column.name))
                    .collect();
                if holders.len() > 1 {
                    let names = holders
                        .iter()
                        .filter_map(|t| t.table.as_ref())
                        .map(|t| t.reference_name().to_string())
                        .collect();
                    return Err(SemanticError::AmbiguousColumn(column.name.clone(), names));
                }
                match holders.first().copied() {
                    Some(table) => table.get(&column.name),
                    None => self.pseudo().and_then(|t| t.get(&column.name)),
                }
            }
        };
        found.ok_or_else(|| SemanticError::MissingColumnValue(column.qualified()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::new()
            .with_value("e", "id", Value::Integer(1))
            .with_value("e", "name", Value::from("ann"))
            .with_value("d", "id", Value::Integer(10))
            .with_value("", "total", Value::Float(2.5))
    }

    fn tables() -> Vec<QueryTable> {
        vec![
            QueryTable::new("emp").with_alias("e"),
            QueryTable::new("dept").with_alias("d"),
        ]
    }

    #[test]
    fn test_qualified_lookup() {
        let ctx = create_evaluation_context(&tables(), &row());
        let column = QueryColumn::new("id").with_table("D");
        assert!(ctx.includes(&column));
        assert_eq!(ctx.get_value(&column).unwrap(), &Value::Integer(10));
    }

    #[test]
    fn test_unqualified_lookup() {
        let ctx = create_evaluation_context(&tables(), &row());
        assert_eq!(
            ctx.get_value(&QueryColumn::new("NAME")).unwrap(),
            &Value::from("ann")
        );
        assert_eq!(
            ctx.get_value(&QueryColumn::new("total")).unwrap(),
            &Value::Float(2.5)
        );
    }

    #[test]
    fn test_ambiguous_column() {
        let ctx = create_evaluation_context(&tables(), &row());
        let err = ctx.get_value(&QueryColumn::new("id")).unwrap_err();
        assert!(matches!(err, SemanticError::AmbiguousColumn(ref c, ref t) if c == "id" && t.len() == 2));
    }

    #[test]
    fn test_missing_value_is_distinct_error() {
        let ctx = create_evaluation_context(&tables(), &row());
        let column = QueryColumn::new("salary").with_table("e");
        assert!(ctx.includes(&column));
        assert_eq!(
            ctx.get_value(&column).unwrap_err(),
            SemanticError::MissingColumnValue("e.salary".to_string())
        );
    }

    #[test]
    fn test_tables_without_values_are_skipped() {
        let ctx = create_evaluation_context(&[QueryTable::new("other")], &row());
        assert_eq!(ctx.tables().len(), 1);
        assert!(!ctx.includes(&QueryColumn::new("id").with_table("other")));
        assert!(!ctx.includes(&QueryColumn::new("name")));
    }
}
