// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Runtime values and rows
//!
//! [`Value`] is the closed set of values a database row can hold once it has
//! been mapped out of the backend. [`Row`] groups one fetched tuple by the
//! table (or alias) each column belongs to.
//!
//! Column labels of the form `qualifier.column` are filed under
//! `qualifier`; bare labels go to the unqualified pseudo-table
//! ([`DEFAULT_TABLE`]). Table and column keys are stored lowercased and
//! looked up case-insensitively. Column order is preserved.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::expr::Literal;
use crate::render::{format_float, quote_string};

/// Key of the pseudo-table holding unqualified columns
pub const DEFAULT_TABLE: &str = "";

/// A value produced by the row-mapping layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// A backend value with no counterpart here (blobs, arrays, ...)
    Unsupported(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Unsupported(_) => "unsupported",
        }
    }

    /// Numeric view of the value. Booleans count as 0/1, text only when it
    /// parses as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            Value::Null | Value::Unsupported(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// SQL truthiness: non-zero numbers and `true` are true, NULL is unknown
    pub fn truthiness(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Integer(i) => Some(*i != 0),
            Value::Float(f) => Some(*f != 0.0),
            Value::Text(s) => s.trim().parse::<f64>().ok().map(|f| f != 0.0),
            Value::Null | Value::Unsupported(_) => None,
        }
    }

    /// Renders the value as a SQL literal.
    ///
    /// Strings are single-quoted, everything else uses its natural textual
    /// form. Unsupported values become `NULL`.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Value::Null | Value::Unsupported(_) => "NULL".to_string(),
            Value::Boolean(true) => "TRUE".to_string(),
            Value::Boolean(false) => "FALSE".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Text(s) => quote_string(s),
        }
    }

    /// The literal that splices this value into SQL text.
    ///
    /// Unsupported values become `NULL`.
    pub fn to_literal(&self) -> Literal {
        match self {
            Value::Null | Value::Unsupported(_) => Literal::Null,
            Value::Boolean(b) => Literal::Boolean(*b),
            Value::Integer(i) => Literal::Integer(*i),
            Value::Float(f) => Literal::Float(*f),
            Value::Text(s) => Literal::String(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::Text(s) => f.write_str(s),
            Value::Unsupported(desc) => write!(f, "<{desc}>"),
        }
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Null => Value::Null,
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Integer(i) => Value::Integer(*i),
            Literal::Float(f) => Value::Float(*f),
            Literal::String(s) => Value::Text(s.clone()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// The columns one table contributes to a row, in fetch order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableValues {
    pub table: String,
    pub columns: Vec<(String, Value)>,
}

impl TableValues {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }
}

/// One fetched tuple, grouped by table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    tables: Vec<TableValues>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a row from `(label, value)` pairs, splitting `alias.column`
    /// labels into their table and column parts.
    pub fn from_labelled<L, I>(cells: I) -> Self
    where
        L: AsRef<str>,
        I: IntoIterator<Item = (L, Value)>,
    {
        cells.into_iter().fold(Row::new(), |row, (label, value)| {
            let label = label.as_ref();
            match label.rsplit_once('.') {
                Some((table, column)) => row.with_value(table, column, value),
                None => row.with_value(DEFAULT_TABLE, label, value),
            }
        })
    }

    /// Builder method: add one column value under `table`
    pub fn with_value(mut self, table: &str, column: &str, value: Value) -> Self {
        let table = table.to_lowercase();
        let column = column.to_lowercase();
        match self.tables.iter_mut().find(|t| t.table == table) {
            Some(entry) => entry.columns.push((column, value)),
            None => self.tables.push(TableValues {
                table,
                columns: vec![(column, value)],
            }),
        }
        self
    }

    /// Values of one table, looked up case-insensitively
    pub fn table(&self, name: &str) -> Option<&TableValues> {
        self.tables
            .iter()
            .find(|t| t.table.eq_ignore_ascii_case(name))
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableValues> {
        self.tables.iter()
    }

    /// All values in fetch order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.tables
            .iter()
            .flat_map(|t| t.columns.iter().map(|(_, value)| value))
    }

    pub fn first_value(&self) -> Option<&Value> {
        self.values().next()
    }

    pub fn len(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_labelled_splits_qualifiers() {
        let row = Row::from_labelled(vec![
            ("u.id", Value::Integer(1)),
            ("u.Name", Value::from("ann")),
            ("total", Value::Float(2.5)),
        ]);

        let users = row.table("U").unwrap();
        assert_eq!(users.get("name"), Some(&Value::from("ann")));
        assert_eq!(row.table(DEFAULT_TABLE).unwrap().get("total"), Some(&Value::Float(2.5)));
        assert_eq!(row.len(), 3);
        assert_eq!(row.first_value(), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_sql_literals() {
        assert_eq!(Value::Integer(42).to_sql_literal(), "42");
        assert_eq!(Value::from("bar").to_sql_literal(), "'bar'");
        assert_eq!(Value::from("o'neil").to_sql_literal(), "'o''neil'");
        assert_eq!(Value::Null.to_sql_literal(), "NULL");
        assert_eq!(Value::Boolean(true).to_sql_literal(), "TRUE");
        assert_eq!(Value::Float(2.5).to_sql_literal(), "2.5");
        assert_eq!(Value::Float(3.0).to_sql_literal(), "3.0");
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(Value::from(" 12 ").as_f64(), Some(12.0));
        assert_eq!(Value::Boolean(true).as_f64(), Some(1.0));
        assert_eq!(Value::from("abc").as_f64(), None);
        assert_eq!(Value::Null.truthiness(), None);
        assert_eq!(Value::Integer(0).truthiness(), Some(false));
    }
}
