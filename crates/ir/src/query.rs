// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Query Representation
//!
//! This module represents SQL queries in the IR.
//!
//! ## Query Structure
//!
//! A [`Query`] consists of:
//!
//! - **Body**: The main query (SELECT or set operation)
//! - **ORDER BY**: Sorting specification
//! - **LIMIT** / **OFFSET**: Row window
//! - **Dialect**: Dialect the query was parsed with
//!
//! ## Set Operations
//!
//! [`SetOp`] represents a single SELECT or a combination of two queries
//! (`UNION`, `INTERSECT`, `EXCEPT`). Set operations form a tree.
//!
//! ## Table References and Joins
//!
//! [`TableRef`] represents one entry of the FROM clause:
//!
//! - **Source**: a named table (possibly `schema.table`) or a derived table
//! - **Alias**: optional alias
//! - **Joins**: tables joined onto this one
//!
//! ```sql
//! FROM users u INNER JOIN orders o ON u.id = o.user_id
//! FROM (SELECT id FROM users) AS active
//! ```
//!
//! ## Builder Pattern
//!
//! ```rust,ignore
//! use sqldist_ir::{Dialect, Query, SelectStatement, TableRef};
//!
//! let select = SelectStatement::default()
//!     .with_from(vec![TableRef::table("users").with_alias("u")]);
//! let query = Query::select(select, Dialect::SQLite);
//! ```

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::expr::Expr;

/// A SQL query (SELECT statement or set operation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// The main body of the query
    pub body: SetOp,

    /// Optional ORDER BY clause
    pub order_by: Option<Vec<OrderBy>>,

    /// Optional LIMIT clause
    pub limit: Option<Expr>,

    /// Optional OFFSET clause
    pub offset: Option<Expr>,

    /// The dialect this query is written for
    pub dialect: Dialect,
}

impl Query {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            body: SetOp::Select(Box::default()),
            order_by: None,
            limit: None,
            offset: None,
            dialect,
        }
    }

    /// Wraps a single SELECT into a query
    pub fn select(select: SelectStatement, dialect: Dialect) -> Self {
        Self {
            body: SetOp::Select(Box::new(select)),
            ..Self::new(dialect)
        }
    }

    pub fn with_limit(mut self, limit: Expr) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: Expr) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_order_by(mut self, order_by: Vec<OrderBy>) -> Self {
        self.order_by = Some(order_by);
        self
    }

    /// The SELECT body, if this query is not a set operation
    pub fn as_select(&self) -> Option<&SelectStatement> {
        match &self.body {
            SetOp::Select(select) => Some(select),
            _ => None,
        }
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::new(Dialect::Generic)
    }
}

/// Set operation (UNION, INTERSECT, EXCEPT) or SELECT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SetOp {
    /// SELECT statement
    Select(Box<SelectStatement>),

    /// UNION [ALL | DISTINCT]
    Union {
        left: Box<Query>,
        right: Box<Query>,
        all: bool,
    },

    /// INTERSECT [ALL]
    Intersect {
        left: Box<Query>,
        right: Box<Query>,
        all: bool,
    },

    /// EXCEPT [ALL]
    Except {
        left: Box<Query>,
        right: Box<Query>,
        all: bool,
    },
}

/// SELECT statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectStatement {
    /// SELECT DISTINCT or ALL
    pub distinct: bool,

    /// Projection list (columns to select)
    pub projection: Vec<SelectItem>,

    /// FROM clause
    pub from: Vec<TableRef>,

    /// WHERE clause
    pub where_clause: Option<Expr>,

    /// GROUP BY clause
    pub group_by: Vec<Expr>,

    /// HAVING clause
    pub having: Option<Expr>,
}

impl SelectStatement {
    pub fn with_projection(mut self, projection: Vec<SelectItem>) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_from(mut self, from: Vec<TableRef>) -> Self {
        self.from = from;
        self
    }

    pub fn with_where(mut self, predicate: Expr) -> Self {
        self.where_clause = Some(predicate);
        self
    }
}

/// Item in a SELECT projection list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectItem {
    /// Unnamed expression (e.g., `column` or `a + b`)
    UnnamedExpr(Expr),

    /// Expression with alias (e.g., `col AS name`)
    AliasedExpr { expr: Expr, alias: String },

    /// Qualified wildcard (e.g., `table.*`)
    QualifiedWildcard(String),

    /// Unqualified wildcard (`*`)
    Wildcard,
}

/// What a FROM entry reads from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableSource {
    /// Named table (may include schema/database)
    Named(String),

    /// Derived table: `(SELECT ...) AS alias`
    Derived(Box<Query>),
}

/// Table reference in FROM clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRef {
    /// Table source
    pub source: TableSource,

    /// Alias
    pub alias: Option<String>,

    /// Joins
    pub joins: Vec<Join>,
}

impl TableRef {
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            source: TableSource::Named(name.into()),
            alias: None,
            joins: Vec::new(),
        }
    }

    pub fn derived(query: Query) -> Self {
        Self {
            source: TableSource::Derived(Box::new(query)),
            alias: None,
            joins: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Name of the named table, if any
    pub fn table_name(&self) -> Option<&str> {
        match &self.source {
            TableSource::Named(name) => Some(name),
            TableSource::Derived(_) => None,
        }
    }

    /// The name rows of this table are labelled with (alias if present)
    pub fn reference_name(&self) -> Option<&str> {
        self.alias.as_deref().or_else(|| self.table_name())
    }
}

/// JOIN clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    /// Join type
    pub join_type: JoinType,

    /// Table to join
    pub table: TableRef,

    /// Join condition (ON or USING)
    pub condition: JoinCondition,
}

/// Join type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinType {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
            JoinType::Cross => "CROSS JOIN",
        }
    }
}

/// Join condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JoinCondition {
    On(Expr),
    Using(Vec<String>),
    Natural,
    None,
}

/// ORDER BY item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub expr: Expr,
    pub direction: Option<SortDirection>,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ColumnRef;

    #[test]
    fn test_query_creation() {
        let query = Query::new(Dialect::MySQL);
        assert_eq!(query.dialect, Dialect::MySQL);
        assert!(query.as_select().is_some());
    }

    #[test]
    fn test_select_default() {
        let select = SelectStatement::default();
        assert!(!select.distinct);
        assert!(select.projection.is_empty());
        assert!(select.from.is_empty());
    }

    #[test]
    fn test_order_by() {
        let ob = OrderBy {
            expr: Expr::Column(ColumnRef::new("id")),
            direction: Some(SortDirection::Asc),
        };
        assert_eq!(ob.direction, Some(SortDirection::Asc));
    }

    #[test]
    fn test_table_reference_name() {
        let plain = TableRef::table("users");
        assert_eq!(plain.reference_name(), Some("users"));

        let aliased = TableRef::table("users").with_alias("u");
        assert_eq!(aliased.reference_name(), Some("u"));
        assert_eq!(aliased.table_name(), Some("users"));

        let derived = TableRef::derived(Query::default());
        assert_eq!(derived.reference_name(), None);
    }
}
