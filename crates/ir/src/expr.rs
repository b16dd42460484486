// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Expressions
//!
//! This module represents SQL expressions in the IR.
//!
//! ## Design
//!
//! Expressions are the building blocks of predicates and can represent:
//!
//! - **Column references**: `table.column` or unqualified `column`
//! - **Literal values**: Numbers, strings, booleans, NULL
//! - **Binary operations**: Arithmetic, comparison, logical, concatenation
//! - **Unary operations**: Negation, NOT
//! - **Predicates**: `IN`, `BETWEEN`, `LIKE`, `IS [NOT] NULL`, `IS [NOT] TRUE`
//! - **Subqueries**: scalar, `EXISTS`, `IN (SELECT ...)`, `ANY`/`ALL`
//! - **Function calls** and **casts**
//!
//! Anything the lowering layer cannot represent becomes
//! [`Expr::Unsupported`], carrying the original SQL text. Consumers treat it
//! as an opaque node rather than failing the whole tree.
//!
//! ## Expression Hierarchy
//!
//! ```text
//! BinaryOp {
//!   left: Box<Expr::Column("price")>,
//!   op: Gt,
//!   right: Box<Expr::BinaryOp {
//!     left: Box<Expr::Literal(10)>>,
//!     op: Mul,
//!     right: Box<Expr::Literal(2)>
//!   }>
//! }
//! ```
//!
//! Represents: `price > 10 * 2`
//!
//! ## Operators
//!
//! ### Binary Operators
//!
//! - **Arithmetic**: Add, Sub, Mul, Div, Mod
//! - **Comparison**: Eq, NotEq, Lt, LtEq, Gt, GtEq
//! - **Logical**: And, Or
//! - **String**: Concat
//!
//! ### Unary Operators
//!
//! - **Neg**: Numeric negation (-x)
//! - **Not**: Logical NOT

use serde::{Deserialize, Serialize};

use crate::query::Query;

/// A SQL expression
///
/// The variant set is closed; rewriters in other crates match it
/// exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Column reference (e.g., `table.column` or just `column`)
    Column(ColumnRef),

    /// Literal value
    Literal(Literal),

    /// Binary operation (e.g., `a + b`, `x = 5`)
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    /// Unary operation (e.g., `-x`, `NOT a`)
    UnaryOp { op: UnaryOp, expr: Box<Expr> },

    /// Function call (e.g., `LOWER(name)`)
    Function {
        name: String,
        args: Vec<Expr>,
        distinct: bool,
    },

    /// CAST expression
    Cast { expr: Box<Expr>, type_name: String },

    /// Parenthesized expression
    Paren(Box<Expr>),

    /// `expr [NOT] IN (a, b, c)`
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },

    /// `expr [NOT] IN (SELECT ...)`
    InSubquery {
        expr: Box<Expr>,
        subquery: Box<Query>,
        negated: bool,
    },

    /// `expr [NOT] BETWEEN low AND high`
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },

    /// `expr [NOT] LIKE pattern`, `ILIKE` when `case_insensitive`
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        negated: bool,
        case_insensitive: bool,
    },

    /// `expr IS [NOT] NULL`
    IsNull { expr: Box<Expr>, negated: bool },

    /// `expr IS [NOT] TRUE` / `expr IS [NOT] FALSE`
    IsBool {
        expr: Box<Expr>,
        value: bool,
        negated: bool,
    },

    /// `[NOT] EXISTS (SELECT ...)`
    Exists { subquery: Box<Query>, negated: bool },

    /// Scalar subquery used as an operand
    Subquery(Box<Query>),

    /// `left op ANY (SELECT ...)` / `left op ALL (SELECT ...)`
    Quantified {
        left: Box<Expr>,
        op: BinaryOp,
        quantifier: Quantifier,
        subquery: Box<Query>,
    },

    /// Placeholder for syntax the IR does not model
    Unsupported(String),
}

impl Expr {
    pub fn column(column: impl Into<String>) -> Self {
        Expr::Column(ColumnRef::new(column))
    }

    pub fn qualified_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Expr::Column(ColumnRef::new(column).with_table(table))
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::And, right)
    }

    pub fn not(expr: Expr) -> Self {
        Expr::UnaryOp {
            op: UnaryOp::Not,
            expr: Box::new(expr),
        }
    }

    /// Strips any number of enclosing parentheses
    pub fn unparenthesized(&self) -> &Expr {
        let mut current = self;
        while let Expr::Paren(inner) = current {
            current = inner;
        }
        current
    }

    /// Rebuilds this node with `f` applied to each direct operand.
    ///
    /// Subqueries are kept as they are; only expressions evaluated in the
    /// current row are visited.
    pub fn try_map_children<E>(
        &self,
        mut f: impl FnMut(&Expr) -> Result<Expr, E>,
    ) -> Result<Expr, E> {
        let mut map = |e: &Expr| f(e).map(Box::new);
        Ok(match self {
            Expr::Column(_)
            | Expr::Literal(_)
            | Expr::Exists { .. }
            | Expr::Subquery(_)
            | Expr::Unsupported(_) => self.clone(),
            Expr::BinaryOp { left, op, right } => Expr::BinaryOp {
                left: map(left)?,
                op: *op,
                right: map(right)?,
            },
            Expr::UnaryOp { op, expr } => Expr::UnaryOp {
                op: *op,
                expr: map(expr)?,
            },
            Expr::Function {
                name,
                args,
                distinct,
            } => Expr::Function {
                name: name.clone(),
                args: args.iter().map(|a| map(a).map(|b| *b)).collect::<Result<_, E>>()?,
                distinct: *distinct,
            },
            Expr::Cast { expr, type_name } => Expr::Cast {
                expr: map(expr)?,
                type_name: type_name.clone(),
            },
            Expr::Paren(inner) => Expr::Paren(map(inner)?),
            Expr::InList {
                expr,
                list,
                negated,
            } => Expr::InList {
                expr: map(expr)?,
                list: list.iter().map(|a| map(a).map(|b| *b)).collect::<Result<_, E>>()?,
                negated: *negated,
            },
            Expr::InSubquery {
                expr,
                subquery,
                negated,
            } => Expr::InSubquery {
                expr: map(expr)?,
                subquery: subquery.clone(),
                negated: *negated,
            },
            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => Expr::Between {
                expr: map(expr)?,
                low: map(low)?,
                high: map(high)?,
                negated: *negated,
            },
            Expr::Like {
                expr,
                pattern,
                negated,
                case_insensitive,
            } => Expr::Like {
                expr: map(expr)?,
                pattern: map(pattern)?,
                negated: *negated,
                case_insensitive: *case_insensitive,
            },
            Expr::IsNull { expr, negated } => Expr::IsNull {
                expr: map(expr)?,
                negated: *negated,
            },
            Expr::IsBool {
                expr,
                value,
                negated,
            } => Expr::IsBool {
                expr: map(expr)?,
                value: *value,
                negated: *negated,
            },
            Expr::Quantified {
                left,
                op,
                quantifier,
                subquery,
            } => Expr::Quantified {
                left: map(left)?,
                op: *op,
                quantifier: *quantifier,
                subquery: subquery.clone(),
            },
        })
    }
}

impl From<Literal> for Expr {
    fn from(literal: Literal) -> Self {
        Expr::Literal(literal)
    }
}

/// Column reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Optional table/alias name
    pub table: Option<String>,
    /// Column name
    pub column: String,
}

impl ColumnRef {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn qualified(&self) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", table, self.column),
            None => self.column.clone(),
        }
    }

    /// `TRUE` / `FALSE` written where the grammar expected an identifier
    pub fn is_boolean_keyword(&self) -> bool {
        self.table.is_none()
            && (self.column.eq_ignore_ascii_case("true") || self.column.eq_ignore_ascii_case("false"))
    }
}

/// Literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,

    // String
    Concat,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        )
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }

    /// The comparison that holds exactly when `self` does not.
    ///
    /// Returns `None` for non-comparison operators.
    pub fn negated(self) -> Option<BinaryOp> {
        match self {
            BinaryOp::Eq => Some(BinaryOp::NotEq),
            BinaryOp::NotEq => Some(BinaryOp::Eq),
            BinaryOp::Lt => Some(BinaryOp::GtEq),
            BinaryOp::LtEq => Some(BinaryOp::Gt),
            BinaryOp::Gt => Some(BinaryOp::LtEq),
            BinaryOp::GtEq => Some(BinaryOp::Lt),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Concat => "||",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Subquery quantifier for `op ANY (...)` and `op ALL (...)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantifier {
    Any,
    All,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_ref() {
        let col = ColumnRef::new("id");
        assert_eq!(col.qualified(), "id");
        assert!(col.table.is_none());

        let qualified = col.with_table("users");
        assert_eq!(qualified.qualified(), "users.id");
        assert_eq!(qualified.table.as_deref(), Some("users"));
    }

    #[test]
    fn test_boolean_keyword_columns() {
        assert!(ColumnRef::new("TRUE").is_boolean_keyword());
        assert!(ColumnRef::new("false").is_boolean_keyword());
        assert!(!ColumnRef::new("true").with_table("t").is_boolean_keyword());
        assert!(!ColumnRef::new("truth").is_boolean_keyword());
    }

    #[test]
    fn test_negated_comparisons() {
        assert_eq!(BinaryOp::Lt.negated(), Some(BinaryOp::GtEq));
        assert_eq!(BinaryOp::Eq.negated(), Some(BinaryOp::NotEq));
        assert_eq!(BinaryOp::And.negated(), None);
    }

    #[test]
    fn test_unparenthesized() {
        let expr = Expr::Paren(Box::new(Expr::Paren(Box::new(Expr::column("a")))));
        assert_eq!(expr.unparenthesized(), &Expr::column("a"));
    }

    #[test]
    fn test_try_map_children_replaces_operands() {
        let expr = Expr::binary(
            Expr::Function {
                name: "COUNT".to_string(),
                args: vec![Expr::column("a")],
                distinct: false,
            },
            BinaryOp::Gt,
            Expr::column("b"),
        );
        let mapped = expr
            .try_map_children(|child| match child {
                Expr::Function { .. } => Ok::<_, ()>(Expr::Literal(Literal::Integer(2))),
                other => Ok(other.clone()),
            })
            .unwrap();
        assert_eq!(
            mapped,
            Expr::binary(Expr::Literal(Literal::Integer(2)), BinaryOp::Gt, Expr::column("b"))
        );

        let err = Expr::not(Expr::column("a")).try_map_children(|_| Err("stop"));
        assert_eq!(err, Err("stop"));
    }
}
