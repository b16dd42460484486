// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL rendering
//!
//! `Display` implementations turning IR back into SQL text. Output is
//! canonical rather than a reproduction of the source: keywords are
//! uppercase, strings single-quoted, and parentheses are added wherever
//! operator precedence would otherwise change the meaning of a rewritten
//! tree.

use std::fmt::{self, Display, Formatter};

use crate::expr::{BinaryOp, Expr, Literal, Quantifier, UnaryOp};
use crate::query::{
    Join, JoinCondition, JoinType, OrderBy, Query, SelectItem, SelectStatement, SetOp,
    SortDirection, TableRef, TableSource,
};

/// Quotes a string as a SQL literal, doubling embedded single quotes
pub fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Renders a float so that SQL reads it back as a real.
///
/// Integral values keep a fractional part (`2.0`, never `2`). NaN has no
/// SQL spelling and renders as `NULL`; infinities overflow to `±Inf`.
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        "NULL".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "9e999" } else { "-9e999" }.to_string()
    } else {
        format!("{x:?}")
    }
}

fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => 1,
        BinaryOp::And => 2,
        BinaryOp::Eq
        | BinaryOp::NotEq
        | BinaryOp::Lt
        | BinaryOp::LtEq
        | BinaryOp::Gt
        | BinaryOp::GtEq => 4,
        BinaryOp::Concat => 5,
        BinaryOp::Add | BinaryOp::Sub => 6,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 7,
    }
}

const NOT_PRECEDENCE: u8 = 3;
const PREDICATE_PRECEDENCE: u8 = 4;
const NEG_PRECEDENCE: u8 = 8;
const ATOM_PRECEDENCE: u8 = 9;

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::BinaryOp { op, .. } => binary_precedence(*op),
        Expr::UnaryOp { op: UnaryOp::Not, .. } => NOT_PRECEDENCE,
        Expr::UnaryOp { op: UnaryOp::Neg, .. } => NEG_PRECEDENCE,
        Expr::InList { .. }
        | Expr::InSubquery { .. }
        | Expr::Between { .. }
        | Expr::Like { .. }
        | Expr::IsNull { .. }
        | Expr::IsBool { .. }
        | Expr::Quantified { .. } => PREDICATE_PRECEDENCE,
        Expr::Exists { negated: true, .. } => NOT_PRECEDENCE,
        _ => ATOM_PRECEDENCE,
    }
}

fn write_operand(f: &mut Formatter<'_>, expr: &Expr, min_precedence: u8) -> fmt::Result {
    if precedence(expr) < min_precedence {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

fn write_list<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn not_keyword(negated: bool) -> &'static str {
    if negated { "NOT " } else { "" }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("NULL"),
            Literal::Boolean(true) => f.write_str("TRUE"),
            Literal::Boolean(false) => f.write_str("FALSE"),
            Literal::Integer(i) => write!(f, "{i}"),
            Literal::Float(x) => f.write_str(&format_float(*x)),
            Literal::String(s) => f.write_str(&quote_string(s)),
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(column) => f.write_str(&column.qualified()),
            Expr::Literal(literal) => write!(f, "{literal}"),
            Expr::BinaryOp { left, op, right } => {
                let p = binary_precedence(*op);
                let associative = matches!(
                    op,
                    BinaryOp::And | BinaryOp::Or | BinaryOp::Add | BinaryOp::Mul | BinaryOp::Concat
                );
                let left_min = if op.is_comparison() { p + 1 } else { p };
                let right_min = if associative { p } else { p + 1 };
                write_operand(f, left, left_min)?;
                write!(f, " {op} ")?;
                write_operand(f, right, right_min)
            }
            Expr::UnaryOp { op: UnaryOp::Not, expr } => {
                f.write_str("NOT ")?;
                write_operand(f, expr, NOT_PRECEDENCE)
            }
            Expr::UnaryOp { op: UnaryOp::Neg, expr } => {
                f.write_str("-")?;
                write_operand(f, expr, NEG_PRECEDENCE)
            }
            Expr::Function {
                name,
                args,
                distinct,
            } => {
                write!(f, "{name}(")?;
                if *distinct {
                    f.write_str("DISTINCT ")?;
                }
                write_list(f, args)?;
                f.write_str(")")
            }
            Expr::Cast { expr, type_name } => write!(f, "CAST({expr} AS {type_name})"),
            Expr::Paren(inner) => write!(f, "({inner})"),
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                write_operand(f, expr, PREDICATE_PRECEDENCE + 1)?;
                write!(f, " {}IN (", not_keyword(*negated))?;
                write_list(f, list)?;
                f.write_str(")")
            }
            Expr::InSubquery {
                expr,
                subquery,
                negated,
            } => {
                write_operand(f, expr, PREDICATE_PRECEDENCE + 1)?;
                write!(f, " {}IN ({subquery})", not_keyword(*negated))
            }
            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                write_operand(f, expr, PREDICATE_PRECEDENCE + 1)?;
                write!(f, " {}BETWEEN ", not_keyword(*negated))?;
                write_operand(f, low, PREDICATE_PRECEDENCE + 1)?;
                f.write_str(" AND ")?;
                write_operand(f, high, PREDICATE_PRECEDENCE + 1)
            }
            Expr::Like {
                expr,
                pattern,
                negated,
                case_insensitive,
            } => {
                write_operand(f, expr, PREDICATE_PRECEDENCE + 1)?;
                let keyword = if *case_insensitive { "ILIKE" } else { "LIKE" };
                write!(f, " {}{keyword} ", not_keyword(*negated))?;
                write_operand(f, pattern, PREDICATE_PRECEDENCE + 1)
            }
            Expr::IsNull { expr, negated } => {
                write_operand(f, expr, PREDICATE_PRECEDENCE + 1)?;
                write!(f, " IS {}NULL", not_keyword(*negated))
            }
            Expr::IsBool {
                expr,
                value,
                negated,
            } => {
                write_operand(f, expr, PREDICATE_PRECEDENCE + 1)?;
                let keyword = if *value { "TRUE" } else { "FALSE" };
                write!(f, " IS {}{keyword}", not_keyword(*negated))
            }
            Expr::Exists { subquery, negated } => {
                write!(f, "{}EXISTS ({subquery})", not_keyword(*negated))
            }
            Expr::Subquery(query) => write!(f, "({query})"),
            Expr::Quantified {
                left,
                op,
                quantifier,
                subquery,
            } => {
                write_operand(f, left, PREDICATE_PRECEDENCE + 1)?;
                let keyword = match quantifier {
                    Quantifier::Any => "ANY",
                    Quantifier::All => "ALL",
                };
                write!(f, " {op} {keyword} ({subquery})")
            }
            Expr::Unsupported(text) => f.write_str(text),
        }
    }
}

impl Display for SelectItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SelectItem::UnnamedExpr(expr) => write!(f, "{expr}"),
            SelectItem::AliasedExpr { expr, alias } => {
                if alias.contains('.') {
                    write!(f, "{expr} AS \"{alias}\"")
                } else {
                    write!(f, "{expr} AS {alias}")
                }
            }
            SelectItem::QualifiedWildcard(table) => write!(f, "{table}.*"),
            SelectItem::Wildcard => f.write_str("*"),
        }
    }
}

impl Display for TableRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.source {
            TableSource::Named(name) => f.write_str(name)?,
            TableSource::Derived(query) => write!(f, "({query})")?,
        }
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        for join in &self.joins {
            write!(f, " {join}")?;
        }
        Ok(())
    }
}

impl Display for Join {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.condition {
            JoinCondition::Natural => {
                let keyword = match self.join_type {
                    JoinType::Left => "NATURAL LEFT JOIN",
                    JoinType::Right => "NATURAL RIGHT JOIN",
                    JoinType::Full => "NATURAL FULL JOIN",
                    JoinType::Inner | JoinType::Cross => "NATURAL JOIN",
                };
                write!(f, "{keyword} {}", self.table)
            }
            JoinCondition::On(expr) => {
                write!(f, "{} {} ON {expr}", self.join_type.as_sql(), self.table)
            }
            JoinCondition::Using(columns) => {
                write!(f, "{} {} USING (", self.join_type.as_sql(), self.table)?;
                write_list(f, columns)?;
                f.write_str(")")
            }
            JoinCondition::None => write!(f, "{} {}", self.join_type.as_sql(), self.table),
        }
    }
}

impl Display for OrderBy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        match self.direction {
            Some(SortDirection::Asc) => f.write_str(" ASC"),
            Some(SortDirection::Desc) => f.write_str(" DESC"),
            None => Ok(()),
        }
    }
}

impl Display for SelectStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        if self.projection.is_empty() {
            f.write_str("*")?;
        } else {
            write_list(f, &self.projection)?;
        }
        if !self.from.is_empty() {
            f.write_str(" FROM ")?;
            write_list(f, &self.from)?;
        }
        if let Some(predicate) = &self.where_clause {
            write!(f, " WHERE {predicate}")?;
        }
        if !self.group_by.is_empty() {
            f.write_str(" GROUP BY ")?;
            write_list(f, &self.group_by)?;
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {having}")?;
        }
        Ok(())
    }
}

impl Display for SetOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (left, keyword, right, all) = match self {
            SetOp::Select(select) => return write!(f, "{select}"),
            SetOp::Union { left, right, all } => (left, "UNION", right, all),
            SetOp::Intersect { left, right, all } => (left, "INTERSECT", right, all),
            SetOp::Except { left, right, all } => (left, "EXCEPT", right, all),
        };
        let all = if *all { " ALL" } else { "" };
        write!(f, "{left} {keyword}{all} {right}")
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.body)?;
        if let Some(order_by) = &self.order_by {
            f.write_str(" ORDER BY ")?;
            write_list(f, order_by)?;
        }
        if let Some(limit) = &self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        if let Some(offset) = &self.offset {
            write!(f, " OFFSET {offset}")?;
        }
        Ok(())
    }
}
