// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Expression lowering from the `sqlparser` AST

use sqlparser::ast::{
    self, BinaryOperator, DuplicateTreatment, Expr as SqlExpr, FunctionArg, FunctionArgExpr,
    FunctionArguments, Ident, ObjectName, ObjectNamePart, UnaryOperator, Value as SqlValue,
};
use sqldist_ir::{BinaryOp, ColumnRef, Expr, Literal, Quantifier, UnaryOp};

use crate::context::LoweringContext;
use crate::error::{LoweringError, LoweringResult};
use crate::query::lower_query;

/// Joins the parts of a dotted object name
pub(crate) fn object_name(name: &ObjectName) -> String {
    name.0
        .iter()
        .map(|part| match part {
            ObjectNamePart::Identifier(ident) => ident.value.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

fn compound_column(idents: &[Ident]) -> Expr {
    match idents.split_last() {
        Some((column, [])) => Expr::Column(ColumnRef::new(column.value.clone())),
        Some((column, qualifiers)) => {
            let table = qualifiers
                .iter()
                .map(|ident| ident.value.as_str())
                .collect::<Vec<_>>()
                .join(".");
            Expr::Column(ColumnRef::new(column.value.clone()).with_table(table))
        }
        None => Expr::Unsupported(String::new()),
    }
}

fn lower_binary_op(op: &BinaryOperator) -> Option<BinaryOp> {
    Some(match op {
        BinaryOperator::Plus => BinaryOp::Add,
        BinaryOperator::Minus => BinaryOp::Sub,
        BinaryOperator::Multiply => BinaryOp::Mul,
        BinaryOperator::Divide => BinaryOp::Div,
        BinaryOperator::Modulo => BinaryOp::Mod,
        BinaryOperator::StringConcat => BinaryOp::Concat,
        BinaryOperator::Eq => BinaryOp::Eq,
        BinaryOperator::NotEq => BinaryOp::NotEq,
        BinaryOperator::Lt => BinaryOp::Lt,
        BinaryOperator::LtEq => BinaryOp::LtEq,
        BinaryOperator::Gt => BinaryOp::Gt,
        BinaryOperator::GtEq => BinaryOp::GtEq,
        BinaryOperator::And => BinaryOp::And,
        BinaryOperator::Or => BinaryOp::Or,
        _ => return None,
    })
}

fn lower_value(ctx: &mut LoweringContext, value: &SqlValue) -> Expr {
    match value {
        SqlValue::Number(raw, _) => {
            if let Ok(i) = raw.parse::<i64>() {
                Expr::Literal(Literal::Integer(i))
            } else if let Some(f) = raw.parse::<f64>().ok().filter(|f| f.is_finite()) {
                Expr::Literal(Literal::Float(f))
            } else {
                ctx.add_error(LoweringError::InvalidLiteral {
                    value: raw.clone(),
                    type_name: "number".to_string(),
                });
                Expr::Unsupported(raw.clone())
            }
        }
        SqlValue::SingleQuotedString(s)
        | SqlValue::DoubleQuotedString(s)
        | SqlValue::EscapedStringLiteral(s)
        | SqlValue::NationalStringLiteral(s) => Expr::Literal(Literal::String(s.clone())),
        SqlValue::Boolean(b) => Expr::Literal(Literal::Boolean(*b)),
        SqlValue::Null => Expr::Literal(Literal::Null),
        other => ctx.unsupported("literal", other),
    }
}

fn negate(expr: Expr) -> Expr {
    match expr {
        Expr::Literal(Literal::Integer(i)) if i != i64::MIN => Expr::Literal(Literal::Integer(-i)),
        Expr::Literal(Literal::Float(f)) => Expr::Literal(Literal::Float(-f)),
        other => Expr::UnaryOp {
            op: UnaryOp::Neg,
            expr: Box::new(other),
        },
    }
}

fn boxed(ctx: &mut LoweringContext, expr: &SqlExpr) -> LoweringResult<Box<Expr>> {
    lower_expr(ctx, expr).map(Box::new)
}

fn lower_function(
    ctx: &mut LoweringContext,
    func: &ast::Function,
    original: &SqlExpr,
) -> LoweringResult<Expr> {
    if func.over.is_some() || func.filter.is_some() {
        return Ok(ctx.unsupported("window or filtered function", original));
    }

    let mut distinct = false;
    let args = match &func.args {
        FunctionArguments::None => Vec::new(),
        FunctionArguments::List(list) => {
            distinct = matches!(list.duplicate_treatment, Some(DuplicateTreatment::Distinct));
            let mut args = Vec::with_capacity(list.args.len());
            for arg in &list.args {
                match arg {
                    FunctionArg::Unnamed(FunctionArgExpr::Expr(expr)) => {
                        args.push(lower_expr(ctx, expr)?)
                    }
                    // `*` and named arguments are kept verbatim
                    other => args.push(Expr::Unsupported(other.to_string())),
                }
            }
            args
        }
        FunctionArguments::Subquery(_) => {
            return Ok(ctx.unsupported("function over subquery", original));
        }
    };

    Ok(Expr::Function {
        name: object_name(&func.name),
        args,
        distinct,
    })
}

/// Lowers one expression.
///
/// Constructs the IR does not model become [`Expr::Unsupported`]
/// placeholders; only nested query failures are returned as errors.
pub(crate) fn lower_expr(ctx: &mut LoweringContext, expr: &SqlExpr) -> LoweringResult<Expr> {
    Ok(match expr {
        SqlExpr::Identifier(ident) => Expr::Column(ColumnRef::new(ident.value.clone())),
        SqlExpr::CompoundIdentifier(idents) => compound_column(idents),
        SqlExpr::Value(value) => lower_value(ctx, &value.value),
        SqlExpr::Nested(inner) => Expr::Paren(boxed(ctx, inner)?),
        SqlExpr::BinaryOp { left, op, right } => match lower_binary_op(op) {
            Some(op) => Expr::BinaryOp {
                left: boxed(ctx, left)?,
                op,
                right: boxed(ctx, right)?,
            },
            None => ctx.unsupported("binary operator", expr),
        },
        SqlExpr::UnaryOp { op, expr: inner } => match op {
            UnaryOperator::Not => Expr::not(lower_expr(ctx, inner)?),
            UnaryOperator::Minus => negate(lower_expr(ctx, inner)?),
            UnaryOperator::Plus => lower_expr(ctx, inner)?,
            _ => ctx.unsupported("unary operator", expr),
        },
        SqlExpr::IsNull(inner) => Expr::IsNull {
            expr: boxed(ctx, inner)?,
            negated: false,
        },
        SqlExpr::IsNotNull(inner) => Expr::IsNull {
            expr: boxed(ctx, inner)?,
            negated: true,
        },
        SqlExpr::IsTrue(inner) => is_bool(ctx, inner, true, false)?,
        SqlExpr::IsNotTrue(inner) => is_bool(ctx, inner, true, true)?,
        SqlExpr::IsFalse(inner) => is_bool(ctx, inner, false, false)?,
        SqlExpr::IsNotFalse(inner) => is_bool(ctx, inner, false, true)?,
        SqlExpr::InList {
            expr: inner,
            list,
            negated,
        } => Expr::InList {
            expr: boxed(ctx, inner)?,
            list: list
                .iter()
                .map(|item| lower_expr(ctx, item))
                .collect::<LoweringResult<_>>()?,
            negated: *negated,
        },
        SqlExpr::InSubquery {
            expr: inner,
            subquery,
            negated,
        } => Expr::InSubquery {
            expr: boxed(ctx, inner)?,
            subquery: Box::new(lower_query(ctx, subquery)?),
            negated: *negated,
        },
        SqlExpr::Between {
            expr: inner,
            negated,
            low,
            high,
        } => Expr::Between {
            expr: boxed(ctx, inner)?,
            low: boxed(ctx, low)?,
            high: boxed(ctx, high)?,
            negated: *negated,
        },
        SqlExpr::Like {
            negated,
            any,
            expr: inner,
            pattern,
            escape_char,
        } => {
            if *any || escape_char.is_some() {
                ctx.unsupported("LIKE ANY / ESCAPE", expr)
            } else {
                like(ctx, inner, pattern, *negated, false)?
            }
        }
        SqlExpr::ILike {
            negated,
            any,
            expr: inner,
            pattern,
            escape_char,
        } => {
            if *any || escape_char.is_some() {
                ctx.unsupported("ILIKE ANY / ESCAPE", expr)
            } else {
                like(ctx, inner, pattern, *negated, true)?
            }
        }
        SqlExpr::Exists { subquery, negated } => Expr::Exists {
            subquery: Box::new(lower_query(ctx, subquery)?),
            negated: *negated,
        },
        SqlExpr::Subquery(query) => Expr::Subquery(Box::new(lower_query(ctx, query)?)),
        SqlExpr::AnyOp {
            left,
            compare_op,
            right,
            ..
        } => quantified(ctx, expr, left, compare_op, right, Quantifier::Any)?,
        SqlExpr::AllOp {
            left,
            compare_op,
            right,
        } => quantified(ctx, expr, left, compare_op, right, Quantifier::All)?,
        SqlExpr::Cast {
            expr: inner,
            data_type,
            ..
        } => Expr::Cast {
            expr: boxed(ctx, inner)?,
            type_name: data_type.to_string(),
        },
        SqlExpr::Function(func) => lower_function(ctx, func, expr)?,
        _ => ctx.unsupported("expression", expr),
    })
}

fn is_bool(
    ctx: &mut LoweringContext,
    inner: &SqlExpr,
    value: bool,
    negated: bool,
) -> LoweringResult<Expr> {
    Ok(Expr::IsBool {
        expr: boxed(ctx, inner)?,
        value,
        negated,
    })
}

fn like(
    ctx: &mut LoweringContext,
    inner: &SqlExpr,
    pattern: &SqlExpr,
    negated: bool,
    case_insensitive: bool,
) -> LoweringResult<Expr> {
    Ok(Expr::Like {
        expr: boxed(ctx, inner)?,
        pattern: boxed(ctx, pattern)?,
        negated,
        case_insensitive,
    })
}

fn quantified(
    ctx: &mut LoweringContext,
    original: &SqlExpr,
    left: &SqlExpr,
    compare_op: &BinaryOperator,
    right: &SqlExpr,
    quantifier: Quantifier,
) -> LoweringResult<Expr> {
    let op = lower_binary_op(compare_op).filter(|op| op.is_comparison());
    let subquery = match right {
        SqlExpr::Subquery(query) => Some(query),
        SqlExpr::Nested(inner) => match inner.as_ref() {
            SqlExpr::Subquery(query) => Some(query),
            _ => None,
        },
        _ => None,
    };
    match (op, subquery) {
        (Some(op), Some(query)) => Ok(Expr::Quantified {
            left: boxed(ctx, left)?,
            op,
            quantifier,
            subquery: Box::new(lower_query(ctx, query)?),
        }),
        _ => Ok(ctx.unsupported("quantified comparison over a non-subquery", original)),
    }
}
