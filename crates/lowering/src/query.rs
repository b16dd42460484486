// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Query lowering: set operations, SELECT bodies and FROM clauses

use sqlparser::ast::{
    self, Distinct, GroupByExpr, JoinConstraint, JoinOperator, LimitClause, OrderByKind,
    SelectItemQualifiedWildcardKind, SetExpr, SetOperator, SetQuantifier, TableFactor,
    TableWithJoins,
};
use sqldist_ir::{
    Join, JoinCondition, JoinType, OrderBy, Query, SelectItem, SelectStatement, SetOp,
    SortDirection, TableRef,
};

use crate::context::LoweringContext;
use crate::error::{LoweringError, LoweringResult};
use crate::expr::{lower_expr, object_name};

/// Lowers a (possibly nested) query.
///
/// Each level counts against the context's recursion limit.
pub(crate) fn lower_query(ctx: &mut LoweringContext, query: &ast::Query) -> LoweringResult<Query> {
    ctx.enter_recursive_context()?;
    let result = lower_query_inner(ctx, query);
    ctx.exit_recursive_context();
    result
}

fn lower_query_inner(ctx: &mut LoweringContext, query: &ast::Query) -> LoweringResult<Query> {
    if query.with.is_some() {
        return Err(LoweringError::UnsupportedStatement {
            statement: "WITH (common table expressions)".to_string(),
        });
    }

    let mut lowered = lower_set_expr(ctx, &query.body)?;

    if let Some(order_by) = &query.order_by {
        match &order_by.kind {
            OrderByKind::Expressions(exprs) => {
                let mut items = Vec::with_capacity(exprs.len());
                for e in exprs {
                    items.push(OrderBy {
                        expr: lower_expr(ctx, &e.expr)?,
                        direction: e.options.asc.map(|asc| {
                            if asc {
                                SortDirection::Asc
                            } else {
                                SortDirection::Desc
                            }
                        }),
                    });
                }
                lowered.order_by = Some(items);
            }
            _ => {
                ctx.unsupported("ORDER BY ALL", order_by);
            }
        }
    }

    match &query.limit_clause {
        Some(LimitClause::LimitOffset { limit, offset, .. }) => {
            if let Some(limit) = limit {
                lowered.limit = Some(lower_expr(ctx, limit)?);
            }
            if let Some(offset) = offset {
                lowered.offset = Some(lower_expr(ctx, &offset.value)?);
            }
        }
        Some(LimitClause::OffsetCommaLimit { offset, limit }) => {
            lowered.limit = Some(lower_expr(ctx, limit)?);
            lowered.offset = Some(lower_expr(ctx, offset)?);
        }
        None => {}
    }

    Ok(lowered)
}

fn lower_set_expr(ctx: &mut LoweringContext, body: &SetExpr) -> LoweringResult<Query> {
    match body {
        SetExpr::Select(select) => Ok(Query::select(lower_select(ctx, select)?, ctx.dialect())),
        SetExpr::Query(query) => lower_query(ctx, query),
        SetExpr::SetOperation {
            op,
            set_quantifier,
            left,
            right,
        } => {
            let left = Box::new(lower_set_expr(ctx, left)?);
            let right = Box::new(lower_set_expr(ctx, right)?);
            let all = matches!(set_quantifier, SetQuantifier::All);
            let body = match op {
                SetOperator::Union => SetOp::Union { left, right, all },
                SetOperator::Intersect => SetOp::Intersect { left, right, all },
                _ => SetOp::Except { left, right, all },
            };
            Ok(Query {
                body,
                ..Query::new(ctx.dialect())
            })
        }
        other => Err(LoweringError::UnsupportedStatement {
            statement: other.to_string(),
        }),
    }
}

fn lower_select(ctx: &mut LoweringContext, select: &ast::Select) -> LoweringResult<SelectStatement> {
    let distinct = match &select.distinct {
        Some(Distinct::On(_)) => {
            ctx.unsupported("DISTINCT ON", &"DISTINCT ON (...)");
            true
        }
        Some(_) => true,
        None => false,
    };

    let mut projection = Vec::with_capacity(select.projection.len());
    for item in &select.projection {
        projection.push(lower_select_item(ctx, item)?);
    }

    let mut from = Vec::with_capacity(select.from.len());
    for table in &select.from {
        from.push(lower_table_with_joins(ctx, table)?);
    }

    let where_clause = select
        .selection
        .as_ref()
        .map(|e| lower_expr(ctx, e))
        .transpose()?;

    let group_by = match &select.group_by {
        GroupByExpr::Expressions(exprs, _) => exprs
            .iter()
            .map(|e| lower_expr(ctx, e))
            .collect::<LoweringResult<Vec<_>>>()?,
        GroupByExpr::All(_) => {
            vec![ctx.unsupported("GROUP BY ALL", &"ALL")]
        }
    };

    let having = select
        .having
        .as_ref()
        .map(|e| lower_expr(ctx, e))
        .transpose()?;

    Ok(SelectStatement {
        distinct,
        projection,
        from,
        where_clause,
        group_by,
        having,
    })
}

fn lower_select_item(
    ctx: &mut LoweringContext,
    item: &ast::SelectItem,
) -> LoweringResult<SelectItem> {
    Ok(match item {
        ast::SelectItem::UnnamedExpr(expr) => SelectItem::UnnamedExpr(lower_expr(ctx, expr)?),
        ast::SelectItem::ExprWithAlias { expr, alias } => SelectItem::AliasedExpr {
            expr: lower_expr(ctx, expr)?,
            alias: alias.value.clone(),
        },
        ast::SelectItem::QualifiedWildcard(kind, _) => match kind {
            SelectItemQualifiedWildcardKind::ObjectName(name) => {
                SelectItem::QualifiedWildcard(object_name(name))
            }
            SelectItemQualifiedWildcardKind::Expr(expr) => {
                SelectItem::UnnamedExpr(ctx.unsupported("expression wildcard", expr))
            }
        },
        ast::SelectItem::Wildcard(_) => SelectItem::Wildcard,
    })
}

pub(crate) fn lower_table_with_joins(
    ctx: &mut LoweringContext,
    table: &TableWithJoins,
) -> LoweringResult<TableRef> {
    let mut lowered = lower_table_factor(ctx, &table.relation)?;
    for join in &table.joins {
        let right = lower_table_factor(ctx, &join.relation)?;
        let (join_type, constraint) = match &join.join_operator {
            JoinOperator::Join(c) | JoinOperator::Inner(c) => (JoinType::Inner, Some(c)),
            JoinOperator::Left(c) | JoinOperator::LeftOuter(c) => (JoinType::Left, Some(c)),
            JoinOperator::Right(c) | JoinOperator::RightOuter(c) => (JoinType::Right, Some(c)),
            JoinOperator::FullOuter(c) => (JoinType::Full, Some(c)),
            _ if join.to_string().trim_start().starts_with("CROSS JOIN") => {
                (JoinType::Cross, None)
            }
            _ => {
                return Err(LoweringError::UnsupportedStatement {
                    statement: join.to_string(),
                });
            }
        };
        let condition = match constraint {
            Some(JoinConstraint::On(expr)) => JoinCondition::On(lower_expr(ctx, expr)?),
            Some(JoinConstraint::Using(columns)) => {
                JoinCondition::Using(columns.iter().map(object_name).collect())
            }
            Some(JoinConstraint::Natural) => JoinCondition::Natural,
            Some(JoinConstraint::None) | None => JoinCondition::None,
        };
        lowered = lowered.with_join(Join {
            join_type,
            table: right,
            condition,
        });
    }
    Ok(lowered)
}

fn lower_table_factor(ctx: &mut LoweringContext, factor: &TableFactor) -> LoweringResult<TableRef> {
    let (table, alias) = match factor {
        TableFactor::Table { name, alias, .. } => (TableRef::table(object_name(name)), alias),
        TableFactor::Derived {
            subquery, alias, ..
        } => (TableRef::derived(lower_query(ctx, subquery)?), alias),
        other => {
            return Err(LoweringError::UnsupportedStatement {
                statement: other.to_string(),
            });
        }
    };
    Ok(match alias {
        Some(alias) => table.with_alias(alias.name.value.clone()),
        None => table,
    })
}
