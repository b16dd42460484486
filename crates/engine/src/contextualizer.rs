// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Subquery contextualization
//!
//! A correlated subquery cannot be run on its own: it mentions columns of the
//! row the enclosing query is looking at. The [`SubQueryContextualizer`]
//! replaces every such reference with the row's value, producing SQL the
//! database can execute directly.
//!
//! A column reference is kept when the subquery's own levels resolve it (or
//! when it is a bare `TRUE`/`FALSE` keyword the grammar read as a column).
//! Otherwise its value is taken from the [`EvaluationContext`] and spliced in
//! as a literal.
//!
//! ```text
//! row: o.id = 42
//! SELECT 1 FROM items i WHERE i.order_id = o.id
//!   -> SELECT 1 FROM items AS i WHERE i.order_id = 42
//! ```
//!
//! Each nested SELECT pushes its own level onto a copy of the enclosing
//! stack, so sibling subqueries never see each other's tables.

use sqldist_catalog::Schema;
use sqldist_ir::{Expr, Join, JoinCondition, OrderBy, Query, SelectItem, SelectStatement, SetOp, TableRef, TableSource};
use sqldist_semantic::{EvaluationContext, QueryColumn, SchemaContext, create_schema_context_item};

use crate::error::{EngineError, EngineResult};

pub struct SubQueryContextualizer<'a> {
    schema: &'a Schema,
    evaluation: &'a EvaluationContext,
    parent: SchemaContext,
}

impl<'a> SubQueryContextualizer<'a> {
    pub fn new(schema: &'a Schema, evaluation: &'a EvaluationContext) -> Self {
        Self {
            schema,
            evaluation,
            parent: SchemaContext::new(),
        }
    }

    /// Builder method: levels whose columns stay as references
    pub fn with_schema_context(mut self, parent: SchemaContext) -> Self {
        self.parent = parent;
        self
    }

    /// Rewrites the query and renders it as SQL
    pub fn contextualize(&self, query: &Query) -> EngineResult<String> {
        let sql = self.contextualize_query(query)?.to_string();
        tracing::debug!(sql = %sql, "contextualized subquery");
        Ok(sql)
    }

    /// Rewrites the query, leaving the input untouched
    pub fn contextualize_query(&self, query: &Query) -> EngineResult<Query> {
        self.rewrite_query(query, &self.parent)
    }

    fn push_level(&self, ctx: &SchemaContext, from: &[TableRef]) -> EngineResult<SchemaContext> {
        let mut inner = ctx.copy();
        inner.add(create_schema_context_item(from, self.schema)?);
        Ok(inner)
    }

    fn rewrite_query(&self, query: &Query, ctx: &SchemaContext) -> EngineResult<Query> {
        let (body, level) = match &query.body {
            SetOp::Select(select) => {
                let level = self.push_level(ctx, &select.from)?;
                let select = self.rewrite_select(select, ctx, &level)?;
                (SetOp::Select(Box::new(select)), Some(level))
            }
            SetOp::Union { left, right, all } => (
                SetOp::Union {
                    left: Box::new(self.rewrite_query(left, ctx)?),
                    right: Box::new(self.rewrite_query(right, ctx)?),
                    all: *all,
                },
                None,
            ),
            SetOp::Intersect { left, right, all } => (
                SetOp::Intersect {
                    left: Box::new(self.rewrite_query(left, ctx)?),
                    right: Box::new(self.rewrite_query(right, ctx)?),
                    all: *all,
                },
                None,
            ),
            SetOp::Except { left, right, all } => (
                SetOp::Except {
                    left: Box::new(self.rewrite_query(left, ctx)?),
                    right: Box::new(self.rewrite_query(right, ctx)?),
                    all: *all,
                },
                None,
            ),
        };

        // ORDER BY of a set operation names output columns; leave it alone
        let order_by = match (&query.order_by, &level) {
            (Some(items), Some(level)) => Some(
                items
                    .iter()
                    .map(|item| {
                        Ok(OrderBy {
                            expr: self.rewrite_expr(&item.expr, level)?,
                            direction: item.direction,
                        })
                    })
                    .collect::<EngineResult<Vec<_>>>()?,
            ),
            (items, _) => items.clone(),
        };

        Ok(Query {
            body,
            order_by,
            limit: self.rewrite_opt(&query.limit, ctx)?,
            offset: self.rewrite_opt(&query.offset, ctx)?,
            dialect: query.dialect,
        })
    }

    fn rewrite_select(
        &self,
        select: &SelectStatement,
        outer: &SchemaContext,
        level: &SchemaContext,
    ) -> EngineResult<SelectStatement> {
        let projection = select
            .projection
            .iter()
            .map(|item| {
                Ok(match item {
                    SelectItem::UnnamedExpr(expr) => {
                        SelectItem::UnnamedExpr(self.rewrite_expr(expr, level)?)
                    }
                    SelectItem::AliasedExpr { expr, alias } => SelectItem::AliasedExpr {
                        expr: self.rewrite_expr(expr, level)?,
                        alias: alias.clone(),
                    },
                    other => other.clone(),
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        let from = select
            .from
            .iter()
            .map(|table| self.rewrite_table(table, outer, level))
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(SelectStatement {
            distinct: select.distinct,
            projection,
            from,
            where_clause: self.rewrite_opt(&select.where_clause, level)?,
            group_by: self.rewrite_all(&select.group_by, level)?,
            having: self.rewrite_opt(&select.having, level)?,
        })
    }

    /// Derived tables see the enclosing levels only; join conditions see
    /// the current level.
    fn rewrite_table(
        &self,
        table: &TableRef,
        outer: &SchemaContext,
        level: &SchemaContext,
    ) -> EngineResult<TableRef> {
        let source = match &table.source {
            TableSource::Named(name) => TableSource::Named(name.clone()),
            TableSource::Derived(query) => {
                TableSource::Derived(Box::new(self.rewrite_query(query, outer)?))
            }
        };
        let joins = table
            .joins
            .iter()
            .map(|join| {
                Ok(Join {
                    join_type: join.join_type,
                    table: self.rewrite_table(&join.table, outer, level)?,
                    condition: match &join.condition {
                        JoinCondition::On(expr) => JoinCondition::On(self.rewrite_expr(expr, level)?),
                        other => other.clone(),
                    },
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;
        Ok(TableRef {
            source,
            alias: table.alias.clone(),
            joins,
        })
    }

    fn rewrite_opt(&self, expr: &Option<Expr>, ctx: &SchemaContext) -> EngineResult<Option<Expr>> {
        expr.as_ref().map(|e| self.rewrite_expr(e, ctx)).transpose()
    }

    fn rewrite_all(&self, exprs: &[Expr], ctx: &SchemaContext) -> EngineResult<Vec<Expr>> {
        exprs.iter().map(|e| self.rewrite_expr(e, ctx)).collect()
    }

    fn rewrite_boxed(&self, expr: &Expr, ctx: &SchemaContext) -> EngineResult<Box<Expr>> {
        self.rewrite_expr(expr, ctx).map(Box::new)
    }

    fn rewrite_column(&self, column: &sqldist_ir::ColumnRef, ctx: &SchemaContext) -> EngineResult<Expr> {
        let query_column = QueryColumn::from(column);
        if ctx.includes(&query_column) || column.is_boolean_keyword() {
            return Ok(Expr::Column(column.clone()));
        }
        if self.evaluation.includes(&query_column) {
            let value = self.evaluation.get_value(&query_column)?;
            return Ok(Expr::Literal(value.to_literal()));
        }
        Err(EngineError::UnresolvedColumn(query_column.qualified()))
    }

    fn rewrite_expr(&self, expr: &Expr, ctx: &SchemaContext) -> EngineResult<Expr> {
        Ok(match expr {
            Expr::Column(column) => self.rewrite_column(column, ctx)?,
            Expr::Literal(_) | Expr::Unsupported(_) => expr.clone(),
            Expr::BinaryOp { left, op, right } => Expr::BinaryOp {
                left: self.rewrite_boxed(left, ctx)?,
                op: *op,
                right: self.rewrite_boxed(right, ctx)?,
            },
            Expr::UnaryOp { op, expr } => Expr::UnaryOp {
                op: *op,
                expr: self.rewrite_boxed(expr, ctx)?,
            },
            Expr::Function {
                name,
                args,
                distinct,
            } => Expr::Function {
                name: name.clone(),
                args: self.rewrite_all(args, ctx)?,
                distinct: *distinct,
            },
            Expr::Cast { expr, type_name } => Expr::Cast {
                expr: self.rewrite_boxed(expr, ctx)?,
                type_name: type_name.clone(),
            },
            Expr::Paren(inner) => Expr::Paren(self.rewrite_boxed(inner, ctx)?),
            Expr::InList {
                expr,
                list,
                negated,
            } => Expr::InList {
                expr: self.rewrite_boxed(expr, ctx)?,
                list: self.rewrite_all(list, ctx)?,
                negated: *negated,
            },
            Expr::InSubquery {
                expr,
                subquery,
                negated,
            } => Expr::InSubquery {
                expr: self.rewrite_boxed(expr, ctx)?,
                subquery: Box::new(self.rewrite_query(subquery, ctx)?),
                negated: *negated,
            },
            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => Expr::Between {
                expr: self.rewrite_boxed(expr, ctx)?,
                low: self.rewrite_boxed(low, ctx)?,
                high: self.rewrite_boxed(high, ctx)?,
                negated: *negated,
            },
            Expr::Like {
                expr,
                pattern,
                negated,
                case_insensitive,
            } => Expr::Like {
                expr: self.rewrite_boxed(expr, ctx)?,
                pattern: self.rewrite_boxed(pattern, ctx)?,
                negated: *negated,
                case_insensitive: *case_insensitive,
            },
            Expr::IsNull { expr, negated } => Expr::IsNull {
                expr: self.rewrite_boxed(expr, ctx)?,
                negated: *negated,
            },
            Expr::IsBool {
                expr,
                value,
                negated,
            } => Expr::IsBool {
                expr: self.rewrite_boxed(expr, ctx)?,
                value: *value,
                negated: *negated,
            },
            Expr::Exists { subquery, negated } => Expr::Exists {
                subquery: Box::new(self.rewrite_query(subquery, ctx)?),
                negated: *negated,
            },
            Expr::Subquery(query) => Expr::Subquery(Box::new(self.rewrite_query(query, ctx)?)),
            Expr::Quantified {
                left,
                op,
                quantifier,
                subquery,
            } => Expr::Quantified {
                left: self.rewrite_boxed(left, ctx)?,
                op: *op,
                quantifier: *quantifier,
                subquery: Box::new(self.rewrite_query(subquery, ctx)?),
            },
        })
    }
}
