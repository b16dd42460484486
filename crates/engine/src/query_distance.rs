// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Query distance
//!
//! Scores a query that returned no rows by how close the data came to
//! satisfying it.
//!
//! ## Process
//!
//! 1. Build the *unrestricted* query: the same `FROM` clause with the
//!    filtering removed. `INNER JOIN ... ON c` becomes a `CROSS JOIN` and `c`
//!    joins the `WHERE` predicate; outer joins keep their `ON`. Grouping,
//!    ordering and limits are dropped from the fetch.
//! 2. Fetch every candidate row, labelling each column `alias.column` so the
//!    row can be split back by table.
//! 3. Score every row with the [`WhereDistanceCalculator`] and keep the
//!    minimum, stopping early on a satisfying row.
//!
//! With a `HAVING` clause, rows that satisfy the predicate are grouped by the
//! `GROUP BY` values and the condition is scored per group, with its
//! aggregates computed over the group's rows. The closest group wins; while
//! no row satisfies the predicate the closest row does.
//!
//! A query without a filtering predicate or `HAVING`, with `LIMIT 0`, or
//! whose unrestricted form returns nothing, scores [`INF_DISTANCE`]. Set
//! operations score their closest branch.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqldist_catalog::Schema;
use sqldist_driver::Driver;
use sqldist_ir::{
    Dialect, Expr, Join, JoinCondition, JoinType, Literal, Query, Row, SelectItem,
    SelectStatement, SetOp, TableRef, TableSource, Value,
};
use sqldist_lowering::parse_statement;
use sqldist_semantic::{
    EvaluationContext, QueryColumn, QueryTable, create_evaluation_context, output_columns,
    select_tables,
};

use crate::aggregate;
use crate::config::EngineConfig;
use crate::diagnostics::DiagnosticsSink;
use crate::distance::{Distance, INF_DISTANCE, ZERO_DISTANCE};
use crate::error::EngineResult;
use crate::where_distance::WhereDistanceCalculator;

/// Outcome of [`QueryDistanceCalculator::evaluate`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceReport {
    pub distance: Distance,
    /// Rows scored before the result was known
    pub rows_evaluated: usize,
    /// Whether the evaluation failed; the distance is then infinite
    pub failed: bool,
}

impl DistanceReport {
    fn failure(rows_evaluated: usize) -> Self {
        Self {
            distance: INF_DISTANCE,
            rows_evaluated,
            failed: true,
        }
    }
}

pub struct QueryDistanceCalculator<'a> {
    query: Query,
    driver: &'a mut dyn Driver,
    config: EngineConfig,
    depth: usize,
    rows_evaluated: usize,
}

impl<'a> QueryDistanceCalculator<'a> {
    /// Parses `sql` (a SELECT, DELETE or UPDATE) in the configured dialect
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid or the statement cannot be
    /// lowered.
    pub fn new(sql: &str, driver: &'a mut dyn Driver, config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let lowered = parse_statement(sql, config.dialect)?;
        tracing::debug!(kind = ?lowered.kind, "statement lowered");
        Ok(Self {
            query: lowered.query,
            driver,
            config,
            depth: 0,
            rows_evaluated: 0,
        })
    }

    /// Scores an already lowered query with the default configuration for
    /// its dialect
    pub fn from_query(query: Query, driver: &'a mut dyn Driver) -> Self {
        let config = EngineConfig::new(query.dialect);
        Self {
            query,
            driver,
            config,
            depth: 0,
            rows_evaluated: 0,
        }
    }

    /// Builder method: replace the configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub(crate) fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Rows scored so far
    pub fn rows_evaluated(&self) -> usize {
        self.rows_evaluated
    }

    /// Distance of the query to returning at least one row
    pub fn calculate(&mut self) -> EngineResult<Distance> {
        let schema = self.driver.schema()?;
        let query = self.query.clone();
        self.query_distance(&schema, &query)
    }

    /// Like [`calculate`](Self::calculate), but never fails.
    ///
    /// Errors are logged, dumped to the diagnostics directory when one is
    /// configured, and reported as a failed, infinitely distant result.
    pub fn evaluate(&mut self) -> DistanceReport {
        match self.calculate() {
            Ok(distance) => DistanceReport {
                distance,
                rows_evaluated: self.rows_evaluated,
                failed: false,
            },
            Err(err) => {
                let sql = self.query.to_string();
                tracing::error!(sql = %sql, error = %err, "distance evaluation failed");
                if let Some(dir) = &self.config.diagnostics_dir {
                    let schema = self.driver.schema().ok();
                    DiagnosticsSink::new(dir).dump(
                        schema.as_deref(),
                        &self.driver.cache_snapshot(),
                        &sql,
                        &err,
                    );
                }
                DistanceReport::failure(self.rows_evaluated)
            }
        }
    }

    fn query_distance(&mut self, schema: &Arc<Schema>, query: &Query) -> EngineResult<Distance> {
        if is_limit_zero(query) {
            tracing::debug!("LIMIT 0 never returns rows");
            return Ok(INF_DISTANCE);
        }
        match &query.body {
            SetOp::Select(select) => self.select_distance(schema, select, query.dialect),
            SetOp::Union { left, right, .. }
            | SetOp::Intersect { left, right, .. }
            | SetOp::Except { left, right, .. } => {
                let left = self.query_distance(schema, left)?;
                if left.is_zero() {
                    return Ok(left);
                }
                Ok(left.or(self.query_distance(schema, right)?))
            }
        }
    }

    fn select_distance(
        &mut self,
        schema: &Schema,
        select: &SelectStatement,
        dialect: Dialect,
    ) -> EngineResult<Distance> {
        let unrestricted = unrestricted_query(select, schema, dialect)?;
        if unrestricted.predicate.is_none() && select.having.is_none() {
            tracing::debug!("query has no filtering predicate");
            return Ok(INF_DISTANCE);
        }

        let rows = self.driver.query(&unrestricted.query.to_string())?;
        if rows.is_empty() {
            tracing::debug!("unrestricted query returned no rows");
            return Ok(INF_DISTANCE);
        }

        let tables = select_tables(select);
        let predicate = unrestricted.predicate.as_ref();
        if let Some(having) = &select.having {
            return self.grouped_distance(schema, select, having, predicate, &tables, &rows);
        }

        let mut best = INF_DISTANCE;
        for row in &rows {
            let evaluation = create_evaluation_context(&tables, row);
            best = best.min(self.row_distance(schema, &evaluation, predicate)?);
            if best.is_zero() {
                break;
            }
        }
        Ok(best)
    }

    fn row_distance(
        &mut self,
        schema: &Schema,
        evaluation: &EvaluationContext,
        predicate: Option<&Expr>,
    ) -> EngineResult<Distance> {
        self.rows_evaluated += 1;
        let Some(predicate) = predicate else {
            return Ok(ZERO_DISTANCE);
        };
        let distance = WhereDistanceCalculator::new(schema, evaluation, &mut *self.driver, &self.config)
            .with_depth(self.depth)
            .calculate(predicate)?;
        tracing::debug!(distance = %distance, row = self.rows_evaluated, "row distance");
        Ok(distance)
    }

    fn grouped_distance(
        &mut self,
        schema: &Schema,
        select: &SelectStatement,
        having: &Expr,
        predicate: Option<&Expr>,
        tables: &[QueryTable],
        rows: &[Row],
    ) -> EngineResult<Distance> {
        let mut closest = INF_DISTANCE;
        let mut groups: Vec<(Vec<Value>, Vec<EvaluationContext>)> = Vec::new();
        for row in rows {
            let evaluation = create_evaluation_context(tables, row);
            let distance = self.row_distance(schema, &evaluation, predicate)?;
            if !distance.is_zero() {
                closest = closest.min(distance);
                continue;
            }
            let key = select
                .group_by
                .iter()
                .map(|expr| self.value_of(schema, &evaluation, expr))
                .collect::<EngineResult<Vec<_>>>()?;
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(evaluation),
                None => groups.push((key, vec![evaluation])),
            }
        }
        if groups.is_empty() {
            return Ok(closest);
        }

        tracing::debug!(groups = groups.len(), "scoring HAVING per group");
        let mut best = INF_DISTANCE;
        for (_, members) in &groups {
            best = best.min(self.having_distance(schema, select, having, members)?);
            if best.is_zero() {
                break;
            }
        }
        Ok(best)
    }

    /// Distance of one group to `having`, scored against its first row
    fn having_distance(
        &mut self,
        schema: &Schema,
        select: &SelectStatement,
        having: &Expr,
        members: &[EvaluationContext],
    ) -> EngineResult<Distance> {
        let Some(witness) = members.first() else {
            return Ok(INF_DISTANCE);
        };
        let folded = self.fold_aggregates(schema, select, having, members, true)?;
        tracing::debug!(having = %folded, rows = members.len(), "group condition");
        WhereDistanceCalculator::new(schema, witness, &mut *self.driver, &self.config)
            .with_depth(self.depth)
            .calculate(&folded)
    }

    /// Replaces every aggregate call in `expr` by its value over `members`.
    ///
    /// Unqualified names the rows cannot resolve are looked up among the
    /// output aliases once.
    fn fold_aggregates(
        &mut self,
        schema: &Schema,
        select: &SelectStatement,
        expr: &Expr,
        members: &[EvaluationContext],
        expand_aliases: bool,
    ) -> EngineResult<Expr> {
        match expr {
            Expr::Function {
                name,
                args,
                distinct,
            } if aggregate::is_aggregate(name) => {
                let count_star = aggregate::is_count_star(name, args);
                let values = match args.as_slice() {
                    _ if count_star => vec![Value::Integer(1); members.len()],
                    [arg] => members
                        .iter()
                        .map(|member| self.value_of(schema, member, arg))
                        .collect::<EngineResult<Vec<_>>>()?,
                    _ => return Ok(Expr::Unsupported(expr.to_string())),
                };
                Ok(match aggregate::aggregate(name, *distinct && !count_star, values) {
                    Value::Unsupported(reason) => Expr::Unsupported(reason),
                    value => Expr::Literal(value.to_literal()),
                })
            }
            Expr::Column(column) if expand_aliases && column.table.is_none() => {
                let resolvable = members
                    .first()
                    .is_some_and(|m| m.includes(&QueryColumn::from(column)));
                match output_alias(select, &column.column) {
                    Some(aliased) if !resolvable => {
                        self.fold_aggregates(schema, select, aliased, members, false)
                    }
                    _ => Ok(expr.clone()),
                }
            }
            _ => expr.try_map_children(|child| {
                self.fold_aggregates(schema, select, child, members, expand_aliases)
            }),
        }
    }

    fn value_of(
        &mut self,
        schema: &Schema,
        evaluation: &EvaluationContext,
        expr: &Expr,
    ) -> EngineResult<Value> {
        WhereDistanceCalculator::new(schema, evaluation, &mut *self.driver, &self.config)
            .with_depth(self.depth)
            .value(expr)
    }
}

fn is_limit_zero(query: &Query) -> bool {
    matches!(
        query.limit.as_ref().map(Expr::unparenthesized),
        Some(Expr::Literal(Literal::Integer(0)))
    )
}

/// The expression projected under `alias`, if any
fn output_alias<'q>(select: &'q SelectStatement, alias: &str) -> Option<&'q Expr> {
    select.projection.iter().find_map(|item| match item {
        SelectItem::AliasedExpr { expr, alias: name } if name.eq_ignore_ascii_case(alias) => {
            Some(expr)
        }
        _ => None,
    })
}

/// Scores `sql` end to end, reporting parse failures like any other
pub fn evaluate_sql(sql: &str, driver: &mut dyn Driver, config: EngineConfig) -> DistanceReport {
    let diagnostics_dir = config.diagnostics_dir.clone();
    match QueryDistanceCalculator::new(sql, driver, config) {
        Ok(mut calculator) => calculator.evaluate(),
        Err(err) => {
            tracing::error!(sql, error = %err, "cannot prepare distance evaluation");
            if let Some(dir) = diagnostics_dir {
                DiagnosticsSink::new(dir).dump(None, &Default::default(), sql, &err);
            }
            DistanceReport::failure(0)
        }
    }
}

/// A query fetching every candidate row, plus the predicate that filters them
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UnrestrictedQuery {
    pub query: Query,
    pub predicate: Option<Expr>,
}

pub(crate) fn unrestricted_query(
    select: &SelectStatement,
    schema: &Schema,
    dialect: Dialect,
) -> EngineResult<UnrestrictedQuery> {
    let mut conditions = Vec::new();
    let from: Vec<TableRef> = select
        .from
        .iter()
        .map(|table| release_inner_joins(table, &mut conditions))
        .collect();

    let predicate = conditions
        .into_iter()
        .chain(select.where_clause.clone())
        .reduce(Expr::and);

    let mut projection = Vec::new();
    for table in &from {
        labelled_columns(table, schema, &mut projection)?;
    }
    if projection.is_empty() {
        projection.push(SelectItem::Wildcard);
    }

    let query = Query::select(
        SelectStatement::default()
            .with_projection(projection)
            .with_from(from),
        dialect,
    );
    Ok(UnrestrictedQuery { query, predicate })
}

/// Turns `INNER JOIN ... ON c` into `CROSS JOIN`, collecting `c`
fn release_inner_joins(table: &TableRef, conditions: &mut Vec<Expr>) -> TableRef {
    let joins = table
        .joins
        .iter()
        .map(|join| {
            let inner = release_inner_joins(&join.table, conditions);
            match (&join.join_type, &join.condition) {
                (JoinType::Inner, JoinCondition::On(condition)) => {
                    conditions.push(condition.clone());
                    Join {
                        join_type: JoinType::Cross,
                        table: inner,
                        condition: JoinCondition::None,
                    }
                }
                _ => Join {
                    join_type: join.join_type,
                    table: inner,
                    condition: join.condition.clone(),
                },
            }
        })
        .collect();
    TableRef {
        source: table.source.clone(),
        alias: table.alias.clone(),
        joins,
    }
}

/// Projects every known column of `table` as `"reference.column"`
fn labelled_columns(table: &TableRef, schema: &Schema, out: &mut Vec<SelectItem>) -> EngineResult<()> {
    if let Some(query_table) = QueryTable::from_table_ref(table) {
        let reference = query_table.reference_name();
        let columns = match &table.source {
            TableSource::Named(name) => schema.columns(name)?,
            TableSource::Derived(query) => output_columns(query, schema)?,
        };
        let plain = |c: &String| c.chars().all(|ch| ch.is_alphanumeric() || ch == '_');
        if columns.is_empty() || !columns.iter().all(plain) {
            out.push(SelectItem::QualifiedWildcard(reference.to_string()));
        } else {
            out.extend(columns.iter().map(|column| SelectItem::AliasedExpr {
                expr: Expr::qualified_column(reference, column.as_str()),
                alias: format!("{reference}.{column}"),
            }));
        }
    }
    for join in &table.joins {
        labelled_columns(&join.table, schema, out)?;
    }
    Ok(())
}
