// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # WHERE distance
//!
//! Computes how far one row is from satisfying a predicate.
//!
//! The calculator walks the predicate tree directly. `NOT` is never
//! evaluated as such: it is pushed down to the leaves, flipping comparison
//! operators, applying De Morgan's laws to `AND`/`OR` and toggling the
//! negation flag of `IN`, `LIKE`, `BETWEEN`, `IS` and `EXISTS`.
//!
//! Subqueries are contextualized against the row and run through the
//! driver. An `EXISTS` that returns nothing is scored by a nested
//! [`QueryDistanceCalculator`] over the contextualized subquery.
//!
//! Anything the calculator cannot score (unsupported expressions, values of
//! unsupported types, NULL operands) yields [`INF_DISTANCE`] for that branch;
//! the rest of the predicate is still evaluated.

use regex::RegexBuilder;
use sqldist_catalog::Schema;
use sqldist_driver::{Driver, DriverError};
use sqldist_ir::{BinaryOp, Dialect, Expr, Quantifier, Query, Row, UnaryOp, Value};
use sqldist_semantic::{EvaluationContext, QueryColumn};

use crate::branch;
use crate::config::EngineConfig;
use crate::contextualizer::SubQueryContextualizer;
use crate::distance::{Distance, INF_DISTANCE, ZERO_DISTANCE};
use crate::error::{EngineError, EngineResult};
use crate::eval;
use crate::query_distance::QueryDistanceCalculator;

/// Distance of a single row to a predicate
pub struct WhereDistanceCalculator<'a> {
    schema: &'a Schema,
    evaluation: &'a EvaluationContext,
    driver: &'a mut dyn Driver,
    config: &'a EngineConfig,
    depth: usize,
}

impl<'a> WhereDistanceCalculator<'a> {
    pub fn new(
        schema: &'a Schema,
        evaluation: &'a EvaluationContext,
        driver: &'a mut dyn Driver,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            schema,
            evaluation,
            driver,
            config,
            depth: 0,
        }
    }

    /// Builder method: nesting level of the query being evaluated
    pub(crate) fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Distance of the row to `predicate`; zero iff the row satisfies it
    pub fn calculate(&mut self, predicate: &Expr) -> EngineResult<Distance> {
        self.predicate(predicate, false)
    }

    fn predicate(&mut self, expr: &Expr, negated: bool) -> EngineResult<Distance> {
        match expr {
            Expr::Paren(inner) => self.predicate(inner, negated),
            Expr::UnaryOp {
                op: UnaryOp::Not,
                expr,
            } => self.predicate(expr, !negated),
            Expr::BinaryOp {
                left,
                op: op @ (BinaryOp::And | BinaryOp::Or),
                right,
            } => {
                // De Morgan
                let conjunction = (*op == BinaryOp::And) != negated;
                let left = self.predicate(left, negated)?;
                if conjunction {
                    if left.is_infinite() {
                        return Ok(INF_DISTANCE);
                    }
                    Ok(left.and(self.predicate(right, negated)?))
                } else {
                    if left.is_zero() {
                        return Ok(ZERO_DISTANCE);
                    }
                    Ok(left.or(self.predicate(right, negated)?))
                }
            }
            Expr::BinaryOp { left, op, right } if op.is_comparison() => {
                let op = if negated { op.negated().unwrap_or(*op) } else { *op };
                let left = self.value(left)?;
                let right = self.value(right)?;
                Ok(comparison(op, &left, &right))
            }
            Expr::InList {
                expr,
                list,
                negated: not_in,
            } => {
                let value = self.value(expr)?;
                let candidates = list
                    .iter()
                    .map(|item| self.value(item))
                    .collect::<EngineResult<Vec<_>>>()?;
                Ok(membership(&value, &candidates, *not_in != negated))
            }
            Expr::InSubquery {
                expr,
                subquery,
                negated: not_in,
            } => {
                let value = self.value(expr)?;
                let candidates = flatten(self.run_subquery(subquery)?);
                Ok(membership(&value, &candidates, *not_in != negated))
            }
            Expr::Between {
                expr,
                low,
                high,
                negated: not_between,
            } => {
                let value = self.value(expr)?;
                let low = self.value(low)?;
                let high = self.value(high)?;
                if *not_between != negated {
                    Ok(comparison(BinaryOp::Lt, &value, &low).or(comparison(
                        BinaryOp::Gt,
                        &value,
                        &high,
                    )))
                } else {
                    Ok(comparison(BinaryOp::GtEq, &value, &low).and(comparison(
                        BinaryOp::LtEq,
                        &value,
                        &high,
                    )))
                }
            }
            Expr::Like {
                expr,
                pattern,
                negated: not_like,
                case_insensitive,
            } => {
                let value = self.value(expr)?;
                let pattern = self.value(pattern)?;
                let case_insensitive =
                    *case_insensitive || matches!(self.config.dialect, Dialect::SQLite | Dialect::MySQL);
                Ok(like(&value, &pattern, case_insensitive, *not_like != negated))
            }
            Expr::IsNull {
                expr,
                negated: is_not,
            } => {
                let value = self.value(expr)?;
                if let Value::Unsupported(reason) = &value {
                    return Ok(evaluation_gap(reason));
                }
                Ok(Distance::from_bool(value.is_null() != (*is_not != negated)))
            }
            Expr::IsBool {
                expr,
                value: expected,
                negated: is_not,
            } => {
                let value = self.value(expr)?;
                if let Value::Unsupported(reason) = &value {
                    return Ok(evaluation_gap(reason));
                }
                let is = value.truthiness() == Some(*expected);
                Ok(Distance::from_bool(is != (*is_not != negated)))
            }
            Expr::Exists {
                subquery,
                negated: not_exists,
            } => self.exists(subquery, *not_exists != negated),
            Expr::Quantified {
                left,
                op,
                quantifier,
                subquery,
            } => {
                // NOT (x op ANY s) is x !op ALL s
                let (op, quantifier) = if negated {
                    let flipped = match quantifier {
                        Quantifier::Any => Quantifier::All,
                        Quantifier::All => Quantifier::Any,
                    };
                    (op.negated().unwrap_or(*op), flipped)
                } else {
                    (*op, *quantifier)
                };
                let value = self.value(left)?;
                let candidates = flatten(self.run_subquery(subquery)?);
                let distances = candidates.iter().map(|c| comparison(op, &value, c));
                Ok(match quantifier {
                    Quantifier::Any => distances.min().unwrap_or(INF_DISTANCE),
                    Quantifier::All => distances.fold(ZERO_DISTANCE, Distance::and),
                })
            }
            Expr::Unsupported(text) => Ok(evaluation_gap(text)),
            _ => {
                let value = self.value(expr)?;
                Ok(truth(&value, negated))
            }
        }
    }

    fn exists(&mut self, subquery: &Query, negated: bool) -> EngineResult<Distance> {
        let contextualized =
            SubQueryContextualizer::new(self.schema, self.evaluation).contextualize_query(subquery)?;
        let rows = self.query(&contextualized.to_string())?;

        if negated {
            return Ok(Distance::new(rows.len() as f64));
        }
        if !rows.is_empty() {
            return Ok(ZERO_DISTANCE);
        }
        if self.depth >= self.config.max_subquery_depth {
            tracing::warn!(depth = self.depth, "subquery nesting too deep, not evaluated");
            return Ok(INF_DISTANCE);
        }

        QueryDistanceCalculator::from_query(contextualized, &mut *self.driver)
            .with_config(self.config.clone())
            .with_depth(self.depth + 1)
            .calculate()
    }

    fn run_subquery(&mut self, subquery: &Query) -> EngineResult<Vec<Row>> {
        let sql = SubQueryContextualizer::new(self.schema, self.evaluation).contextualize(subquery)?;
        Ok(self.query(&sql)?)
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Row>, DriverError> {
        self.driver.query(sql)
    }

    /// Value of an expression for the current row
    pub(crate) fn value(&mut self, expr: &Expr) -> EngineResult<Value> {
        Ok(match expr {
            Expr::Column(column) => {
                let query_column = QueryColumn::from(column);
                if self.evaluation.includes(&query_column) {
                    self.evaluation.get_value(&query_column)?.clone()
                } else if column.is_boolean_keyword() {
                    Value::Boolean(column.column.eq_ignore_ascii_case("true"))
                } else {
                    return Err(EngineError::UnresolvedColumn(query_column.qualified()));
                }
            }
            Expr::Literal(literal) => Value::from(literal),
            Expr::Paren(inner) => self.value(inner)?,
            Expr::BinaryOp { left, op, right } if op.is_arithmetic() => {
                let left = self.value(left)?;
                let right = self.value(right)?;
                eval::arithmetic(*op, &left, &right)
            }
            Expr::BinaryOp {
                left,
                op: BinaryOp::Concat,
                right,
            } => {
                let left = self.value(left)?;
                let right = self.value(right)?;
                eval::concat(&left, &right)
            }
            Expr::UnaryOp {
                op: UnaryOp::Neg,
                expr,
            } => eval::negate(&self.value(expr)?),
            Expr::Function { name, args, .. } => {
                let args = args
                    .iter()
                    .map(|arg| self.value(arg))
                    .collect::<EngineResult<Vec<_>>>()?;
                eval::call_function(name, &args)
            }
            Expr::Cast { expr, type_name } => eval::cast(self.value(expr)?, type_name),
            Expr::Subquery(query) => self
                .run_subquery(query)?
                .first()
                .and_then(Row::first_value)
                .cloned()
                .unwrap_or(Value::Null),
            Expr::Unsupported(text) => eval::gap(text.as_str()),
            // Predicates in value position evaluate to whether they hold
            _ => Value::Boolean(self.predicate(expr, false)?.is_zero()),
        })
    }
}

fn evaluation_gap(reason: &str) -> Distance {
    tracing::warn!(reason, "cannot evaluate branch, treating as unreachable");
    INF_DISTANCE
}

fn flatten(rows: Vec<Row>) -> Vec<Value> {
    rows.iter().flat_map(|row| row.values().cloned()).collect()
}

/// Distance for `l op r` over runtime values
fn comparison(op: BinaryOp, l: &Value, r: &Value) -> Distance {
    let raw = match (l, r) {
        (Value::Unsupported(reason), _) | (_, Value::Unsupported(reason)) => {
            return evaluation_gap(reason);
        }
        (Value::Null, _) | (_, Value::Null) => return INF_DISTANCE,
        (Value::Integer(a), Value::Integer(b)) => branch::integer_comparison(op, *a, *b),
        (Value::Text(a), Value::Text(b)) => branch::string_comparison(op, a, b),
        (Value::Boolean(a), Value::Boolean(b)) => branch::boolean_comparison(op, *a, *b),
        _ => match (l.as_f64(), r.as_f64()) {
            (Some(x), Some(y)) => branch::numeric_comparison(op, x, y),
            // Non-numeric text against a number compares as text
            _ => match (eval::text_form(l), eval::text_form(r)) {
                (Some(a), Some(b)) => branch::string_comparison(op, &a, &b),
                _ => None,
            },
        },
    };
    match raw {
        Some(raw) => Distance::new(raw),
        None => evaluation_gap(&format!("{} {} {}", l.type_name(), op, r.type_name())),
    }
}

/// `IN` is the closest candidate; `NOT IN` must differ from all of them
fn membership(value: &Value, candidates: &[Value], negated: bool) -> Distance {
    if negated {
        if candidates.iter().any(Value::is_null) {
            return INF_DISTANCE;
        }
        candidates
            .iter()
            .map(|c| comparison(BinaryOp::NotEq, value, c))
            .fold(ZERO_DISTANCE, Distance::and)
    } else {
        candidates
            .iter()
            .map(|c| comparison(BinaryOp::Eq, value, c))
            .min()
            .unwrap_or(INF_DISTANCE)
    }
}

/// Bare value used as a predicate
fn truth(value: &Value, negated: bool) -> Distance {
    match value {
        Value::Unsupported(reason) => evaluation_gap(reason),
        other => match other.truthiness() {
            Some(holds) => Distance::from_bool(holds != negated),
            None => INF_DISTANCE,
        },
    }
}

fn like(value: &Value, pattern: &Value, case_insensitive: bool, negated: bool) -> Distance {
    if let Value::Unsupported(reason) = value {
        return evaluation_gap(reason);
    }
    if let Value::Unsupported(reason) = pattern {
        return evaluation_gap(reason);
    }
    let (Some(text), Some(pattern)) = (eval::text_form(value), eval::text_form(pattern)) else {
        return INF_DISTANCE;
    };

    let matched = match like_regex(&pattern, case_insensitive) {
        Ok(regex) => regex.is_match(&text),
        Err(err) => return evaluation_gap(&err.to_string()),
    };

    if negated {
        return Distance::from_bool(!matched);
    }
    if matched {
        return ZERO_DISTANCE;
    }

    let mut prefix: String = pattern.chars().take_while(|c| *c != '%' && *c != '_').collect();
    let mut head: String = text.chars().take(prefix.chars().count()).collect();
    if case_insensitive {
        prefix = prefix.to_lowercase();
        head = head.to_lowercase();
    }
    Distance::new(branch::add_distances(
        1.0,
        branch::left_alignment_distance(&prefix, &head),
    ))
}

/// Translates a LIKE pattern: `%` is any run, `_` any single character
fn like_regex(pattern: &str, case_insensitive: bool) -> Result<regex::Regex, regex::Error> {
    let mut source = String::with_capacity(pattern.len() + 8);
    source.push('^');
    for c in pattern.chars() {
        match c {
            '%' => source.push_str(".*"),
            '_' => source.push('.'),
            other => source.push_str(&regex::escape(&other.to_string())),
        }
    }
    source.push('$');
    RegexBuilder::new(&source)
        .dot_matches_new_line(true)
        .case_insensitive(case_insensitive)
        .build()
}
