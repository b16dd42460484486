// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Statement dispatch
//!
//! DELETE and UPDATE are evaluated through the rows they would touch, so
//! both are rewritten to `SELECT * FROM <target> WHERE <selection>`.

use serde::{Deserialize, Serialize};
use sqlparser::ast::{FromTable, Statement, TableWithJoins};
use sqldist_ir::{Query, SelectItem, SelectStatement};

use crate::context::LoweringContext;
use crate::error::{LoweringError, LoweringResult};
use crate::expr::lower_expr;
use crate::query::{lower_query, lower_table_with_joins};

/// Kind of statement a lowered query came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    Select,
    Delete,
    Update,
}

pub(crate) fn lower_statement(
    ctx: &mut LoweringContext,
    statement: &Statement,
) -> LoweringResult<(StatementKind, Query)> {
    match statement {
        Statement::Query(query) => Ok((StatementKind::Select, lower_query(ctx, query)?)),
        Statement::Delete(delete) => {
            let tables = match &delete.from {
                FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => tables,
            };
            let query = select_all(ctx, tables, delete.selection.as_ref())?;
            Ok((StatementKind::Delete, query))
        }
        Statement::Update {
            table, selection, ..
        } => {
            let query = select_all(ctx, std::slice::from_ref(table), selection.as_ref())?;
            Ok((StatementKind::Update, query))
        }
        other => Err(LoweringError::UnsupportedStatement {
            statement: statement_keyword(other),
        }),
    }
}

fn select_all(
    ctx: &mut LoweringContext,
    tables: &[TableWithJoins],
    selection: Option<&sqlparser::ast::Expr>,
) -> LoweringResult<Query> {
    let mut from = Vec::with_capacity(tables.len());
    for table in tables {
        from.push(lower_table_with_joins(ctx, table)?);
    }
    let mut select = SelectStatement::default()
        .with_projection(vec![SelectItem::Wildcard])
        .with_from(from);
    if let Some(selection) = selection {
        select = select.with_where(lower_expr(ctx, selection)?);
    }
    Ok(Query::select(select, ctx.dialect()))
}

fn statement_keyword(statement: &Statement) -> String {
    statement
        .to_string()
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_uppercase()
}
