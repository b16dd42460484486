// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mapping from IR dialects to `sqlparser` dialects

use sqlparser::dialect::{
    Dialect as ParserDialect, GenericDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect,
};
use sqldist_ir::Dialect;

/// Returns the parser dialect used to read SQL written for `dialect`
pub fn parser_dialect(dialect: Dialect) -> Box<dyn ParserDialect> {
    match dialect {
        Dialect::SQLite => Box::new(SQLiteDialect {}),
        Dialect::MySQL => Box::new(MySqlDialect {}),
        Dialect::PostgreSQL => Box::new(PostgreSqlDialect {}),
        _ => Box::new(GenericDialect {}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlparser::parser::Parser;

    #[test]
    fn test_every_dialect_parses_simple_select() {
        for dialect in [
            Dialect::Generic,
            Dialect::SQLite,
            Dialect::MySQL,
            Dialect::PostgreSQL,
        ] {
            let parser = parser_dialect(dialect);
            let statements = Parser::parse_sql(parser.as_ref(), "SELECT a FROM t WHERE a = 1");
            assert!(statements.is_ok(), "{} failed", dialect);
        }
    }
}
