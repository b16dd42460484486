// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Dialect Support
//!
//! The dialect selects the parser grammar used to read SQL text and the
//! default schema assumed for unqualified table names.
//!
//! - **Generic**: ANSI-leaning grammar, accepts most common syntax
//! - **SQLite**: the embedded backend used by the bundled driver
//! - **MySQL**: backtick identifiers, `LIMIT offset, count`
//! - **PostgreSQL**: `ILIKE`, dollar-quoted strings, `public` schema

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Dialect {
    #[default]
    Generic,
    #[serde(alias = "sqlite3")]
    SQLite,
    MySQL,
    #[serde(alias = "postgres")]
    PostgreSQL,
}

impl Dialect {
    /// Schema name an unqualified table is assumed to live in
    pub fn default_schema(&self) -> &'static str {
        match self {
            Dialect::SQLite => "main",
            Dialect::Generic | Dialect::MySQL | Dialect::PostgreSQL => "public",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Generic => "generic",
            Dialect::SQLite => "sqlite",
            Dialect::MySQL => "mysql",
            Dialect::PostgreSQL => "postgresql",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generic" | "ansi" => Ok(Dialect::Generic),
            "sqlite" | "sqlite3" => Ok(Dialect::SQLite),
            "mysql" => Ok(Dialect::MySQL),
            "postgresql" | "postgres" => Ok(Dialect::PostgreSQL),
            other => Err(format!("unknown dialect '{other}'")),
        }
    }
}
