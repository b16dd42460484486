// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! `sqldist`: scores how close a SQLite database comes to satisfying a query
//!
//! ```text
//! sqldist [--config FILE] [--dialect NAME] [--schema FILE] [--json] <DB_PATH> <SQL>
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use sqldist_catalog::{Schema, StaticCatalog};
use sqldist_driver::{SqlDriver, SqliteConnection};
use sqldist_engine::{DistanceReport, EngineConfig, evaluate_sql};
use sqldist_ir::Dialect;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const USAGE: &str =
    "usage: sqldist [--config FILE] [--dialect NAME] [--schema FILE] [--json] <DB_PATH> <SQL>";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    dialect: Option<String>,
    schema: Option<PathBuf>,
    json: bool,
    show_help: bool,
    db_path: Option<PathBuf>,
    sql: Option<String>,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let options = parse_args(std::env::args_os())?;
    if options.show_help {
        println!("{USAGE}");
        return Ok(());
    }

    let report = run(&options)?;
    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render_report(&report));
    }
    if report.failed {
        std::process::exit(1);
    }
    Ok(())
}

fn parse_args<I>(args: I) -> Result<CliOptions>
where
    I: IntoIterator<Item = OsString>,
{
    let mut iter = args.into_iter();
    let _argv0 = iter.next();
    let mut options = CliOptions::default();

    while let Some(argument) = iter.next() {
        let arg = argument.to_string_lossy().into_owned();
        match arg.as_str() {
            "-h" | "--help" => options.show_help = true,
            "--json" => options.json = true,
            "--config" => {
                let value = iter.next().context("missing file argument for `--config`")?;
                options.config = Some(PathBuf::from(value));
            }
            "--schema" => {
                let value = iter.next().context("missing file argument for `--schema`")?;
                options.schema = Some(PathBuf::from(value));
            }
            "--dialect" => {
                let value = iter.next().context("missing name argument for `--dialect`")?;
                options.dialect = Some(value.to_string_lossy().into_owned());
            }
            _ if arg.starts_with('-') => bail!("unknown option `{arg}`"),
            _ if options.db_path.is_none() => options.db_path = Some(PathBuf::from(arg)),
            _ if options.sql.is_none() => options.sql = Some(arg),
            _ => bail!("too many positional arguments; expected a DB path and one SQL statement"),
        }
    }

    if !options.show_help && (options.db_path.is_none() || options.sql.is_none()) {
        bail!("expected a DB path and a SQL statement\n{USAGE}");
    }
    Ok(options)
}

/// Configuration from `--config`, with `--dialect` taking precedence
fn load_config(options: &CliOptions) -> Result<EngineConfig> {
    let mut config = match &options.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(name) = &options.dialect {
        config.dialect = name.parse::<Dialect>().map_err(anyhow::Error::msg)?;
    }
    config.validate()?;
    Ok(config)
}

fn run(options: &CliOptions) -> Result<DistanceReport> {
    let config = load_config(options)?;
    let (Some(db_path), Some(sql)) = (&options.db_path, &options.sql) else {
        bail!("expected a DB path and a SQL statement");
    };

    let connection = SqliteConnection::open(db_path)?;
    let mut driver = SqlDriver::new(connection).with_cache(config.cache_queries);
    if let Some(path) = &options.schema {
        let catalog = StaticCatalog::from_file(path)?;
        driver = driver.with_schema(Schema::from_catalog(&catalog)?);
    }
    tracing::info!(db = %db_path.display(), dialect = %config.dialect, "evaluating query distance");

    Ok(evaluate_sql(sql, &mut driver, config))
}

fn render_report(report: &DistanceReport) -> String {
    let status = if report.failed { " (evaluation failed)" } else { "" };
    let raw = if report.distance.is_infinite() {
        "inf".to_string()
    } else {
        report.distance.raw().to_string()
    };
    format!(
        "distance {:.6} (raw {raw}, rows evaluated {}){status}",
        report.distance.value(),
        report.rows_evaluated
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        std::iter::once("sqldist")
            .chain(list.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn test_parse_positional_and_options() {
        let options = parse_args(args(&[
            "--dialect",
            "postgres",
            "--json",
            "shop.db",
            "SELECT * FROM t WHERE a = 1",
        ]))
        .unwrap();
        assert_eq!(options.dialect.as_deref(), Some("postgres"));
        assert!(options.json);
        assert_eq!(options.db_path, Some(PathBuf::from("shop.db")));
        assert_eq!(options.sql.as_deref(), Some("SELECT * FROM t WHERE a = 1"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(args(&["--bogus"])).is_err());
        assert!(parse_args(args(&["only.db"])).is_err());
        assert!(parse_args(args(&["a.db", "SELECT 1", "extra"])).is_err());
        assert!(parse_args(args(&["--config"])).is_err());
        assert!(parse_args(args(&["--help"])).unwrap().show_help);
    }

    #[test]
    fn test_dialect_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.yaml");
        std::fs::write(&path, "dialect: mysql\nmax_subquery_depth: 3\n").unwrap();

        let mut options = CliOptions {
            config: Some(path),
            ..Default::default()
        };
        let config = load_config(&options).unwrap();
        assert_eq!(config.dialect, Dialect::MySQL);
        assert_eq!(config.max_subquery_depth, 3);

        options.dialect = Some("sqlite".to_string());
        assert_eq!(load_config(&options).unwrap().dialect, Dialect::SQLite);

        options.dialect = Some("oracle".to_string());
        assert!(load_config(&options).is_err());
    }

    #[test]
    fn test_schema_file_replaces_extracted_schema() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("t.db");
        let setup = SqliteConnection::open(&db_path).unwrap();
        sqldist_driver::Connection::execute(&setup, "CREATE TABLE t (a INTEGER, b INTEGER); INSERT INTO t VALUES (1, 2);")
            .unwrap();
        drop(setup);
        // Only column a is known, so b cannot be resolved
        let schema_path = dir.path().join("schema.yaml");
        std::fs::write(
            &schema_path,
            "tables:\n  - name: t\n    columns:\n      - { name: a, data_type: Integer }\n",
        )
        .unwrap();

        let options = CliOptions {
            db_path: Some(db_path),
            schema: Some(schema_path),
            sql: Some("SELECT * FROM t WHERE b = 5".to_string()),
            ..Default::default()
        };
        assert!(run(&options).unwrap().failed);
    }

    #[test]
    fn test_run_against_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("t.db");
        let setup = SqliteConnection::open(&db_path).unwrap();
        sqldist_driver::Connection::execute(
            &setup,
            "CREATE TABLE t (a INTEGER); INSERT INTO t VALUES (1), (5), (10);",
        )
        .unwrap();
        drop(setup);

        let options = CliOptions {
            db_path: Some(db_path),
            sql: Some("SELECT * FROM t WHERE a = 7".to_string()),
            ..Default::default()
        };
        let report = run(&options).unwrap();
        assert!(!report.failed);
        assert_eq!(report.distance.raw(), 2.0);
        assert!(render_report(&report).starts_with("distance 0.666667"));
    }
}
