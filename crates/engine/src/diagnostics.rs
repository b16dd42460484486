// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Diagnostics dumps for failed evaluations
//!
//! Each dump is one pretty-printed JSON file holding the statement, the
//! error, the schema and the driver's query cache, enough to replay the
//! failure offline.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use sqldist_catalog::Schema;
use sqldist_ir::Row;

static DUMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Serialize)]
struct DiagnosticsDump<'a> {
    sql: &'a str,
    error: String,
    schema: Option<&'a Schema>,
    cache: &'a BTreeMap<String, Vec<Row>>,
}

/// Writes diagnostics dumps into a directory
#[derive(Debug, Clone)]
pub struct DiagnosticsSink {
    dir: PathBuf,
}

impl DiagnosticsSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes one dump and returns its path.
    ///
    /// Failing to write is logged and otherwise ignored.
    pub fn dump(
        &self,
        schema: Option<&Schema>,
        cache: &BTreeMap<String, Vec<Row>>,
        sql: &str,
        error: &dyn std::error::Error,
    ) -> Option<PathBuf> {
        let dump = DiagnosticsDump {
            sql,
            error: error.to_string(),
            schema,
            cache,
        };
        let path = self.dir.join(file_name());
        match self.write(&path, &dump) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "diagnostics written");
                Some(path)
            }
            Err(err) => {
                tracing::warn!(dir = %self.dir.display(), error = %err, "cannot write diagnostics");
                None
            }
        }
    }

    fn write(&self, path: &Path, dump: &DiagnosticsDump<'_>) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(dump).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

fn file_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let seq = DUMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("distance-failure-{millis}-{seq}.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqldist_ir::Value;

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn test_dump_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DiagnosticsSink::new(dir.path().join("dumps"));
        let schema = Schema::from_table_columns(vec![("t", vec!["a"])]);
        let mut cache = BTreeMap::new();
        cache.insert(
            "SELECT a FROM t".to_string(),
            vec![Row::new().with_value("t", "a", Value::Integer(1))],
        );

        let path = sink
            .dump(Some(&schema), &cache, "SELECT * FROM t WHERE a = 2", &Boom)
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["sql"], "SELECT * FROM t WHERE a = 2");
        assert_eq!(json["error"], "boom");
        assert!(json["cache"]["SELECT a FROM t"].is_array());
    }

    #[test]
    fn test_dump_failure_is_not_fatal() {
        let file = tempfile::NamedTempFile::new().unwrap();
        // A regular file cannot hold the dump directory
        let sink = DiagnosticsSink::new(file.path().join("nested"));
        assert!(sink.dump(None, &BTreeMap::new(), "SELECT 1", &Boom).is_none());
    }

    #[test]
    fn test_file_names_are_unique() {
        assert_ne!(file_name(), file_name());
    }
}
