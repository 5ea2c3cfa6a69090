//! SQLite export
//!
//! Each export is one row in `runs`; cell values go to `row_values` keyed by
//! run, row index and column, and `run_columns` keeps the column order.

use crate::dataset::Row;
use crate::output::stats::CrawlReport;
use crate::output::traits::{OutputResult, RowSink};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// SQL schema for the export database
pub const SCHEMA_SQL: &str = r#"
-- One entry per harvest run
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT,
    finished_at TEXT,
    exported_at TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    stop_reason TEXT,
    listing_pages INTEGER NOT NULL,
    details_fetched INTEGER NOT NULL,
    row_count INTEGER NOT NULL
);

-- Column order of each run
CREATE TABLE IF NOT EXISTS run_columns (
    run_id INTEGER NOT NULL REFERENCES runs(id),
    position INTEGER NOT NULL,
    column_name TEXT NOT NULL,
    PRIMARY KEY (run_id, position)
);

-- Cell values; absent cells have no entry
CREATE TABLE IF NOT EXISTS row_values (
    run_id INTEGER NOT NULL REFERENCES runs(id),
    row_index INTEGER NOT NULL,
    column_name TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (run_id, row_index, column_name)
);

CREATE INDEX IF NOT EXISTS idx_row_values_column ON row_values(column_name);
"#;

/// Appends a run's rows to a SQLite database
#[derive(Debug, Clone)]
pub struct SqliteSink {
    path: PathBuf,
    config_hash: String,
    last_run_id: Option<i64>,
}

impl SqliteSink {
    pub fn new(path: impl AsRef<Path>, config_hash: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            config_hash: config_hash.into(),
            last_run_id: None,
        }
    }

    /// Id of the run written by the last `write_rows` call
    pub fn last_run_id(&self) -> Option<i64> {
        self.last_run_id
    }

    fn open(&self) -> OutputResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(conn)
    }
}

impl RowSink for SqliteSink {
    fn write_rows(&mut self, columns: &[String], rows: &[Row], report: &CrawlReport) -> OutputResult<()> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO runs (started_at, finished_at, exported_at, config_hash, stop_reason,
                               listing_pages, details_fetched, row_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                report.started_at.map(|t| t.to_rfc3339()),
                report.finished_at.map(|t| t.to_rfc3339()),
                Utc::now().to_rfc3339(),
                self.config_hash,
                report.stop_reason.map(|r| r.to_string()),
                report.listing_pages_crawled as i64,
                report.details_fetched as i64,
                rows.len() as i64,
            ],
        )?;
        let run_id = tx.last_insert_rowid();

        {
            let mut insert_column = tx.prepare(
                "INSERT INTO run_columns (run_id, position, column_name) VALUES (?1, ?2, ?3)",
            )?;
            for (position, column) in columns.iter().enumerate() {
                insert_column.execute(params![run_id, position as i64, column])?;
            }

            let mut insert_value = tx.prepare(
                "INSERT INTO row_values (run_id, row_index, column_name, value) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (index, row) in rows.iter().enumerate() {
                for (column, value) in row.iter() {
                    insert_value.execute(params![run_id, index as i64, column, value])?;
                }
            }
        }

        tx.commit()?;
        self.last_run_id = Some(run_id);
        tracing::debug!("Stored run {} with {} rows in {}", run_id, rows.len(), self.path.display());
        Ok(())
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}
