//! Output sink traits and errors

use crate::dataset::Row;
use crate::output::stats::CrawlReport;
use thiserror::Error;

/// Errors that can occur while writing results
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A destination for the assembled dataset
///
/// Sinks receive the full, ordered column list; a row lacking a column is
/// written with an empty value.
pub trait RowSink {
    /// Writes every row
    ///
    /// # Arguments
    ///
    /// * `columns` - Column order, as produced by `order_columns`
    /// * `rows` - Rows in crawl order
    /// * `report` - Counters of the run that produced the rows
    fn write_rows(&mut self, columns: &[String], rows: &[Row], report: &CrawlReport) -> OutputResult<()>;

    /// Human-readable destination, for log lines
    fn destination(&self) -> String;
}
