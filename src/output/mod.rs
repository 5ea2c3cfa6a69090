//! Output module for exporting the dataset and reporting on the run
//!
//! This module handles:
//! - Ordering dataset columns
//! - Exporting rows to CSV, XLSX and SQLite through the `RowSink` trait
//! - Printing the run report

mod columns;
mod csv_output;
mod sqlite_output;
pub mod stats;
mod traits;
mod xlsx_output;

pub use columns::{order_columns, PREFERRED_COLUMNS};
pub use csv_output::{write_csv, CsvSink};
pub use sqlite_output::{SqliteSink, SCHEMA_SQL};
pub use stats::{print_report, CrawlReport};
pub use traits::{OutputError, OutputResult, RowSink};
pub use xlsx_output::{XlsxSink, MAX_CELL_CHARS};

use crate::dataset::Row;

/// Orders the columns once and hands the rows to every sink
///
/// Stops at the first sink that fails.
pub fn export(sinks: &mut [Box<dyn RowSink>], rows: &[Row], report: &CrawlReport) -> OutputResult<Vec<String>> {
    let columns = order_columns(rows);
    for sink in sinks.iter_mut() {
        sink.write_rows(&columns, rows, report)?;
        tracing::info!("Wrote {} rows to {}", rows.len(), sink.destination());
    }
    Ok(columns)
}
