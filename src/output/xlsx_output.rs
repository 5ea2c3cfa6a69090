//! Excel export

use crate::dataset::Row;
use crate::output::stats::CrawlReport;
use crate::output::traits::{OutputResult, RowSink};
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

/// Longest text a single worksheet cell accepts
pub const MAX_CELL_CHARS: usize = 32_767;

const SHEET_NAME: &str = "listings";

/// Writes rows to a single-sheet workbook, replacing it
#[derive(Debug, Clone)]
pub struct XlsxSink {
    path: PathBuf,
}

impl XlsxSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RowSink for XlsxSink {
    fn write_rows(&mut self, columns: &[String], rows: &[Row], _report: &CrawlReport) -> OutputResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (col, name) in columns.iter().enumerate() {
            sheet.write_string_with_format(0, cell_col(col), name, &header)?;
        }

        for (index, row) in rows.iter().enumerate() {
            let line = cell_row(index + 1);
            for (col, name) in columns.iter().enumerate() {
                if let Some(value) = row.get(name) {
                    sheet.write_string(line, cell_col(col), fit_cell(value))?;
                }
            }
        }

        workbook.save(&self.path)?;
        Ok(())
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}

// Out-of-range indices saturate and are rejected by the worksheet limit check.
fn cell_row(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

fn cell_col(index: usize) -> u16 {
    u16::try_from(index).unwrap_or(u16::MAX)
}

/// Cuts `value` to the cell limit on a char boundary
fn fit_cell(value: &str) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_cell() {
        assert_eq!(fit_cell("Əlaqə"), "Əlaqə");

        let long = "ə".repeat(MAX_CELL_CHARS + 10);
        let fitted = fit_cell(&long);
        assert_eq!(fitted.chars().count(), MAX_CELL_CHARS);
    }

    #[test]
    fn test_sink_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.xlsx");

        let mut first = Row::new();
        first.set("Title", "Acme");
        first.set("Segment", "FinTech");
        let mut second = Row::new();
        second.set("Title", "Əlaqə");
        let columns = vec!["Title".to_string(), "Segment".to_string()];

        let mut sink = XlsxSink::new(&path);
        sink.write_rows(&columns, &[first, second], &CrawlReport::new()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        // xlsx files are zip archives
        assert!(bytes.starts_with(b"PK\x03\x04"));
        assert_eq!(sink.destination(), path.display().to_string());
    }

    #[test]
    fn test_sink_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        std::fs::write(&path, b"stale").unwrap();

        let mut sink = XlsxSink::new(&path);
        sink.write_rows(&["Title".to_string()], &[], &CrawlReport::new()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
