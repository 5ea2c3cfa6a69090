//! CSV export
//!
//! Files start with a UTF-8 byte order mark so spreadsheet tools pick the
//! right encoding for non-ASCII labels and values.

use crate::dataset::Row;
use crate::output::stats::CrawlReport;
use crate::output::traits::{OutputResult, RowSink};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes rows to a CSV file, replacing it
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RowSink for CsvSink {
    fn write_rows(&mut self, columns: &[String], rows: &[Row], _report: &CrawlReport) -> OutputResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        write_csv(BufWriter::new(file), columns, rows)
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}

/// Writes a BOM, the header and one record per row to `writer`
pub fn write_csv<W: Write>(mut writer: W, columns: &[String], rows: &[Row]) -> OutputResult<()> {
    writer.write_all(UTF8_BOM)?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(columns)?;
    for row in rows {
        csv_writer.write_record(columns.iter().map(|c| row.get(c).unwrap_or("")))?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Row> {
        let mut first = Row::new();
        first.set("Title", "Acme, Inc.");
        first.set("Segment", "Fin\"Tech\"");
        let mut second = Row::new();
        second.set("Title", "Əlaqə");
        vec![first, second]
    }

    fn columns() -> Vec<String> {
        vec!["Title".to_string(), "Segment".to_string()]
    }

    #[test]
    fn test_write_csv_with_bom() {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &columns(), &rows()).unwrap();

        assert!(buffer.starts_with(UTF8_BOM));
        let text = String::from_utf8(buffer[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(
            text,
            "Title,Segment\n\"Acme, Inc.\",\"Fin\"\"Tech\"\"\"\nƏlaqə,\n"
        );
    }

    #[test]
    fn test_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let mut sink = CsvSink::new(&path);
        sink.write_rows(&columns(), &rows(), &CrawlReport::new()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let mut reader = csv::Reader::from_reader(&bytes[UTF8_BOM.len()..]);
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[1][0], "Əlaqə");
        assert_eq!(sink.destination(), path.display().to_string());
    }
}
