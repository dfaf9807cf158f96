//! CSV export for summary tables and the hourly matrix.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use crate::aggregate::SummaryRow;
use crate::disaggregate::HourlyMatrix;

/// Column header for annual summary tables.
const SUMMARY_HEADER: [&str; 4] = ["LABEL", "YEAR", "VALUE", "COLOR"];

/// Writes summary rows as CSV to any writer.
///
/// Rows with no color leave the `COLOR` cell empty. Produces deterministic
/// output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_summary_csv(rows: &[SummaryRow], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(SUMMARY_HEADER)?;
    for r in rows {
        let year = r.year.to_string();
        let value = r.value.to_string();
        wtr.write_record([
            r.label.as_str(),
            year.as_str(),
            value.as_str(),
            r.color.as_deref().unwrap_or(""),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the hourly matrix as CSV: `MONTH,HOUR,YEAR` then one column per label.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_hourly_csv(matrix: &HourlyMatrix, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let mut header = vec!["MONTH".to_string(), "HOUR".to_string(), "YEAR".to_string()];
    header.extend(matrix.labels().iter().cloned());
    wtr.write_record(&header)?;

    for row in matrix.rows() {
        let mut record = Vec::with_capacity(3 + row.values.len());
        record.push(row.month.clone());
        record.push(row.hour.to_string());
        record.push(row.year.to_string());
        record.extend(row.values.iter().map(|v| format!("{v:.6}")));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports summary rows to `path`, creating parent directories.
pub fn export_summary(rows: &[SummaryRow], path: &Path) -> io::Result<()> {
    let file = create(path)?;
    write_summary_csv(rows, io::BufWriter::new(file))
}

/// Exports the hourly matrix to `path`, creating parent directories.
pub fn export_hourly(matrix: &HourlyMatrix, path: &Path) -> io::Result<()> {
    let file = create(path)?;
    write_hourly_csv(matrix, io::BufWriter::new(file))
}

fn create(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}
