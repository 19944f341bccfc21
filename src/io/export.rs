//! Export frames to CSV.
//!
//! Dates are written as ISO `YYYY-MM-DD`, numbers with full precision and
//! missing numeric values as empty cells, so an export reads back through
//! `ingest::read_frame` with the same column types.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{ColumnData, Frame};
use crate::error::AppError;

/// Write `frame` to a CSV file.
pub fn write_frame_csv(path: &Path, frame: &Frame) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_frame(file, frame)
}

/// Write `frame` as CSV to any sink.
pub fn write_frame<W: Write>(sink: W, frame: &Frame) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(sink);

    writer
        .write_record(frame.column_names())
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for row in 0..frame.n_rows() {
        let record: Vec<String> = frame.columns().iter().map(|c| cell(&c.data, row)).collect();
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

fn cell(data: &ColumnData, row: usize) -> String {
    match data {
        ColumnData::Numeric(values) => {
            let v = values[row];
            if v.is_finite() { v.to_string() } else { String::new() }
        }
        ColumnData::Text(values) => values[row].clone(),
        ColumnData::Date(values) => values[row].format("%Y-%m-%d").to_string(),
    }
}
