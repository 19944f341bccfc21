//! CSV ingest.
//!
//! Turns a CSV file into a typed `RawDataset` without knowing anything about
//! column roles; role resolution and value validation happen in
//! `crate::engineering`.
//!
//! Column typing is decided per column:
//! - **numeric** if every non-empty cell parses as a number (empty → NaN)
//! - **date** if every cell parses as a date in one of the accepted formats
//! - **text** otherwise

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use csv::StringRecord;
use tracing::debug;

use crate::domain::{Column, Frame, HolidayEvent, RawDataset};
use crate::error::AppError;

/// Load a raw dataset from a CSV file.
pub fn load_frame_csv(path: &Path) -> Result<RawDataset, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let frame = read_frame(file)?;
    debug!(path = %path.display(), rows = frame.n_rows(), cols = frame.n_cols(), "loaded dataset");
    Ok(frame)
}

/// Read a raw dataset from any CSV source.
pub fn read_frame<R: Read>(source: R) -> Result<RawDataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let names: Vec<String> = headers.iter().map(normalize_header_name).collect();
    if names.is_empty() || names.iter().all(String::is_empty) {
        return Err(AppError::new(2, "CSV has no header row."));
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); names.len()];
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header; CSV lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::new(3, format!("CSV parse error on line {line}: {e}")))?;
        if record.len() != names.len() {
            return Err(AppError::new(
                3,
                format!(
                    "Line {line} has {} fields, header has {}.",
                    record.len(),
                    names.len()
                ),
            ));
        }
        for (col, value) in record.iter().enumerate() {
            cells[col].push(value.to_string());
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| infer_column(name, values))
        .collect();
    Ok(Frame::new(columns)?)
}

/// Load a holiday calendar from a CSV file.
pub fn load_holidays_csv(path: &Path) -> Result<Vec<HolidayEvent>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open holidays CSV '{}': {e}", path.display())))?;
    read_holidays(file)
}

/// Read a holiday calendar with columns `ds`, `holiday`, `country` and an
/// optional `year`.
pub fn read_holidays<R: Read>(source: R) -> Result<Vec<HolidayEvent>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read holidays CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    for required in ["ds", "holiday", "country"] {
        if !header_map.contains_key(required) {
            return Err(AppError::new(
                2,
                format!("Missing required column in holidays CSV: `{required}`"),
            ));
        }
    }

    let mut events = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| AppError::new(3, format!("Holidays CSV parse error on line {line}: {e}")))?;
        let row = parse_holiday_row(&record, &header_map).map_err(|e| AppError::new(3, format!("Line {line}: {e}")))?;
        events.push(row);
    }
    Ok(events)
}

fn parse_holiday_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<HolidayEvent, String> {
    let ds = parse_date(get_required(record, header_map, "ds")?)?;
    let holiday = get_required(record, header_map, "holiday")?;
    let country = get_required(record, header_map, "country")?;

    let mut event = HolidayEvent::new(ds, holiday, country);
    if let Some(year) = get_optional(record, header_map, "year") {
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid year '{year}'."))?;
        if year != ds.year() {
            return Err(format!("Year {year} does not match date {ds}."));
        }
        event.year = year;
    }
    Ok(event)
}

fn infer_column(name: String, values: Vec<String>) -> Column {
    if let Some(numbers) = parse_numeric(&values) {
        return Column::numeric(name, numbers);
    }
    if let Some(dates) = parse_all_dates(&values) {
        return Column::dates(name, dates);
    }
    Column::text(name, values)
}

fn parse_numeric(values: &[String]) -> Option<Vec<f64>> {
    if values.iter().all(String::is_empty) {
        return None;
    }
    values
        .iter()
        .map(|s| if s.is_empty() { Some(f64::NAN) } else { s.parse::<f64>().ok() })
        .collect()
}

fn parse_all_dates(values: &[String]) -> Option<Vec<NaiveDate>> {
    if values.is_empty() {
        return None;
    }
    values.iter().map(|s| parse_date(s).ok()).collect()
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name).to_ascii_lowercase(), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn get_required<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, key: &str) -> Result<&'a str, String> {
    get_optional(record, header_map, key).ok_or_else(|| format!("Missing `{key}` value."))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, key: &str) -> Option<&'a str> {
    let idx = *header_map.get(key)?;
    record.get(idx).filter(|s| !s.is_empty())
}

/// Parse a date in one of the accepted formats.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}
