//! CSV file data adapter.
//!
//! Reads `<dir>/<SYMBOL>_<interval>.csv`. The header must name a timestamp
//! column (`Date`, `Datetime` or `Timestamp`) and the price columns; names
//! match case-insensitively and unknown columns are ignored. Cells are passed
//! to the normalizer untouched as text.

use crate::domain::error::ScanError;
use crate::domain::normalize::{RawCell, RawTable, REQUIRED_COLUMNS, VOLUME_COLUMN};
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const TIMESTAMP_COLUMNS: [&str; 3] = ["date", "datetime", "timestamp"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, interval: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, interval))
    }

    /// Symbols that have a file for `interval`, sorted.
    pub fn list_symbols(&self, interval: &str) -> Result<Vec<String>, ScanError> {
        let entries = fs::read_dir(&self.base_path)?;
        let suffix = format!("_{}.csv", interval);
        let mut symbols = Vec::new();

        for entry in entries {
            let name = entry?.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(&suffix) {
                if !symbol.is_empty() {
                    symbols.push(symbol.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn cell(value: Option<&str>) -> RawCell {
    match value.map(str::trim) {
        None | Some("") => RawCell::Missing,
        Some(s) => RawCell::Text(s.to_string()),
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(&self, symbol: &str, interval: &str) -> Result<RawTable, ScanError> {
        let unavailable = |reason: String| ScanError::DataUnavailable {
            symbol: symbol.to_string(),
            interval: interval.to_string(),
            reason,
        };

        let path = self.csv_path(symbol, interval);
        let content = fs::read_to_string(&path)
            .map_err(|e| unavailable(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| unavailable(format!("CSV header error: {}", e)))?
            .clone();

        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let ts_idx = TIMESTAMP_COLUMNS
            .iter()
            .find_map(|name| find(*name))
            .ok_or_else(|| unavailable("no Date/Datetime column".to_string()))?;
        let value_columns: Vec<(&str, usize)> = REQUIRED_COLUMNS
            .iter()
            .chain(std::iter::once(&VOLUME_COLUMN))
            .filter_map(|name| find(*name).map(|idx| (*name, idx)))
            .collect();

        let mut index = Vec::new();
        let mut cells: Vec<Vec<RawCell>> = vec![Vec::new(); value_columns.len()];
        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| unavailable(format!("CSV parse error: {}", e)))?;
            let raw_ts = record.get(ts_idx).unwrap_or_default();
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| {
                unavailable(format!("invalid timestamp '{}' on row {}", raw_ts, row + 1))
            })?;
            index.push(timestamp);
            for (column, (_, idx)) in cells.iter_mut().zip(&value_columns) {
                column.push(cell(record.get(*idx)));
            }
        }

        debug!(symbol, interval, rows = index.len(), path = %path.display(), "loaded CSV");
        let table = value_columns
            .iter()
            .zip(cells)
            .fold(RawTable::new(index), |table, ((name, _), column)| {
                table.with_column(name, column)
            });
        Ok(table)
    }
}
