//! Scan result rendering: console table, CSV and JSON.

use crate::domain::error::ScanError;
use crate::domain::scanner::{ScanRecord, ScanResult, ScanSummary};
use serde::Serialize;
use std::collections::BTreeSet;

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

fn availability(result: &ScanResult) -> String {
    result
        .timeframes
        .iter()
        .map(|t| format!("{}{}", t.label, if t.available { "" } else { "(n/a)" }))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_table(records: &[ScanRecord]) -> String {
    let mut out = format!(
        "{:<10} {:<8} {:>12} {:<8} {:<28} {:<28} {}\n",
        "Symbol", "Signal", "Price", "Trend", "Patterns", "Setups", "Timeframes"
    );
    for record in records {
        match &record.result {
            Ok(r) => out.push_str(&format!(
                "{:<10} {:<8} {:>12.2} {:<8} {:<28} {:<28} {}\n",
                r.symbol,
                r.signal.to_string(),
                r.price,
                r.alignment.to_string(),
                join_or_dash(&r.patterns),
                join_or_dash(&r.setups),
                availability(r),
            )),
            Err(e) => out.push_str(&format!("{:<10} {:<8} {}\n", record.symbol, "ERROR", e)),
        }
    }
    out
}

pub fn render_summary(summary: &ScanSummary) -> String {
    format!(
        "Scanned: {}  Buy: {}  Sell: {}  With patterns: {}  Errors: {}",
        summary.total, summary.buy, summary.sell, summary.with_patterns, summary.errors
    )
}

fn format_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// One row per record. Snapshot columns are the union over all results,
/// sorted by name; error rows leave them blank.
pub fn render_csv(records: &[ScanRecord]) -> Result<String, ScanError> {
    let snapshot_columns: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| r.result.as_ref().ok())
        .flat_map(|r| r.snapshot.keys().map(String::as_str))
        .collect();

    let mut wtr = csv::Writer::from_writer(Vec::new());
    let mut header: Vec<&str> = vec![
        "symbol",
        "signal",
        "price",
        "timestamp",
        "primary_timeframe",
        "alignment",
        "patterns",
        "setups",
    ];
    header.extend(snapshot_columns.iter().copied());
    header.push("error");
    wtr.write_record(&header).map_err(csv_error)?;

    for record in records {
        let row: Vec<String> = match &record.result {
            Ok(r) => {
                let mut row = vec![
                    r.symbol.clone(),
                    r.signal.to_string(),
                    r.price.to_string(),
                    r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                    r.primary_timeframe.clone(),
                    r.alignment.to_string(),
                    r.patterns.join(";"),
                    r.setups.join(";"),
                ];
                row.extend(
                    snapshot_columns
                        .iter()
                        .map(|c| format_value(r.snapshot.get(*c).copied().flatten())),
                );
                row.push(String::new());
                row
            }
            Err(e) => {
                let mut row = vec![record.symbol.clone()];
                row.extend(std::iter::repeat_n(String::new(), 7 + snapshot_columns.len()));
                row.push(e.to_string());
                row
            }
        };
        wtr.write_record(&row).map_err(csv_error)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| ScanError::Io(std::io::Error::other(e.to_string())))?;
    String::from_utf8(bytes).map_err(|e| ScanError::Io(std::io::Error::other(e)))
}

fn csv_error(e: csv::Error) -> ScanError {
    ScanError::Io(std::io::Error::other(e))
}

#[derive(Serialize)]
#[serde(untagged)]
enum JsonRecord<'a> {
    Ok(&'a ScanResult),
    Err { symbol: &'a str, error: String },
}

#[derive(Serialize)]
struct JsonReport<'a> {
    workflow: &'a str,
    summary: ScanSummary,
    results: Vec<JsonRecord<'a>>,
}

/// `summary` covers the whole batch even when `records` is a filtered subset.
pub fn render_json(
    workflow: &str,
    summary: &ScanSummary,
    records: &[ScanRecord],
) -> Result<String, ScanError> {
    let report = JsonReport {
        workflow,
        summary: *summary,
        results: records
            .iter()
            .map(|record| match &record.result {
                Ok(r) => JsonRecord::Ok(r),
                Err(e) => JsonRecord::Err {
                    symbol: &record.symbol,
                    error: e.to_string(),
                },
            })
            .collect(),
    };
    serde_json::to_string_pretty(&report).map_err(|e| ScanError::Io(std::io::Error::other(e)))
}
