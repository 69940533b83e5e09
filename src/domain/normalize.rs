//! Raw price-table normalization.
//!
//! Data providers hand over tables whose OHLC columns can arrive in several
//! encodings: plain numbers, strings, a single array holding the whole column,
//! or per-cell nested arrays. [`normalize`] turns any of these into a
//! [`PriceSeries`] of `f64`s, using `NaN` for anything it cannot parse.

use crate::domain::error::ScanError;
use crate::domain::ohlcv::{OhlcvBar, PriceSeries};
use chrono::NaiveDateTime;
use tracing::debug;

pub const REQUIRED_COLUMNS: [&str; 4] = ["Open", "High", "Low", "Close"];
pub const VOLUME_COLUMN: &str = "Volume";

#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Number(f64),
    Text(String),
    Array(Vec<RawCell>),
    Missing,
}

impl From<f64> for RawCell {
    fn from(v: f64) -> Self {
        RawCell::Number(v)
    }
}

impl From<&str> for RawCell {
    fn from(s: &str) -> Self {
        RawCell::Text(s.to_string())
    }
}

/// A timestamp-indexed table as delivered by a data provider.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub index: Vec<NaiveDateTime>,
    pub columns: Vec<(String, Vec<RawCell>)>,
}

impl RawTable {
    pub fn new(index: Vec<NaiveDateTime>) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, name: &str, cells: Vec<RawCell>) -> Self {
        self.columns.retain(|(n, _)| n != name);
        self.columns.push((name.to_string(), cells));
        self
    }

    pub fn column(&self, name: &str) -> Option<&[RawCell]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, cells)| cells.as_slice())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Numeric table holding the given bars.
    pub fn from_bars(bars: &[OhlcvBar], with_volume: bool) -> Self {
        let column = |f: fn(&OhlcvBar) -> f64| -> Vec<RawCell> {
            bars.iter().map(|b| RawCell::Number(f(b))).collect()
        };
        let table = Self::new(bars.iter().map(|b| b.timestamp).collect())
            .with_column("Open", column(|b| b.open))
            .with_column("High", column(|b| b.high))
            .with_column("Low", column(|b| b.low))
            .with_column("Close", column(|b| b.close));
        if with_volume {
            table.with_column(VOLUME_COLUMN, column(|b| b.volume))
        } else {
            table
        }
    }
}

/// Normalize a raw table into a price series.
///
/// Fails only when one of Open/High/Low/Close is absent. Rows are ordered by
/// timestamp; for duplicated timestamps the last row wins.
pub fn normalize(table: &RawTable) -> Result<PriceSeries, ScanError> {
    let n = table.len();
    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(REQUIRED_COLUMNS.len());
    for name in REQUIRED_COLUMNS {
        let cells = table.column(name).ok_or_else(|| ScanError::MissingColumn {
            column: name.to_string(),
        })?;
        columns.push(normalize_column(cells, n));
    }

    let volume = table.column(VOLUME_COLUMN).map(|c| normalize_column(c, n));
    let has_volume = volume.is_some();

    let mut bars: Vec<OhlcvBar> = (0..n)
        .map(|i| OhlcvBar {
            timestamp: table.index[i],
            open: columns[0][i],
            high: columns[1][i],
            low: columns[2][i],
            close: columns[3][i],
            volume: volume.as_ref().map_or(0.0, |v| v[i]),
        })
        .collect();

    if !bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp) {
        bars.sort_by_key(|b| b.timestamp);
        let before = bars.len();
        let mut deduped: Vec<OhlcvBar> = Vec::with_capacity(before);
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => deduped.push(bar),
            }
        }
        debug!(
            rows = before,
            kept = deduped.len(),
            "reordered raw table by timestamp"
        );
        bars = deduped;
    }

    Ok(PriceSeries::new(bars, has_volume))
}

/// Coerce one raw column to `n` floats.
pub fn normalize_column(cells: &[RawCell], n: usize) -> Vec<f64> {
    let at = |i: usize| cells.get(i).unwrap_or(&RawCell::Missing);

    if cells
        .iter()
        .all(|c| matches!(c, RawCell::Number(_) | RawCell::Missing))
    {
        return (0..n)
            .map(|i| match at(i) {
                RawCell::Number(v) => *v,
                _ => f64::NAN,
            })
            .collect();
    }

    match cells.first() {
        Some(RawCell::Text(_)) => {
            return (0..n).map(|i| text_or_number(at(i))).collect();
        }
        Some(RawCell::Array(items)) => {
            let mut flat = Vec::new();
            flatten(items, &mut flat);
            if flat.len() == n {
                if let Some(values) = flat.iter().map(|c| scalar_value(c)).collect() {
                    return values;
                }
            }
        }
        _ => {}
    }

    (0..n).map(|i| extract_scalar(at(i))).collect()
}

fn text_or_number(cell: &RawCell) -> f64 {
    match cell {
        RawCell::Number(v) => *v,
        RawCell::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn flatten<'a>(items: &'a [RawCell], out: &mut Vec<&'a RawCell>) {
    for item in items {
        match item {
            RawCell::Array(inner) => flatten(inner, out),
            other => out.push(other),
        }
    }
}

/// Float value of a non-array cell; `None` when it cannot be converted.
fn scalar_value(cell: &RawCell) -> Option<f64> {
    match cell {
        RawCell::Number(v) => Some(*v),
        RawCell::Text(s) => s.trim().parse().ok(),
        RawCell::Missing => Some(f64::NAN),
        RawCell::Array(_) => None,
    }
}

/// Last element of a (possibly nested) array cell, or the cell itself.
fn extract_scalar(cell: &RawCell) -> f64 {
    match cell {
        RawCell::Array(items) => {
            let mut flat = Vec::new();
            flatten(items, &mut flat);
            let values: Option<Vec<f64>> = flat.iter().map(|c| scalar_value(c)).collect();
            values
                .and_then(|v| v.last().copied())
                .unwrap_or(f64::NAN)
        }
        other => scalar_value(other).unwrap_or(f64::NAN),
    }
}
