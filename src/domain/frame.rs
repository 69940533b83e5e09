//! Per-timeframe indicator frame.
//!
//! An [`IndicatorFrame`] pairs a normalized [`PriceSeries`] with the named
//! columns computed over it. The base columns `Open`, `High`, `Low`, `Close`
//! and `Volume` are addressable by name alongside the computed ones.

use crate::domain::error::ScanError;
use crate::domain::ohlcv::PriceSeries;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Numeric,
    Flag,
}

/// Name and kind of one column an indicator or detector produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn numeric(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Numeric,
        }
    }

    pub fn flag(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Flag,
        }
    }

    /// A column of this kind holding only undefined values.
    pub fn undefined(&self, len: usize) -> Column {
        match self.kind {
            ColumnKind::Numeric => Column::Numeric(vec![f64::NAN; len]),
            ColumnKind::Flag => Column::Flag(vec![false; len]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Flag(Vec<bool>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Flag(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Numeric(_) => ColumnKind::Numeric,
            Column::Flag(_) => ColumnKind::Flag,
        }
    }

    /// Value at `i`; flags read as 1.0 / 0.0.
    pub fn value_at(&self, i: usize) -> Option<f64> {
        match self {
            Column::Numeric(v) => v.get(i).copied(),
            Column::Flag(v) => v.get(i).map(|&b| if b { 1.0 } else { 0.0 }),
        }
    }

    pub fn flag_at(&self, i: usize) -> bool {
        match self {
            Column::Numeric(v) => v.get(i).is_some_and(|x| *x != 0.0 && !x.is_nan()),
            Column::Flag(v) => v.get(i).copied().unwrap_or(false),
        }
    }
}

pub const BASE_COLUMNS: [&str; 5] = ["Open", "High", "Low", "Close", "Volume"];

#[derive(Debug, Clone, Default)]
pub struct IndicatorFrame {
    pub series: PriceSeries,
    columns: BTreeMap<String, Column>,
}

impl IndicatorFrame {
    pub fn new(series: PriceSeries) -> Self {
        Self {
            series,
            columns: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Insert or replace a computed column. Its length must match the series.
    pub fn insert(&mut self, name: &str, column: Column) -> Result<(), ScanError> {
        if column.len() != self.len() {
            return Err(ScanError::computation(
                name,
                format!(
                    "column has {} values, series has {}",
                    column.len(),
                    self.len()
                ),
            ));
        }
        self.columns.insert(name.to_string(), column);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name) || self.is_base(name)
    }

    fn is_base(&self, name: &str) -> bool {
        match name {
            "Volume" => self.series.has_volume,
            other => BASE_COLUMNS.contains(&other),
        }
    }

    fn base_value(&self, name: &str, i: usize) -> Option<f64> {
        if !self.is_base(name) {
            return None;
        }
        let bar = self.series.bars.get(i)?;
        match name {
            "Open" => Some(bar.open),
            "High" => Some(bar.high),
            "Low" => Some(bar.low),
            "Close" => Some(bar.close),
            "Volume" => Some(bar.volume),
            _ => None,
        }
    }

    /// Value of `name` at bar `i`. Computed columns shadow base columns.
    pub fn value_at(&self, name: &str, i: usize) -> Option<f64> {
        match self.columns.get(name) {
            Some(column) => column.value_at(i),
            None => self.base_value(name, i),
        }
    }

    /// Value of `name` at the latest bar; `None` if the column is missing or
    /// the frame is empty.
    pub fn latest_value(&self, name: &str) -> Option<f64> {
        let last = self.len().checked_sub(1)?;
        self.value_at(name, last)
    }

    /// Whether flag column `name` is set at the latest bar.
    pub fn latest_flag(&self, name: &str) -> bool {
        match (self.len().checked_sub(1), self.columns.get(name)) {
            (Some(last), Some(column)) => column.flag_at(last),
            _ => false,
        }
    }
}

/// Frames of one symbol keyed by timeframe label, in workflow order.
/// `None` marks a timeframe whose data was unavailable.
#[derive(Debug, Clone, Default)]
pub struct TimeframeFrames {
    entries: Vec<(String, Option<IndicatorFrame>)>,
}

impl TimeframeFrames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: &str, frame: Option<IndicatorFrame>) {
        self.entries.push((label.to_string(), frame));
    }

    pub fn get(&self, label: &str) -> Option<&IndicatorFrame> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .and_then(|(_, f)| f.as_ref())
    }

    pub fn available(&self) -> impl Iterator<Item = (&str, &IndicatorFrame)> {
        self.entries
            .iter()
            .filter_map(|(l, f)| f.as_ref().map(|f| (l.as_str(), f)))
    }

    pub fn availability(&self) -> Vec<(String, bool)> {
        self.entries
            .iter()
            .map(|(l, f)| (l.clone(), f.is_some()))
            .collect()
    }

    pub fn is_all_unavailable(&self) -> bool {
        self.entries.iter().all(|(_, f)| f.is_none())
    }
}
