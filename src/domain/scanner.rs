//! Multi-timeframe scan orchestration.
//!
//! For one symbol: fetch every workflow timeframe, normalize it, compute the
//! requested indicators and pattern flags, then read the signal, patterns,
//! setups and alignment off the latest bars. For a batch: run every symbol in
//! isolation so that one failure or panic only tags that symbol's record.

use crate::domain::error::ScanError;
use crate::domain::frame::{Column, ColumnKind, ColumnSpec, IndicatorFrame, TimeframeFrames};
use crate::domain::normalize::normalize;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::registry::Registry;
use crate::domain::setup::SetupLibrary;
use crate::domain::workflow::{SetupMode, Workflow};
use crate::ports::data_port::DataPort;
use crate::ports::progress_port::ProgressPort;
use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::Serialize;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Everything a scan needs, passed explicitly into each call.
#[derive(Clone, Copy)]
pub struct ScanContext<'a> {
    pub workflow: &'a Workflow,
    pub data: &'a dyn DataPort,
    pub registry: &'a Registry,
    pub setups: &'a SetupLibrary,
    pub cancel: Option<&'a AtomicBool>,
}

impl<'a> ScanContext<'a> {
    pub fn new(
        workflow: &'a Workflow,
        data: &'a dyn DataPort,
        registry: &'a Registry,
        setups: &'a SetupLibrary,
    ) -> Self {
        Self {
            workflow,
            data,
            registry,
            setups,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: &'a AtomicBool) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|c| c.load(Ordering::SeqCst))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Neutral,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

impl FromStr for Signal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(Signal::Buy),
            "SELL" => Ok(Signal::Sell),
            "NEUTRAL" => Ok(Signal::Neutral),
            other => Err(format!("unknown signal '{}', expected BUY, SELL or NEUTRAL", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Alignment {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alignment::Bullish => write!(f, "Bullish"),
            Alignment::Bearish => write!(f, "Bearish"),
            Alignment::Neutral => write!(f, "Neutral"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeframeStatus {
    pub label: String,
    pub interval: String,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub symbol: String,
    pub primary_timeframe: String,
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub signal: Signal,
    /// Latest primary value of each numeric column the requested indicators
    /// produce; `None` while undefined.
    pub snapshot: BTreeMap<String, Option<f64>>,
    pub patterns: Vec<String>,
    pub setups: Vec<String>,
    pub alignment: Alignment,
    pub timeframes: Vec<TimeframeStatus>,
}

/// One batch entry: the symbol and either its result or why it failed.
#[derive(Debug)]
pub struct ScanRecord {
    pub symbol: String,
    pub result: Result<ScanResult, ScanError>,
}

impl ScanRecord {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub total: usize,
    pub buy: usize,
    pub sell: usize,
    pub with_patterns: usize,
    pub errors: usize,
}

impl ScanSummary {
    pub fn from_records(records: &[ScanRecord]) -> Self {
        let mut summary = ScanSummary {
            total: records.len(),
            ..Default::default()
        };
        for record in records {
            match &record.result {
                Ok(result) => {
                    match result.signal {
                        Signal::Buy => summary.buy += 1,
                        Signal::Sell => summary.sell += 1,
                        Signal::Neutral => {}
                    }
                    if !result.patterns.is_empty() {
                        summary.with_patterns += 1;
                    }
                }
                Err(_) => summary.errors += 1,
            }
        }
        summary
    }
}

/// Compute the workflow's indicators and pattern flags over `series`.
///
/// Indicators run in workflow order and a later column replaces an earlier
/// one of the same name. Unknown ids are skipped; a failed computation leaves
/// its columns undefined.
pub fn build_frame(
    series: PriceSeries,
    workflow: &Workflow,
    registry: &Registry,
) -> Result<IndicatorFrame, ScanError> {
    let mut frame = IndicatorFrame::new(series);
    let n = frame.len();

    for id in &workflow.indicators {
        let Some(indicator) = registry.indicator(id) else {
            warn!(indicator = %id, "unknown indicator id, skipped");
            continue;
        };
        let outputs = indicator.outputs();
        let columns = match indicator.compute(&frame.series) {
            Ok(columns)
                if columns.len() == outputs.len() && columns.iter().all(|c| c.len() == n) =>
            {
                columns
            }
            Ok(columns) => {
                warn!(
                    indicator = %id,
                    produced = columns.len(),
                    expected = outputs.len(),
                    "indicator output misaligned, columns left undefined"
                );
                undefined_columns(&outputs, n)
            }
            Err(e) => {
                warn!(indicator = %id, error = %e, "indicator failed, columns left undefined");
                undefined_columns(&outputs, n)
            }
        };
        for (spec, column) in outputs.iter().zip(columns) {
            frame.insert(&spec.name, column)?;
        }
    }

    for id in &workflow.patterns {
        let Some(detector) = registry.pattern(id) else {
            warn!(pattern = %id, "unknown pattern id, skipped");
            continue;
        };
        let flags = match detector.detect(&frame.series) {
            Ok(flags) if flags.len() == n => flags,
            Ok(_) => {
                warn!(pattern = %id, "pattern output misaligned, flags cleared");
                vec![false; n]
            }
            Err(e) => {
                warn!(pattern = %id, error = %e, "pattern detection failed, flags cleared");
                vec![false; n]
            }
        };
        frame.insert(id, Column::Flag(flags))?;
    }

    Ok(frame)
}

fn undefined_columns(outputs: &[ColumnSpec], n: usize) -> Vec<Column> {
    outputs.iter().map(|spec| spec.undefined(n)).collect()
}

/// Fetch and build every workflow timeframe for `symbol`. A provider error or
/// an empty table marks that timeframe unavailable.
pub fn fetch_frames(ctx: &ScanContext<'_>, symbol: &str) -> Result<TimeframeFrames, ScanError> {
    let mut frames = TimeframeFrames::new();
    for tf in &ctx.workflow.timeframes {
        let table = match ctx.data.fetch_ohlcv(symbol, &tf.interval) {
            Ok(table) => table,
            Err(e) => {
                warn!(symbol, timeframe = %tf.label, interval = %tf.interval, error = %e, "timeframe unavailable");
                frames.push(&tf.label, None);
                continue;
            }
        };
        if table.is_empty() {
            debug!(symbol, timeframe = %tf.label, "provider returned an empty table");
            frames.push(&tf.label, None);
            continue;
        }
        let series = normalize(&table)?;
        let frame = build_frame(series, ctx.workflow, ctx.registry)?;
        frames.push(&tf.label, Some(frame));
    }
    Ok(frames)
}

/// Tide, else Wave, else the first available timeframe.
pub fn primary_frame(frames: &TimeframeFrames) -> Option<(&str, &IndicatorFrame)> {
    ["Tide", "Wave"]
        .into_iter()
        .find_map(|label| frames.get(label).map(|f| (label, f)))
        .or_else(|| frames.available().next())
}

/// Average of per-timeframe trend votes: close vs `SMA` where that column
/// exists, else the `Buy_Signal`/`Sell_Signal` flags.
pub fn alignment(frames: &TimeframeFrames) -> Alignment {
    let scores: Vec<f64> = frames
        .available()
        .filter_map(|(_, frame)| timeframe_vote(frame))
        .collect();
    if scores.is_empty() {
        return Alignment::Neutral;
    }
    let avg = scores.iter().sum::<f64>() / scores.len() as f64;
    if avg > 0.5 {
        Alignment::Bullish
    } else if avg < -0.5 {
        Alignment::Bearish
    } else {
        Alignment::Neutral
    }
}

fn timeframe_vote(frame: &IndicatorFrame) -> Option<f64> {
    if frame.column("SMA").is_some() {
        let close = frame.latest_value("Close")?;
        let sma = frame.latest_value("SMA")?;
        if close.is_nan() || sma.is_nan() {
            return None;
        }
        return Some(if close > sma { 1.0 } else { -1.0 });
    }
    if frame.column("Buy_Signal").is_some() {
        if frame.latest_flag("Buy_Signal") {
            return Some(1.0);
        }
        if frame.latest_flag("Sell_Signal") {
            return Some(-1.0);
        }
    }
    None
}

fn signal_of(frame: &IndicatorFrame) -> Signal {
    if frame.latest_flag("Buy_Signal") {
        Signal::Buy
    } else if frame.latest_flag("Sell_Signal") {
        Signal::Sell
    } else {
        Signal::Neutral
    }
}

fn matched_setups(ctx: &ScanContext<'_>, signal: Signal, frames: &TimeframeFrames) -> Vec<String> {
    match ctx.workflow.setup_mode {
        SetupMode::Signal => ctx
            .workflow
            .setups
            .iter()
            .filter(|name| match name.as_str() {
                "Momentum_Long" => signal == Signal::Buy,
                "Momentum_Short" => signal == Signal::Sell,
                _ => false,
            })
            .cloned()
            .collect(),
        SetupMode::Full => ctx
            .workflow
            .setups
            .iter()
            .filter(|name| match ctx.setups.get(name) {
                Some(setup) => setup.evaluate(frames),
                None => {
                    warn!(setup = %name, "unknown setup, skipped");
                    false
                }
            })
            .cloned()
            .collect(),
    }
}

fn snapshot(ctx: &ScanContext<'_>, frame: &IndicatorFrame) -> BTreeMap<String, Option<f64>> {
    ctx.workflow
        .indicators
        .iter()
        .filter_map(|id| ctx.registry.indicator(id))
        .flat_map(|indicator| indicator.outputs())
        .filter(|spec| spec.kind == ColumnKind::Numeric)
        .map(|spec| {
            let value = frame.latest_value(&spec.name).filter(|v| !v.is_nan());
            (spec.name, value)
        })
        .collect()
}

/// Scan one symbol across every workflow timeframe.
pub fn scan_symbol(ctx: &ScanContext<'_>, symbol: &str) -> Result<ScanResult, ScanError> {
    let frames = fetch_frames(ctx, symbol)?;
    let no_data = || ScanError::NoData {
        symbol: symbol.to_string(),
    };
    if frames.is_all_unavailable() {
        return Err(no_data());
    }
    let (primary_label, primary) = primary_frame(&frames).ok_or_else(no_data)?;
    let latest = primary.series.latest().ok_or_else(no_data)?;

    let signal = signal_of(primary);
    let patterns = ctx
        .workflow
        .patterns
        .iter()
        .filter(|id| primary.latest_flag(id))
        .cloned()
        .collect();
    let setups = matched_setups(ctx, signal, &frames);

    let timeframes = frames
        .availability()
        .into_iter()
        .map(|(label, available)| TimeframeStatus {
            interval: ctx.workflow.interval_for(&label).unwrap_or_default().to_string(),
            label,
            available,
        })
        .collect();

    Ok(ScanResult {
        symbol: symbol.to_string(),
        primary_timeframe: primary_label.to_string(),
        timestamp: latest.timestamp,
        price: latest.close,
        signal,
        snapshot: snapshot(ctx, primary),
        patterns,
        setups,
        alignment: alignment(&frames),
        timeframes,
    })
}

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn scan_isolated(ctx: &ScanContext<'_>, symbol: &str) -> ScanRecord {
    if ctx.is_cancelled() {
        return ScanRecord {
            symbol: symbol.to_string(),
            result: Err(ScanError::Cancelled {
                symbol: symbol.to_string(),
            }),
        };
    }
    let result = panic::catch_unwind(AssertUnwindSafe(|| scan_symbol(ctx, symbol)))
        .unwrap_or_else(|payload| {
            Err(ScanError::SymbolPanicked {
                symbol: symbol.to_string(),
                reason: panic_reason(payload),
            })
        });
    if let Err(e) = &result {
        warn!(symbol, error = %e, "scan failed");
    }
    ScanRecord {
        symbol: symbol.to_string(),
        result,
    }
}

/// Scan every symbol, returning one record per input symbol in input order.
///
/// `progress` is notified after each symbol with the number completed so far.
/// With `parallel`, symbols run on the rayon pool. Once the context's cancel
/// flag is set, symbols not yet started yield [`ScanError::Cancelled`].
pub fn scan_batch(
    ctx: &ScanContext<'_>,
    symbols: &[String],
    progress: &dyn ProgressPort,
    parallel: bool,
) -> Vec<ScanRecord> {
    let total = symbols.len();
    let completed = AtomicUsize::new(0);
    info!(symbols = total, parallel, workflow = %ctx.workflow.name, "starting scan");

    let run = |symbol: &String| -> ScanRecord {
        let record = scan_isolated(ctx, symbol);
        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
        progress.on_progress(done, total, symbol);
        record
    };

    let records: Vec<ScanRecord> = if parallel {
        symbols.par_iter().map(run).collect()
    } else {
        symbols.iter().map(run).collect()
    };

    let summary = ScanSummary::from_records(&records);
    info!(
        total = summary.total,
        buy = summary.buy,
        sell = summary.sell,
        errors = summary.errors,
        "scan complete"
    );
    records
}
