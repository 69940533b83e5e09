//! Scan workflow: which indicators, patterns and setups to run, over which
//! timeframes.

use crate::domain::error::ScanError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A timeframe label (`Wave`, `Tide`, `SuperTide`, ...) and the provider
/// interval it is fetched at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeframeSpec {
    pub label: String,
    pub interval: String,
}

impl TimeframeSpec {
    pub fn new(label: &str, interval: &str) -> Self {
        Self {
            label: label.to_string(),
            interval: interval.to_string(),
        }
    }
}

/// How matched setups are decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SetupMode {
    /// Momentum_Long on a BUY signal, Momentum_Short on a SELL signal.
    #[default]
    Signal,
    /// Every requested setup whose multi-timeframe composition holds.
    Full,
}

impl FromStr for SetupMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "signal" => Ok(SetupMode::Signal),
            "full" => Ok(SetupMode::Full),
            other => Err(format!("unknown setup mode '{}', expected signal or full", other)),
        }
    }
}

impl fmt::Display for SetupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupMode::Signal => write!(f, "signal"),
            SetupMode::Full => write!(f, "full"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workflow {
    pub name: String,
    pub indicators: Vec<String>,
    pub patterns: Vec<String>,
    pub setups: Vec<String>,
    pub timeframes: Vec<TimeframeSpec>,
    pub setup_mode: SetupMode,
}

impl Default for Workflow {
    fn default() -> Self {
        Self {
            name: "Default Scanner".to_string(),
            indicators: to_strings(&["Yoda", "RSI", "MACD"]),
            patterns: to_strings(&["Double_Bottom", "Double_Top", "TL_Break_Up"]),
            setups: to_strings(&["Momentum_Long"]),
            timeframes: vec![
                TimeframeSpec::new("Wave", "4h"),
                TimeframeSpec::new("Tide", "1d"),
                TimeframeSpec::new("SuperTide", "1wk"),
            ],
            setup_mode: SetupMode::Signal,
        }
    }
}

impl Workflow {
    pub fn interval_for(&self, label: &str) -> Option<&str> {
        self.timeframes
            .iter()
            .find(|t| t.label == label)
            .map(|t| t.interval.as_str())
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Split a comma separated id list, dropping blanks.
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Parse `Wave:4h, Tide:1d, SuperTide:1wk`. Labels must be unique.
pub fn parse_timeframes(input: &str) -> Result<Vec<TimeframeSpec>, ScanError> {
    let invalid = |reason: String| ScanError::ConfigInvalid {
        section: "workflow".to_string(),
        key: "timeframes".to_string(),
        reason,
    };

    let mut timeframes: Vec<TimeframeSpec> = Vec::new();
    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let Some((label, interval)) = token.split_once(':') else {
            return Err(invalid(format!("expected 'Label:interval', found '{}'", token)));
        };
        let (label, interval) = (label.trim(), interval.trim());
        if label.is_empty() || interval.is_empty() {
            return Err(invalid(format!("expected 'Label:interval', found '{}'", token)));
        }
        if label.contains(char::is_whitespace) {
            return Err(invalid(format!("timeframe label '{}' contains whitespace", label)));
        }
        if timeframes.iter().any(|t| t.label == label) {
            return Err(invalid(format!("duplicate timeframe label '{}'", label)));
        }
        timeframes.push(TimeframeSpec::new(label, interval));
    }

    if timeframes.is_empty() {
        return Err(invalid("at least one timeframe is required".to_string()));
    }
    Ok(timeframes)
}
