//! Post-scan result filters.
//!
//! Filters only narrow what is shown; batch counts are taken before they
//! apply. While any filter is set, error records are dropped.

use crate::domain::scanner::{ScanRecord, ScanResult, Signal};
use std::str::FromStr;

/// Which names a result must (or must not) carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    /// At least one name.
    Any,
    /// No names at all.
    None,
    /// This exact name among the result's names.
    Named(String),
}

impl Membership {
    pub fn matches(&self, names: &[String]) -> bool {
        match self {
            Membership::Any => !names.is_empty(),
            Membership::None => names.is_empty(),
            Membership::Named(name) => names.iter().any(|n| n == name),
        }
    }
}

impl FromStr for Membership {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "" => Err("expected any, none or a name".to_string()),
            "any" => Ok(Membership::Any),
            "none" => Ok(Membership::None),
            _ => Ok(Membership::Named(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultFilter {
    pub signal: Option<Signal>,
    pub pattern: Option<Membership>,
    pub setup: Option<Membership>,
}

impl ResultFilter {
    pub fn is_empty(&self) -> bool {
        self.signal.is_none() && self.pattern.is_none() && self.setup.is_none()
    }

    pub fn matches(&self, result: &ScanResult) -> bool {
        self.signal.is_none_or(|s| s == result.signal)
            && self
                .pattern
                .as_ref()
                .is_none_or(|m| m.matches(&result.patterns))
            && self.setup.as_ref().is_none_or(|m| m.matches(&result.setups))
    }

    /// Records that pass, in batch order.
    pub fn apply(&self, records: Vec<ScanRecord>) -> Vec<ScanRecord> {
        records
            .into_iter()
            .filter(|record| match &record.result {
                Ok(result) => self.matches(result),
                Err(_) => self.is_empty(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ScanError;
    use crate::domain::scanner::Alignment;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn record(symbol: &str, signal: Signal, patterns: &[&str], setups: &[&str]) -> ScanRecord {
        let result = ScanResult {
            symbol: symbol.into(),
            primary_timeframe: "Tide".into(),
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            price: 10.0,
            signal,
            snapshot: BTreeMap::new(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            setups: setups.iter().map(|s| s.to_string()).collect(),
            alignment: Alignment::Neutral,
            timeframes: Vec::new(),
        };
        ScanRecord {
            symbol: symbol.into(),
            result: Ok(result),
        }
    }

    fn batch() -> Vec<ScanRecord> {
        vec![
            record("AAA", Signal::Buy, &["Double_Bottom", "Flag"], &["Momentum_Long"]),
            record("BBB", Signal::Sell, &[], &["Momentum_Short"]),
            record("CCC", Signal::Neutral, &["Flag"], &[]),
            ScanRecord {
                symbol: "ZZZ".into(),
                result: Err(ScanError::NoData {
                    symbol: "ZZZ".into(),
                }),
            },
        ]
    }

    fn symbols(records: Vec<ScanRecord>) -> Vec<String> {
        records.into_iter().map(|r| r.symbol).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let filter = ResultFilter::default();
        assert!(filter.is_empty());
        assert_eq!(symbols(filter.apply(batch())), vec!["AAA", "BBB", "CCC", "ZZZ"]);
    }

    #[test]
    fn signal_filter() {
        let filter = ResultFilter {
            signal: Some(Signal::Sell),
            ..Default::default()
        };
        assert_eq!(symbols(filter.apply(batch())), vec!["BBB"]);
    }

    #[test]
    fn pattern_membership() {
        let with = |m: Membership| ResultFilter {
            pattern: Some(m),
            ..Default::default()
        };
        assert_eq!(symbols(with(Membership::Any).apply(batch())), vec!["AAA", "CCC"]);
        assert_eq!(symbols(with(Membership::None).apply(batch())), vec!["BBB"]);
        assert_eq!(
            symbols(with(Membership::Named("Flag".into())).apply(batch())),
            vec!["AAA", "CCC"]
        );
        assert!(with(Membership::Named("Double".into())).apply(batch()).is_empty());
    }

    #[test]
    fn filters_combine() {
        let filter = ResultFilter {
            signal: Some(Signal::Buy),
            pattern: Some(Membership::Any),
            setup: Some(Membership::Named("Momentum_Long".into())),
        };
        assert_eq!(symbols(filter.apply(batch())), vec!["AAA"]);

        let filter = ResultFilter {
            setup: Some(Membership::None),
            ..Default::default()
        };
        assert_eq!(symbols(filter.apply(batch())), vec!["CCC"]);
    }

    #[test]
    fn membership_from_str() {
        assert_eq!("ANY".parse::<Membership>(), Ok(Membership::Any));
        assert_eq!(" none ".parse::<Membership>(), Ok(Membership::None));
        assert_eq!(
            "Cup_Handle".parse::<Membership>(),
            Ok(Membership::Named("Cup_Handle".into()))
        );
        assert!("  ".parse::<Membership>().is_err());
    }

    #[test]
    fn signal_from_str() {
        assert_eq!("buy".parse::<Signal>(), Ok(Signal::Buy));
        assert_eq!("NEUTRAL".parse::<Signal>(), Ok(Signal::Neutral));
        assert!("hold".parse::<Signal>().is_err());
    }
}
