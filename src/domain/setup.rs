//! Multi-timeframe setups.
//!
//! A setup pairs per-timeframe rule lists with a logic expression over the
//! timeframe labels (e.g. `Wave AND Tide AND SuperTide`). A timeframe's verdict
//! is true when every one of its rules holds on that timeframe's frame; the
//! logic expression combines the verdicts with the same positional AND/OR
//! splitting the text rule parser uses.

use crate::domain::error::ParseError;
use crate::domain::frame::{IndicatorFrame, TimeframeFrames};
use crate::domain::rule::{Combinator, Condition, Operator, Rule, RuleNode};
use crate::domain::rule_eval::evaluate_node;
use crate::domain::rule_parser::{parse_text_rule, split_combinator, trim_with_offset};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum LogicExpr {
    Label(String),
    All(Vec<LogicExpr>),
    Any(Vec<LogicExpr>),
}

impl LogicExpr {
    pub fn all_of(labels: &[&str]) -> Self {
        LogicExpr::All(labels.iter().map(|l| LogicExpr::Label(l.to_string())).collect())
    }

    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Self::parse_at(input, 0)
    }

    fn parse_at(text: &str, offset: usize) -> Result<Self, ParseError> {
        let (offset, text) = trim_with_offset(text, offset);
        if let Some((combinator, parts)) = split_combinator(text) {
            let children = parts
                .into_iter()
                .map(|(pos, part)| Self::parse_at(part, offset + pos))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(match combinator {
                Combinator::Or => LogicExpr::Any(children),
                _ => LogicExpr::All(children),
            });
        }
        if text.is_empty() || text.contains(char::is_whitespace) {
            return Err(ParseError {
                message: format!("expected timeframe label, found '{}'", text),
                position: offset,
            });
        }
        Ok(LogicExpr::Label(text.to_string()))
    }

    pub fn evaluate(&self, verdict: &impl Fn(&str) -> bool) -> bool {
        match self {
            LogicExpr::Label(label) => verdict(label),
            LogicExpr::All(children) => {
                !children.is_empty() && children.iter().all(|c| c.evaluate(verdict))
            }
            LogicExpr::Any(children) => children.iter().any(|c| c.evaluate(verdict)),
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        match self {
            LogicExpr::Label(label) => vec![label.as_str()],
            LogicExpr::All(children) | LogicExpr::Any(children) => {
                children.iter().flat_map(|c| c.labels()).collect()
            }
        }
    }
}

impl fmt::Display for LogicExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (children, sep) = match self {
            LogicExpr::Label(label) => return f.write_str(label),
            LogicExpr::All(children) => (children, " AND "),
            LogicExpr::Any(children) => (children, " OR "),
        };
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                f.write_str(sep)?;
            }
            write!(f, "{}", child)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Setup {
    pub name: String,
    pub description: String,
    pub timeframes: Vec<(String, Vec<RuleNode>)>,
    pub logic: LogicExpr,
}

impl Setup {
    /// Build a setup from per-timeframe text rules, e.g.
    /// `[("Tide", "RSI > 50 AND Close > SMA"), ("Wave", "MACD > 0")]` with logic
    /// `Tide AND Wave`. Rules for the same label accumulate.
    pub fn from_text(
        name: &str,
        description: &str,
        rules: &[(&str, &str)],
        logic: &str,
    ) -> Result<Self, ParseError> {
        let mut timeframes: Vec<(String, Vec<RuleNode>)> = Vec::new();
        for (label, text) in rules {
            let label = label.trim();
            if label.is_empty() || label.contains(char::is_whitespace) {
                return Err(ParseError {
                    message: format!("invalid timeframe label '{}'", label),
                    position: 0,
                });
            }
            let node = parse_text_rule(text)?;
            match timeframes.iter_mut().find(|(l, _)| l == label) {
                Some((_, nodes)) => nodes.push(node),
                None => timeframes.push((label.to_string(), vec![node])),
            }
        }

        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            timeframes,
            logic: LogicExpr::parse(logic)?,
        })
    }

    pub fn rules_for(&self, label: &str) -> Option<&[RuleNode]> {
        self.timeframes
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, rules)| rules.as_slice())
    }

    /// Whether every rule for `label` holds on `frame`; false when the label
    /// has no rules or the frame is unavailable.
    pub fn evaluate_timeframe(&self, label: &str, frame: Option<&IndicatorFrame>) -> bool {
        match (self.rules_for(label), frame) {
            (Some(rules), Some(frame)) if !rules.is_empty() => {
                rules.iter().all(|r| evaluate_node(frame, r))
            }
            _ => false,
        }
    }

    /// Full multi-timeframe composition through the logic expression.
    pub fn evaluate(&self, frames: &TimeframeFrames) -> bool {
        self.logic
            .evaluate(&|label| self.evaluate_timeframe(label, frames.get(label)))
    }
}

fn cond(indicator: &str, operator: Operator, value: f64) -> RuleNode {
    Condition::value(indicator, operator, value).into()
}

fn cond_ref(indicator: &str, operator: Operator, reference: &str) -> RuleNode {
    Condition::reference(indicator, operator, reference).into()
}

fn momentum_long() -> Setup {
    Setup {
        name: "Momentum_Long".into(),
        description: "Multi-timeframe momentum alignment for long entries".into(),
        timeframes: vec![
            (
                "Wave".into(),
                vec![
                    Rule::and(vec![
                        cond("RSI", Operator::Gt, 50.0),
                        cond("MACD", Operator::Gt, 0.0),
                    ])
                    .into(),
                ],
            ),
            (
                "Tide".into(),
                vec![
                    Rule::and(vec![
                        cond("Buy_Signal", Operator::Eq, 1.0),
                        cond_ref("Close", Operator::Gt, "SMA"),
                    ])
                    .into(),
                ],
            ),
            (
                "SuperTide".into(),
                vec![
                    Rule::or(vec![
                        cond_ref("Close", Operator::Gt, "SMA"),
                        cond("TTM_Fired", Operator::Eq, 1.0),
                    ])
                    .into(),
                ],
            ),
        ],
        logic: LogicExpr::all_of(&["Wave", "Tide", "SuperTide"]),
    }
}

fn momentum_short() -> Setup {
    Setup {
        name: "Momentum_Short".into(),
        description: "Multi-timeframe momentum alignment for short entries".into(),
        timeframes: vec![
            (
                "Wave".into(),
                vec![
                    Rule::and(vec![
                        cond("RSI", Operator::Lt, 50.0),
                        cond("MACD", Operator::Lt, 0.0),
                    ])
                    .into(),
                ],
            ),
            (
                "Tide".into(),
                vec![
                    Rule::and(vec![
                        cond("Sell_Signal", Operator::Eq, 1.0),
                        cond_ref("Close", Operator::Lt, "SMA"),
                    ])
                    .into(),
                ],
            ),
            (
                "SuperTide".into(),
                vec![
                    Rule::or(vec![
                        cond_ref("Close", Operator::Lt, "SMA"),
                        cond("TTM_Fired", Operator::Eq, 1.0),
                    ])
                    .into(),
                ],
            ),
        ],
        logic: LogicExpr::all_of(&["Wave", "Tide"]),
    }
}

fn breakout() -> Setup {
    Setup {
        name: "Breakout".into(),
        description: "Price breakout with volume confirmation".into(),
        timeframes: vec![
            (
                "Wave".into(),
                vec![
                    Rule::or(vec![
                        cond("TL_Break_Up", Operator::Eq, 1.0),
                        cond("Double_Bottom", Operator::Eq, 1.0),
                    ])
                    .into(),
                ],
            ),
            (
                "Tide".into(),
                vec![
                    Rule::and(vec![
                        cond("RSI", Operator::Gt, 40.0),
                        cond("RSI", Operator::Lt, 70.0),
                    ])
                    .into(),
                ],
            ),
        ],
        logic: LogicExpr::all_of(&["Wave", "Tide"]),
    }
}

/// Named setups: the built-in presets plus any added from configuration.
#[derive(Debug, Clone, Default)]
pub struct SetupLibrary {
    setups: BTreeMap<String, Setup>,
}

impl SetupLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_presets() -> Self {
        let mut library = Self::new();
        for setup in [momentum_long(), momentum_short(), breakout()] {
            library.insert(setup);
        }
        library
    }

    /// Add or replace a setup by name.
    pub fn insert(&mut self, setup: Setup) {
        self.setups.insert(setup.name.clone(), setup);
    }

    pub fn get(&self, name: &str) -> Option<&Setup> {
        self.setups.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.setups.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.setups.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Setup> {
        self.setups.values()
    }
}
