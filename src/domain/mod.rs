//! Core domain types and logic.

pub mod ohlcv;
pub mod normalize;
pub mod frame;
pub mod indicator;
pub mod indicator_helpers;
pub mod pattern;
pub mod registry;
pub mod rule;
pub mod rule_parser;
pub mod rule_eval;
pub mod setup;
pub mod workflow;
pub mod scanner;
pub mod result_filter;
pub mod symbols;
pub mod config_validation;
pub mod error;

#[cfg(test)]
pub mod test_support;
