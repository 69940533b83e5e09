//! Text rule parser.
//!
//! Grammar, applied recursively to each trimmed segment:
//! - if the segment contains ` AND `, split on every occurrence into an AND node;
//! - else if it contains ` OR `, split on every occurrence into an OR node;
//! - else it is a leaf `column OP operand`.
//!
//! The AND/OR split is positional, not precedence-based: `A OR B AND C` is
//! `AND(A OR B, C)` and `A AND B OR C` is `AND(A, B OR C)`. Leaf operators are
//! tried in the order `>=`, `<=`, `>`, `<`, `==`, `!=`; an operator is taken
//! only when splitting on it yields exactly two sides. A right side that
//! parses as a number is a literal, anything else names another column.

use crate::domain::error::ParseError;
use crate::domain::rule::{Combinator, Condition, Operand, Operator, Rule, RuleNode};

const AND_SEPARATOR: &str = " AND ";
const OR_SEPARATOR: &str = " OR ";

/// Split `text` on every occurrence of the first combinator keyword it
/// contains. Each part carries its byte offset within `text`.
pub fn split_combinator(text: &str) -> Option<(Combinator, Vec<(usize, &str)>)> {
    for (separator, combinator) in [
        (AND_SEPARATOR, Combinator::And),
        (OR_SEPARATOR, Combinator::Or),
    ] {
        if !text.contains(separator) {
            continue;
        }
        let mut parts = Vec::new();
        let mut start = 0;
        for (idx, _) in text.match_indices(separator) {
            parts.push((start, &text[start..idx]));
            start = idx + separator.len();
        }
        parts.push((start, &text[start..]));
        return Some((combinator, parts));
    }
    None
}

/// Trim `text`, returning the trimmed slice and its offset from `offset`.
pub fn trim_with_offset(text: &str, offset: usize) -> (usize, &str) {
    let leading = text.len() - text.trim_start().len();
    (offset + leading, text.trim())
}

pub fn parse_text_rule(input: &str) -> Result<RuleNode, ParseError> {
    parse_segment(input, 0)
}

fn parse_segment(text: &str, offset: usize) -> Result<RuleNode, ParseError> {
    let (offset, text) = trim_with_offset(text, offset);
    match split_combinator(text) {
        Some((combinator, parts)) => {
            let conditions = parts
                .into_iter()
                .map(|(pos, part)| parse_segment(part, offset + pos))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RuleNode::Rule(Rule {
                combinator,
                conditions,
            }))
        }
        None => parse_condition(text, offset).map(RuleNode::Condition),
    }
}

fn parse_condition(text: &str, offset: usize) -> Result<Condition, ParseError> {
    if text.is_empty() {
        return Err(ParseError {
            message: "expected condition, found end of input".to_string(),
            position: offset,
        });
    }

    for operator in Operator::PRIORITY {
        let symbol = operator.symbol();
        let Some(op_pos) = text.find(symbol) else {
            continue;
        };
        let sides: Vec<&str> = text.split(symbol).collect();
        if sides.len() != 2 {
            continue;
        }
        let indicator = sides[0].trim();
        let right = sides[1].trim();
        if indicator.is_empty() {
            return Err(ParseError {
                message: format!("expected column name before '{}'", symbol),
                position: offset,
            });
        }
        if right.is_empty() {
            return Err(ParseError {
                message: format!("expected value or column after '{}'", symbol),
                position: offset + op_pos + symbol.len(),
            });
        }
        let operand = match right.parse::<f64>() {
            Ok(value) => Operand::Value(value),
            Err(_) => Operand::Reference(right.to_string()),
        };
        return Ok(Condition {
            indicator: indicator.to_string(),
            operator,
            operand,
        });
    }

    Err(ParseError {
        message: format!("no comparison operator in '{}'", text),
        position: offset,
    })
}
