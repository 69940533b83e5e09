//! Rule evaluation against the latest bar of an indicator frame.
//!
//! # Evaluation Semantics
//!
//! - A condition reads the latest value of its column and of its reference
//!   column (or literal). A missing column, an empty frame or an undefined
//!   value on either side makes it `false`.
//! - `AND`: every child true. `OR`: at least one child true.
//! - An empty child list, or an unrecognized combinator, is `false`.

use crate::domain::frame::IndicatorFrame;
use crate::domain::rule::{Combinator, Condition, Operand, Rule, RuleNode};

pub fn evaluate_condition(frame: &IndicatorFrame, condition: &Condition) -> bool {
    let Some(left) = frame.latest_value(&condition.indicator) else {
        return false;
    };
    let right = match &condition.operand {
        Operand::Value(v) => *v,
        Operand::Reference(name) => match frame.latest_value(name) {
            Some(v) => v,
            None => return false,
        },
    };
    if left.is_nan() || right.is_nan() {
        return false;
    }
    condition.operator.apply(left, right)
}

pub fn evaluate_rule(frame: &IndicatorFrame, rule: &Rule) -> bool {
    if rule.conditions.is_empty() {
        return false;
    }
    match rule.combinator {
        Combinator::And => rule.conditions.iter().all(|c| evaluate_node(frame, c)),
        Combinator::Or => rule.conditions.iter().any(|c| evaluate_node(frame, c)),
        Combinator::Unknown => false,
    }
}

pub fn evaluate_node(frame: &IndicatorFrame, node: &RuleNode) -> bool {
    match node {
        RuleNode::Rule(rule) => evaluate_rule(frame, rule),
        RuleNode::Condition(condition) => evaluate_condition(frame, condition),
    }
}
