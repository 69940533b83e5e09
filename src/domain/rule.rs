//! Rule tree data structures.
//!
//! A rule is a tree of AND/OR nodes over leaf conditions. A condition compares
//! the latest value of a named frame column against a literal or against the
//! latest value of another column:
//! - `Condition`: `{indicator, operator, value | reference}`
//! - `Rule`: `{type: AND | OR, conditions: [...]}`
//! - `RuleNode`: either of the two
//!
//! The serde layout matches the JSON rule documents the scanner exchanges with
//! its configuration surface.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
}

impl Operator {
    /// Operators in the order the text parser tries them.
    pub const PRIORITY: [Operator; 6] = [
        Operator::Ge,
        Operator::Le,
        Operator::Gt,
        Operator::Lt,
        Operator::Eq,
        Operator::Ne,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Eq => "==",
            Operator::Ne => "!=",
        }
    }

    pub fn apply(&self, left: f64, right: f64) -> bool {
        match self {
            Operator::Gt => left > right,
            Operator::Lt => left < right,
            Operator::Ge => left >= right,
            Operator::Le => left <= right,
            Operator::Eq => left == right,
            Operator::Ne => left != right,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operand {
    Value(f64),
    Reference(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub indicator: String,
    pub operator: Operator,
    #[serde(flatten)]
    pub operand: Operand,
}

impl Condition {
    pub fn value(indicator: &str, operator: Operator, value: f64) -> Self {
        Self {
            indicator: indicator.to_string(),
            operator,
            operand: Operand::Value(value),
        }
    }

    pub fn reference(indicator: &str, operator: Operator, reference: &str) -> Self {
        Self {
            indicator: indicator.to_string(),
            operator,
            operand: Operand::Reference(reference.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Combinator {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::And => write!(f, "AND"),
            Combinator::Or => write!(f, "OR"),
            Combinator::Unknown => write!(f, "?"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(rename = "type")]
    pub combinator: Combinator,
    pub conditions: Vec<RuleNode>,
}

impl Rule {
    pub fn and(conditions: Vec<RuleNode>) -> Self {
        Self {
            combinator: Combinator::And,
            conditions,
        }
    }

    pub fn or(conditions: Vec<RuleNode>) -> Self {
        Self {
            combinator: Combinator::Or,
            conditions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleNode {
    Rule(Rule),
    Condition(Condition),
}

impl From<Condition> for RuleNode {
    fn from(c: Condition) -> Self {
        RuleNode::Condition(c)
    }
}

impl From<Rule> for RuleNode {
    fn from(r: Rule) -> Self {
        RuleNode::Rule(r)
    }
}

impl fmt::Display for RuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleNode::Condition(c) => match &c.operand {
                Operand::Value(v) => write!(f, "{} {} {}", c.indicator, c.operator, v),
                Operand::Reference(r) => write!(f, "{} {} {}", c.indicator, c.operator, r),
            },
            RuleNode::Rule(r) => {
                write!(f, "(")?;
                for (i, child) in r.conditions.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", r.combinator)?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
        }
    }
}
