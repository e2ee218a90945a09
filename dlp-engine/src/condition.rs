//! Rule conditions and exceptions.
//!
//! A condition compares one context attribute against a literal. Rules AND
//! their conditions and OR their exceptions. A missing field makes the
//! predicate false in both roles, so rules fail closed on absent context.

use crate::context::EvaluationContext;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    Regex,
    GreaterThan,
    LessThan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    /// Dot-path into the evaluation context
    pub field: String,
    pub operator: ConditionOperator,
    pub value: String,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: ConditionOperator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Whether the predicate holds against the context
    ///
    /// Missing field, group-valued field, non-numeric operands under the
    /// ordering operators, and malformed regexes all yield false, never an
    /// error.
    pub fn holds(&self, context: &EvaluationContext) -> bool {
        let Some(value) = context.lookup(&self.field) else {
            return false;
        };

        match self.operator {
            ConditionOperator::Equals => value.as_text().is_some_and(|v| v == self.value),
            ConditionOperator::NotEquals => value.as_text().is_some_and(|v| v != self.value),
            ConditionOperator::Contains => value
                .as_text()
                .is_some_and(|v| v.contains(self.value.as_str())),
            ConditionOperator::NotContains => value
                .as_text()
                .is_some_and(|v| !v.contains(self.value.as_str())),
            ConditionOperator::Regex => match Regex::new(&self.value) {
                Ok(re) => value.as_text().is_some_and(|v| re.is_match(&v)),
                Err(err) => {
                    warn!(field = %self.field, pattern = %self.value, %err,
                        "malformed condition regex treated as non-matching");
                    false
                }
            },
            ConditionOperator::GreaterThan => match (value.as_number(), self.value.trim().parse::<f64>()) {
                (Some(actual), Ok(threshold)) => actual > threshold,
                _ => false,
            },
            ConditionOperator::LessThan => match (value.as_number(), self.value.trim().parse::<f64>()) {
                (Some(actual), Ok(threshold)) => actual < threshold,
                _ => false,
            },
        }
    }
}
