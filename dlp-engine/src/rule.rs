//! DLP rule model.

use crate::condition::Condition;
use crate::context::EvaluationContext;
use crate::error::{DlpError, DlpResult};
use chrono::{DateTime, Utc};
use data_classification::Classification;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rule severity, used to order evaluation and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// What a firing rule does to the enclosing submission
///
/// Ordered by severity: `Block` outranks `Warn` outranks `Log` outranks
/// `Allow`. Only `Block` halts a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Log,
    Warn,
    Block,
}

/// How the rule's pattern is interpreted
///
/// The builtin detectors use fixed expressions (see `matcher`); `Regex` and
/// `Keyword` read the rule's `pattern` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Regex,
    Keyword,
    CreditCard,
    Ssn,
    Email,
    Phone,
}

/// Where a rule applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "value", rename_all = "snake_case")]
pub enum RuleScope {
    /// Applies to every submission
    Global,
    /// Applies when the context's `department_id` equals the value
    Department(String),
    /// Applies when the context's `user_id` equals the value
    User(String),
    /// Applies when the context's `data_type` equals the value
    DataType(String),
}

impl RuleScope {
    pub fn matches(&self, context: &EvaluationContext) -> bool {
        match self {
            RuleScope::Global => true,
            RuleScope::Department(value) => context.text("department_id").as_deref() == Some(value),
            RuleScope::User(value) => context.text("user_id").as_deref() == Some(value),
            RuleScope::DataType(value) => context.text("data_type").as_deref() == Some(value),
        }
    }
}

/// Trigger counters, never cleared by disabling a rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleStatistics {
    pub total_matches: u64,
    pub blocked_count: u64,
    pub warned_count: u64,
    pub logged_count: u64,
    pub last_triggered_at: Option<DateTime<Utc>>,
}

impl RuleStatistics {
    /// One firing of the rule: the action picks the counter
    pub fn record(&mut self, action: RuleAction, now: DateTime<Utc>) {
        self.total_matches += 1;
        match action {
            RuleAction::Block => self.blocked_count += 1,
            RuleAction::Warn => self.warned_count += 1,
            RuleAction::Log => self.logged_count += 1,
            RuleAction::Allow => {}
        }
        self.last_triggered_at = Some(now);
    }
}

/// A data-loss-prevention rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DlpRule {
    pub id: Uuid,
    pub name: String,
    pub pattern: String,
    pub pattern_type: PatternType,
    pub action: RuleAction,
    /// Classification levels the rule screens; empty means every level
    pub classification_scope: Vec<Classification>,
    pub severity: Severity,
    pub enabled: bool,
    pub scope: RuleScope,
    pub conditions: Vec<Condition>,
    pub exceptions: Vec<Condition>,
    pub statistics: RuleStatistics,
    /// Starts at 1 on creation, +1 on every modification
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DlpRule {
    pub fn new(name: impl Into<String>, pattern_type: PatternType, pattern: impl Into<String>, action: RuleAction) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            pattern: pattern.into(),
            pattern_type,
            action,
            classification_scope: Vec::new(),
            severity: Severity::Medium,
            enabled: true,
            scope: RuleScope::Global,
            conditions: Vec::new(),
            exceptions: Vec::new(),
            statistics: RuleStatistics::default(),
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_scope(mut self, scope: RuleScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn for_classifications(mut self, levels: &[Classification]) -> Self {
        self.classification_scope = levels.to_vec();
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_exception(mut self, exception: Condition) -> Self {
        self.exceptions.push(exception);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether the rule screens the given classification level
    pub fn applies_to(&self, classification: Classification) -> bool {
        self.classification_scope.is_empty() || self.classification_scope.contains(&classification)
    }

    pub fn validate(&self) -> DlpResult<()> {
        if self.name.trim().is_empty() {
            return Err(DlpError::Validation("rule name cannot be empty".to_string()));
        }
        match self.pattern_type {
            PatternType::Regex => {
                if let Err(err) = regex::Regex::new(&self.pattern) {
                    return Err(DlpError::InvalidPattern(err.to_string()));
                }
            }
            PatternType::Keyword => {
                if self.pattern.is_empty() {
                    return Err(DlpError::Validation(
                        "keyword rules need a non-empty pattern".to_string(),
                    ));
                }
            }
            // Builtin detectors ignore the pattern field
            _ => {}
        }
        Ok(())
    }
}

/// Partial update applied through `RuleStore::update`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulePatch {
    pub name: Option<String>,
    pub pattern: Option<String>,
    pub pattern_type: Option<PatternType>,
    pub action: Option<RuleAction>,
    pub classification_scope: Option<Vec<Classification>>,
    pub severity: Option<Severity>,
    pub enabled: Option<bool>,
    pub scope: Option<RuleScope>,
    pub conditions: Option<Vec<Condition>>,
    pub exceptions: Option<Vec<Condition>>,
}

impl RulePatch {
    /// Apply the patch, bumping the version by exactly 1
    pub fn apply_to(self, rule: &mut DlpRule, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            rule.name = name;
        }
        if let Some(pattern) = self.pattern {
            rule.pattern = pattern;
        }
        if let Some(pattern_type) = self.pattern_type {
            rule.pattern_type = pattern_type;
        }
        if let Some(action) = self.action {
            rule.action = action;
        }
        if let Some(scope) = self.classification_scope {
            rule.classification_scope = scope;
        }
        if let Some(severity) = self.severity {
            rule.severity = severity;
        }
        if let Some(enabled) = self.enabled {
            rule.enabled = enabled;
        }
        if let Some(scope) = self.scope {
            rule.scope = scope;
        }
        if let Some(conditions) = self.conditions {
            rule.conditions = conditions;
        }
        if let Some(exceptions) = self.exceptions {
            rule.exceptions = exceptions;
        }
        rule.version += 1;
        rule.updated_at = now;
    }
}
