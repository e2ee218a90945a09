//! Rule evaluation.

use crate::context::EvaluationContext;
use crate::error::DlpResult;
use crate::matcher::Matcher;
use crate::rule::{DlpRule, RuleAction, Severity};
use crate::store::RuleStore;
use data_classification::Classification;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// One rule that fired during an evaluation
#[derive(Debug, Clone)]
pub struct RuleMatch {
    pub rule_id: Uuid,
    pub rule_name: String,
    pub action: RuleAction,
    pub severity: Severity,
}

/// Outcome of screening one payload
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Firing rules, most severe first
    pub matched_rules: Vec<RuleMatch>,
    /// Most severe action among the firing rules; `Allow` when none fired
    pub final_action: RuleAction,
}

impl Evaluation {
    /// The rule responsible for a blocked submission, if any
    pub fn blocking_rule(&self) -> Option<&RuleMatch> {
        self.matched_rules
            .iter()
            .find(|m| m.action == RuleAction::Block)
    }
}

/// Side-effect-free dry run of a single rule against a sample
#[derive(Debug, Clone)]
pub struct RulePreview {
    pub rule_id: Uuid,
    pub pattern_matched: bool,
    pub conditions_hold: bool,
    pub exception_holds: bool,
    /// pattern ∧ conditions ∧ ¬exception
    pub fires: bool,
    pub action: RuleAction,
}

/// Evaluates payloads against the stored rule set
pub struct RuleEngine {
    store: Arc<dyn RuleStore>,
    matcher: Matcher,
}

impl RuleEngine {
    pub fn new(store: Arc<dyn RuleStore>) -> Self {
        Self {
            store,
            matcher: Matcher::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn RuleStore> {
        &self.store
    }

    /// Screen a payload against every applicable rule
    ///
    /// Candidates are the enabled rules whose scope matches the context and
    /// whose classification scope includes the candidate level, ordered by
    /// severity desc, then creation time, then rule id. Each firing rule's
    /// statistics increment exactly once per call.
    pub async fn evaluate(
        &self,
        content: &str,
        context: &EvaluationContext,
        classification: Classification,
    ) -> DlpResult<Evaluation> {
        let mut candidates: Vec<DlpRule> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|rule| {
                rule.enabled && rule.scope.matches(context) && rule.applies_to(classification)
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut matched_rules = Vec::new();
        for rule in &candidates {
            let preview = self.probe(rule, content, context);
            if !preview.fires {
                debug!(rule = %rule.name, "rule did not fire");
                continue;
            }

            self.store.record_trigger(rule.id, rule.action).await?;
            matched_rules.push(RuleMatch {
                rule_id: rule.id,
                rule_name: rule.name.clone(),
                action: rule.action,
                severity: rule.severity,
            });
        }

        let final_action = matched_rules
            .iter()
            .map(|m| m.action)
            .max()
            .unwrap_or(RuleAction::Allow);

        if final_action >= RuleAction::Warn {
            info!(
                ?final_action,
                fired = matched_rules.len(),
                %classification,
                "DLP screening flagged submission"
            );
        }

        Ok(Evaluation {
            matched_rules,
            final_action,
        })
    }

    /// Dry-run one rule against a sample; never touches statistics
    pub fn test_rule(
        &self,
        rule: &DlpRule,
        sample: &str,
        context: &EvaluationContext,
    ) -> RulePreview {
        self.probe(rule, sample, context)
    }

    fn probe(&self, rule: &DlpRule, content: &str, context: &EvaluationContext) -> RulePreview {
        let pattern_matched = self
            .matcher
            .matches(rule.pattern_type, &rule.pattern, content);
        let conditions_hold = rule.conditions.iter().all(|c| c.holds(context));
        let exception_holds = rule.exceptions.iter().any(|e| e.holds(context));

        RulePreview {
            rule_id: rule.id,
            pattern_matched,
            conditions_hold,
            exception_holds,
            fires: pattern_matched && conditions_hold && !exception_holds,
            action: rule.action,
        }
    }
}
