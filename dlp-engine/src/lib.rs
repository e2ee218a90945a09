//! Data-loss-prevention rule engine.
//!
//! Screens payloads against classification-scoped rules before they are
//! stored. A rule pairs a pattern (regex, keyword, or a builtin detector for
//! credit cards, SSNs, emails, and phone numbers) with scope filters,
//! AND-combined conditions, OR-combined exceptions, and an action. The most
//! severe action among firing rules decides the submission's fate; only
//! `block` halts it.
//!
//! Rules are versioned (strictly +1 per modification) and keep commutative
//! trigger counters that survive disabling.

pub mod condition;
pub mod context;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod rule;
pub mod store;

pub use condition::{Condition, ConditionOperator};
pub use context::{ContextValue, EvaluationContext};
pub use engine::{Evaluation, RuleEngine, RuleMatch, RulePreview};
pub use error::{DlpError, DlpResult};
pub use matcher::Matcher;
pub use rule::{DlpRule, PatternType, RuleAction, RulePatch, RuleScope, RuleStatistics, Severity};
pub use store::{InMemoryRuleStore, RuleStore};
