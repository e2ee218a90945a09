//! Typed evaluation context with dot-path lookup.
//!
//! Rules reference context attributes by dot-path (`request.department_id`).
//! Values come from a closed kind set; a lookup on a missing path returns
//! `None` and never fails.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A context attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Flag(bool),
    Number(f64),
    Text(String),
    Group(BTreeMap<String, ContextValue>),
}

impl ContextValue {
    /// String form used by equality and substring operators
    ///
    /// Groups have no string form; an operator applied to one is false.
    pub fn as_text(&self) -> Option<String> {
        match self {
            ContextValue::Text(s) => Some(s.clone()),
            ContextValue::Number(n) => Some(format_number(*n)),
            ContextValue::Flag(b) => Some(b.to_string()),
            ContextValue::Group(_) => None,
        }
    }

    /// Numeric coercion used by the ordering operators
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ContextValue::Number(n) => Some(*n),
            ContextValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Opaque request attributes carried through submit/retrieve calls
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationContext {
    #[serde(flatten)]
    values: BTreeMap<String, ContextValue>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ContextValue) {
        self.values.insert(key.into(), value);
    }

    pub fn with_text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, ContextValue::Text(value.into()));
        self
    }

    pub fn with_number(mut self, key: impl Into<String>, value: f64) -> Self {
        self.insert(key, ContextValue::Number(value));
        self
    }

    pub fn with_flag(mut self, key: impl Into<String>, value: bool) -> Self {
        self.insert(key, ContextValue::Flag(value));
        self
    }

    pub fn with_group(
        mut self,
        key: impl Into<String>,
        group: BTreeMap<String, ContextValue>,
    ) -> Self {
        self.insert(key, ContextValue::Group(group));
        self
    }

    /// Resolve a dot-path; absent segments yield `None`, never an error
    pub fn lookup(&self, path: &str) -> Option<&ContextValue> {
        let mut segments = path.split('.');
        let mut current = self.values.get(segments.next()?)?;
        for segment in segments {
            match current {
                ContextValue::Group(inner) => current = inner.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Text form of the value at a path, if any
    pub fn text(&self, path: &str) -> Option<String> {
        self.lookup(path).and_then(ContextValue::as_text)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested() -> EvaluationContext {
        let mut request = BTreeMap::new();
        request.insert("ip".to_string(), ContextValue::Text("10.0.0.7".to_string()));
        request.insert("attempts".to_string(), ContextValue::Number(3.0));

        EvaluationContext::new()
            .with_text("department_id", "engineering")
            .with_flag("external", false)
            .with_group("request", request)
    }

    #[test]
    fn test_flat_lookup() {
        let ctx = nested();
        assert_eq!(ctx.text("department_id").as_deref(), Some("engineering"));
        assert_eq!(ctx.text("external").as_deref(), Some("false"));
    }

    #[test]
    fn test_dot_path_lookup() {
        let ctx = nested();
        assert_eq!(ctx.text("request.ip").as_deref(), Some("10.0.0.7"));
        assert_eq!(
            ctx.lookup("request.attempts").and_then(ContextValue::as_number),
            Some(3.0)
        );
    }

    #[test]
    fn test_absent_paths() {
        let ctx = nested();
        assert!(ctx.lookup("missing").is_none());
        assert!(ctx.lookup("request.missing").is_none());
        // Descending into a scalar is absent, not an error
        assert!(ctx.lookup("department_id.anything").is_none());
    }

    #[test]
    fn test_group_has_no_text_form() {
        let ctx = nested();
        assert!(ctx.text("request").is_none());
    }

    #[test]
    fn test_number_text_form_is_integral_when_whole() {
        assert_eq!(ContextValue::Number(5.0).as_text().as_deref(), Some("5"));
        assert_eq!(ContextValue::Number(2.5).as_text().as_deref(), Some("2.5"));
    }

    #[test]
    fn test_numeric_coercion_from_text() {
        assert_eq!(ContextValue::Text(" 42 ".to_string()).as_number(), Some(42.0));
        assert_eq!(ContextValue::Text("n/a".to_string()).as_number(), None);
        assert_eq!(ContextValue::Flag(true).as_number(), None);
    }

    #[test]
    fn test_serde_is_a_plain_object() {
        let ctx = EvaluationContext::new().with_text("ip", "10.0.0.1").with_number("port", 443.0);
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["ip"], "10.0.0.1");
        assert_eq!(json["port"], 443.0);
    }
}
