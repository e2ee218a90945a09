//! Pattern matchers.
//!
//! The builtin detectors are fixed, documented expressions; `Regex` and
//! `Keyword` rules carry their own pattern. Matching answers "does the
//! content contain at least one hit" — per-call statistics never depend on
//! how many hits a payload contains.

use crate::rule::PatternType;
use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Compiled builtin detectors
pub struct Matcher {
    credit_card: Regex,
    ssn: Regex,
    email: Regex,
    phone: Regex,
}

impl Matcher {
    pub fn new() -> Self {
        Self {
            // 13-16 digit card numbers in 4-digit groups; candidates are
            // Luhn-validated before they count as a hit
            credit_card: Regex::new(r"\b(?:\d{4}[-\s]?){3}\d{1,4}\b").unwrap(),
            ssn: Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap(),
            email: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap(),
            phone: Regex::new(r"\b(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b").unwrap(),
        }
    }

    /// Whether the content matches under the given pattern type
    ///
    /// A malformed stored regex is treated as non-matching; evaluation never
    /// fails on a bad pattern.
    pub fn matches(&self, pattern_type: PatternType, pattern: &str, content: &str) -> bool {
        match pattern_type {
            PatternType::Regex => match RegexBuilder::new(pattern).case_insensitive(true).build() {
                Ok(re) => re.is_match(content),
                Err(err) => {
                    warn!(pattern, %err, "malformed rule pattern treated as non-matching");
                    false
                }
            },
            PatternType::Keyword => content.to_lowercase().contains(&pattern.to_lowercase()),
            PatternType::CreditCard => self
                .credit_card
                .find_iter(content)
                .any(|m| luhn_valid(m.as_str())),
            PatternType::Ssn => self.ssn.is_match(content),
            PatternType::Email => self.email.is_match(content),
            PatternType::Phone => self.phone.is_match(content),
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Luhn checksum over the digits of a candidate card number
fn luhn_valid(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();
    if !(13..=19).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_card_detector_requires_luhn() {
        let matcher = Matcher::new();
        assert!(matcher.matches(PatternType::CreditCard, "", "card: 4111-1111-1111-1111"));
        assert!(matcher.matches(PatternType::CreditCard, "", "4111 1111 1111 1111"));
        assert!(matcher.matches(PatternType::CreditCard, "", "4111111111111111"));
        // Right shape, wrong checksum
        assert!(!matcher.matches(PatternType::CreditCard, "", "1234-5678-9012-3456"));
        assert!(!matcher.matches(PatternType::CreditCard, "", "no numbers here"));
    }

    #[test]
    fn test_ssn_detector() {
        let matcher = Matcher::new();
        assert!(matcher.matches(PatternType::Ssn, "", "SSN: 123-45-6789"));
        assert!(!matcher.matches(PatternType::Ssn, "", "123456789"));
    }

    #[test]
    fn test_email_detector() {
        let matcher = Matcher::new();
        assert!(matcher.matches(PatternType::Email, "", "reach me at jane.doe+dlp@example.co.uk"));
        assert!(!matcher.matches(PatternType::Email, "", "jane.doe at example"));
    }

    #[test]
    fn test_phone_detector() {
        let matcher = Matcher::new();
        assert!(matcher.matches(PatternType::Phone, "", "call (555) 867-5309"));
        assert!(matcher.matches(PatternType::Phone, "", "+1 555.867.5309"));
        assert!(!matcher.matches(PatternType::Phone, "", "extension 12"));
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        let matcher = Matcher::new();
        assert!(matcher.matches(PatternType::Keyword, "Project Falcon", "leak of PROJECT falcon notes"));
        assert!(!matcher.matches(PatternType::Keyword, "Project Falcon", "nothing to see"));
    }

    #[test]
    fn test_regex_is_case_insensitive() {
        let matcher = Matcher::new();
        assert!(matcher.matches(PatternType::Regex, r"internal[-_]only", "marked INTERNAL_ONLY"));
    }

    #[test]
    fn test_malformed_regex_never_matches() {
        let matcher = Matcher::new();
        assert!(!matcher.matches(PatternType::Regex, r"([unclosed", "anything"));
    }

    #[test]
    fn test_luhn() {
        assert!(luhn_valid("4111111111111111"));
        assert!(luhn_valid("4111-1111-1111-1111"));
        assert!(!luhn_valid("4111111111111112"));
        assert!(!luhn_valid("411"));
    }
}
