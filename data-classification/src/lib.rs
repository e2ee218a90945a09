//! Sensitivity classification levels shared across the engine.
//!
//! A classification is the label a caller assigns to a payload at submission
//! time. It governs which DLP rules screen the payload, the default retention
//! period, and whether access must be audited.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Sensitivity classification for protected data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Public data - no restrictions
    Public,
    /// Internal use only
    Internal,
    /// Confidential business data
    Confidential,
    /// Restricted data with the tightest handling requirements
    Restricted,
}

impl Classification {
    /// All classification levels, lowest sensitivity first.
    pub const ALL: [Classification; 4] = [
        Classification::Public,
        Classification::Internal,
        Classification::Confidential,
        Classification::Restricted,
    ];

    /// Check if access to data at this level must be audited
    pub fn requires_audit(&self) -> bool {
        !matches!(self, Classification::Public)
    }

    /// Default retention period in days, used when the caller supplies none
    pub fn default_retention_days(&self) -> u32 {
        match self {
            Classification::Public => 365,
            Classification::Internal => 730,
            Classification::Confidential => 1825, // 5 years
            Classification::Restricted => 2555,   // 7 years
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Public => "public",
            Classification::Internal => "internal",
            Classification::Confidential => "confidential",
            Classification::Restricted => "restricted",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown classification: {0}. Valid options: public, internal, confidential, restricted")]
pub struct ParseClassificationError(String);

impl FromStr for Classification {
    type Err = ParseClassificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Classification::Public),
            "internal" => Ok(Classification::Internal),
            "confidential" => Ok(Classification::Confidential),
            "restricted" => Ok(Classification::Restricted),
            _ => Err(ParseClassificationError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_requirements() {
        assert!(!Classification::Public.requires_audit());
        assert!(Classification::Internal.requires_audit());
        assert!(Classification::Confidential.requires_audit());
        assert!(Classification::Restricted.requires_audit());
    }

    #[test]
    fn test_retention_defaults_increase_with_sensitivity() {
        let days: Vec<u32> = Classification::ALL
            .iter()
            .map(|c| c.default_retention_days())
            .collect();
        let mut sorted = days.clone();
        sorted.sort_unstable();
        assert_eq!(days, sorted);
        assert_eq!(Classification::Restricted.default_retention_days(), 2555);
    }

    #[test]
    fn test_parse_roundtrip() {
        for level in Classification::ALL {
            let parsed: Classification = level.as_str().parse().unwrap();
            assert_eq!(parsed, level);
        }
        assert!("secret".parse::<Classification>().is_err());
    }

    #[test]
    fn test_serde_representation() {
        let json = serde_json::to_string(&Classification::Confidential).unwrap();
        assert_eq!(json, "\"confidential\"");
    }
}
