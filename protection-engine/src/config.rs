use data_classification::Classification;
use std::collections::HashMap;

/// Engine configuration, constructed once and threaded through every call
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Retention periods overriding the classification defaults, in days
    pub retention_overrides: HashMap<Classification, u32>,
    /// How close to expiry a record counts as "expiring soon"
    pub expiring_soon_window_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retention_overrides: HashMap::new(),
            expiring_soon_window_days: 30,
        }
    }
}

impl EngineConfig {
    pub fn with_retention(mut self, classification: Classification, days: u32) -> Self {
        self.retention_overrides.insert(classification, days);
        self
    }

    pub fn with_expiring_soon_window_days(mut self, days: i64) -> Self {
        self.expiring_soon_window_days = days;
        self
    }

    /// Retention period for a classification, override or default
    pub fn retention_days_for(&self, classification: Classification) -> u32 {
        self.retention_overrides
            .get(&classification)
            .copied()
            .unwrap_or_else(|| classification.default_retention_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_defaults_and_overrides() {
        let config = EngineConfig::default().with_retention(Classification::Internal, 90);
        assert_eq!(config.retention_days_for(Classification::Internal), 90);
        assert_eq!(
            config.retention_days_for(Classification::Restricted),
            Classification::Restricted.default_retention_days()
        );
        assert_eq!(config.expiring_soon_window_days, 30);
    }
}
