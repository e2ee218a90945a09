//! Read-only views over a record's embedded event list.

use crate::entry::{AuditAction, AuditEvent};

/// Chronological, filterable view of one record's audit history
pub struct AuditTrail<'a> {
    events: &'a [AuditEvent],
}

impl<'a> AuditTrail<'a> {
    pub fn new(events: &'a [AuditEvent]) -> Self {
        Self { events }
    }

    /// All events, oldest first
    pub fn chronological(&self) -> Vec<AuditEvent> {
        let mut events: Vec<AuditEvent> = self.events.to_vec();
        events.sort_by_key(|e| e.timestamp);
        events
    }

    pub fn for_actor(&self, actor_id: &str) -> Vec<AuditEvent> {
        self.chronological()
            .into_iter()
            .filter(|e| e.actor_id == actor_id)
            .collect()
    }

    pub fn with_action(&self, action: AuditAction) -> Vec<AuditEvent> {
        self.chronological()
            .into_iter()
            .filter(|e| e.action == action)
            .collect()
    }

    /// Denied and failed events only
    pub fn security_events(&self) -> Vec<AuditEvent> {
        self.chronological()
            .into_iter()
            .filter(AuditEvent::is_security_event)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::AuditOutcome;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn event(actor: &str, action: AuditAction, outcome: AuditOutcome) -> AuditEvent {
        AuditEvent::new(Uuid::new_v4(), actor, action, outcome)
    }

    #[test]
    fn test_chronological_ordering() {
        let mut older = event("u1", AuditAction::RecordCreated, AuditOutcome::Success);
        older.timestamp = Utc::now() - Duration::hours(2);
        let newer = event("u1", AuditAction::RecordAccessed, AuditOutcome::Success);

        // Stored out of order, read back in order
        let events = vec![newer.clone(), older.clone()];
        let trail = AuditTrail::new(&events);
        let ordered = trail.chronological();
        assert_eq!(ordered[0].id, older.id);
        assert_eq!(ordered[1].id, newer.id);
    }

    #[test]
    fn test_filters() {
        let events = vec![
            event("u1", AuditAction::RecordCreated, AuditOutcome::Success),
            event("u2", AuditAction::AccessDenied, AuditOutcome::Denied),
            event("u2", AuditAction::RecordAccessed, AuditOutcome::Success),
        ];
        let trail = AuditTrail::new(&events);

        assert_eq!(trail.for_actor("u2").len(), 2);
        assert_eq!(trail.with_action(AuditAction::RecordCreated).len(), 1);
        assert_eq!(trail.security_events().len(), 1);
        assert_eq!(trail.len(), 3);
        assert!(!trail.is_empty());
    }
}
