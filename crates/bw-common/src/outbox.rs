//! Outbox record wire type and state machine.
//!
//! An outbox record is the durable delivery obligation derived from a domain
//! event. Its id is derived deterministically from `(orgId, eventId)`, so a
//! second create for the same pair collapses into the existing record
//! instead of producing a duplicate delivery obligation.

use serde::{Deserialize, Serialize};

/// The single job type currently dispatched from the outbox.
pub const JOB_TYPE_NOTIFICATION_DISPATCH: &str = "notification_dispatch";

/// Retry ceiling. The fifth failed attempt moves the record to `dead`.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutboxStatus {
    Pending,
    Processing,
    Done,
    Dead,
}

impl OutboxStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Dead)
    }

    /// Legal transitions:
    /// pending → processing, processing → done | pending | dead.
    pub fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Done)
                | (Self::Processing, Self::Pending)
                | (Self::Processing, Self::Dead)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid outbox transition: {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: OutboxStatus,
    pub to: OutboxStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxRecord {
    /// Deterministic idempotency key: `notif:{orgId}:{eventId}`.
    pub id: String,
    pub org_id: String,
    /// Back-reference to the domain event; the record does not own it.
    pub event_id: String,
    pub job_type: String,
    pub status: OutboxStatus,
    /// Completed delivery attempts so far.
    pub attempts: u32,
    pub max_attempts: u32,
    /// Epoch milliseconds gating the earliest next delivery attempt.
    pub next_attempt_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Derive the deterministic outbox id for an event.
pub fn outbox_id(org_id: &str, event_id: &str) -> String {
    format!("notif:{}:{}", org_id, event_id)
}

impl OutboxRecord {
    pub fn for_event(org_id: &str, event_id: &str, now_ms: i64) -> Self {
        Self {
            id: outbox_id(org_id, event_id),
            org_id: org_id.to_string(),
            event_id: event_id.to_string(),
            job_type: JOB_TYPE_NOTIFICATION_DISPATCH.to_string(),
            status: OutboxStatus::Pending,
            attempts: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            next_attempt_at: now_ms,
            created_at: now_ms,
            updated_at: now_ms,
            last_error: None,
        }
    }

    fn transition(&mut self, next: OutboxStatus, now_ms: i64) -> Result<(), InvalidTransition> {
        if !self.status.can_transition(next) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = now_ms;
        Ok(())
    }

    /// Claim the record for an exclusive delivery attempt.
    pub fn begin_processing(&mut self, now_ms: i64) -> Result<(), InvalidTransition> {
        self.transition(OutboxStatus::Processing, now_ms)
    }

    /// Resolve a successful delivery.
    pub fn complete(&mut self, now_ms: i64) -> Result<(), InvalidTransition> {
        self.transition(OutboxStatus::Done, now_ms)
    }

    /// Resolve a failed delivery attempt. Re-queues with `next_attempt_at`
    /// until the attempt ceiling, then dead-letters.
    pub fn record_failure(
        &mut self,
        error: impl Into<String>,
        next_attempt_at: i64,
        now_ms: i64,
    ) -> Result<OutboxStatus, InvalidTransition> {
        let attempts = self.attempts + 1;
        let next = if attempts >= self.max_attempts {
            OutboxStatus::Dead
        } else {
            OutboxStatus::Pending
        };
        self.transition(next, now_ms)?;
        self.attempts = attempts;
        self.last_error = Some(error.into());
        if next == OutboxStatus::Pending {
            self.next_attempt_at = next_attempt_at;
        }
        Ok(next)
    }

    /// Whether the record is eligible for a delivery attempt at `now_ms`.
    pub fn is_due(&self, now_ms: i64) -> bool {
        self.status == OutboxStatus::Pending && self.next_attempt_at <= now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_derivation_is_deterministic() {
        assert_eq!(outbox_id("org1", "evt1"), "notif:org1:evt1");
        assert_eq!(
            OutboxRecord::for_event("org1", "evt1", 0).id,
            OutboxRecord::for_event("org1", "evt1", 99).id,
        );
    }

    #[test]
    fn new_record_starts_pending_with_zero_attempts() {
        let record = OutboxRecord::for_event("org1", "evt1", 1000);
        assert_eq!(record.status, OutboxStatus::Pending);
        assert_eq!(record.attempts, 0);
        assert_eq!(record.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert!(record.is_due(1000));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OutboxStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&OutboxStatus::Dead).unwrap(),
            "\"dead\""
        );
    }

    #[test]
    fn happy_path_transitions() {
        let mut record = OutboxRecord::for_event("org1", "evt1", 0);
        record.begin_processing(1).unwrap();
        assert_eq!(record.status, OutboxStatus::Processing);
        record.complete(2).unwrap();
        assert_eq!(record.status, OutboxStatus::Done);
    }

    #[test]
    fn failure_requeues_until_ceiling_then_dead_letters() {
        let mut record = OutboxRecord::for_event("org1", "evt1", 0);
        for attempt in 1..DEFAULT_MAX_ATTEMPTS {
            record.begin_processing(0).unwrap();
            let status = record.record_failure("sink unreachable", 1000, 0).unwrap();
            assert_eq!(status, OutboxStatus::Pending);
            assert_eq!(record.attempts, attempt);
            assert_eq!(record.next_attempt_at, 1000);
        }
        record.begin_processing(0).unwrap();
        let status = record.record_failure("sink unreachable", 2000, 0).unwrap();
        assert_eq!(status, OutboxStatus::Dead);
        assert_eq!(record.attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn terminal_states_reject_transitions() {
        let mut record = OutboxRecord::for_event("org1", "evt1", 0);
        record.begin_processing(0).unwrap();
        record.complete(0).unwrap();
        assert!(record.begin_processing(0).is_err());

        // dead → pending is not expressible either
        assert!(!OutboxStatus::Dead.can_transition(OutboxStatus::Pending));
        assert!(!OutboxStatus::Done.can_transition(OutboxStatus::Processing));
    }

    #[test]
    fn pending_record_not_due_before_next_attempt_at() {
        let mut record = OutboxRecord::for_event("org1", "evt1", 0);
        record.begin_processing(0).unwrap();
        record.record_failure("boom", 5000, 0).unwrap();
        assert!(!record.is_due(4999));
        assert!(record.is_due(5000));
    }
}
