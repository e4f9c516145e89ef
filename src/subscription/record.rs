use chrono::{DateTime, Utc};
use serde::Serialize;

use super::state::SubscriptionState;
use crate::topic::Pattern;

/// Bookkeeping for one subscription pattern.
///
/// `message_count` and `last_received_at` survive every state change and are
/// only lost when the record itself is deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionRecord {
    pattern: Pattern,
    state: SubscriptionState,
    message_count: u64,
    last_received_at: Option<DateTime<Utc>>,
}

impl SubscriptionRecord {
    pub(crate) fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            state: SubscriptionState::PendingAdd,
            message_count: 0,
            last_received_at: None,
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn state(&self) -> &SubscriptionState {
        &self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error()
    }

    pub fn message_count(&self) -> u64 {
        self.message_count
    }

    pub fn last_received_at(&self) -> Option<DateTime<Utc>> {
        self.last_received_at
    }

    /// Replaces the state and returns the previous one.
    pub(crate) fn set_state(&mut self, state: SubscriptionState) -> SubscriptionState {
        std::mem::replace(&mut self.state, state)
    }

    pub(crate) fn record_message(&mut self, at: DateTime<Utc>) {
        self.message_count += 1;
        self.last_received_at = Some(at);
    }
}
