//! Subscription registry
//!
//! The registry maps each pattern to its `SubscriptionRecord` and enforces the
//! lifecycle:
//!
//! ```text
//!   (new) --subscribe--> PendingAdd --ack--> Active --unsubscribe--> PendingRemove
//!                           ^                                            |
//!                           |                                           ack
//!             subscribe     |                                            v
//!   Inactive / Disconnected / Error  <------------------------------  Inactive
//! ```
//!
//! A broker error moves any record to `Error`; a lost connection moves every
//! subscribed or pending record to `Disconnected`.
//!
//! Usage notes:
//! - All operations are synchronous and expect one event at a time. The owner
//!   (a session) is the only writer.
//! - Broker acknowledgments are looked up by their correlation key, the
//!   pattern string. Acks for different patterns may arrive in any order.
//! - There is no timeout for pending states; a request the broker never
//!   answers stays pending.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::error::SubscriptionError;
use super::record::SubscriptionRecord;
use super::state::SubscriptionState;
use crate::topic::Pattern;

/// Reason stored when the broker rejects a pattern without saying why.
const DEFAULT_BROKER_ERROR: &str = "Subscription error";

/// What the caller must ask the broker for after an accepted transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerRequest {
    Subscribe,
    Unsubscribe,
}

/// An accepted state change. `from` is `None` when the record was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub pattern: Pattern,
    pub from: Option<SubscriptionState>,
    pub to: SubscriptionState,
}

impl Transition {
    pub fn request(&self) -> Option<BrokerRequest> {
        match self.to {
            SubscriptionState::PendingAdd => Some(BrokerRequest::Subscribe),
            SubscriptionState::PendingRemove => Some(BrokerRequest::Unsubscribe),
            _ => None,
        }
    }

    /// A subscribe request for a pattern that already had a record.
    pub fn is_resubscribe(&self) -> bool {
        self.from.is_some() && self.to == SubscriptionState::PendingAdd
    }
}

/// Result of feeding a broker acknowledgment into the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckOutcome {
    Confirmed(Transition),
    /// The ack does not fit the record's in-flight direction. Nothing changed.
    Mismatched {
        pattern: Pattern,
        state: SubscriptionState,
    },
}

#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    records: BTreeMap<Pattern, SubscriptionRecord>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    pub fn get(&self, pattern: &str) -> Option<&SubscriptionRecord> {
        self.records.get(pattern)
    }

    /// Records in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = &SubscriptionRecord> {
        self.records.values()
    }

    /// An owned copy of every record, in pattern order, for renderers.
    pub fn snapshot(&self) -> Vec<SubscriptionRecord> {
        self.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Creates a record in `PendingAdd`, or moves an inactive, disconnected or
    /// failed record back to `PendingAdd` keeping its counters.
    pub fn request_subscribe(&mut self, raw: &str) -> Result<Transition, SubscriptionError> {
        let pattern = normalize(raw)?;

        match self.records.entry(pattern.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(SubscriptionRecord::new(pattern.clone()));
                debug!("New subscription record for {pattern}");
                Ok(Transition {
                    pattern,
                    from: None,
                    to: SubscriptionState::PendingAdd,
                })
            }
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                if !record.state().can_resubscribe() {
                    return Err(SubscriptionError::DuplicateOrInFlight {
                        pattern: pattern.to_string(),
                        state: record.state().clone(),
                    });
                }
                let from = record.set_state(SubscriptionState::PendingAdd);
                debug!("Re-subscribing {pattern} from {from}");
                Ok(Transition {
                    pattern,
                    from: Some(from),
                    to: SubscriptionState::PendingAdd,
                })
            }
        }
    }

    /// Moves an `Active` record to `PendingRemove`.
    pub fn request_unsubscribe(&mut self, raw: &str) -> Result<Transition, SubscriptionError> {
        let pattern = normalize(raw)?;
        let record = self
            .records
            .get_mut(pattern.as_str())
            .ok_or_else(|| SubscriptionError::UnknownSubscription(pattern.to_string()))?;

        if *record.state() != SubscriptionState::Active {
            return Err(SubscriptionError::NotSubscribed {
                pattern: pattern.to_string(),
                state: record.state().clone(),
            });
        }

        let from = record.set_state(SubscriptionState::PendingRemove);
        Ok(Transition {
            pattern,
            from: Some(from),
            to: SubscriptionState::PendingRemove,
        })
    }

    /// Decides what a toggle of `raw` would do without changing anything.
    pub fn plan_toggle(&self, raw: &str) -> Result<BrokerRequest, SubscriptionError> {
        let pattern = normalize(raw)?;
        let record = self
            .records
            .get(pattern.as_str())
            .ok_or_else(|| SubscriptionError::UnknownSubscription(pattern.to_string()))?;

        match record.state() {
            state if state.is_in_flight() => Err(SubscriptionError::DuplicateOrInFlight {
                pattern: pattern.to_string(),
                state: state.clone(),
            }),
            SubscriptionState::Active => Ok(BrokerRequest::Unsubscribe),
            _ => Ok(BrokerRequest::Subscribe),
        }
    }

    /// Unsubscribes an active record, re-subscribes an inactive one and
    /// refuses while a request is in flight.
    pub fn toggle(&mut self, raw: &str) -> Result<Transition, SubscriptionError> {
        match self.plan_toggle(raw)? {
            BrokerRequest::Subscribe => self.request_subscribe(raw),
            BrokerRequest::Unsubscribe => self.request_unsubscribe(raw),
        }
    }

    /// Removes a record that is neither subscribed nor pending, returning it.
    pub fn delete(&mut self, raw: &str) -> Result<SubscriptionRecord, SubscriptionError> {
        let pattern = normalize(raw)?;
        let record = self
            .records
            .get(pattern.as_str())
            .ok_or_else(|| SubscriptionError::UnknownSubscription(pattern.to_string()))?;

        if record.state().is_protected() {
            return Err(SubscriptionError::ProtectedFromDelete {
                pattern: pattern.to_string(),
                state: record.state().clone(),
            });
        }

        self.records
            .remove(pattern.as_str())
            .ok_or_else(|| SubscriptionError::UnknownSubscription(pattern.to_string()))
    }

    /// Broker confirmed a subscribe request for `pattern`.
    pub fn ack_subscribe(&mut self, pattern: &str) -> Result<AckOutcome, SubscriptionError> {
        self.apply_ack(
            pattern,
            SubscriptionState::PendingAdd,
            SubscriptionState::Active,
        )
    }

    /// Broker confirmed an unsubscribe request for `pattern`.
    pub fn ack_unsubscribe(&mut self, pattern: &str) -> Result<AckOutcome, SubscriptionError> {
        self.apply_ack(
            pattern,
            SubscriptionState::PendingRemove,
            SubscriptionState::Inactive,
        )
    }

    /// Broker rejected `pattern`. The record moves to `Error` whatever its
    /// current state.
    pub fn fail(&mut self, pattern: &str, reason: &str) -> Result<Transition, SubscriptionError> {
        let record = self
            .records
            .get_mut(pattern)
            .ok_or_else(|| SubscriptionError::UnknownSubscription(pattern.to_string()))?;

        let reason = if reason.trim().is_empty() {
            DEFAULT_BROKER_ERROR.to_string()
        } else {
            reason.to_string()
        };

        let to = SubscriptionState::Error(reason);
        let from = record.set_state(to.clone());
        Ok(Transition {
            pattern: record.pattern().clone(),
            from: Some(from),
            to,
        })
    }

    /// Connection lost: every subscribed or pending record becomes
    /// `Disconnected`. Inactive and failed records are left alone.
    pub fn mark_disconnected(&mut self) -> Vec<Transition> {
        self.records
            .values_mut()
            .filter(|record| record.state().is_protected())
            .map(|record| {
                let from = record.set_state(SubscriptionState::Disconnected);
                Transition {
                    pattern: record.pattern().clone(),
                    from: Some(from),
                    to: SubscriptionState::Disconnected,
                }
            })
            .collect()
    }

    /// Counts an inbound message against every record whose pattern covers
    /// `topic`, whatever that record's state. Returns the matched patterns.
    pub fn attribute(&mut self, topic: &str, at: DateTime<Utc>) -> Vec<Pattern> {
        self.records
            .values_mut()
            .filter(|record| record.pattern().matches(topic))
            .map(|record| {
                record.record_message(at);
                record.pattern().clone()
            })
            .collect()
    }

    /// Whether any `Active` subscription covers `topic`.
    pub fn has_active_coverage(&self, topic: &str) -> bool {
        self.records.values().any(|record| {
            *record.state() == SubscriptionState::Active && record.pattern().matches(topic)
        })
    }

    fn apply_ack(
        &mut self,
        pattern: &str,
        expected: SubscriptionState,
        to: SubscriptionState,
    ) -> Result<AckOutcome, SubscriptionError> {
        let record = self
            .records
            .get_mut(pattern)
            .ok_or_else(|| SubscriptionError::UnknownSubscription(pattern.to_string()))?;

        if *record.state() != expected {
            warn!(
                "Acknowledgment for \"{}\" expected {} but local state was {}",
                pattern,
                expected,
                record.state()
            );
            return Ok(AckOutcome::Mismatched {
                pattern: record.pattern().clone(),
                state: record.state().clone(),
            });
        }

        let from = record.set_state(to.clone());
        Ok(AckOutcome::Confirmed(Transition {
            pattern: record.pattern().clone(),
            from: Some(from),
            to,
        }))
    }
}

fn normalize(raw: &str) -> Result<Pattern, SubscriptionError> {
    Pattern::normalize(raw).ok_or_else(|| SubscriptionError::InvalidPattern(raw.to_string()))
}
