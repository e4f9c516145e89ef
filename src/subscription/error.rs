use thiserror::Error;

use super::state::SubscriptionState;

/// Why the registry refused a request, or why the broker refused a pattern.
///
/// Only `BrokerRejected` accompanies a state change (the record moves to
/// `Error`); every other variant means nothing was touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    #[error("invalid subscription pattern {0:?}")]
    InvalidPattern(String),

    #[error("\"{pattern}\" is already subscribed or still updating (state is {state})")]
    DuplicateOrInFlight {
        pattern: String,
        state: SubscriptionState,
    },

    #[error("cannot unsubscribe \"{pattern}\" because state is {state}: not currently subscribed")]
    NotSubscribed {
        pattern: String,
        state: SubscriptionState,
    },

    #[error("no subscription entry for \"{0}\"")]
    UnknownSubscription(String),

    #[error("cannot delete \"{pattern}\" because state is {state}: unsubscribe first")]
    ProtectedFromDelete {
        pattern: String,
        state: SubscriptionState,
    },

    #[error("subscription error for \"{pattern}\": {reason}")]
    BrokerRejected { pattern: String, reason: String },
}

impl SubscriptionError {
    /// Short headline for a status banner.
    pub fn title(&self) -> &'static str {
        match self {
            Self::InvalidPattern(_) => "Invalid pattern",
            Self::DuplicateOrInFlight { state, .. } if state.is_in_flight() => "Please wait",
            Self::DuplicateOrInFlight { .. } => "Duplicate subscription",
            Self::NotSubscribed { .. } => "Not subscribed",
            Self::UnknownSubscription(_) => "Unknown subscription",
            Self::ProtectedFromDelete { .. } => "Cannot delete yet",
            Self::BrokerRejected { .. } => "Subscription failed",
        }
    }
}
