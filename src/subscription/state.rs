use std::fmt;

use serde::Serialize;

/// Where a subscription stands between the user and the broker.
///
/// The broker's rejection reason lives inside `Error`, so a record carries a
/// last error exactly when it is in the error state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "last_error", rename_all = "snake_case")]
pub enum SubscriptionState {
    PendingAdd,
    Active,
    PendingRemove,
    Inactive,
    Disconnected,
    Error(String),
}

impl SubscriptionState {
    /// Subscribed or waiting on the broker. Such records cannot be deleted.
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Active | Self::PendingAdd | Self::PendingRemove)
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::PendingAdd | Self::PendingRemove)
    }

    pub fn can_resubscribe(&self) -> bool {
        matches!(self, Self::Inactive | Self::Disconnected | Self::Error(_))
    }

    pub fn last_error(&self) -> Option<&str> {
        match self {
            Self::Error(reason) => Some(reason),
            _ => None,
        }
    }

    /// Human-facing status text for a subscription row.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PendingAdd => "Subscribing…",
            Self::Active => "Subscribed",
            Self::PendingRemove => "Unsubscribing…",
            Self::Inactive => "Unsubscribed",
            Self::Disconnected => "Not Active (Disconnected)",
            Self::Error(_) => "Error",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::PendingAdd => "pending_add",
            Self::Active => "active",
            Self::PendingRemove => "pending_remove",
            Self::Inactive => "inactive",
            Self::Disconnected => "disconnected",
            Self::Error(_) => "error",
        }
    }
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
