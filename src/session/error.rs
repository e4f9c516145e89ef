use thiserror::Error;

use super::transport::TransportError;
use crate::subscription::SubscriptionError;

/// Why a user action on the session was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("not connected to a broker")]
    NotConnected,

    #[error("connect already in progress")]
    ConnectInProgress,

    #[error("missing connection details: {}", .0.join(", "))]
    MissingConnectionDetails(Vec<&'static str>),

    #[error("no topic given")]
    MissingTopic,

    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}
