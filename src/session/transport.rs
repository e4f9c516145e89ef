use thiserror::Error;

use crate::config::ConnectionSettings;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("not connected")]
    NotConnected,

    #[error("event channel closed")]
    Closed,

    #[error("{0}")]
    Rejected(String),
}

/// Outbound half of a broker session.
///
/// Each call only hands the request to the broker. Its result arrives later as
/// a `BrokerEvent`; an `Err` here means the request never left.
pub trait BrokerTransport {
    fn connect(&mut self, settings: &ConnectionSettings) -> Result<(), TransportError>;

    fn disconnect(&mut self) -> Result<(), TransportError>;

    /// Requests a subscription. `pattern` doubles as the correlation key.
    fn subscribe(&mut self, pattern: &str) -> Result<(), TransportError>;

    fn unsubscribe(&mut self, pattern: &str) -> Result<(), TransportError>;

    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError>;
}
