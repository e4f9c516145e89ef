use crate::broker::message::InboundMessage;

/// Everything a broker session reports back to the client.
///
/// Subscription acknowledgments and errors carry the pattern they answer as a
/// correlation key. Acks for different patterns may arrive in any order.
#[derive(Debug, Clone, PartialEq)]
pub enum BrokerEvent {
    /// The session is up.
    UpNotice,
    ConnectFailed {
        reason: String,
    },
    Disconnected,
    SubscribeAck {
        pattern: String,
    },
    UnsubscribeAck {
        pattern: String,
    },
    /// `pattern` is `None` when the broker did not echo a correlation key.
    SubscribeError {
        pattern: Option<String>,
        reason: Option<String>,
    },
    Message(InboundMessage),
}
