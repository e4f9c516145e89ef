use std::collections::HashSet;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::broker::message::InboundMessage;
use crate::config::ConnectionSettings;
use crate::session::{BrokerEvent, BrokerTransport, TransportError};
use crate::topic::{topic_matches_pattern, validate_pattern, validate_topic};

/// URL schemes the loopback broker accepts on connect.
const SUPPORTED_SCHEMES: [&str; 4] = ["ws", "wss", "tcp", "tcps"];

/// An in-process broker serving a single client session.
///
/// Every request is answered right away on the event channel: acks for
/// accepted (un)subscriptions, `SubscribeError` for patterns the broker would
/// not accept, and the published message itself when one of the session's
/// subscriptions covers its topic. Overlapping subscriptions still deliver a
/// message only once, as a real broker does for one session.
#[derive(Debug)]
pub struct LoopbackBroker {
    events: UnboundedSender<BrokerEvent>,
    subscriptions: HashSet<String>,
    client_name: Option<String>,
}

impl LoopbackBroker {
    pub fn new(events: UnboundedSender<BrokerEvent>) -> Self {
        Self {
            events,
            subscriptions: HashSet::new(),
            client_name: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.client_name.is_some()
    }

    /// Broker-side subscriptions, sorted.
    pub fn subscriptions(&self) -> Vec<&str> {
        let mut patterns: Vec<&str> = self.subscriptions.iter().map(String::as_str).collect();
        patterns.sort_unstable();
        patterns
    }

    fn emit(&self, event: BrokerEvent) -> Result<(), TransportError> {
        self.events.send(event).map_err(|_| TransportError::Closed)
    }

    fn ensure_connected(&self) -> Result<(), TransportError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }
}

impl BrokerTransport for LoopbackBroker {
    fn connect(&mut self, settings: &ConnectionSettings) -> Result<(), TransportError> {
        let scheme = settings
            .url
            .split_once("://")
            .map(|(scheme, _)| scheme.to_lowercase());

        match scheme {
            Some(scheme) if SUPPORTED_SCHEMES.contains(&scheme.as_str()) => {
                info!(
                    "Client {} connected to vpn {}",
                    settings.client_name, settings.vpn
                );
                self.client_name = Some(settings.client_name.clone());
                self.emit(BrokerEvent::UpNotice)
            }
            _ => {
                warn!("Refusing connection to {}", settings.url);
                self.emit(BrokerEvent::ConnectFailed {
                    reason: format!("unsupported broker url '{}'", settings.url),
                })
            }
        }
    }

    fn disconnect(&mut self) -> Result<(), TransportError> {
        self.ensure_connected()?;
        if let Some(client) = self.client_name.take() {
            info!("Client {} disconnected", client);
        }
        self.subscriptions.clear();
        self.emit(BrokerEvent::Disconnected)
    }

    fn subscribe(&mut self, pattern: &str) -> Result<(), TransportError> {
        self.ensure_connected()?;

        if let Err(err) = validate_pattern(pattern) {
            debug!("Rejecting subscription {}: {}", pattern, err);
            return self.emit(BrokerEvent::SubscribeError {
                pattern: Some(pattern.to_string()),
                reason: Some(err.to_string()),
            });
        }

        self.subscriptions.insert(pattern.to_string());
        self.emit(BrokerEvent::SubscribeAck {
            pattern: pattern.to_string(),
        })
    }

    fn unsubscribe(&mut self, pattern: &str) -> Result<(), TransportError> {
        self.ensure_connected()?;
        self.subscriptions.remove(pattern);
        self.emit(BrokerEvent::UnsubscribeAck {
            pattern: pattern.to_string(),
        })
    }

    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError> {
        self.ensure_connected()?;
        validate_topic(topic).map_err(|err| TransportError::Rejected(err.to_string()))?;

        let covered = self
            .subscriptions
            .iter()
            .any(|pattern| topic_matches_pattern(topic, pattern));
        if !covered {
            debug!("No subscription covers {}; message dropped", topic);
            return Ok(());
        }

        self.emit(BrokerEvent::Message(InboundMessage::new(topic, payload)))
    }
}
