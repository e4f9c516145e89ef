//! Message definitions for the broker
//!
//! `InboundMessage` is what a broker session delivers to the client: the
//! concrete topic it was published on, the payload as text, and the time the
//! client received it.
//!
//! Notes on fields:
//! - `topic`: concrete topic, never a pattern
//! - `payload`: body as a String; often, but not necessarily, JSON
//! - `timestamp`: UTC receive time; used for subscription attribution

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: String,
    pub timestamp: DateTime<Utc>,
}

impl InboundMessage {
    /// Creates a message stamped with the current time.
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            timestamp: Utc::now(),
        }
    }

    /// The payload indented as JSON when it is a JSON object or array,
    /// otherwise unchanged.
    pub fn pretty_payload(&self) -> String {
        let trimmed = self.payload.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let looks_like_json = (trimmed.starts_with('{') && trimmed.ends_with('}'))
            || (trimmed.starts_with('[') && trimmed.ends_with(']'));
        if !looks_like_json {
            return self.payload.clone();
        }

        serde_json::from_str::<serde_json::Value>(trimmed)
            .and_then(|value| serde_json::to_string_pretty(&value))
            .unwrap_or_else(|_| self.payload.clone())
    }
}
