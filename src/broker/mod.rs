//! Broker side of a session
//!
//! `LoopbackBroker` answers a single client in-process, and `InboundMessage`
//! is what any broker delivers back to the client.

pub mod engine;
pub mod message;

pub use engine::LoopbackBroker;
pub use message::InboundMessage;
