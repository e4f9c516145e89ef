//! Subscription bookkeeping
//!
//! The `subscription` module owns the local view of every subscription the
//! user has asked for: one record per distinct pattern, the state machine that
//! moves it between pending, active and inactive states as user actions and
//! broker acknowledgments arrive, and the attribution of inbound messages to
//! the patterns that cover them.
//!
//! Nothing here talks to a broker or draws anything. Every operation returns
//! either a `Transition` describing what changed (and which broker request the
//! caller should now issue) or a `SubscriptionError` explaining why nothing did.

pub mod error;
pub mod record;
pub mod registry;
pub mod state;

pub use error::SubscriptionError;
pub use record::SubscriptionRecord;
pub use registry::{AckOutcome, BrokerRequest, SubscriptionRegistry, Transition};
pub use state::SubscriptionState;

#[cfg(test)]
mod tests;
