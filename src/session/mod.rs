//! Client session
//!
//! Everything between the console and the broker: the `Session` controller
//! that owns the subscription registry, the `BrokerTransport` and `Renderer`
//! seams it talks through, the bounded activity log, console command parsing
//! and the async loop that feeds it all.

pub mod activity;
pub mod command;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod render;
pub mod transport;

pub use activity::{ActivityEntry, ActivityLog};
pub use command::{BuilderCommand, Command, CommandError, HELP};
pub use controller::{ConnectionState, PublishReport, Session};
pub use dispatcher::run;
pub use error::SessionError;
pub use event::BrokerEvent;
pub use render::{Banner, BannerArea, BannerLevel, Renderer};
pub use transport::{BrokerTransport, TransportError};
