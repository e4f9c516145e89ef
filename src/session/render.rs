use std::fmt;

use super::activity::ActivityEntry;
use crate::broker::message::InboundMessage;
use crate::subscription::SubscriptionRecord;

/// Which status banner a notice belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerArea {
    Connection,
    Subscriptions,
    Publish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerLevel {
    Info,
    Success,
    Warn,
    Error,
}

impl fmt::Display for BannerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Info => "INFO",
            Self::Success => "OK",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub area: BannerArea,
    pub level: BannerLevel,
    pub title: String,
    pub hint: String,
}

impl Banner {
    pub fn new(
        area: BannerArea,
        level: BannerLevel,
        title: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self {
            area,
            level,
            title: title.into(),
            hint: hint.into(),
        }
    }
}

/// Presentation side of a session. Receives read-only views only.
pub trait Renderer {
    /// Called after any change to the subscription records, with all of them
    /// in pattern order.
    fn subscriptions_changed(&mut self, records: &[SubscriptionRecord]);

    fn banner(&mut self, banner: Banner);

    fn clear_banner(&mut self, area: BannerArea);

    fn activity(&mut self, entry: &ActivityEntry);

    fn message_received(&mut self, message: &InboundMessage);
}
