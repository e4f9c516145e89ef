//! Session controller
//!
//! `Session` is the one place user actions and broker events meet. It owns the
//! subscription registry and decides, for each input, what to ask the broker,
//! what to tell the renderer and what to write to the activity log.
//!
//! The registry only ever changes through the session, and the session only
//! ever handles one input at a time, so nothing here is shared or locked.

use tracing::{debug, warn};

use super::activity::ActivityLog;
use super::command::{BuilderCommand, Command};
use super::error::SessionError;
use super::event::BrokerEvent;
use super::render::{Banner, BannerArea, BannerLevel, Renderer};
use super::transport::BrokerTransport;
use crate::broker::message::InboundMessage;
use crate::config::Settings;
use crate::subscription::{
    AckOutcome, BrokerRequest, SubscriptionError, SubscriptionRecord, SubscriptionRegistry,
    SubscriptionState, Transition,
};
use crate::topic::{Pattern, TopicBuilder};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// What happened to a message the user published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub topic: String,
    /// Whether an active subscription of ours covers the topic.
    pub covered: bool,
}

pub struct Session<T, R> {
    registry: SubscriptionRegistry,
    transport: T,
    renderer: R,
    activity: ActivityLog,
    builder: TopicBuilder,
    settings: Settings,
    connection: ConnectionState,
}

impl<T: BrokerTransport, R: Renderer> Session<T, R> {
    pub fn new(settings: Settings, transport: T, renderer: R) -> Self {
        let mut session = Self {
            registry: SubscriptionRegistry::new(),
            transport,
            renderer,
            activity: ActivityLog::new(settings.session.activity_capacity),
            builder: TopicBuilder::from_settings(&settings.topic_builder),
            settings,
            connection: ConnectionState::Disconnected,
        };
        session.notify(
            BannerArea::Connection,
            BannerLevel::Info,
            "Disconnected",
            "Check the connection settings, then run 'connect'.",
        );
        session.log("Ready. Enter broker details, then connect.");
        session
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn builder(&self) -> &TopicBuilder {
        &self.builder
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Runs one console command.
    pub fn execute(&mut self, command: Command) -> Result<(), SessionError> {
        match command {
            Command::ConnectToggle => self.connect_toggle(),
            Command::Disconnect => self.disconnect(),
            Command::Subscribe(pattern) => self.add_subscription(&pattern).map(|_| ()),
            Command::Unsubscribe(pattern) => self.unsubscribe(&pattern).map(|_| ()),
            Command::Toggle(pattern) => self.toggle(&pattern).map(|_| ()),
            Command::Delete(pattern) => self.delete(&pattern).map(|_| ()),
            Command::Publish { topic, payload } => self.publish(&topic, &payload).map(|_| ()),
            Command::PublishFromBuilder { payload } => {
                self.publish_from_builder(payload.as_deref()).map(|_| ())
            }
            Command::Builder(action) => {
                self.update_builder(action);
                Ok(())
            }
            Command::List => {
                self.render();
                Ok(())
            }
            Command::Log => {
                for entry in self.activity.entries() {
                    self.renderer.activity(entry);
                }
                Ok(())
            }
            Command::ClearLog => {
                self.activity.clear();
                Ok(())
            }
            Command::Help | Command::Quit => Ok(()),
        }
    }

    /// Connects when disconnected, disconnects when connected, and refuses
    /// while a connect is in progress.
    pub fn connect_toggle(&mut self) -> Result<(), SessionError> {
        match self.connection {
            ConnectionState::Connecting => {
                self.notify(
                    BannerArea::Connection,
                    BannerLevel::Info,
                    "Connecting",
                    "Please wait…",
                );
                self.log("Connect already in progress.");
                Err(SessionError::ConnectInProgress)
            }
            ConnectionState::Connected => self.disconnect(),
            ConnectionState::Disconnected => self.connect(),
        }
    }

    pub fn disconnect(&mut self) -> Result<(), SessionError> {
        if self.connection == ConnectionState::Disconnected {
            self.notify(
                BannerArea::Connection,
                BannerLevel::Warn,
                "Not connected",
                "There is no session to end.",
            );
            self.log("Cannot disconnect: not connected.");
            return Err(SessionError::NotConnected);
        }

        self.notify(
            BannerArea::Connection,
            BannerLevel::Warn,
            "Disconnecting",
            "Ending the session…",
        );
        if let Err(err) = self.transport.disconnect() {
            self.log(format!("Disconnect failed: {err}"));
            self.notify(
                BannerArea::Connection,
                BannerLevel::Error,
                "Disconnect failed",
                "See the activity log for details.",
            );
            return Err(err.into());
        }
        Ok(())
    }

    /// Adds a subscription for `raw`, or re-subscribes an existing inactive
    /// one.
    pub fn add_subscription(&mut self, raw: &str) -> Result<Transition, SessionError> {
        self.renderer.clear_banner(BannerArea::Subscriptions);

        let Some(pattern) = Pattern::normalize(raw) else {
            self.notify(
                BannerArea::Subscriptions,
                BannerLevel::Warn,
                "Missing pattern",
                "Enter a subscription pattern (for example: workshop/*).",
            );
            self.log("Cannot subscribe: please enter a subscription pattern.");
            return Err(SubscriptionError::InvalidPattern(raw.to_string()).into());
        };

        self.ensure_connected(BannerArea::Subscriptions, "subscribe")?;

        let transition = self
            .registry
            .request_subscribe(pattern.as_str())
            .map_err(|err| self.refuse(err))?;
        self.issue(transition)
    }

    pub fn unsubscribe(&mut self, raw: &str) -> Result<Transition, SessionError> {
        self.renderer.clear_banner(BannerArea::Subscriptions);
        self.ensure_connected(BannerArea::Subscriptions, "unsubscribe")?;

        let transition = self
            .registry
            .request_unsubscribe(raw)
            .map_err(|err| self.refuse(err))?;
        self.issue(transition)
    }

    /// Unsubscribes an active pattern or re-subscribes an inactive one.
    pub fn toggle(&mut self, raw: &str) -> Result<Transition, SessionError> {
        self.renderer.clear_banner(BannerArea::Subscriptions);

        let request = self
            .registry
            .plan_toggle(raw)
            .map_err(|err| self.refuse(err))?;
        let verb = match request {
            BrokerRequest::Subscribe => "subscribe",
            BrokerRequest::Unsubscribe => "unsubscribe",
        };
        self.ensure_connected(BannerArea::Subscriptions, verb)?;

        let transition = self.registry.toggle(raw).map_err(|err| self.refuse(err))?;
        self.issue(transition)
    }

    /// Forgets a pattern that is neither subscribed nor pending. Works while
    /// disconnected.
    pub fn delete(&mut self, raw: &str) -> Result<SubscriptionRecord, SessionError> {
        self.renderer.clear_banner(BannerArea::Subscriptions);

        let record = self.registry.delete(raw).map_err(|err| self.refuse(err))?;
        self.log(format!("Deleted subscription entry: {}", record.pattern()));
        self.render();
        Ok(record)
    }

    pub fn publish(&mut self, topic: &str, payload: &str) -> Result<PublishReport, SessionError> {
        self.renderer.clear_banner(BannerArea::Publish);
        self.ensure_connected(BannerArea::Publish, "publish")?;

        let topic = topic.trim();
        if topic.is_empty() {
            self.notify(
                BannerArea::Publish,
                BannerLevel::Warn,
                "Missing topic",
                "Enter a topic before publishing.",
            );
            self.log("Cannot publish: please specify a topic.");
            return Err(SessionError::MissingTopic);
        }

        if let Err(err) = self.transport.publish(topic, payload) {
            self.notify(
                BannerArea::Publish,
                BannerLevel::Error,
                "Publish failed",
                err.to_string(),
            );
            self.log(format!("Publish failed: {err}"));
            return Err(err.into());
        }

        let covered = self.registry.has_active_coverage(topic);
        if !covered {
            self.notify(
                BannerArea::Publish,
                BannerLevel::Info,
                "Published",
                "Hint: the topic of this message is not covered by any active subscription.",
            );
        }
        self.log(format!("Published message to: {topic}"));

        Ok(PublishReport {
            topic: topic.to_string(),
            covered,
        })
    }

    /// Publishes to the topic builder's topic. Without a payload, the builder's
    /// sample JSON document is sent.
    pub fn publish_from_builder(
        &mut self,
        payload: Option<&str>,
    ) -> Result<PublishReport, SessionError> {
        let topic = self.builder.topic();
        let payload = match payload {
            Some(payload) => payload.to_string(),
            None => self.builder.sample_payload(),
        };
        self.publish(&topic, &payload)
    }

    pub fn update_builder(&mut self, action: BuilderCommand) {
        match action {
            BuilderCommand::Show => {}
            BuilderCommand::Clear => self.builder.clear(),
            BuilderCommand::Reset => self.builder.reset(&self.settings.topic_builder),
            BuilderCommand::Set(field, value) => self.builder.set(field, &value),
        }

        let topic = self.builder.topic();
        self.log(format!("Topic builder: {topic}"));
        let suggestions = self.builder.suggestions();
        if !suggestions.is_empty() {
            self.log(format!("Suggested patterns: {}", suggestions.join("  ")));
        }
    }

    /// Applies one broker event.
    pub fn handle_event(&mut self, event: BrokerEvent) {
        match event {
            BrokerEvent::UpNotice => {
                self.connection = ConnectionState::Connected;
                self.notify(
                    BannerArea::Connection,
                    BannerLevel::Success,
                    "Connected",
                    "Add a subscription pattern to start receiving messages.",
                );
                self.renderer.clear_banner(BannerArea::Subscriptions);
                self.renderer.clear_banner(BannerArea::Publish);
                self.log("Connected.");
                self.render();
            }
            BrokerEvent::ConnectFailed { reason } => {
                self.notify(
                    BannerArea::Connection,
                    BannerLevel::Error,
                    "Connection failed",
                    "Check URL/VPN/credentials. Then try connect again.",
                );
                self.log(format!("Connect failed: {reason}"));
                self.connection_lost();
            }
            BrokerEvent::Disconnected => {
                self.notify(
                    BannerArea::Connection,
                    BannerLevel::Warn,
                    "Disconnected",
                    "Reconnect to continue. Existing subscription rows are kept, \
                     but are not active until you re-subscribe.",
                );
                self.log("Disconnected.");
                self.connection_lost();
            }
            BrokerEvent::SubscribeAck { pattern } => {
                self.on_ack(&pattern, BrokerRequest::Subscribe);
            }
            BrokerEvent::UnsubscribeAck { pattern } => {
                self.on_ack(&pattern, BrokerRequest::Unsubscribe);
            }
            BrokerEvent::SubscribeError { pattern, reason } => {
                self.on_subscribe_error(pattern, reason);
            }
            BrokerEvent::Message(message) => self.on_message(message),
        }
    }

    fn connect(&mut self) -> Result<(), SessionError> {
        let missing = self.settings.connection.missing_fields();
        if !missing.is_empty() {
            self.notify(
                BannerArea::Connection,
                BannerLevel::Warn,
                "Missing connection details",
                format!("Set {} in the configuration.", missing.join(", ")),
            );
            self.log("Cannot connect: please specify all connection fields.");
            return Err(SessionError::MissingConnectionDetails(missing));
        }

        self.connection = ConnectionState::Connecting;
        self.notify(
            BannerArea::Connection,
            BannerLevel::Info,
            "Connecting",
            "Opening a session to the broker…",
        );
        self.log(format!(
            "Connecting to broker at {}",
            self.settings.connection.url
        ));

        if let Err(err) = self.transport.connect(&self.settings.connection) {
            self.connection = ConnectionState::Disconnected;
            self.log(format!("Connect failed: {err}"));
            self.notify(
                BannerArea::Connection,
                BannerLevel::Error,
                "Connect failed",
                "Check URL/VPN/credentials. Then try connect again.",
            );
            return Err(err.into());
        }
        Ok(())
    }

    fn connection_lost(&mut self) {
        self.connection = ConnectionState::Disconnected;
        let transitions = self.registry.mark_disconnected();
        debug!("{} subscriptions marked disconnected", transitions.len());
        self.render();
    }

    fn on_ack(&mut self, pattern: &str, request: BrokerRequest) {
        let outcome = match request {
            BrokerRequest::Subscribe => self.registry.ack_subscribe(pattern),
            BrokerRequest::Unsubscribe => self.registry.ack_unsubscribe(pattern),
        };

        match outcome {
            Ok(AckOutcome::Confirmed(transition)) => {
                let line = if transition.to == SubscriptionState::Active {
                    format!("Subscribed: {pattern}")
                } else {
                    format!("Unsubscribed: {pattern}")
                };
                self.log(line);
                self.renderer.clear_banner(BannerArea::Subscriptions);
                self.render();
            }
            Ok(AckOutcome::Mismatched { pattern, state }) => {
                self.log(format!(
                    "Subscription confirmation for \"{pattern}\" but local state was \"{state}\"."
                ));
            }
            Err(err) => {
                debug!("Ignoring acknowledgment: {err}");
                self.log(format!("Subscription confirmation for unknown pattern: {pattern}"));
            }
        }
    }

    fn on_subscribe_error(&mut self, pattern: Option<String>, reason: Option<String>) {
        let Some(pattern) = pattern.filter(|pattern| !pattern.is_empty()) else {
            self.notify(
                BannerArea::Subscriptions,
                BannerLevel::Error,
                "Subscription error",
                "A subscription failed. Check the activity log for details.",
            );
            self.log("Subscription error (missing correlation key).");
            return;
        };

        match self.registry.fail(&pattern, reason.as_deref().unwrap_or("")) {
            Ok(transition) => {
                let rejected = SubscriptionError::BrokerRejected {
                    pattern,
                    reason: transition.to.last_error().unwrap_or_default().to_string(),
                };
                self.notify(
                    BannerArea::Subscriptions,
                    BannerLevel::Error,
                    rejected.title(),
                    rejected.to_string(),
                );
                self.log(rejected.to_string());
                self.render();
            }
            Err(err) => {
                debug!("Ignoring subscription error: {err}");
                self.notify(
                    BannerArea::Subscriptions,
                    BannerLevel::Error,
                    "Subscription error",
                    "A subscription failed. Check the activity log for details.",
                );
                self.log(format!("Subscription error for unknown pattern: {pattern}"));
            }
        }
    }

    fn on_message(&mut self, message: InboundMessage) {
        self.renderer.message_received(&message);
        let matched = self.registry.attribute(&message.topic, message.timestamp);
        if !matched.is_empty() {
            self.render();
        }
    }

    /// Sends the broker request an accepted transition calls for. If the
    /// request cannot even be sent, the record moves to `Error`.
    fn issue(&mut self, transition: Transition) -> Result<Transition, SessionError> {
        self.render();

        let pattern = transition.pattern.clone();
        let Some(request) = transition.request() else {
            return Ok(transition);
        };

        let (sent, failure_title) = match request {
            BrokerRequest::Subscribe => {
                let verb = if transition.is_resubscribe() {
                    "Re-subscribing"
                } else {
                    "Subscribing"
                };
                self.log(format!("{verb}: {pattern}"));
                (self.transport.subscribe(pattern.as_str()), "Subscribe failed")
            }
            BrokerRequest::Unsubscribe => {
                self.log(format!("Unsubscribing: {pattern}"));
                (
                    self.transport.unsubscribe(pattern.as_str()),
                    "Unsubscribe failed",
                )
            }
        };

        if let Err(err) = sent {
            let detail = err.to_string();
            self.notify(
                BannerArea::Subscriptions,
                BannerLevel::Error,
                failure_title,
                "Check the pattern for typos, then try again.",
            );
            self.log(format!("{failure_title}: {detail}"));
            if let Err(fail_err) = self.registry.fail(pattern.as_str(), &detail) {
                warn!("Could not record failure for {pattern}: {fail_err}");
            }
            self.render();
            return Err(err.into());
        }

        Ok(transition)
    }

    fn ensure_connected(&mut self, area: BannerArea, verb: &str) -> Result<(), SessionError> {
        if self.connection == ConnectionState::Connected {
            return Ok(());
        }
        self.notify(
            area,
            BannerLevel::Warn,
            "Not connected",
            format!("Connect before you {verb}."),
        );
        self.log(format!("Cannot {verb}: not connected."));
        Err(SessionError::NotConnected)
    }

    /// Reports a registry refusal and hands the error back.
    fn refuse(&mut self, err: SubscriptionError) -> SessionError {
        let hint = match &err {
            SubscriptionError::InvalidPattern(_) => "That subscription pattern is not valid.",
            SubscriptionError::DuplicateOrInFlight { state, .. } if state.is_in_flight() => {
                "That subscription is currently updating."
            }
            SubscriptionError::DuplicateOrInFlight { .. } => {
                "That pattern is already subscribed. Duplicates are not allowed."
            }
            SubscriptionError::NotSubscribed { .. } => "That row is not currently subscribed.",
            SubscriptionError::UnknownSubscription(_) => "That subscription row was not found.",
            SubscriptionError::ProtectedFromDelete { .. } => "Unsubscribe first, then delete.",
            SubscriptionError::BrokerRejected { .. } => "See the activity log for details.",
        };
        let level = if err.title() == "Please wait" {
            BannerLevel::Info
        } else {
            BannerLevel::Warn
        };
        self.notify(BannerArea::Subscriptions, level, err.title(), hint);
        self.log(err.to_string());
        err.into()
    }

    fn notify(
        &mut self,
        area: BannerArea,
        level: BannerLevel,
        title: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.renderer.banner(Banner::new(area, level, title, hint));
    }

    fn log(&mut self, line: impl Into<String>) {
        let entry = self.activity.push(line);
        self.renderer.activity(entry);
    }

    fn render(&mut self) {
        let snapshot = self.registry.snapshot();
        self.renderer.subscriptions_changed(&snapshot);
    }
}
