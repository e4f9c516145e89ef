use serde::Deserialize;
use uuid::Uuid;

/// Top-level configuration settings for the application.
///
/// Includes the broker connection, session bookkeeping, logging and the
/// topic builder's starting values.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub connection: ConnectionSettings,
    pub session: SessionSettings,
    pub logging: LoggingSettings,
    pub topic_builder: TopicBuilderSettings,
}

/// Where and as whom to connect.
///
/// All of `url`, `vpn`, `username` and `password` must be non-empty before a
/// connection attempt is made.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ConnectionSettings {
    pub url: String,
    pub vpn: String,
    pub username: String,
    pub password: String,
    pub client_name: String,
}

impl ConnectionSettings {
    /// Names of the required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("url", &self.url),
            ("vpn", &self.vpn),
            ("username", &self.username),
            ("password", &self.password),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Session bookkeeping limits.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SessionSettings {
    pub activity_capacity: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Initial levels of the topic builder.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TopicBuilderSettings {
    pub domain: String,
    pub noun: String,
    pub verb: String,
    pub prop1: String,
    pub prop2: String,
    pub prop3: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub connection: Option<PartialConnectionSettings>,
    pub session: Option<PartialSessionSettings>,
    pub logging: Option<PartialLoggingSettings>,
    pub topic_builder: Option<PartialTopicBuilderSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialConnectionSettings {
    pub url: Option<String>,
    pub vpn: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialSessionSettings {
    pub activity_capacity: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialTopicBuilderSettings {
    pub domain: Option<String>,
    pub noun: Option<String>,
    pub verb: Option<String>,
    pub prop1: Option<String>,
    pub prop2: Option<String>,
    pub prop3: Option<String>,
}

/// Provides default values for `Settings`.
///
/// The client name and the last builder level are randomized per process so
/// two demo clients on one broker do not collide.
impl Default for Settings {
    fn default() -> Self {
        let id = Uuid::new_v4();
        Self {
            connection: ConnectionSettings {
                url: "ws://localhost:8008".to_string(),
                vpn: "default".to_string(),
                username: String::new(),
                password: String::new(),
                client_name: format!("subscope-{}", id.simple()),
            },
            session: SessionSettings {
                activity_capacity: 500,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
            topic_builder: TopicBuilderSettings {
                domain: "workshop".to_string(),
                noun: "hello-message".to_string(),
                verb: "announced".to_string(),
                prop1: "united-states".to_string(),
                prop2: "english".to_string(),
                prop3: four_digit_id(&id),
            },
        }
    }
}

/// A number in `0001..=9999`, zero padded.
fn four_digit_id(id: &Uuid) -> String {
    let bytes = id.as_bytes();
    let n = u16::from_be_bytes([bytes[0], bytes[1]]) % 9999 + 1;
    format!("{n:04}")
}
