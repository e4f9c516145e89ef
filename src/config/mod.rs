mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{
    ConnectionSettings, LoggingSettings, SessionSettings, Settings, TopicBuilderSettings,
};

/// Prefix of environment variables read by `load_config`, for example
/// `SUBSCOPE_CONNECTION__URL`.
pub const ENV_PREFIX: &str = "SUBSCOPE";

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct with every section filled in
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    let connection = partial.connection;
    let session = partial.session;
    let logging = partial.logging;
    let topic_builder = partial.topic_builder;

    Ok(Settings {
        connection: ConnectionSettings {
            url: connection
                .as_ref()
                .and_then(|c| c.url.clone())
                .unwrap_or(default.connection.url),
            vpn: connection
                .as_ref()
                .and_then(|c| c.vpn.clone())
                .unwrap_or(default.connection.vpn),
            username: connection
                .as_ref()
                .and_then(|c| c.username.clone())
                .unwrap_or(default.connection.username),
            password: connection
                .as_ref()
                .and_then(|c| c.password.clone())
                .unwrap_or(default.connection.password),
            client_name: connection
                .as_ref()
                .and_then(|c| c.client_name.clone())
                .unwrap_or(default.connection.client_name),
        },
        session: SessionSettings {
            activity_capacity: session
                .as_ref()
                .and_then(|s| s.activity_capacity)
                .unwrap_or(default.session.activity_capacity),
        },
        logging: LoggingSettings {
            level: logging
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.logging.level),
        },
        topic_builder: TopicBuilderSettings {
            domain: topic_builder
                .as_ref()
                .and_then(|b| b.domain.clone())
                .unwrap_or(default.topic_builder.domain),
            noun: topic_builder
                .as_ref()
                .and_then(|b| b.noun.clone())
                .unwrap_or(default.topic_builder.noun),
            verb: topic_builder
                .as_ref()
                .and_then(|b| b.verb.clone())
                .unwrap_or(default.topic_builder.verb),
            prop1: topic_builder
                .as_ref()
                .and_then(|b| b.prop1.clone())
                .unwrap_or(default.topic_builder.prop1),
            prop2: topic_builder
                .as_ref()
                .and_then(|b| b.prop2.clone())
                .unwrap_or(default.topic_builder.prop2),
            prop3: topic_builder
                .as_ref()
                .and_then(|b| b.prop3.clone())
                .unwrap_or(default.topic_builder.prop3),
        },
    })
}

#[cfg(test)]
mod tests;
