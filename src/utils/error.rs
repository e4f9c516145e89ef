//! The `error` module defines the error type returned by the `subscope`
//! binary's setup path.
//!
//! Errors raised while a session is running never reach this type: they are
//! rendered as banners and activity lines and the session carries on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
