//! The `topic` module knows how hierarchical topics and subscription patterns
//! are shaped and how one covers the other.
//!
//! Topics and patterns are `/`-separated levels. A pattern level may be the
//! single-level wildcard `*` or, as its last level, the multi-level wildcard `>`.

pub mod builder;
pub mod error;
pub mod matcher;
pub mod pattern;

pub use builder::{BuilderField, TopicBuilder};
pub use error::{PatternError, UnknownBuilderField};
pub use matcher::{topic_matches_pattern, validate_pattern, validate_topic};
pub use pattern::Pattern;
