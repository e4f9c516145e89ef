use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;

use super::matcher::topic_matches_pattern;

/// A normalized subscription pattern.
///
/// Also serves as the correlation key for broker acknowledgments, so two
/// patterns are the same subscription exactly when their strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Pattern(String);

impl Pattern {
    /// Strips every whitespace character from `raw`. Returns `None` when
    /// nothing is left.
    pub fn normalize(raw: &str) -> Option<Self> {
        let normalized: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this pattern covers `topic`.
    pub fn matches(&self, topic: &str) -> bool {
        topic_matches_pattern(topic, &self.0)
    }
}

impl Borrow<str> for Pattern {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Pattern {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
