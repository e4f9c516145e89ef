//! Pattern matching
//!
//! A single left-to-right scan over the levels of a pattern and a topic.
//! Matching never fails loudly: anything that does not line up is simply
//! "no match".

use super::error::PatternError;

/// Separator between topic levels.
pub const DELIMITER: char = '/';

/// Matches exactly one level at its position.
pub const SINGLE_LEVEL_WILDCARD: &str = "*";

/// Matches every remaining level from its position to the end of the topic.
pub const MULTI_LEVEL_WILDCARD: &str = ">";

/// Returns `true` if `topic` is covered by `pattern`.
///
/// `>` succeeds as soon as the scan reaches it, so `a/>` covers `a/b/c` and
/// also the bare topic `a`. A topic with levels left over after the last
/// pattern level does not match.
pub fn topic_matches_pattern(topic: &str, pattern: &str) -> bool {
    let mut levels = topic.split(DELIMITER);

    for token in pattern.split(DELIMITER) {
        if token == MULTI_LEVEL_WILDCARD {
            return true;
        }

        let Some(level) = levels.next() else {
            return false;
        };

        if token != SINGLE_LEVEL_WILDCARD && token != level {
            return false;
        }
    }

    levels.next().is_none()
}

/// Checks a subscription pattern the way a broker would before accepting it.
pub fn validate_pattern(pattern: &str) -> Result<(), PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }

    let levels: Vec<&str> = pattern.split(DELIMITER).collect();
    let last = levels.len() - 1;

    for (index, level) in levels.iter().enumerate() {
        if level.is_empty() {
            return Err(PatternError::EmptyLevel { index });
        }
        if *level == MULTI_LEVEL_WILDCARD && index != last {
            return Err(PatternError::MisplacedMultiLevel { index });
        }
    }

    Ok(())
}

/// Checks a concrete publish topic: non-empty levels and no wildcards.
pub fn validate_topic(topic: &str) -> Result<(), PatternError> {
    if topic.is_empty() {
        return Err(PatternError::Empty);
    }

    for (index, level) in topic.split(DELIMITER).enumerate() {
        if level.is_empty() {
            return Err(PatternError::EmptyLevel { index });
        }
        if level == SINGLE_LEVEL_WILDCARD || level == MULTI_LEVEL_WILDCARD {
            return Err(PatternError::WildcardInTopic { index });
        }
    }

    Ok(())
}
