//! Topic builder
//!
//! Composes a publish topic out of named levels and proposes subscription
//! patterns that would cover it.

use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde_json::json;

use crate::config::TopicBuilderSettings;

use super::error::UnknownBuilderField;
use super::matcher::DELIMITER;

/// One of the six levels a `TopicBuilder` composes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderField {
    Domain,
    Noun,
    Verb,
    Prop1,
    Prop2,
    Prop3,
}

impl FromStr for BuilderField {
    type Err = UnknownBuilderField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "domain" => Ok(Self::Domain),
            "noun" => Ok(Self::Noun),
            "verb" => Ok(Self::Verb),
            "prop1" => Ok(Self::Prop1),
            "prop2" => Ok(Self::Prop2),
            "prop3" => Ok(Self::Prop3),
            other => Err(UnknownBuilderField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicBuilder {
    pub domain: String,
    pub noun: String,
    pub verb: String,
    pub prop1: String,
    pub prop2: String,
    pub prop3: String,
}

impl TopicBuilder {
    pub fn from_settings(settings: &TopicBuilderSettings) -> Self {
        Self {
            domain: settings.domain.clone(),
            noun: settings.noun.clone(),
            verb: settings.verb.clone(),
            prop1: settings.prop1.clone(),
            prop2: settings.prop2.clone(),
            prop3: settings.prop3.clone(),
        }
    }

    pub fn set(&mut self, field: BuilderField, value: &str) {
        let value = value.trim().to_string();
        match field {
            BuilderField::Domain => self.domain = value,
            BuilderField::Noun => self.noun = value,
            BuilderField::Verb => self.verb = value,
            BuilderField::Prop1 => self.prop1 = value,
            BuilderField::Prop2 => self.prop2 = value,
            BuilderField::Prop3 => self.prop3 = value,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn reset(&mut self, settings: &TopicBuilderSettings) {
        *self = Self::from_settings(settings);
    }

    /// Joins the non-empty levels with `/`. Empty levels are skipped rather
    /// than producing `a//b`.
    pub fn topic(&self) -> String {
        let delimiter = DELIMITER.to_string();
        self.levels()
            .into_iter()
            .map(str::trim)
            .filter(|level| !level.is_empty())
            .collect::<Vec<_>>()
            .join(delimiter.as_str())
    }

    /// Subscription patterns worth suggesting for the current levels, most
    /// general first.
    pub fn suggestions(&self) -> Vec<String> {
        let domain = self.domain.trim();
        let noun = self.noun.trim();
        let verb = self.verb.trim();
        let prop1 = self.prop1.trim();
        let prop3 = self.prop3.trim();

        let mut suggestions = Vec::new();
        if domain.is_empty() {
            return suggestions;
        }

        suggestions.push(format!("{domain}/>"));
        if !noun.is_empty() && !prop1.is_empty() {
            suggestions.push(format!("{domain}/{noun}/*/{prop1}/*/*"));
        }
        if !noun.is_empty() && !verb.is_empty() {
            suggestions.push(format!("{domain}/{noun}/{verb}/>"));
        }
        if !noun.is_empty() && !prop3.is_empty() {
            suggestions.push(format!("{domain}/{noun}/*/*/*/{prop3}"));
        }
        suggestions
    }

    /// A small JSON document describing the sender, for quick publishing.
    pub fn sample_payload(&self) -> String {
        let payload = json!({
            "country": self.prop1,
            "language": self.prop2,
            "msgId": self.prop3,
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        });
        serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string())
    }

    fn levels(&self) -> [&str; 6] {
        [
            &self.domain,
            &self.noun,
            &self.verb,
            &self.prop1,
            &self.prop2,
            &self.prop3,
        ]
    }
}
