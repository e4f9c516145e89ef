use thiserror::Error;

/// Syntax problems a broker reports for a topic or subscription pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("topic is empty")]
    Empty,

    #[error("level {index} is empty")]
    EmptyLevel { index: usize },

    #[error("multi-level wildcard '>' at level {index} is not the last level")]
    MisplacedMultiLevel { index: usize },

    #[error("wildcard at level {index} is not allowed in a publish topic")]
    WildcardInTopic { index: usize },
}

/// A topic builder level name that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown builder field '{0}'")]
pub struct UnknownBuilderField(pub String);
