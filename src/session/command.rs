//! Console commands
//!
//! One line of user input maps to one `Command`. Parsing is whitespace based;
//! everything after the topic of `pub` is the payload, verbatim.

use std::str::FromStr;

use thiserror::Error;

use crate::topic::{BuilderField, UnknownBuilderField};

pub const HELP: &str = "\
commands:
  connect                      connect, or disconnect when connected
  disconnect                   end the session
  sub <pattern>                subscribe (wildcards: * one level, > the rest)
  unsub <pattern>              unsubscribe
  toggle <pattern>             unsubscribe if subscribed, else re-subscribe
  delete <pattern>             forget an unsubscribed pattern
  pub <topic> [payload...]     publish
  pubb [payload...]            publish to the builder topic (sample JSON if no payload)
  builder [show|clear|reset]   show or reset the topic builder
  builder set <field> <value>  set domain|noun|verb|prop1|prop2|prop3
  list                         show subscriptions
  log | clear-log              show or clear the activity log
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderCommand {
    Show,
    Clear,
    Reset,
    Set(BuilderField, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ConnectToggle,
    Disconnect,
    Subscribe(String),
    Unsubscribe(String),
    Toggle(String),
    Delete(String),
    Publish { topic: String, payload: String },
    PublishFromBuilder { payload: Option<String> },
    Builder(BuilderCommand),
    List,
    Log,
    ClearLog,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    BuilderField(#[from] UnknownBuilderField),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "connect" => Ok(Self::ConnectToggle),
            "disconnect" => Ok(Self::Disconnect),
            "sub" | "subscribe" => required(rest, "sub", "a pattern").map(Self::Subscribe),
            "unsub" | "unsubscribe" => required(rest, "unsub", "a pattern").map(Self::Unsubscribe),
            "toggle" => required(rest, "toggle", "a pattern").map(Self::Toggle),
            "delete" | "del" => required(rest, "delete", "a pattern").map(Self::Delete),
            "pub" | "publish" => {
                let rest = required(rest, "pub", "a topic")?;
                let (topic, payload) = match rest.split_once(char::is_whitespace) {
                    Some((topic, payload)) => (topic, payload.trim_start()),
                    None => (rest.as_str(), ""),
                };
                Ok(Self::Publish {
                    topic: topic.to_string(),
                    payload: payload.to_string(),
                })
            }
            "pubb" => Ok(Self::PublishFromBuilder {
                payload: (!rest.is_empty()).then(|| rest.to_string()),
            }),
            "builder" => parse_builder(rest).map(Self::Builder),
            "list" | "ls" => Ok(Self::List),
            "log" => Ok(Self::Log),
            "clear-log" => Ok(Self::ClearLog),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn required(
    rest: &str,
    command: &'static str,
    argument: &'static str,
) -> Result<String, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { command, argument })
    } else {
        Ok(rest.to_string())
    }
}

fn parse_builder(rest: &str) -> Result<BuilderCommand, CommandError> {
    let (action, rest) = split_word(rest);
    match action {
        "" | "show" => Ok(BuilderCommand::Show),
        "clear" => Ok(BuilderCommand::Clear),
        "reset" => Ok(BuilderCommand::Reset),
        "set" => {
            let (field, value) = split_word(rest);
            if field.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "builder set",
                    argument: "a field",
                });
            }
            let field = field.parse::<BuilderField>()?;
            Ok(BuilderCommand::Set(field, value.to_string()))
        }
        other => Err(CommandError::InvalidArgument(format!(
            "unknown builder action '{other}'"
        ))),
    }
}

/// First whitespace-separated word of `text` and the trimmed remainder.
fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}
