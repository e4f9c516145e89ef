//! # Subscope
//!
//! `subscope` is an interactive publish/subscribe demo client. It tracks every
//! subscription pattern the user asks for through its lifecycle with a broker
//! and attributes each inbound message to the patterns that cover its topic.
//!
//! ## Core Modules
//!
//! - `topic`: Topic and pattern syntax, wildcard matching and the topic builder.
//! - `subscription`: The subscription registry and its state machine.
//! - `session`: The controller that connects user commands, broker events and rendering.
//! - `broker`: An in-process loopback broker and the inbound message type.
//! - `console`: A plain-text renderer for terminals.
//! - `config`: Loads settings from files and the environment.
//! - `utils`: Shared utilities, such as error handling and logging setup.

pub mod broker;
pub mod config;
pub mod console;
pub mod session;
pub mod subscription;
pub mod topic;
pub mod utils;
