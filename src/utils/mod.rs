//! The `utils` module provides a collection of utility functions and common
//! definitions used across the `subscope` application.
//!
//! This module centralizes the application-level error type and the logging
//! setup shared by the binary and the tests.

pub mod error;
pub mod logging;
