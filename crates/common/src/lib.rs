//! Common utilities and types shared across Lectern components.

#![warn(clippy::pedantic)]

/// Module for logging setup shared by every binary
pub mod observability;

/// Module for secret types that prevent accidental logging
pub mod secret;
