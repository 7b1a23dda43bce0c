//! Conference Gateway Library
//!
//! Signed-request proxy between the Lectern dashboard and the conferencing
//! servers:
//!
//! - BigBlueButton-compatible API calls signed with the shared secret, with
//!   XML responses normalized into JSON
//! - Create-if-missing handling for join and meeting-info lookups
//! - A Jitsi-compatible backend with an in-memory demo store
//!
//! # Architecture
//!
//! The gateway follows the Handler -> Service -> Repository pattern:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs -> repositories/*.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `extract` - JSON-or-query request extractor
//! - `handlers` - HTTP request handlers
//! - `middleware` - HTTP metrics middleware
//! - `models` - Wire models
//! - `observability` - Prometheus metrics
//! - `repositories` - In-memory Jitsi store
//! - `routes` - Axum router setup
//! - `services` - Signing, transport, normalization and meeting logic
//! - `tasks` - Startup warm-up

pub mod config;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod tasks;
