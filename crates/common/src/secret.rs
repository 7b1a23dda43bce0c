//! Secret types for values that must never reach a log line.
//!
//! Re-exports [`secrecy`] so every Lectern crate wraps the conferencing
//! server's shared API secret (and anything like it) the same way.
//! `SecretString` renders as `[REDACTED]` under `Debug`, so structs that
//! derive `Debug` stay safe to log, and the value is zeroized on drop.
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! let api_secret = SecretString::from("8cd8ef52e8e1");
//! assert!(!format!("{api_secret:?}").contains("8cd8ef52e8e1"));
//!
//! // Reading the value has to be explicit.
//! let raw: &str = api_secret.expose_secret();
//! assert_eq!(raw, "8cd8ef52e8e1");
//! ```
//!
//! Only the request signer should call `expose_secret()` on the API secret.

pub use secrecy::{ExposeSecret, SecretString};
