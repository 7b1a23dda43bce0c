//! # Gateway Test Utilities
//!
//! Shared test utilities for the Conference Gateway.
//!
//! This crate provides:
//! - Server test harness (`TestGatewayServer` for E2E tests)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gateway_test_utils::*;
//! use wiremock::MockServer;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let upstream = MockServer::start().await;
//!     let server = TestGatewayServer::spawn(&upstream.uri()).await?;
//!
//!     let response = reqwest::get(format!("{}/health", server.url())).await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod server_harness;

// Re-export commonly used items
pub use server_harness::*;
