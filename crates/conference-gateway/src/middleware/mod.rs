//! Middleware for the Conference Gateway.
//!
//! # Components
//!
//! - `http_metrics` - Records every HTTP response, including framework rejections

pub mod http_metrics;

pub use http_metrics::http_metrics_middleware;
