//! Observability for the Conference Gateway.
//!
//! Prometheus metrics definitions and recorder setup. Tracing is initialized
//! by `common::observability`.

pub mod metrics;
