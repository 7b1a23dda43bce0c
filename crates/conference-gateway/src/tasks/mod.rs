//! Background tasks for the Conference Gateway.
//!
//! # Tasks
//!
//! - `sample_meetings` - One-shot startup warm-up of the sample meeting

pub mod sample_meetings;

pub use sample_meetings::{warm_up, WarmupOutcome};
