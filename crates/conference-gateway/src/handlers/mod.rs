//! HTTP request handlers for the Conference Gateway.

pub mod bbb;
pub mod health;
pub mod jitsi;
pub mod metrics;
pub mod recordings;

pub use bbb::{
    create_meeting, end_meeting, get_meeting_info, get_meetings, get_recordings,
    init_sample_meetings, join_meeting,
};
pub use health::{api_test, health_check};
pub use metrics::metrics_handler;
pub use recordings::serve_recording;
