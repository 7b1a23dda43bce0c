//! Service layer for the Conference Gateway.
//!
//! # Components
//!
//! - `signer` - Checksum signing of conferencing API calls
//! - `normalizer` - XML response parsing into `MeetingInfoResult`
//! - `bbb_client` - HTTP transport behind the `ConferenceApi` seam
//! - `meeting_service` - Create-if-missing policy and the proxy operations
//! - `jitsi` - Room names, meeting URLs and the demo store operations

pub mod bbb_client;
pub mod jitsi;
pub mod meeting_service;
pub mod normalizer;
pub mod signer;

pub use bbb_client::{BbbClient, ConferenceApi, MockConferenceApi, MockReply};
pub use jitsi::JitsiService;
pub use meeting_service::MeetingService;
pub use signer::{Operation, QueryParams, RequestSigner, SignedUrl};
