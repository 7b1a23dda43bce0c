//! Repository layer for the Conference Gateway.
//!
//! The conferencing server owns all BigBlueButton state; the only local
//! state is the in-memory Jitsi demo store.

pub mod meeting_store;

pub use meeting_store::MeetingStore;
