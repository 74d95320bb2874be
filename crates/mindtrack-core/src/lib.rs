//! mindtrack-core
//!
//! Pure domain types and storage key conventions. No I/O. This is the
//! shared vocabulary of the MindTrack assessment engine.

pub mod error;
pub mod keys;
pub mod models;
