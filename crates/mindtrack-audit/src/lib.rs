//! mindtrack-audit
//!
//! Application-level audit trail, written to the `tracing` pipeline.

pub mod events;
