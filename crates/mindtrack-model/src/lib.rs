//! mindtrack-model
//!
//! Feature derivation and risk classification. Scores go in, a bounded
//! risk value and a three-band category come out.

pub mod backend;
pub mod category;
pub mod classifier;
pub mod error;
pub mod features;
