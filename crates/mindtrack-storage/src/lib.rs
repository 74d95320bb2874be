//! mindtrack-storage
//!
//! Collaborator interfaces the assessment engine depends on (document
//! store, local key-value cache, identity) plus in-memory and local-disk
//! implementations.

pub mod cache;
pub mod error;
pub mod identity;
pub mod local;
pub mod memory;
pub mod store;
