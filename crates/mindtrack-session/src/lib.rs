//! mindtrack-session
//!
//! Paginated answer collection for one instrument, ending in a single
//! immutable submission.
//!
//! [`machine::SessionMachine`] holds the state and decides every transition
//! without touching I/O; each transition returns the [`machine::Effect`]s it
//! needs. [`session::AssessmentSession`] runs those effects against the
//! injected collaborators.

pub mod error;
pub mod machine;
pub mod session;
