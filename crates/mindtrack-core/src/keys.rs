//! Storage key/path conventions.
//!
//! Pure string functions. These define where submissions live in the
//! document store and how autosave snapshots are named in the local cache.

/// Namespace used for autosave snapshots when nobody is signed in.
pub const ANONYMOUS: &str = "anon";

/// Root collection for all per-user assessment data.
pub const ASSESSMENTS_PREFIX: &str = "assessments/";

/// Collection path that holds a user's submissions.
pub fn submissions(user_id: &str) -> String {
    format!("{ASSESSMENTS_PREFIX}{user_id}/submissions")
}

/// Document path of a single stored submission.
pub fn submission(user_id: &str, submission_id: &str) -> String {
    format!("{}/{submission_id}", submissions(user_id))
}

/// Local cache key for the autosaved partial answers of one instrument.
pub fn autosave(user_id: Option<&str>, instrument_id: &str) -> String {
    let owner = user_id.unwrap_or(ANONYMOUS);
    format!("{owner}:{instrument_id}:answers")
}
