use thiserror::Error;

use mindtrack_instruments::error::{IncompleteAnswers, InstrumentError};
use mindtrack_model::error::ModelError;
use mindtrack_storage::error::StorageError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: &'static str,
    },

    #[error("unknown item: {0}")]
    UnknownItem(String),

    #[error("answer {value} for '{item}' is outside [{min}, {max}]")]
    OutOfRange {
        item: String,
        value: i32,
        min: i32,
        max: i32,
    },

    #[error("answer every question on page {} to continue (missing: {})", .page + 1, .missing.join(", "))]
    PageIncomplete { page: usize, missing: Vec<String> },

    #[error("already on the first page")]
    AtFirstPage,

    #[error("finalize is only available on the last page (on page {}, last is {})", .page + 1, .last + 1)]
    NotOnLastPage { page: usize, last: usize },

    #[error("some questions are unanswered: {0}")]
    IncompleteAnswers(#[from] IncompleteAnswers),

    #[error("no signed-in user to attach the submission to")]
    NotSignedIn,

    #[error(transparent)]
    Instrument(#[from] InstrumentError),

    #[error("feature mapping failed: {0}")]
    Features(#[from] ModelError),

    #[error("autosave failed: {0}")]
    Autosave(#[source] StorageError),

    #[error("could not save the assessment: {0}")]
    Persistence(#[source] StorageError),
}

impl SessionError {
    /// Errors the person filling in the questionnaire can fix themselves.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange { .. }
                | Self::PageIncomplete { .. }
                | Self::IncompleteAnswers(_)
                | Self::AtFirstPage
                | Self::NotOnLastPage { .. }
        )
    }
}
