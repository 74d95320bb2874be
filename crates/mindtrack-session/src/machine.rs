//! Answer-collection state machine.
//!
//! ```text
//! Collecting { page } ──finalize──▶ Submitting ──persisted──▶ Completed
//!        ▲                              │
//!        └──────resume_editing──── Failed ◀──store error──┘
//! ```
//!
//! Nothing here performs I/O. Transitions that need the outside world return
//! [`Effect`]s for the caller to run, in order.

use mindtrack_core::keys;
use mindtrack_core::models::{Answers, RiskAssessment, ScoringResult, Submission};
use mindtrack_instruments::Instrument;
use mindtrack_instruments::scoring::check_complete;
use mindtrack_model::features::{FeatureVector, to_features};
use tracing::warn;

use crate::error::SessionError;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Collecting { page: usize },
    Submitting,
    Completed(RiskAssessment),
    Failed { reason: String },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Collecting { .. } => "collecting",
            Self::Submitting => "submitting",
            Self::Completed(_) => "completed",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Persist the full answer set under the autosave key.
    SaveSnapshot { key: String, answers: Answers },
    /// Drop the autosave snapshot.
    ClearSnapshot { key: String },
    /// Store the finished submission.
    CreateSubmission {
        collection: String,
        submission: Submission,
    },
}

/// Outcome of [`SessionMachine::begin_finalize`].
#[derive(Debug, Clone, PartialEq)]
pub enum FinalizeStep {
    /// Already finalized; nothing to do.
    Completed(RiskAssessment),
    /// Scores computed; classify `features` and call
    /// [`SessionMachine::complete_scoring`].
    Classify {
        scores: ScoringResult,
        features: FeatureVector,
    },
}

pub struct SessionMachine {
    instrument: Box<dyn Instrument>,
    user: Option<String>,
    answers: Answers,
    state: SessionState,
    scores: Option<ScoringResult>,
    pending: Option<Submission>,
}

impl SessionMachine {
    /// Start on the first page. `restored` answers from an earlier snapshot
    /// are kept only where they still fit the schema.
    pub fn new(instrument: Box<dyn Instrument>, user: Option<String>, restored: Answers) -> Self {
        let schema = instrument.schema();
        let answers: Answers = restored
            .into_iter()
            .filter(|(item, value)| {
                let keep = schema.has_item(item) && schema.scale.contains(*value);
                if !keep {
                    warn!(instrument = %schema.id, item = %item, value, "dropping stale autosaved answer");
                }
                keep
            })
            .collect();

        Self {
            instrument,
            user,
            answers,
            state: SessionState::Collecting { page: 0 },
            scores: None,
            pending: None,
        }
    }

    pub fn instrument(&self) -> &dyn Instrument {
        self.instrument.as_ref()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Follow sign-in changes; later snapshots use the new namespace.
    pub fn set_user(&mut self, user: Option<String>) {
        self.user = user;
    }

    pub fn autosave_key(&self) -> String {
        keys::autosave(self.user.as_deref(), self.instrument.id())
    }

    /// Set once finalize has scored the answers.
    pub fn scores(&self) -> Option<&ScoringResult> {
        self.scores.as_ref()
    }

    /// The risk assessment, once completed.
    pub fn result(&self) -> Option<RiskAssessment> {
        match self.state {
            SessionState::Completed(r) => Some(r),
            _ => None,
        }
    }

    pub fn page(&self) -> Option<usize> {
        match self.state {
            SessionState::Collecting { page } => Some(page),
            _ => None,
        }
    }

    pub fn page_count(&self) -> usize {
        self.instrument.pages().len()
    }

    pub fn last_page(&self) -> usize {
        self.page_count().saturating_sub(1)
    }

    pub fn is_last_page(&self) -> bool {
        self.page() == Some(self.last_page())
    }

    /// Item ids on the page being shown; empty outside `Collecting`.
    pub fn current_page_items(&self) -> Vec<String> {
        self.page()
            .and_then(|p| self.instrument.pages().get(p).map(|items| items.to_vec()))
            .unwrap_or_default()
    }

    pub fn total_items(&self) -> usize {
        self.instrument.schema().items.len()
    }

    pub fn answered_count(&self) -> usize {
        self.instrument
            .schema()
            .items
            .iter()
            .filter(|i| self.answers.contains_key(*i))
            .count()
    }

    /// Share of items answered, rounded to a whole percent.
    pub fn progress_percent(&self) -> u8 {
        let total = self.total_items();
        if total == 0 {
            return 0;
        }
        ((self.answered_count() as f64 / total as f64) * 100.0).round() as u8
    }

    fn collecting_page(&self, operation: &'static str) -> Result<usize, SessionError> {
        self.page().ok_or(SessionError::InvalidTransition {
            operation,
            state: self.state.name(),
        })
    }

    /// Record an answer. Returns the snapshot write that must finish before
    /// the change counts as made.
    pub fn set_answer(&mut self, item: &str, value: i32) -> Result<Vec<Effect>, SessionError> {
        self.collecting_page("answer")?;
        let schema = self.instrument.schema();
        if !schema.has_item(item) {
            return Err(SessionError::UnknownItem(item.to_string()));
        }
        if !schema.scale.contains(value) {
            return Err(SessionError::OutOfRange {
                item: item.to_string(),
                value,
                min: schema.scale.min,
                max: schema.scale.max,
            });
        }

        self.answers.insert(item.to_string(), value);
        Ok(vec![Effect::SaveSnapshot {
            key: self.autosave_key(),
            answers: self.answers.clone(),
        }])
    }

    /// Undo a `set_answer` whose snapshot could not be written.
    pub fn revert_answer(&mut self, item: &str, previous: Option<i32>) {
        match previous {
            Some(v) => self.answers.insert(item.to_string(), v),
            None => self.answers.remove(item),
        };
    }

    /// Unanswered items on `page`, in order.
    fn missing_on_page(&self, page: usize) -> Vec<String> {
        self.instrument
            .pages()
            .get(page)
            .map(|items| {
                items
                    .iter()
                    .filter(|i| !self.answers.contains_key(*i))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Move to the next page if every item on this one is answered. On the
    /// last page a complete page is accepted without moving.
    pub fn advance(&mut self) -> Result<usize, SessionError> {
        let page = self.collecting_page("advance")?;
        let missing = self.missing_on_page(page);
        if !missing.is_empty() {
            return Err(SessionError::PageIncomplete { page, missing });
        }
        let next = (page + 1).min(self.last_page());
        self.state = SessionState::Collecting { page: next };
        Ok(next)
    }

    /// Go back one page. Never validates.
    pub fn retreat(&mut self) -> Result<usize, SessionError> {
        let page = self.collecting_page("go back")?;
        if page == 0 {
            return Err(SessionError::AtFirstPage);
        }
        self.state = SessionState::Collecting { page: page - 1 };
        Ok(page - 1)
    }

    /// After a failed submission, return to the last page to edit answers.
    pub fn resume_editing(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Failed { .. } => {
                self.state = SessionState::Collecting {
                    page: self.last_page(),
                };
                Ok(())
            }
            _ => Err(SessionError::InvalidTransition {
                operation: "resume editing",
                state: self.state.name(),
            }),
        }
    }

    /// Validate and score. On success the machine is `Submitting`; on error
    /// nothing changes.
    pub fn begin_finalize(&mut self) -> Result<FinalizeStep, SessionError> {
        match &self.state {
            SessionState::Completed(result) => return Ok(FinalizeStep::Completed(*result)),
            SessionState::Submitting => {
                return Err(SessionError::InvalidTransition {
                    operation: "finalize",
                    state: self.state.name(),
                });
            }
            SessionState::Collecting { page } if *page != self.last_page() => {
                return Err(SessionError::NotOnLastPage {
                    page: *page,
                    last: self.last_page(),
                });
            }
            SessionState::Collecting { .. } | SessionState::Failed { .. } => {}
        }

        // Checked over the whole instrument, independent of page checks.
        check_complete(self.instrument.schema(), &self.answers)?;
        if self.user.is_none() {
            return Err(SessionError::NotSignedIn);
        }

        let scores = self.instrument.score(&self.answers)?;
        let features = to_features(self.instrument.id(), &scores)?;

        self.scores = Some(scores.clone());
        self.state = SessionState::Submitting;
        Ok(FinalizeStep::Classify { scores, features })
    }

    /// Attach the classifier result and request persistence.
    pub fn complete_scoring(&mut self, model: RiskAssessment) -> Result<Vec<Effect>, SessionError> {
        if self.state != SessionState::Submitting {
            return Err(SessionError::InvalidTransition {
                operation: "record a risk assessment",
                state: self.state.name(),
            });
        }
        let (Some(user), Some(scores)) = (self.user.clone(), self.scores.clone()) else {
            return Err(SessionError::NotSignedIn);
        };

        let schema = self.instrument.schema();
        let submission = Submission::new(
            &schema.id,
            &schema.version,
            &user,
            self.answers.clone(),
            scores,
            model,
        );
        self.pending = Some(submission.clone());

        Ok(vec![
            Effect::CreateSubmission {
                collection: keys::submissions(&user),
                submission,
            },
            Effect::ClearSnapshot {
                key: self.autosave_key(),
            },
        ])
    }

    /// The store accepted the submission.
    pub fn mark_persisted(&mut self) -> Result<RiskAssessment, SessionError> {
        let invalid = SessionError::InvalidTransition {
            operation: "complete",
            state: self.state.name(),
        };
        if self.state != SessionState::Submitting {
            return Err(invalid);
        }
        let submission = self.pending.take().ok_or(invalid)?;
        self.state = SessionState::Completed(submission.model);
        Ok(submission.model)
    }

    /// The store rejected the submission. Answers stay put for a retry.
    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.pending = None;
        self.state = SessionState::Failed {
            reason: reason.into(),
        };
    }
}
