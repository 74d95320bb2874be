use std::sync::Arc;

use tracing::{debug, info, warn};

use mindtrack_audit::events::AuditEvent;
use mindtrack_core::models::{Answers, RiskAssessment, Submission};
use mindtrack_instruments::get_instrument;
use mindtrack_model::classifier::Classifier;
use mindtrack_storage::cache::KeyValueCache;
use mindtrack_storage::error::StorageError;
use mindtrack_storage::identity::IdentityProvider;
use mindtrack_storage::store::DocumentStore;

use crate::error::SessionError;
use crate::machine::{Effect, FinalizeStep, SessionMachine, SessionState};

/// Everything a session talks to. Cheap to clone; share one set across
/// sessions.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn DocumentStore>,
    pub cache: Arc<dyn KeyValueCache>,
    pub identity: Arc<dyn IdentityProvider>,
    pub classifier: Arc<Classifier>,
}

/// One person working through one instrument.
pub struct AssessmentSession {
    machine: SessionMachine,
    deps: Collaborators,
    submission_id: Option<String>,
}

impl AssessmentSession {
    /// Open a session on the first page, restoring any autosaved answers for
    /// the current user and instrument.
    pub fn open(instrument_id: &str, deps: Collaborators) -> Result<Self, SessionError> {
        let instrument = get_instrument(instrument_id)?;
        let user = deps.identity.current_user();
        let key = mindtrack_core::keys::autosave(user.as_deref(), instrument_id);
        let restored = load_snapshot(deps.cache.as_ref(), &key);

        info!(
            instrument = instrument_id,
            user = user.as_deref().unwrap_or(mindtrack_core::keys::ANONYMOUS),
            restored = restored.len(),
            "assessment session opened"
        );

        Ok(Self {
            machine: SessionMachine::new(instrument, user, restored),
            deps,
            submission_id: None,
        })
    }

    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    pub fn state(&self) -> &SessionState {
        self.machine.state()
    }

    pub fn answers(&self) -> &Answers {
        self.machine.answers()
    }

    /// Store id of the persisted submission, once completed.
    pub fn submission_id(&self) -> Option<&str> {
        self.submission_id.as_deref()
    }

    fn sync_identity(&mut self) {
        let current = self.deps.identity.current_user();
        if current.as_deref() != self.machine.user() {
            debug!(user = ?current, "identity changed during session");
            self.machine.set_user(current);
        }
    }

    /// Record an answer and write the autosave snapshot before returning.
    /// A failed write undoes the change.
    pub fn set_answer(&mut self, item: &str, value: i32) -> Result<(), SessionError> {
        self.sync_identity();
        let previous = self.machine.answers().get(item).copied();
        for effect in self.machine.set_answer(item, value)? {
            if let Err(e) = self.apply_local(&effect) {
                self.machine.revert_answer(item, previous);
                return Err(SessionError::Autosave(e));
            }
        }
        Ok(())
    }

    pub fn advance(&mut self) -> Result<usize, SessionError> {
        self.machine.advance()
    }

    pub fn retreat(&mut self) -> Result<usize, SessionError> {
        self.machine.retreat()
    }

    pub fn resume_editing(&mut self) -> Result<(), SessionError> {
        self.machine.resume_editing()
    }

    /// Score, classify, and persist the submission.
    ///
    /// Calling again after success returns the same result without writing.
    /// Calling again after a store failure retries from scratch.
    pub async fn finalize(&mut self) -> Result<RiskAssessment, SessionError> {
        self.sync_identity();

        // `&mut self` rules out a concurrent finalize, so `Submitting` here
        // means an earlier attempt was dropped mid-flight.
        if *self.machine.state() == SessionState::Submitting {
            warn!("previous finalize was interrupted, retrying");
            self.machine.mark_failed("interrupted");
        }

        let features = match self.machine.begin_finalize()? {
            FinalizeStep::Completed(result) => return Ok(result),
            FinalizeStep::Classify { features, .. } => features,
        };

        let model = self.deps.classifier.assess(&features).await;

        for effect in self.machine.complete_scoring(model)? {
            match effect {
                Effect::CreateSubmission {
                    collection,
                    submission,
                } => {
                    if let Err(e) = self.persist(&collection, &submission).await {
                        warn!(collection = %collection, error = %e, "submission not saved");
                        AuditEvent::submission_failed(
                            &submission.author,
                            &submission.instrument_id,
                            &e.to_string(),
                        )
                        .emit();
                        self.machine.mark_failed(e.to_string());
                        return Err(SessionError::Persistence(e));
                    }
                }
                other => {
                    // The submission is stored; a stale snapshot only means
                    // old answers reappear next time.
                    if let Err(e) = self.apply_local(&other) {
                        warn!(error = %e, "failed to clear autosave snapshot");
                    }
                }
            }
        }

        self.machine.mark_persisted()
    }

    async fn persist(&mut self, collection: &str, submission: &Submission) -> Result<(), StorageError> {
        let document = submission.to_document()?;
        let id = self.deps.store.create(collection, document).await?;
        info!(
            path = %mindtrack_core::keys::submission(&submission.author, &id),
            instrument = %submission.instrument_id,
            category = %submission.model.category,
            "submission saved"
        );
        AuditEvent::submission_created(&id, submission).emit();
        self.submission_id = Some(id);
        Ok(())
    }

    /// Run a cache effect.
    fn apply_local(&self, effect: &Effect) -> Result<(), StorageError> {
        match effect {
            Effect::SaveSnapshot { key, answers } => {
                let json = serde_json::to_string(answers)?;
                self.deps.cache.set(key, &json)?;
                debug!(key = %key, answered = answers.len(), "autosaved");
                Ok(())
            }
            Effect::ClearSnapshot { key } => self.deps.cache.remove(key),
            // Remote write; finalize runs it.
            Effect::CreateSubmission { .. } => Ok(()),
        }
    }
}

/// Read an autosave snapshot. Anything unreadable counts as no snapshot.
fn load_snapshot(cache: &dyn KeyValueCache, key: &str) -> Answers {
    let raw = match cache.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Answers::new(),
        Err(e) => {
            warn!(key, error = %e, "failed to read autosave snapshot");
            return Answers::new();
        }
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(key, error = %e, "ignoring corrupt autosave snapshot");
        Answers::new()
    })
}
