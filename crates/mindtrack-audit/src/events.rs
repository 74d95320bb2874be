use serde::Serialize;
use serde_json::json;
use tracing::info;

use mindtrack_core::models::Submission;

/// A structured audit event for assessment actions.
///
/// Events go through `tracing` so they land wherever the process ships its
/// logs. Answers are never included, only scores and the model outcome.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub user_id: String,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(
        action: impl Into<String>,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            user_id: user_id.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// A stored submission.
    pub fn submission_created(submission_id: &str, submission: &Submission) -> Self {
        Self::new(
            "submission.create",
            "submission",
            submission_id,
            &submission.author,
        )
        .with_details(json!({
            "instrument_id": submission.instrument_id,
            "schema_version": submission.schema_version,
            "raw": submission.scores.raw,
            "risk": submission.model.risk,
            "category": submission.model.category,
            "needs_follow_up": submission.flags.needs_follow_up,
        }))
    }

    /// A submission attempt the store rejected.
    pub fn submission_failed(user_id: &str, instrument_id: &str, reason: &str) -> Self {
        Self::new("submission.fail", "submission", instrument_id, user_id)
            .with_details(json!({ "reason": reason }))
    }

    /// Emit this audit event via tracing.
    pub fn emit(&self) {
        let details = self
            .details
            .as_ref()
            .map(|d| d.to_string())
            .unwrap_or_default();
        info!(
            audit.action = %self.action,
            audit.resource_type = %self.resource_type,
            audit.resource_id = %self.resource_id,
            audit.user_id = %self.user_id,
            audit.details = %details,
            "audit event"
        );
    }
}
