use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

use super::answers::Answers;
use super::risk::{RiskAssessment, RiskCategory};
use super::scores::ScoringResult;

/// Derived booleans stored alongside a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubmissionFlags {
    pub needs_follow_up: bool,
}

impl SubmissionFlags {
    pub fn from_category(category: RiskCategory) -> Self {
        Self {
            needs_follow_up: category == RiskCategory::High,
        }
    }
}

/// Immutable record of one completed assessment.
///
/// Built once at finalize and handed to the document store, which owns it
/// from then on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Submission {
    pub instrument_id: String,
    pub schema_version: String,
    /// User id of whoever completed the questionnaire.
    pub author: String,
    pub created_at: jiff::Timestamp,
    pub answers: Answers,
    pub scores: ScoringResult,
    pub model: RiskAssessment,
    pub flags: SubmissionFlags,
}

impl Submission {
    pub fn new(
        instrument_id: impl Into<String>,
        schema_version: impl Into<String>,
        author: impl Into<String>,
        answers: Answers,
        scores: ScoringResult,
        model: RiskAssessment,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            schema_version: schema_version.into(),
            author: author.into(),
            created_at: jiff::Timestamp::now(),
            answers,
            scores,
            flags: SubmissionFlags::from_category(model.category),
            model,
        }
    }

    pub fn to_document(&self) -> Result<serde_json::Value, CoreError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_document(document: serde_json::Value) -> Result<Self, CoreError> {
        Ok(serde_json::from_value(document)?)
    }
}
