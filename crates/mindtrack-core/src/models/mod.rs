pub mod answers;
pub mod risk;
pub mod scores;
pub mod submission;

pub use answers::Answers;
pub use risk::{RiskAssessment, RiskCategory};
pub use scores::ScoringResult;
pub use submission::{Submission, SubmissionFlags};
