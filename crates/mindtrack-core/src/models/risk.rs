use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// Coarse three-band risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum RiskCategory {
    Low,
    Med,
    High,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Med => "med",
            Self::High => "high",
        }
    }

    /// Human-readable label for dashboards and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Med => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "med" => Ok(Self::Med),
            "high" => Ok(Self::High),
            other => Err(CoreError::InvalidCategory(other.to_string())),
        }
    }
}

/// Classifier output attached to a submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RiskAssessment {
    /// Continuous risk in [0, 1].
    pub risk: f64,
    pub category: RiskCategory,
}

impl RiskAssessment {
    /// Risk as a whole percentage (0–100).
    pub fn percent(&self) -> u8 {
        (self.risk.clamp(0.0, 1.0) * 100.0).round() as u8
    }

    /// Inverse of [`percent`](Self::percent), shown as "wellbeing" out of 100.
    pub fn wellbeing_index(&self) -> u8 {
        100 - self.percent()
    }
}
