use serde::{Deserialize, Serialize};

use mindtrack_core::models::RiskCategory;

use crate::error::ModelError;

/// Cut points between the low/med and med/high bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub low: f64,
    pub high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: 0.33,
            high: 0.66,
        }
    }
}

impl Thresholds {
    pub fn new(low: f64, high: f64) -> Result<Self, ModelError> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(low) || !in_unit(high) || low > high {
            return Err(ModelError::InvalidThresholds { low, high });
        }
        Ok(Self { low, high })
    }
}

/// Map a risk value to its band. Bands are closed-open going up, so a value
/// sitting exactly on a threshold belongs to the higher band.
pub fn categorize(risk: f64, thresholds: Thresholds) -> RiskCategory {
    if risk < thresholds.low {
        RiskCategory::Low
    } else if risk < thresholds.high {
        RiskCategory::Med
    } else {
        RiskCategory::High
    }
}
