//! Instrument scores → fixed-length classifier input.
//!
//! Every instrument writes into the same seven slots so one classifier
//! serves all of them:
//!
//! | Slot | Meaning             | DASS-21          | PSS-10     |
//! |------|---------------------|------------------|------------|
//! | 0    | stress              | stress / 42      | 0          |
//! | 1    | anxiety             | anxiety / 42     | 0          |
//! | 2    | depression          | depression / 42  | 0          |
//! | 3    | perceived stress    | 0                | raw / 40   |
//! | 4–6  | check-in signals    | placeholders     | placeholders |
//!
//! Slots 4–6 are reserved for check-in data that is not collected yet. They
//! carry [`CHECKIN_PLACEHOLDERS`] rather than zero.

use mindtrack_core::models::ScoringResult;
use mindtrack_instruments::get_instrument;

use crate::error::ModelError;

pub const FEATURE_LEN: usize = 7;

pub type FeatureVector = [f64; FEATURE_LEN];

pub const STRESS: usize = 0;
pub const ANXIETY: usize = 1;
pub const DEPRESSION: usize = 2;
pub const PERCEIVED_STRESS: usize = 3;
pub const CHECKIN_START: usize = 4;

/// Neutral values for the check-in slots (4, 5, 6).
pub const CHECKIN_PLACEHOLDERS: [f64; 3] = [0.5, 0.1, 0.5];

/// Symptom slot left untouched by the current instrument.
///
/// Zero, as the deployed model was trained on. Whether these slots should
/// instead carry neutral placeholders like the check-in slots is pending a
/// product decision.
pub const UNUSED_SYMPTOM: f64 = 0.0;

fn base_vector() -> FeatureVector {
    let mut v = [UNUSED_SYMPTOM; FEATURE_LEN];
    v[CHECKIN_START..].copy_from_slice(&CHECKIN_PLACEHOLDERS);
    v
}

fn normalize(value: i32, max: i32) -> f64 {
    if max <= 0 {
        return 0.0;
    }
    (f64::from(value) / f64::from(max)).clamp(0.0, 1.0)
}

/// Build the classifier input for one scored instrument.
pub fn to_features(instrument_id: &str, scores: &ScoringResult) -> Result<FeatureVector, ModelError> {
    let instrument = get_instrument(instrument_id)
        .map_err(|_| ModelError::UnknownInstrument(instrument_id.to_string()))?;
    let mut v = base_vector();

    match instrument_id {
        "dass21" => {
            for (slot, name) in [(STRESS, "stress"), (ANXIETY, "anxiety"), (DEPRESSION, "depression")] {
                let missing = || ModelError::MissingSubscale {
                    instrument_id: instrument_id.to_string(),
                    subscale: name.to_string(),
                };
                let value = scores.subscale(name).ok_or_else(missing)?;
                let max = instrument.max_subscale(name).ok_or_else(missing)?;
                v[slot] = normalize(value, max);
            }
        }
        "pss10" => {
            v[PERCEIVED_STRESS] = normalize(scores.raw, instrument.max_raw());
        }
        other => return Err(ModelError::UnknownInstrument(other.to_string())),
    }

    Ok(v)
}
