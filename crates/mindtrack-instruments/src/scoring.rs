//! Instrument scoring.
//!
//! Integer arithmetic only: identical (schema, answers) always produce the
//! identical result.

use std::collections::BTreeMap;

use mindtrack_core::models::{Answers, ScoringResult};

use crate::error::{IncompleteAnswers, IncompleteReason};
use crate::schema::InstrumentSchema;

/// Check that every item has an answer on the scale. Reports the first
/// offending item in presentation order.
pub fn check_complete(schema: &InstrumentSchema, answers: &Answers) -> Result<(), IncompleteAnswers> {
    for item in &schema.items {
        match answers.get(item) {
            None => {
                return Err(IncompleteAnswers {
                    item: item.clone(),
                    reason: IncompleteReason::Missing,
                });
            }
            Some(&value) if !schema.scale.contains(value) => {
                return Err(IncompleteAnswers {
                    item: item.clone(),
                    reason: IncompleteReason::OutOfRange {
                        value,
                        min: schema.scale.min,
                        max: schema.scale.max,
                    },
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Value an answer contributes after reverse keying.
pub fn mapped_value(schema: &InstrumentSchema, item: &str, value: i32) -> i32 {
    if schema.is_reverse(item) {
        schema.scale.max - value
    } else {
        value
    }
}

/// Score a complete answer set.
///
/// With subscales, each subscale sum is multiplied by `subscale_multiplier`
/// and `raw` is the total of the multiplied sums. Without subscales, `raw`
/// is the plain sum of mapped values and the multiplier is not applied.
pub fn score(
    schema: &InstrumentSchema,
    subscale_multiplier: i32,
    answers: &Answers,
) -> Result<ScoringResult, IncompleteAnswers> {
    check_complete(schema, answers)?;

    let sum_of = |items: &[String]| -> i32 {
        items
            .iter()
            .map(|id| mapped_value(schema, id, answers[id]))
            .sum()
    };

    match &schema.subscales {
        Some(subscales) => {
            let sub: BTreeMap<String, i32> = subscales
                .iter()
                .map(|s| (s.name.clone(), sum_of(&s.items) * subscale_multiplier))
                .collect();
            let raw = sub.values().sum();
            Ok(ScoringResult {
                raw,
                sub: Some(sub),
            })
        }
        None => Ok(ScoringResult {
            raw: sum_of(&schema.items),
            sub: None,
        }),
    }
}
