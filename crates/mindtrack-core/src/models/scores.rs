use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Output of scoring one completed instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoringResult {
    /// Total score, in the instrument's reporting unit.
    pub raw: i32,
    /// Per-subscale totals for instruments that define subscales.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sub: Option<BTreeMap<String, i32>>,
}

impl ScoringResult {
    pub fn subscale(&self, name: &str) -> Option<i32> {
        self.sub.as_ref().and_then(|s| s.get(name).copied())
    }

    /// One-line score detail for history tables.
    pub fn summary(&self, instrument_id: &str) -> String {
        let show = |name: &str| {
            self.subscale(name)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        match instrument_id {
            "dass21" => format!(
                "D:{}  A:{}  S:{}",
                show("depression"),
                show("anxiety"),
                show("stress")
            ),
            _ => format!("Total:{}", self.raw),
        }
    }
}
