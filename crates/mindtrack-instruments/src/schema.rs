use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::SchemaError;

/// Discrete ordinal response scale shared by every item of an instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Scale {
    pub min: i32,
    pub max: i32,
    /// One label per scale point, lowest first.
    pub labels: Vec<String>,
}

/// A selectable response, as rendered by a Likert question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LikertOption {
    pub value: i32,
    pub label: String,
}

impl Scale {
    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Number of points on the scale. Widened so extreme bounds cannot
    /// overflow.
    pub fn points(&self) -> usize {
        let span = i64::from(self.max) - i64::from(self.min) + 1;
        usize::try_from(span).unwrap_or(0)
    }

    pub fn options(&self) -> Vec<LikertOption> {
        self.labels
            .iter()
            .zip(self.min..=self.max)
            .map(|(label, value)| LikertOption {
                value,
                label: label.clone(),
            })
            .collect()
    }
}

/// A named group of items aggregated separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Subscale {
    pub name: String,
    pub items: Vec<String>,
}

/// Static definition of a questionnaire. Pure data, validated once at load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InstrumentSchema {
    pub id: String,
    pub name: String,
    /// Item set / wording revision.
    pub version: String,
    pub scale: Scale,
    /// Item ids in presentation order.
    pub items: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subscales: Option<Vec<Subscale>>,
    /// Items scored as `scale.max - value`.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub reverse_items: Vec<String>,
    /// Prompt wording per item.
    #[serde(default)]
    pub text: BTreeMap<String, String>,
}

impl InstrumentSchema {
    pub fn validate(&self) -> Result<(), SchemaError> {
        let instrument_id = || self.id.clone();

        if self.items.is_empty() {
            return Err(SchemaError::NoItems {
                instrument_id: instrument_id(),
            });
        }

        if self.scale.min > self.scale.max {
            return Err(SchemaError::InvalidScale {
                instrument_id: instrument_id(),
                min: self.scale.min,
                max: self.scale.max,
            });
        }

        if self.scale.labels.len() != self.scale.points() {
            return Err(SchemaError::LabelCount {
                instrument_id: instrument_id(),
                expected: self.scale.points(),
                actual: self.scale.labels.len(),
            });
        }

        let mut known = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if !known.insert(item.as_str()) {
                return Err(SchemaError::DuplicateItem {
                    instrument_id: instrument_id(),
                    item: item.clone(),
                });
            }
        }

        for item in &self.reverse_items {
            if !known.contains(item.as_str()) {
                return Err(SchemaError::UnknownReverseItem {
                    instrument_id: instrument_id(),
                    item: item.clone(),
                });
            }
        }

        if let Some(subscales) = &self.subscales {
            let mut owner: HashMap<&str, &str> = HashMap::new();
            for subscale in subscales {
                for item in &subscale.items {
                    if !known.contains(item.as_str()) {
                        return Err(SchemaError::UnknownSubscaleItem {
                            instrument_id: instrument_id(),
                            subscale: subscale.name.clone(),
                            item: item.clone(),
                        });
                    }
                    if owner.insert(item.as_str(), subscale.name.as_str()).is_some() {
                        return Err(SchemaError::ItemInSeveralSubscales {
                            instrument_id: instrument_id(),
                            item: item.clone(),
                        });
                    }
                }
            }
            if let Some(orphan) = self.items.iter().find(|i| !owner.contains_key(i.as_str())) {
                return Err(SchemaError::ItemWithoutSubscale {
                    instrument_id: instrument_id(),
                    item: orphan.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn has_item(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }

    pub fn is_reverse(&self, item: &str) -> bool {
        self.reverse_items.iter().any(|i| i == item)
    }

    pub fn text(&self, item: &str) -> Option<&str> {
        self.text.get(item).map(String::as_str)
    }

    /// Split items into consecutive pages of `page_size`. The last page may
    /// be shorter.
    pub fn pages(&self, page_size: usize) -> Vec<&[String]> {
        self.items.chunks(page_size.max(1)).collect()
    }

    /// Highest contribution a single item can make after reverse mapping.
    pub fn item_max(&self, item: &str) -> i32 {
        if self.is_reverse(item) {
            self.scale.max.saturating_sub(self.scale.min)
        } else {
            self.scale.max
        }
    }
}
