use thiserror::Error;

/// A malformed instrument definition. Fatal at load time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("instrument '{instrument_id}' has no items")]
    NoItems { instrument_id: String },

    #[error("instrument '{instrument_id}': duplicate item '{item}'")]
    DuplicateItem { instrument_id: String, item: String },

    #[error("instrument '{instrument_id}': scale min {min} is greater than max {max}")]
    InvalidScale {
        instrument_id: String,
        min: i32,
        max: i32,
    },

    #[error("instrument '{instrument_id}': scale has {actual} labels, expected {expected}")]
    LabelCount {
        instrument_id: String,
        expected: usize,
        actual: usize,
    },

    #[error("instrument '{instrument_id}': subscale '{subscale}' references unknown item '{item}'")]
    UnknownSubscaleItem {
        instrument_id: String,
        subscale: String,
        item: String,
    },

    #[error("instrument '{instrument_id}': reverse item '{item}' is not in the item list")]
    UnknownReverseItem { instrument_id: String, item: String },

    #[error("instrument '{instrument_id}': item '{item}' belongs to more than one subscale")]
    ItemInSeveralSubscales { instrument_id: String, item: String },

    #[error("instrument '{instrument_id}': item '{item}' belongs to no subscale")]
    ItemWithoutSubscale { instrument_id: String, item: String },
}

/// Why an item blocks scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncompleteReason {
    Missing,
    OutOfRange { value: i32, min: i32, max: i32 },
}

/// Answers are missing an item, or hold a value off the response scale.
/// Names the first offending item in item order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.item, .reason))]
pub struct IncompleteAnswers {
    pub item: String,
    pub reason: IncompleteReason,
}

fn describe(item: &str, reason: &IncompleteReason) -> String {
    match reason {
        IncompleteReason::Missing => format!("item '{item}' has no answer"),
        IncompleteReason::OutOfRange { value, min, max } => {
            format!("item '{item}' answer {value} is outside [{min}, {max}]")
        }
    }
}

#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("invalid instrument schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("incomplete answers: {0}")]
    Incomplete(#[from] IncompleteAnswers),
}
