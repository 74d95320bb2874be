use std::collections::BTreeMap;

/// Item id → selected value on the instrument's response scale.
///
/// Ordered so that serialized snapshots and submissions are stable.
pub type Answers = BTreeMap<String, i32>;
