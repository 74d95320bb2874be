pub mod dass21;
pub mod pss10;

use std::collections::BTreeMap;

pub(crate) fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

pub(crate) fn labels(labels: &[&str]) -> Vec<String> {
    ids(labels)
}

pub(crate) fn text(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(id, t)| (id.to_string(), t.to_string()))
        .collect()
}
