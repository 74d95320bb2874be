use std::collections::BTreeMap;

use mindtrack_instruments::error::SchemaError;
use mindtrack_instruments::schema::{InstrumentSchema, Scale, Subscale};
use mindtrack_instruments::{all_instruments, get_instrument, validate_all};

fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn tiny_schema() -> InstrumentSchema {
    InstrumentSchema {
        id: "tiny".to_string(),
        name: "Tiny".to_string(),
        version: "v1".to_string(),
        scale: Scale {
            min: 0,
            max: 2,
            labels: ids(&["no", "maybe", "yes"]),
        },
        items: ids(&["x1", "x2", "y1"]),
        subscales: Some(vec![
            Subscale {
                name: "x".to_string(),
                items: ids(&["x1", "x2"]),
            },
            Subscale {
                name: "y".to_string(),
                items: ids(&["y1"]),
            },
        ]),
        reverse_items: ids(&["x2"]),
        text: BTreeMap::new(),
    }
}

#[test]
fn registered_schemas_are_valid() {
    validate_all().expect("built-in schemas must validate");
    assert_eq!(all_instruments().len(), 2);
}

#[test]
fn unknown_instrument_is_rejected() {
    assert!(get_instrument("phq9").is_err());
    assert_eq!(get_instrument("pss10").unwrap().name(), "PSS-10");
}

#[test]
fn valid_custom_schema_passes() {
    assert_eq!(tiny_schema().validate(), Ok(()));
}

#[test]
fn duplicate_item_fails() {
    let mut s = tiny_schema();
    s.items.push("x1".to_string());
    assert!(matches!(
        s.validate(),
        Err(SchemaError::DuplicateItem { item, .. }) if item == "x1"
    ));
}

#[test]
fn dangling_subscale_reference_fails() {
    let mut s = tiny_schema();
    s.subscales.as_mut().unwrap()[1].items.push("z9".to_string());
    assert!(matches!(
        s.validate(),
        Err(SchemaError::UnknownSubscaleItem { item, subscale, .. }) if item == "z9" && subscale == "y"
    ));
}

#[test]
fn dangling_reverse_reference_fails() {
    let mut s = tiny_schema();
    s.reverse_items.push("q".to_string());
    assert!(matches!(
        s.validate(),
        Err(SchemaError::UnknownReverseItem { .. })
    ));
}

#[test]
fn label_count_must_match_scale() {
    let mut s = tiny_schema();
    s.scale.labels.pop();
    assert!(matches!(
        s.validate(),
        Err(SchemaError::LabelCount {
            expected: 3,
            actual: 2,
            ..
        })
    ));
}

#[test]
fn extreme_scale_bounds_fail_validation_cleanly() {
    let mut s = tiny_schema();
    s.scale.min = i32::MIN;
    s.scale.max = i32::MAX;
    assert_eq!(s.scale.points(), 1usize << 32);
    assert!(matches!(
        s.validate(),
        Err(SchemaError::LabelCount { actual: 3, .. })
    ));
}

#[test]
fn every_item_needs_exactly_one_subscale() {
    let mut s = tiny_schema();
    s.subscales.as_mut().unwrap()[1].items.push("x1".to_string());
    assert!(matches!(
        s.validate(),
        Err(SchemaError::ItemInSeveralSubscales { .. })
    ));

    let mut s = tiny_schema();
    s.subscales.as_mut().unwrap()[1].items.clear();
    assert!(matches!(
        s.validate(),
        Err(SchemaError::ItemWithoutSubscale { item, .. }) if item == "y1"
    ));
}

#[test]
fn pages_are_consecutive_with_short_tail() {
    let s = tiny_schema();
    let pages = s.pages(2);
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0], &ids(&["x1", "x2"])[..]);
    assert_eq!(pages[1], &ids(&["y1"])[..]);
}

#[test]
fn builtin_pagination_matches_page_sizes() {
    let dass = get_instrument("dass21").unwrap();
    let pages = dass.pages();
    assert_eq!(pages.len(), 3);
    assert!(pages.iter().all(|p| p.len() == 7));

    let pss = get_instrument("pss10").unwrap();
    assert_eq!(pss.pages().len(), 2);
}

#[test]
fn likert_options_follow_scale() {
    let pss = get_instrument("pss10").unwrap();
    let options = pss.schema().scale.options();
    assert_eq!(options.len(), 5);
    assert_eq!(options[0].value, 0);
    assert_eq!(options[4].value, 4);
    assert_eq!(options[4].label, "Very often");
}

#[test]
fn every_builtin_item_has_text() {
    for instrument in all_instruments() {
        let schema = instrument.schema();
        for item in &schema.items {
            assert!(schema.text(item).is_some(), "{} has no text", item);
        }
    }
}
