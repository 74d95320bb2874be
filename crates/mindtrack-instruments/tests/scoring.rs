use mindtrack_core::models::Answers;
use mindtrack_instruments::error::IncompleteReason;
use mindtrack_instruments::get_instrument;

fn uniform(id: &str, value: i32) -> Answers {
    let instrument = get_instrument(id).unwrap();
    instrument
        .schema()
        .items
        .iter()
        .map(|i| (i.clone(), value))
        .collect()
}

#[test]
fn all_minimum_scores_zero_and_all_maximum_scores_max() {
    for id in ["dass21", "pss10"] {
        let instrument = get_instrument(id).unwrap();
        let scale = &instrument.schema().scale;

        // PSS-10 reverse items invert, so all-min only zeros out dass21.
        if instrument.schema().reverse_items.is_empty() {
            let low = instrument.score(&uniform(id, scale.min)).unwrap();
            assert_eq!(low.raw, 0, "{id}");
            let high = instrument.score(&uniform(id, scale.max)).unwrap();
            assert_eq!(high.raw, instrument.max_raw(), "{id}");
        }
    }
    assert_eq!(get_instrument("dass21").unwrap().max_raw(), 126);
    assert_eq!(get_instrument("pss10").unwrap().max_raw(), 40);
}

#[test]
fn pss10_minimum_and_maximum_in_mapped_terms() {
    let pss = get_instrument("pss10").unwrap();
    let schema = pss.schema();

    // Lowest mapped value for every item: 0 forward, 4 on reverse items.
    let lowest: Answers = schema
        .items
        .iter()
        .map(|i| (i.clone(), if schema.is_reverse(i) { 4 } else { 0 }))
        .collect();
    assert_eq!(pss.score(&lowest).unwrap().raw, 0);

    let highest: Answers = schema
        .items
        .iter()
        .map(|i| (i.clone(), if schema.is_reverse(i) { 0 } else { 4 }))
        .collect();
    assert_eq!(pss.score(&highest).unwrap().raw, 40);
}

#[test]
fn reverse_item_contributes_max_minus_value() {
    let pss = get_instrument("pss10").unwrap();
    let mut answers = uniform("pss10", 0);
    let base = pss.score(&answers).unwrap().raw;

    // p4 is reverse keyed: answering 1 instead of 0 lowers the total by 1.
    answers.insert("p4".to_string(), 1);
    assert_eq!(pss.score(&answers).unwrap().raw, base - 1);

    // p1 is forward keyed: answering 1 raises it by 1.
    answers.insert("p1".to_string(), 1);
    assert_eq!(pss.score(&answers).unwrap().raw, base);
}

#[test]
fn dass21_single_subscale_scenario() {
    let dass = get_instrument("dass21").unwrap();
    let mut answers = uniform("dass21", 0);
    for i in 1..=7 {
        answers.insert(format!("s{i}"), 1);
    }

    let result = dass.score(&answers).unwrap();
    assert_eq!(result.subscale("stress"), Some(14));
    assert_eq!(result.subscale("anxiety"), Some(0));
    assert_eq!(result.subscale("depression"), Some(0));
    assert_eq!(result.raw, 14);
}

#[test]
fn pss10_all_twos_scores_twenty() {
    let pss = get_instrument("pss10").unwrap();
    let result = pss.score(&uniform("pss10", 2)).unwrap();
    assert_eq!(result.raw, 20);
    assert_eq!(result.sub, None);
}

#[test]
fn missing_item_names_the_first_gap() {
    let dass = get_instrument("dass21").unwrap();
    let mut answers = uniform("dass21", 1);
    answers.remove("a3");
    answers.remove("s5");

    let err = dass.score(&answers).unwrap_err();
    assert_eq!(err.item, "a3");
    assert_eq!(err.reason, IncompleteReason::Missing);
}

#[test]
fn out_of_range_value_is_rejected() {
    let pss = get_instrument("pss10").unwrap();
    let mut answers = uniform("pss10", 1);
    answers.insert("p7".to_string(), 5);

    let err = pss.score(&answers).unwrap_err();
    assert_eq!(err.item, "p7");
    assert_eq!(
        err.reason,
        IncompleteReason::OutOfRange {
            value: 5,
            min: 0,
            max: 4
        }
    );
}

#[test]
fn scoring_is_deterministic() {
    let dass = get_instrument("dass21").unwrap();
    let mut answers = uniform("dass21", 2);
    answers.insert("d4".to_string(), 3);
    assert_eq!(dass.score(&answers).unwrap(), dass.score(&answers).unwrap());
}

#[test]
fn subscale_maximum_is_reported_in_clinical_units() {
    let dass = get_instrument("dass21").unwrap();
    assert_eq!(dass.max_subscale("stress"), Some(42));
    assert_eq!(dass.max_subscale("mood"), None);
    assert_eq!(get_instrument("pss10").unwrap().max_subscale("stress"), None);
}
