use mindtrack_core::keys;

#[test]
fn submissions_collection_is_namespaced_by_user() {
    assert_eq!(keys::submissions("u-42"), "assessments/u-42/submissions");
    assert_eq!(
        keys::submission("u-42", "abc"),
        "assessments/u-42/submissions/abc"
    );
    assert!(keys::submissions("u-42").starts_with(keys::ASSESSMENTS_PREFIX));
}

#[test]
fn autosave_key_falls_back_to_anonymous() {
    assert_eq!(keys::autosave(Some("u-42"), "dass21"), "u-42:dass21:answers");
    assert_eq!(keys::autosave(None, "pss10"), "anon:pss10:answers");
}
