use std::sync::LazyLock;

use crate::Instrument;
use crate::schema::{InstrumentSchema, Scale};

use super::{ids, labels, text};

/// PSS-10: Perceived Stress Scale, 10-item version.
/// Items rated 0–4; p4, p5, p7, p8 are positively worded and reverse-keyed.
/// Total 0–40, no subscales.
pub struct Pss10;

static SCHEMA: LazyLock<InstrumentSchema> = LazyLock::new(|| InstrumentSchema {
    id: "pss10".to_string(),
    name: "PSS-10".to_string(),
    version: "v1".to_string(),
    scale: Scale {
        min: 0,
        max: 4,
        labels: labels(&["Never", "Almost never", "Sometimes", "Fairly often", "Very often"]),
    },
    items: ids(&["p1", "p2", "p3", "p4", "p5", "p6", "p7", "p8", "p9", "p10"]),
    subscales: None,
    reverse_items: ids(&["p4", "p5", "p7", "p8"]),
    text: text(&[
        ("p1", "In the last month, how often have you been upset because of something that happened unexpectedly?"),
        ("p2", "In the last month, how often have you felt that you were unable to control the important things in your life?"),
        ("p3", "In the last month, how often have you felt nervous and stressed?"),
        ("p4", "In the last month, how often have you felt that things were going your way?"),
        ("p5", "In the last month, how often have you felt confident about your ability to handle your personal problems?"),
        ("p6", "In the last month, how often have you found that you could not cope with all the things that you had to do?"),
        ("p7", "In the last month, how often have you been able to control irritations in your life?"),
        ("p8", "In the last month, how often have you felt that you were on top of things?"),
        ("p9", "In the last month, how often have you been angered because of things that happened that were outside of your control?"),
        ("p10", "In the last month, how often have you felt difficulties were piling up so high that you could not overcome them?"),
    ]),
});

impl Instrument for Pss10 {
    fn schema(&self) -> &InstrumentSchema {
        &SCHEMA
    }

    fn page_size(&self) -> usize {
        5
    }
}
