use std::sync::LazyLock;

use crate::Instrument;
use crate::schema::{InstrumentSchema, Scale, Subscale};

use super::{ids, labels, text};

/// DASS-21: Depression Anxiety Stress Scales, short form.
/// 21 items rated 0–3, three subscales of 7 items. Subscale sums are doubled
/// to match the DASS-42 reporting range (0–42 per subscale).
pub struct Dass21;

static SCHEMA: LazyLock<InstrumentSchema> = LazyLock::new(|| InstrumentSchema {
    id: "dass21".to_string(),
    name: "DASS-21".to_string(),
    version: "v1".to_string(),
    scale: Scale {
        min: 0,
        max: 3,
        labels: labels(&["Never", "Sometimes", "Often", "Almost always"]),
    },
    items: ids(&[
        "d1", "d2", "d3", "d4", "d5", "d6", "d7", //
        "a1", "a2", "a3", "a4", "a5", "a6", "a7", //
        "s1", "s2", "s3", "s4", "s5", "s6", "s7",
    ]),
    subscales: Some(vec![
        Subscale {
            name: "depression".to_string(),
            items: ids(&["d1", "d2", "d3", "d4", "d5", "d6", "d7"]),
        },
        Subscale {
            name: "anxiety".to_string(),
            items: ids(&["a1", "a2", "a3", "a4", "a5", "a6", "a7"]),
        },
        Subscale {
            name: "stress".to_string(),
            items: ids(&["s1", "s2", "s3", "s4", "s5", "s6", "s7"]),
        },
    ]),
    reverse_items: Vec::new(),
    text: text(&[
        ("d1", "I couldn't seem to experience any enthusiasm for anything."),
        ("d2", "I couldn't seem to experience any positive feeling at all."),
        ("d3", "I felt that I had nothing to look forward to."),
        ("d4", "I felt that life was meaningless."),
        ("d5", "I found it difficult to work up the initiative to do things."),
        ("d6", "I felt I wasn't worth much as a person."),
        ("d7", "I felt down-hearted and blue."),
        ("a1", "I felt scared without any good reason."),
        ("a2", "I was aware of the action of my heart in the absence of physical exertion."),
        ("a3", "I experienced breathing difficulty in the absence of physical exertion."),
        ("a4", "I experienced trembling (e.g. in the hands)."),
        ("a5", "I felt I was close to panic."),
        ("a6", "I was worried about situations in which I might panic."),
        ("a7", "I felt very nervous."),
        ("s1", "I found it hard to wind down."),
        ("s2", "I found it difficult to calm down after something upset me."),
        ("s3", "I felt that I was using a lot of nervous energy."),
        ("s4", "I worried excessively about situations that might get out of control."),
        ("s5", "I found myself getting agitated."),
        ("s6", "I felt that I was rather touchy."),
        ("s7", "I was intolerant of anything that kept me from getting on with what I was doing."),
    ]),
});

impl Instrument for Dass21 {
    fn schema(&self) -> &InstrumentSchema {
        &SCHEMA
    }

    fn page_size(&self) -> usize {
        7
    }

    fn subscale_multiplier(&self) -> i32 {
        2
    }
}
