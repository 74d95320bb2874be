//! mindtrack-instruments
//!
//! Questionnaire definitions and scoring. Pure data and pure functions, no
//! I/O. Each supported instrument carries its schema, page size, and the
//! constants its scoring rules need.

pub mod error;
pub mod instruments;
pub mod schema;
pub mod scoring;

use mindtrack_core::models::{Answers, ScoringResult};

use error::{IncompleteAnswers, InstrumentError, SchemaError};
use schema::InstrumentSchema;

/// Trait implemented by each self-report instrument.
pub trait Instrument: Send + Sync {
    /// The static item set, scale, and grouping.
    fn schema(&self) -> &InstrumentSchema;

    /// Number of items shown per page during collection.
    fn page_size(&self) -> usize;

    /// Factor applied to each subscale sum to bring it onto the instrument's
    /// reporting range. Ignored by instruments without subscales.
    fn subscale_multiplier(&self) -> i32 {
        1
    }

    fn id(&self) -> &str {
        &self.schema().id
    }

    fn name(&self) -> &str {
        &self.schema().name
    }

    fn version(&self) -> &str {
        &self.schema().version
    }

    fn score(&self, answers: &Answers) -> Result<ScoringResult, IncompleteAnswers> {
        scoring::score(self.schema(), self.subscale_multiplier(), answers)
    }

    fn pages(&self) -> Vec<&[String]> {
        self.schema().pages(self.page_size())
    }

    /// Highest attainable score for one subscale, in reporting units.
    fn max_subscale(&self, name: &str) -> Option<i32> {
        let schema = self.schema();
        schema
            .subscales
            .as_ref()?
            .iter()
            .find(|s| s.name == name)
            .map(|s| {
                s.items.iter().map(|i| schema.item_max(i)).sum::<i32>()
                    * self.subscale_multiplier()
            })
    }

    /// Highest attainable `raw` score.
    fn max_raw(&self) -> i32 {
        let schema = self.schema();
        let item_total: i32 = schema.items.iter().map(|i| schema.item_max(i)).sum();
        if schema.subscales.is_some() {
            item_total * self.subscale_multiplier()
        } else {
            item_total
        }
    }
}

/// Return all registered instruments.
pub fn all_instruments() -> Vec<Box<dyn Instrument>> {
    vec![
        Box::new(instruments::dass21::Dass21),
        Box::new(instruments::pss10::Pss10),
    ]
}

/// Validate every registered schema. Run once at startup; a failure means
/// the build ships a broken instrument definition.
pub fn validate_all() -> Result<(), SchemaError> {
    all_instruments()
        .iter()
        .try_for_each(|i| i.schema().validate())
}

/// Look up an instrument by ID, validating its schema.
pub fn get_instrument(id: &str) -> Result<Box<dyn Instrument>, InstrumentError> {
    let instrument = all_instruments()
        .into_iter()
        .find(|i| i.id() == id)
        .ok_or_else(|| InstrumentError::UnknownInstrument(id.to_string()))?;
    instrument.schema().validate()?;
    Ok(instrument)
}
