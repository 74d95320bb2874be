use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no feature mapping for instrument: {0}")]
    UnknownInstrument(String),

    #[error("instrument '{instrument_id}' scores have no '{subscale}' subscale")]
    MissingSubscale {
        instrument_id: String,
        subscale: String,
    },

    #[error("invalid thresholds: low {low} must not exceed high {high}, both within [0, 1]")]
    InvalidThresholds { low: f64, high: f64 },

    #[error("model artifact I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("model artifact parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model artifact shape error: {0}")]
    Shape(String),

    #[error("global classifier already initialised")]
    AlreadyInstalled,
}
