//! Interchangeable risk backends.
//!
//! A backend turns a feature vector into a single risk value. The primary
//! backend is a small dense network read from a JSON artifact; when no
//! artifact can be loaded the [`FallbackEstimator`] takes its place.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::features::{FEATURE_LEN, FeatureVector};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Default artifact location, relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "model/model.json";

/// Environment variable overriding [`DEFAULT_MODEL_PATH`].
pub const MODEL_PATH_ENV: &str = "MINDTRACK_MODEL_PATH";

pub trait RiskBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Raw model output. Callers clamp into [0, 1].
    fn predict(&self, features: &FeatureVector) -> f64;
}

/// Produces a backend. Called at most once per [`Classifier`](crate::classifier::Classifier).
pub trait BackendLoader: Send + Sync {
    fn load(&self) -> BoxFuture<'_, Result<Arc<dyn RiskBackend>, ModelError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
}

impl Activation {
    fn apply(self, x: f64) -> f64 {
        match self {
            Self::Linear => x,
            Self::Relu => x.max(0.0),
            Self::Sigmoid => sigmoid(x),
        }
    }
}

/// Fully connected layer. `weights` is laid out `[input][unit]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub activation: Activation,
}

/// On-disk model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub layers: Vec<DenseLayer>,
}

/// Feed-forward network evaluated from a [`ModelArtifact`].
#[derive(Debug)]
pub struct ArtifactBackend {
    layers: Vec<DenseLayer>,
}

impl ArtifactBackend {
    /// Check layer shapes chain from [`FEATURE_LEN`] inputs to one output.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        if artifact.layers.is_empty() {
            return Err(ModelError::Shape("artifact has no layers".to_string()));
        }

        let mut width = FEATURE_LEN;
        for (n, layer) in artifact.layers.iter().enumerate() {
            if layer.weights.len() != width {
                return Err(ModelError::Shape(format!(
                    "layer {n}: expected {width} input rows, got {}",
                    layer.weights.len()
                )));
            }
            let units = layer.bias.len();
            if let Some(row) = layer.weights.iter().position(|r| r.len() != units) {
                return Err(ModelError::Shape(format!(
                    "layer {n}: row {row} does not have {units} units"
                )));
            }
            width = units;
        }

        if width != 1 {
            return Err(ModelError::Shape(format!(
                "final layer must have 1 unit, got {width}"
            )));
        }

        Ok(Self {
            layers: artifact.layers,
        })
    }
}

impl RiskBackend for ArtifactBackend {
    fn name(&self) -> &str {
        "artifact"
    }

    fn predict(&self, features: &FeatureVector) -> f64 {
        let mut input: Vec<f64> = features.to_vec();
        for layer in &self.layers {
            input = layer
                .bias
                .iter()
                .enumerate()
                .map(|(unit, b)| {
                    let z = input
                        .iter()
                        .zip(&layer.weights)
                        .map(|(x, row)| x * row[unit])
                        .sum::<f64>()
                        + b;
                    layer.activation.apply(z)
                })
                .collect();
        }
        input.first().copied().unwrap_or(0.5)
    }
}

/// Fixed logistic formula used when no artifact is available.
///
/// `sigmoid(-2.0 + 1.5·stress + 1.5·anxiety + 2.0·depression + 3.5·perceived_stress)`.
/// Check-in slots are ignored. All-zero symptoms give ≈0.12, a maximal
/// DASS-21 gives ≈0.95 and a maximal PSS-10 ≈0.82.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackEstimator;

impl FallbackEstimator {
    pub const INTERCEPT: f64 = -2.0;
    pub const WEIGHTS: [f64; 4] = [1.5, 1.5, 2.0, 3.5];
}

impl RiskBackend for FallbackEstimator {
    fn name(&self) -> &str {
        "fallback"
    }

    fn predict(&self, features: &FeatureVector) -> f64 {
        let z = Self::WEIGHTS
            .iter()
            .zip(features.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + Self::INTERCEPT;
        sigmoid(z)
    }
}

/// Reads a [`ModelArtifact`] from a JSON file.
#[derive(Debug, Clone)]
pub struct ArtifactLoader {
    pub path: PathBuf,
}

impl ArtifactLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path from `MINDTRACK_MODEL_PATH`, else [`DEFAULT_MODEL_PATH`].
    pub fn from_env() -> Self {
        let path = std::env::var(MODEL_PATH_ENV).unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string());
        Self::new(path)
    }
}

impl BackendLoader for ArtifactLoader {
    fn load(&self) -> BoxFuture<'_, Result<Arc<dyn RiskBackend>, ModelError>> {
        Box::pin(async move {
            let bytes = tokio::fs::read(&self.path).await?;
            let artifact: ModelArtifact = serde_json::from_slice(&bytes)?;
            let backend = ArtifactBackend::from_artifact(artifact)?;
            tracing::info!(
                path = %self.path.display(),
                layers = backend.layers.len(),
                "model artifact loaded"
            );
            Ok(Arc::new(backend) as Arc<dyn RiskBackend>)
        })
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
