//! Lazily loaded, shared risk classifier.
//!
//! The backend is loaded on first prediction and reused for the life of the
//! [`Classifier`]. Concurrent first callers all await the same in-flight
//! load. A failed load is replaced by [`FallbackEstimator`] and never
//! reported to callers.

use std::sync::{Arc, OnceLock};

use tokio::sync::OnceCell;
use tracing::{info, warn};

use mindtrack_core::models::RiskAssessment;

use crate::backend::{ArtifactLoader, BackendLoader, FallbackEstimator, RiskBackend};
use crate::category::{Thresholds, categorize};
use crate::error::ModelError;
use crate::features::FeatureVector;

/// Risk returned when a backend produces a non-finite value.
pub const NEUTRAL_RISK: f64 = 0.5;

pub struct Classifier {
    loader: Box<dyn BackendLoader>,
    backend: OnceCell<Arc<dyn RiskBackend>>,
    thresholds: Thresholds,
}

static GLOBAL: OnceLock<Arc<Classifier>> = OnceLock::new();

impl Classifier {
    pub fn new(loader: impl BackendLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            backend: OnceCell::new(),
            thresholds: Thresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Process-wide classifier. Created on first use from
    /// `MINDTRACK_MODEL_PATH` unless [`install_global`](Self::install_global)
    /// ran first. Lives until process exit.
    pub fn global() -> Arc<Classifier> {
        GLOBAL
            .get_or_init(|| Arc::new(Classifier::new(ArtifactLoader::from_env())))
            .clone()
    }

    /// Configure the process-wide classifier. Must run before the first
    /// call to [`global`](Self::global).
    pub fn install_global(classifier: Classifier) -> Result<Arc<Classifier>, ModelError> {
        let shared = Arc::new(classifier);
        GLOBAL
            .set(shared.clone())
            .map_err(|_| ModelError::AlreadyInstalled)?;
        Ok(shared)
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Whether the backend has been resolved (loaded or replaced by the
    /// fallback).
    pub fn is_loaded(&self) -> bool {
        self.backend.initialized()
    }

    /// The shared backend, loading it on first call.
    pub async fn backend(&self) -> Arc<dyn RiskBackend> {
        self.backend
            .get_or_init(|| async {
                match self.loader.load().await {
                    Ok(backend) => {
                        info!(backend = backend.name(), "risk backend ready");
                        backend
                    }
                    Err(e) => {
                        warn!(error = %e, "risk backend failed to load, using fallback estimator");
                        Arc::new(FallbackEstimator) as Arc<dyn RiskBackend>
                    }
                }
            })
            .await
            .clone()
    }

    /// Continuous risk in [0, 1].
    pub async fn predict_risk(&self, features: &FeatureVector) -> f64 {
        let backend = self.backend().await;
        let risk = backend.predict(features);
        if risk.is_finite() {
            risk.clamp(0.0, 1.0)
        } else {
            warn!(backend = backend.name(), "non-finite risk, substituting neutral value");
            NEUTRAL_RISK
        }
    }

    /// Predict and categorize in one step.
    pub async fn assess(&self, features: &FeatureVector) -> RiskAssessment {
        let risk = self.predict_risk(features).await;
        RiskAssessment {
            risk,
            category: categorize(risk, self.thresholds),
        }
    }
}
