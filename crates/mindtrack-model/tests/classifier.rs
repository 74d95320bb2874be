use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use mindtrack_core::models::RiskCategory;
use mindtrack_model::backend::{
    Activation, ArtifactBackend, ArtifactLoader, BackendLoader, BoxFuture, DenseLayer,
    FallbackEstimator, ModelArtifact, RiskBackend,
};
use mindtrack_model::category::{Thresholds, categorize};
use mindtrack_model::classifier::Classifier;
use mindtrack_model::error::ModelError;
use mindtrack_model::features::FEATURE_LEN;

struct Constant(f64);

impl RiskBackend for Constant {
    fn name(&self) -> &str {
        "constant"
    }

    fn predict(&self, _features: &[f64; FEATURE_LEN]) -> f64 {
        self.0
    }
}

/// Counts loads and sleeps so concurrent callers overlap.
struct CountingLoader {
    loads: Arc<AtomicUsize>,
    value: f64,
}

impl BackendLoader for CountingLoader {
    fn load(&self) -> BoxFuture<'_, Result<Arc<dyn RiskBackend>, ModelError>> {
        Box::pin(async move {
            self.loads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(Arc::new(Constant(self.value)) as Arc<dyn RiskBackend>)
        })
    }
}

struct FailingLoader;

impl BackendLoader for FailingLoader {
    fn load(&self) -> BoxFuture<'_, Result<Arc<dyn RiskBackend>, ModelError>> {
        Box::pin(async { Err(ModelError::Shape("broken".to_string())) })
    }
}

const ZEROS: [f64; FEATURE_LEN] = [0.0; FEATURE_LEN];

#[test]
fn categorize_boundaries_belong_to_the_higher_band() {
    let t = Thresholds::default();
    assert_eq!(categorize(0.0, t), RiskCategory::Low);
    assert_eq!(categorize(0.329999, t), RiskCategory::Low);
    assert_eq!(categorize(0.33, t), RiskCategory::Med);
    assert_eq!(categorize(0.659999, t), RiskCategory::Med);
    assert_eq!(categorize(0.66, t), RiskCategory::High);
    assert_eq!(categorize(1.0, t), RiskCategory::High);
}

#[test]
fn thresholds_must_be_ordered_and_bounded() {
    assert!(Thresholds::new(0.2, 0.8).is_ok());
    assert!(Thresholds::new(0.8, 0.2).is_err());
    assert!(Thresholds::new(-0.1, 0.5).is_err());
    assert!(Thresholds::new(0.1, 1.5).is_err());
}

#[tokio::test]
async fn concurrent_first_use_loads_once() {
    let loads = Arc::new(AtomicUsize::new(0));
    let classifier = Arc::new(Classifier::new(CountingLoader {
        loads: loads.clone(),
        value: 0.4,
    }));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let c = classifier.clone();
        handles.push(tokio::spawn(async move { c.predict_risk(&ZEROS).await }));
    }
    for h in handles {
        assert_eq!(h.await.unwrap(), 0.4);
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(classifier.is_loaded());

    classifier.predict_risk(&ZEROS).await;
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_load_falls_back_transparently() {
    let classifier = Classifier::new(FailingLoader);
    let risk = classifier.predict_risk(&ZEROS).await;
    assert_eq!(risk, FallbackEstimator.predict(&ZEROS));
    assert_eq!(classifier.backend().await.name(), "fallback");
}

#[tokio::test]
async fn missing_artifact_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let classifier = Classifier::new(ArtifactLoader::new(dir.path().join("absent.json")));
    let assessment = classifier.assess(&ZEROS).await;
    assert!((0.0..=1.0).contains(&assessment.risk));
    assert_eq!(assessment.category, RiskCategory::Low);
}

#[tokio::test]
async fn out_of_range_backend_output_is_clamped() {
    let loads = Arc::new(AtomicUsize::new(0));
    let high = Classifier::new(CountingLoader {
        loads: loads.clone(),
        value: 3.0,
    });
    assert_eq!(high.predict_risk(&ZEROS).await, 1.0);

    let nan = Classifier::new(CountingLoader {
        loads,
        value: f64::NAN,
    });
    assert_eq!(nan.predict_risk(&ZEROS).await, 0.5);
}

#[tokio::test]
async fn custom_thresholds_drive_category() {
    let classifier = Classifier::new(CountingLoader {
        loads: Arc::new(AtomicUsize::new(0)),
        value: 0.5,
    })
    .with_thresholds(Thresholds::new(0.1, 0.4).unwrap());
    assert_eq!(classifier.assess(&ZEROS).await.category, RiskCategory::High);
}

fn single_layer(weights: Vec<f64>, bias: f64, activation: Activation) -> ModelArtifact {
    ModelArtifact {
        layers: vec![DenseLayer {
            weights: weights.into_iter().map(|w| vec![w]).collect(),
            bias: vec![bias],
            activation,
        }],
    }
}

#[test]
fn artifact_forward_pass() {
    // Linear sum of the first two slots.
    let mut w = vec![0.0; FEATURE_LEN];
    w[0] = 1.0;
    w[1] = 1.0;
    let backend = ArtifactBackend::from_artifact(single_layer(w, 0.0, Activation::Linear)).unwrap();

    let mut f = ZEROS;
    f[0] = 0.25;
    f[1] = 0.5;
    assert!((backend.predict(&f) - 0.75).abs() < 1e-12);
}

#[test]
fn artifact_hidden_layer_with_relu() {
    // 7 -> 2 (relu) -> 1 (sigmoid); bias-only hidden units.
    let artifact = ModelArtifact {
        layers: vec![
            DenseLayer {
                weights: vec![vec![0.0, 0.0]; FEATURE_LEN],
                bias: vec![-1.0, 2.0],
                activation: Activation::Relu,
            },
            DenseLayer {
                weights: vec![vec![5.0], vec![0.0]],
                bias: vec![0.0],
                activation: Activation::Sigmoid,
            },
        ],
    };
    let backend = ArtifactBackend::from_artifact(artifact).unwrap();
    // relu(-1) = 0 so the output is sigmoid(0).
    assert!((backend.predict(&ZEROS) - 0.5).abs() < 1e-12);
}

#[test]
fn artifact_shape_is_checked() {
    let wrong_inputs = single_layer(vec![1.0; 3], 0.0, Activation::Linear);
    assert!(matches!(
        ArtifactBackend::from_artifact(wrong_inputs),
        Err(ModelError::Shape(_))
    ));

    let two_outputs = ModelArtifact {
        layers: vec![DenseLayer {
            weights: vec![vec![1.0, 1.0]; FEATURE_LEN],
            bias: vec![0.0, 0.0],
            activation: Activation::Sigmoid,
        }],
    };
    assert!(ArtifactBackend::from_artifact(two_outputs).is_err());
    assert!(ArtifactBackend::from_artifact(ModelArtifact { layers: vec![] }).is_err());
}

#[tokio::test]
async fn artifact_loads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let artifact = single_layer(vec![0.0; FEATURE_LEN], 2.0, Activation::Sigmoid);
    std::fs::write(&path, serde_json::to_vec(&artifact).unwrap()).unwrap();

    let classifier = Classifier::new(ArtifactLoader::new(&path));
    assert_eq!(classifier.backend().await.name(), "artifact");
    let risk = classifier.predict_risk(&ZEROS).await;
    assert!((risk - 1.0 / (1.0 + (-2.0f64).exp())).abs() < 1e-12);
}

#[test]
fn fallback_orders_risk_by_symptom_load() {
    let calm = FallbackEstimator.predict(&ZEROS);
    let mut severe = ZEROS;
    severe[..3].copy_from_slice(&[1.0, 1.0, 1.0]);
    let severe = FallbackEstimator.predict(&severe);

    assert_eq!(categorize(calm, Thresholds::default()), RiskCategory::Low);
    assert_eq!(categorize(severe, Thresholds::default()), RiskCategory::High);
}
