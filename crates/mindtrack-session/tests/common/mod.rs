#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures::stream::BoxStream;

use mindtrack_model::backend::{BackendLoader, BoxFuture, RiskBackend};
use mindtrack_model::classifier::Classifier;
use mindtrack_model::error::ModelError;
use mindtrack_model::features::FeatureVector;
use mindtrack_session::session::Collaborators;
use mindtrack_storage::cache::KeyValueCache;
use mindtrack_storage::error::StorageError;
use mindtrack_storage::identity::WatchIdentity;
use mindtrack_storage::memory::{MemoryCache, MemoryStore};
use mindtrack_storage::store::{self, Document, DocumentStore, Query, StoredDocument};

/// Backend returning a fixed risk.
pub struct Fixed(pub f64);

impl RiskBackend for Fixed {
    fn name(&self) -> &str {
        "fixed"
    }

    fn predict(&self, _features: &FeatureVector) -> f64 {
        self.0
    }
}

pub struct FixedLoader(pub f64);

impl BackendLoader for FixedLoader {
    fn load(&self) -> BoxFuture<'_, Result<Arc<dyn RiskBackend>, ModelError>> {
        let risk = self.0;
        Box::pin(async move { Ok(Arc::new(Fixed(risk)) as Arc<dyn RiskBackend>) })
    }
}

/// Memory store that can be switched offline and counts create calls.
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub offline: Arc<AtomicBool>,
    pub creates: Arc<AtomicUsize>,
}

impl FlakyStore {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

impl DocumentStore for FlakyStore {
    fn create<'a>(
        &'a self,
        collection: &'a str,
        document: Document,
    ) -> store::BoxFuture<'a, Result<String, StorageError>> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Box::pin(async { Err(StorageError::Unavailable("offline".to_string())) });
        }
        self.inner.create(collection, document)
    }

    fn subscribe(&self, query: Query) -> BoxStream<'static, Vec<StoredDocument>> {
        self.inner.subscribe(query)
    }

    fn update<'a>(
        &'a self,
        path: &'a str,
        partial: Document,
    ) -> store::BoxFuture<'a, Result<(), StorageError>> {
        self.inner.update(path, partial)
    }
}

/// Cache whose writes can be made to fail.
#[derive(Default)]
pub struct BrokenCache {
    pub inner: MemoryCache,
    pub failing: AtomicBool,
}

impl KeyValueCache for BrokenCache {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("disk full".to_string()));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

pub struct Harness {
    pub store: FlakyStore,
    pub cache: Arc<MemoryCache>,
    pub identity: Arc<WatchIdentity>,
    pub deps: Collaborators,
}

pub fn harness(user: Option<&str>, risk: f64) -> Harness {
    let store = FlakyStore::default();
    let cache = Arc::new(MemoryCache::new());
    let identity = Arc::new(match user {
        Some(u) => WatchIdentity::signed_in(u),
        None => WatchIdentity::anonymous(),
    });
    let deps = Collaborators {
        store: Arc::new(store.clone()),
        cache: cache.clone(),
        identity: identity.clone(),
        classifier: Arc::new(Classifier::new(FixedLoader(risk))),
    };
    Harness {
        store,
        cache,
        identity,
        deps,
    }
}
