//! In-process collaborators for tests and offline use.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use futures::StreamExt;
use futures::stream::{self, BoxStream};
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use crate::cache::KeyValueCache;
use crate::error::StorageError;
use crate::store::{BoxFuture, Document, DocumentStore, Query, StoredDocument, check_path, merge, split_path};

type Collections = BTreeMap<String, Vec<StoredDocument>>;

struct Inner {
    collections: RwLock<Collections>,
    /// Bumped on every write so subscribers re-read.
    version: watch::Sender<u64>,
}

/// Document store kept entirely in memory. Clones share the same data.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                collections: RwLock::new(BTreeMap::new()),
                version: watch::Sender::new(0),
            }),
        }
    }

    /// Current contents of one collection, in insertion order.
    pub async fn documents(&self, collection: &str) -> Vec<StoredDocument> {
        snapshot(&self.inner, &Query::collection(collection)).await
    }

    fn notify(&self) {
        self.inner.version.send_modify(|v| *v += 1);
    }
}

async fn snapshot(inner: &Inner, query: &Query) -> Vec<StoredDocument> {
    let docs = inner
        .collections
        .read()
        .await
        .get(&query.collection)
        .cloned()
        .unwrap_or_default();
    query.apply(docs)
}

impl DocumentStore for MemoryStore {
    fn create<'a>(
        &'a self,
        collection: &'a str,
        document: Document,
    ) -> BoxFuture<'a, Result<String, StorageError>> {
        Box::pin(async move {
            check_path(collection)?;
            let id = Uuid::new_v4().to_string();
            let doc = StoredDocument {
                path: format!("{collection}/{id}"),
                id: id.clone(),
                data: document,
            };
            self.inner
                .collections
                .write()
                .await
                .entry(collection.to_string())
                .or_default()
                .push(doc);
            self.notify();
            tracing::debug!(collection, id = %id, "document created");
            Ok(id)
        })
    }

    fn subscribe(&self, query: Query) -> BoxStream<'static, Vec<StoredDocument>> {
        let inner = self.inner.clone();
        let rx = inner.version.subscribe();
        stream::unfold(
            (inner, rx, query, true),
            |(inner, mut rx, query, first)| async move {
                if !first && rx.changed().await.is_err() {
                    return None;
                }
                let docs = snapshot(&inner, &query).await;
                Some((docs, (inner, rx, query, false)))
            },
        )
        .boxed()
    }

    fn update<'a>(
        &'a self,
        path: &'a str,
        partial: Document,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let (collection, id) = split_path(path)?;
            let mut collections = self.inner.collections.write().await;
            let doc = collections
                .get_mut(collection)
                .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
                .ok_or_else(|| StorageError::NotFound {
                    path: path.to_string(),
                })?;
            merge(&mut doc.data, partial, path)?;
            drop(collections);
            self.notify();
            tracing::debug!(path, "document updated");
            Ok(())
        })
    }
}

/// Key-value cache backed by a `HashMap`.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}
