//! Local-disk collaborators.
//!
//! Every write goes to a temp file first and is renamed into place, so a
//! crash never leaves a half-written value behind.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use futures::stream::{self, BoxStream};
use uuid::Uuid;

use crate::cache::KeyValueCache;
use crate::error::StorageError;
use crate::store::{BoxFuture, Document, DocumentStore, Query, StoredDocument, check_path, merge, split_path};

/// Write `bytes` to `path` atomically (tmp + rename).
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, bytes)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Percent-encode everything outside `[A-Za-z0-9_-]` so any key maps to a
/// unique, portable file name.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// Key-value cache with one JSON file per key.
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }
}

impl KeyValueCache for LocalCache {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        write_atomic(&path, value.as_bytes())?;
        tracing::debug!(key, path = %path.display(), "cache entry written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => {
                tracing::debug!(key, "cache entry removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Document store laid out as `{root}/{collection}/{id}.json`.
///
/// Subscriptions yield the current result set once; there is no change
/// feed on disk.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn document_path(&self, collection: &str, id: &str) -> PathBuf {
        self.root.join(collection).join(format!("{id}.json"))
    }
}

fn read_collection(root: &Path, query: &Query) -> Result<Vec<StoredDocument>, StorageError> {
    check_path(&query.collection)?;
    let dir = root.join(&query.collection);
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut docs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        let data: Document = serde_json::from_slice(&std::fs::read(&path)?)?;
        docs.push(StoredDocument {
            path: format!("{}/{id}", query.collection),
            id,
            data,
        });
    }
    docs.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(query.apply(docs))
}

impl DocumentStore for LocalStore {
    fn create<'a>(
        &'a self,
        collection: &'a str,
        document: Document,
    ) -> BoxFuture<'a, Result<String, StorageError>> {
        Box::pin(async move {
            check_path(collection)?;
            let id = Uuid::new_v4().to_string();
            let path = self.document_path(collection, &id);
            let bytes = serde_json::to_vec_pretty(&document)?;
            write_atomic(&path, &bytes)?;
            tracing::debug!(collection, id = %id, path = %path.display(), "document created");
            Ok(id)
        })
    }

    fn subscribe(&self, query: Query) -> BoxStream<'static, Vec<StoredDocument>> {
        let docs = match read_collection(&self.root, &query) {
            Ok(docs) => docs,
            Err(e) => {
                tracing::warn!(collection = %query.collection, error = %e, "failed to read collection");
                Vec::new()
            }
        };
        stream::once(async move { docs }).boxed()
    }

    fn update<'a>(
        &'a self,
        path: &'a str,
        partial: Document,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let (collection, id) = split_path(path)?;
            let file = self.document_path(collection, id);
            let bytes = match std::fs::read(&file) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(StorageError::NotFound {
                        path: path.to_string(),
                    });
                }
                Err(e) => return Err(e.into()),
            };
            let mut doc: Document = serde_json::from_slice(&bytes)?;
            merge(&mut doc, partial, path)?;
            write_atomic(&file, &serde_json::to_vec_pretty(&doc)?)?;
            tracing::debug!(path, "document updated");
            Ok(())
        })
    }
}
