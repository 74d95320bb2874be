use std::cmp::Ordering;
use std::future::Future;
use std::pin::Pin;

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type Document = serde_json::Value;

/// A document as read back from a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    /// Full path: `{collection}/{id}`.
    pub path: String,
    pub data: Document,
}

/// Which documents a subscription watches.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub collection: String,
    /// Top-level field to sort by.
    pub order_by: Option<String>,
    pub descending: bool,
    pub limit: Option<usize>,
}

impl Query {
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Self::default()
        }
    }

    pub fn order_by(mut self, field: impl Into<String>, descending: bool) -> Self {
        self.order_by = Some(field.into());
        self.descending = descending;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sort and truncate one collection's documents.
    pub fn apply(&self, mut docs: Vec<StoredDocument>) -> Vec<StoredDocument> {
        if let Some(field) = &self.order_by {
            docs.sort_by(|a, b| {
                let ord = compare_json(a.data.get(field), b.data.get(field));
                if self.descending { ord.reverse() } else { ord }
            });
        }
        if let Some(limit) = self.limit {
            docs.truncate(limit);
        }
        docs
    }
}

fn compare_json(a: Option<&Document>, b: Option<&Document>) -> Ordering {
    match (a, b) {
        (Some(Document::Number(x)), Some(Document::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Document::String(x)), Some(Document::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// Remote document database. The engine only ever calls [`create`];
/// [`subscribe`] and [`update`] serve dashboards and admin tooling.
///
/// [`create`]: DocumentStore::create
/// [`subscribe`]: DocumentStore::subscribe
/// [`update`]: DocumentStore::update
pub trait DocumentStore: Send + Sync {
    /// Insert a new document and return its generated id.
    fn create<'a>(
        &'a self,
        collection: &'a str,
        document: Document,
    ) -> BoxFuture<'a, Result<String, StorageError>>;

    /// Stream of result sets; yields the current set first.
    fn subscribe(&self, query: Query) -> BoxStream<'static, Vec<StoredDocument>>;

    /// Shallow-merge `partial` into the document at `path`.
    fn update<'a>(
        &'a self,
        path: &'a str,
        partial: Document,
    ) -> BoxFuture<'a, Result<(), StorageError>>;
}

/// Reject empty segments and traversal so paths map safely onto keys and
/// directories.
pub fn check_path(path: &str) -> Result<(), StorageError> {
    let bad = path.is_empty()
        || path
            .split('/')
            .any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// Split `{collection}/{id}` into its parts.
pub fn split_path(path: &str) -> Result<(&str, &str), StorageError> {
    check_path(path)?;
    path.rsplit_once('/')
        .ok_or_else(|| StorageError::InvalidPath(path.to_string()))
}

/// Shallow merge of JSON objects: top-level keys of `partial` replace those
/// in `target`.
pub fn merge(target: &mut Document, partial: Document, path: &str) -> Result<(), StorageError> {
    let not_object = || StorageError::NotAnObject {
        path: path.to_string(),
    };
    let target = target.as_object_mut().ok_or_else(not_object)?;
    let Document::Object(fields) = partial else {
        return Err(not_object());
    };
    target.extend(fields);
    Ok(())
}
