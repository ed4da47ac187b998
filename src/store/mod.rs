//! Resource Store Adapter: the persistence contract for the clinical
//! resource graph.
//!
//! Concrete storage is a collaborator: anything that can put/get opaque
//! resource bytes under `{subject, kind, id}` and list a partition in
//! creation order satisfies the contract. Two backends ship with the
//! crate: an in-memory store (tests, embedding) and a SQLite store.

pub mod memory;
pub mod sqlite;

pub use memory::*;
pub use sqlite::*;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::ResourceKind;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Resource not found: {kind}/{id}")]
    NotFound { kind: ResourceKind, id: Uuid },

    #[error("Storage timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Resource encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether the caller may retry the operation with backoff.
    /// `NotFound` and encoding failures are definitive; everything else
    /// is a transient storage-layer condition.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Unavailable(_) | Self::Io(_)
        )
    }
}

/// Persistence contract for resources addressed by `{subject, kind, id}`.
///
/// Guarantees required of implementations:
/// - `list` returns ids in non-decreasing creation-time order, so callers
///   can take "the last two" without re-sorting.
/// - Re-putting an existing id replaces the bytes but keeps its original
///   position in the creation order.
/// - Every call is bounded by the caller-supplied timeout; exceeding it
///   yields `StoreError::Timeout`, which callers treat as retryable.
///
/// No partial-write guarantee is assumed: a failed `put` means "resource
/// not persisted" and nothing else.
pub trait ResourceStore {
    fn put(
        &self,
        subject_id: Uuid,
        kind: ResourceKind,
        id: Uuid,
        bytes: &[u8],
        timeout: Duration,
    ) -> Result<(), StoreError>;

    fn get(
        &self,
        subject_id: Uuid,
        kind: ResourceKind,
        id: Uuid,
        timeout: Duration,
    ) -> Result<Vec<u8>, StoreError>;

    fn list(
        &self,
        subject_id: Uuid,
        kind: ResourceKind,
        timeout: Duration,
    ) -> Result<Vec<Uuid>, StoreError>;
}

/// Serialize a resource as JSON and put it.
pub fn put_json<S, T>(
    store: &S,
    subject_id: Uuid,
    kind: ResourceKind,
    id: Uuid,
    resource: &T,
    timeout: Duration,
) -> Result<(), StoreError>
where
    S: ResourceStore + ?Sized,
    T: Serialize,
{
    let bytes = serde_json::to_vec(resource)?;
    store.put(subject_id, kind, id, &bytes, timeout)
}

/// Get a resource and deserialize it from JSON.
pub fn get_json<S, T>(
    store: &S,
    subject_id: Uuid,
    kind: ResourceKind,
    id: Uuid,
    timeout: Duration,
) -> Result<T, StoreError>
where
    S: ResourceStore + ?Sized,
    T: DeserializeOwned,
{
    let bytes = store.get(subject_id, kind, id, timeout)?;
    Ok(serde_json::from_slice(&bytes)?)
}
