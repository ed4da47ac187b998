use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use uuid::Uuid;

use super::{ResourceStore, StoreError};
use crate::models::ResourceKind;

/// In-memory resource store. The default backend for tests and for
/// embedding the engine without external storage.
///
/// Creation order is tracked per `(subject, kind)` partition; re-putting
/// an existing id replaces the bytes without moving it in the order.
#[derive(Default)]
pub struct InMemoryStore {
    partitions: Mutex<HashMap<(Uuid, ResourceKind), Partition>>,
}

#[derive(Default)]
struct Partition {
    order: Vec<Uuid>,
    items: HashMap<Uuid, Vec<u8>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_partitions<R>(
        &self,
        f: impl FnOnce(&mut HashMap<(Uuid, ResourceKind), Partition>) -> R,
    ) -> R {
        let mut guard = match self.partitions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

impl ResourceStore for InMemoryStore {
    fn put(
        &self,
        subject_id: Uuid,
        kind: ResourceKind,
        id: Uuid,
        bytes: &[u8],
        _timeout: Duration,
    ) -> Result<(), StoreError> {
        self.with_partitions(|partitions| {
            let partition = partitions.entry((subject_id, kind)).or_default();
            if partition.items.insert(id, bytes.to_vec()).is_none() {
                partition.order.push(id);
            }
            Ok(())
        })
    }

    fn get(
        &self,
        subject_id: Uuid,
        kind: ResourceKind,
        id: Uuid,
        _timeout: Duration,
    ) -> Result<Vec<u8>, StoreError> {
        self.with_partitions(|partitions| {
            partitions
                .get(&(subject_id, kind))
                .and_then(|p| p.items.get(&id))
                .cloned()
                .ok_or(StoreError::NotFound { kind, id })
        })
    }

    fn list(
        &self,
        subject_id: Uuid,
        kind: ResourceKind,
        _timeout: Duration,
    ) -> Result<Vec<Uuid>, StoreError> {
        self.with_partitions(|partitions| {
            Ok(partitions
                .get(&(subject_id, kind))
                .map(|p| p.order.clone())
                .unwrap_or_default())
        })
    }
}
