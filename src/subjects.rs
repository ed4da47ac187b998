//! Subject registration and lookup.
//!
//! The patient profile resource is written once at registration and read
//! by ingestion to validate that the Subject exists before anything else
//! is persisted for it.

use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::models::{ResourceKind, Subject};
use crate::store::{get_json, put_json, ResourceStore, StoreError};

/// Register a new Subject and persist its profile resource.
/// The profile lives in the subject's own partition under its own id.
pub fn register_subject<S: ResourceStore>(
    store: &S,
    display_name: &str,
    contact: &[String],
    timeout: Duration,
) -> Result<Subject, StoreError> {
    let subject = Subject {
        id: Uuid::new_v4(),
        display_name: display_name.to_string(),
        contact: contact.to_vec(),
        registered_at: Utc::now(),
    };

    put_json(store, subject.id, ResourceKind::Patient, subject.id, &subject, timeout)?;
    tracing::info!(subject = %subject.id, "registered subject");
    Ok(subject)
}

/// Load a Subject's profile resource.
pub fn load_subject<S: ResourceStore>(
    store: &S,
    id: Uuid,
    timeout: Duration,
) -> Result<Subject, StoreError> {
    get_json(store, id, ResourceKind::Patient, id, timeout)
}

/// Whether a Subject profile exists. Storage failures propagate; only a
/// definitive `NotFound` maps to `false`.
pub fn subject_exists<S: ResourceStore>(
    store: &S,
    id: Uuid,
    timeout: Duration,
) -> Result<bool, StoreError> {
    match store.get(id, ResourceKind::Patient, id, timeout) {
        Ok(_) => Ok(true),
        Err(StoreError::NotFound { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}
