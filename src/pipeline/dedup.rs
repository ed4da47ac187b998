//! Content fingerprinting and same-subject duplicate detection.
//!
//! The fingerprint hashes a canonical serialization of the *normalized*
//! extraction, not the original file bytes: two scans of the same
//! physical page differ byte-for-byte but normalize identically.
//! Measurement lines are sorted before hashing so the fingerprint is
//! order-independent.

use std::time::Duration;

use base64::Engine;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::build::collapse_whitespace;
use super::normalize::NormalizedDocument;
use crate::models::{DocumentRecord, ResourceKind};
use crate::store::{get_json, ResourceStore, StoreError};

/// Compute the deterministic content fingerprint for a normalized
/// document.
pub fn fingerprint(normalized: &NormalizedDocument) -> String {
    let mut measurement_lines: Vec<String> = normalized
        .measurements
        .iter()
        .map(|m| {
            format!(
                "{}|{}|{}|{}",
                canonical(&m.label),
                canonical(&m.value),
                canonical(m.unit.as_deref().unwrap_or("")),
                canonical(m.reference_range.as_deref().unwrap_or("")),
            )
        })
        .collect();
    measurement_lines.sort();

    let text_lines: Vec<String> = normalized
        .audit_text
        .iter()
        .map(|l| canonical(l))
        .filter(|l| !l.is_empty())
        .collect();

    let mut hasher = Sha256::new();
    for line in &measurement_lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    hasher.update(b"--\n");
    for line in &text_lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }

    base64::engine::general_purpose::STANDARD.encode(hasher.finalize())
}

fn canonical(s: &str) -> String {
    collapse_whitespace(s).to_lowercase()
}

/// Scan the subject's document index for an existing record with this
/// fingerprint. Returns the first match in creation order.
pub fn find_existing<S: ResourceStore>(
    store: &S,
    subject_id: Uuid,
    fingerprint: &str,
    timeout: Duration,
) -> Result<Option<DocumentRecord>, StoreError> {
    for id in store.list(subject_id, ResourceKind::Original, timeout)? {
        let record: DocumentRecord =
            get_json(store, subject_id, ResourceKind::Original, id, timeout)?;
        if record.fingerprint == fingerprint {
            return Ok(Some(record));
        }
    }
    Ok(None)
}
