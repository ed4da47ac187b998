use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One uploaded artifact. Written once at the end of ingestion, never
/// mutated; a re-upload that matches an existing fingerprint returns this
/// record's identifiers instead of creating anything new.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub uploaded_at: DateTime<Utc>,
    /// Content fingerprint over the normalized extraction, not the file
    /// bytes, so re-scans of the same physical page hash identically.
    pub fingerprint: String,
    /// Report produced from this document; `None` when the document had
    /// usable metadata but no recognizable measurements.
    pub report_id: Option<Uuid>,
    /// Pointer to the original artifact in external blob storage.
    pub source_file: Option<String>,
    pub ocr_confidence: Option<f32>,
    /// Free-text OCR lines retained verbatim for audit and debugging.
    pub text_lines: Vec<String>,
    /// Key-value pairs that were not routed to any known metadata field.
    pub extra_metadata: Vec<(String, String)>,
}
