use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::build::build_report;
use super::dedup::{find_existing, fingerprint};
use super::normalize::{normalize, OcrOutput};
use super::IngestError;
use crate::config::EngineConfig;
use crate::models::{DocumentRecord, ResourceKind};
use crate::store::{put_json, ResourceStore};
use crate::subjects::subject_exists;

/// Result of one ingestion call. Never ambiguous: either fresh
/// identifiers, or the existing ones with `was_duplicate = true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub document_id: Uuid,
    /// `None` when the document had usable metadata but no recognized
    /// measurements; no empty Report is created.
    pub report_id: Option<Uuid>,
    pub was_duplicate: bool,
}

/// Per-subject mutual exclusion for the "fingerprint check → conditional
/// write" critical section. Scoped per subject so ingestion for
/// different subjects runs fully in parallel.
#[derive(Default)]
pub struct SubjectLocks {
    inner: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl SubjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn for_subject(&self, subject_id: Uuid) -> Arc<Mutex<()>> {
        let mut registry = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        registry.entry(subject_id).or_default().clone()
    }
}

/// Ingestion orchestrator: normalize → fingerprint → duplicate gate →
/// build → persist, with the write order that keeps the graph safe under
/// failure (observations first, then report, then document index).
pub struct Ingestor<'a, S: ResourceStore> {
    store: &'a S,
    config: &'a EngineConfig,
    locks: SubjectLocks,
    timeout: Duration,
}

impl<'a, S: ResourceStore> Ingestor<'a, S> {
    pub fn new(store: &'a S, config: &'a EngineConfig, timeout: Duration) -> Self {
        Self { store, config, locks: SubjectLocks::new(), timeout }
    }

    /// Ingest one document's OCR output for a subject.
    ///
    /// The effective date resolves in order: explicit argument, then a
    /// recognized date from the document's metadata, then the upload
    /// date. Re-uploading content with a matching fingerprint is a
    /// no-op that returns the original identifiers.
    pub fn ingest_document(
        &self,
        subject_id: Uuid,
        ocr: &OcrOutput,
        effective_date: Option<NaiveDate>,
        source_file: Option<&str>,
    ) -> Result<IngestOutcome, IngestError> {
        if !subject_exists(self.store, subject_id, self.timeout)? {
            return Err(IngestError::UnknownSubject(subject_id));
        }

        let normalized = normalize(ocr, self.config);
        if !normalized.has_usable_content() {
            return Err(IngestError::EmptyDocument);
        }
        let content_fingerprint = fingerprint(&normalized);

        // Check-then-act region: hold the subject's lock from the
        // duplicate check through the last write so two concurrent
        // uploads of the same content cannot both pass the gate.
        let cell = self.locks.for_subject(subject_id);
        let _guard = match cell.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(existing) =
            find_existing(self.store, subject_id, &content_fingerprint, self.timeout)?
        {
            tracing::info!(
                subject = %subject_id,
                document = %existing.id,
                "duplicate content fingerprint, returning existing identifiers"
            );
            return Ok(IngestOutcome {
                document_id: existing.id,
                report_id: existing.report_id,
                was_duplicate: true,
            });
        }

        let uploaded_at = Utc::now();
        let effective = effective_date
            .or(normalized.metadata.document_date)
            .unwrap_or_else(|| uploaded_at.date_naive());

        let document_id = Uuid::new_v4();
        let report_id = if normalized.measurements.is_empty() {
            tracing::warn!(
                subject = %subject_id,
                document = %document_id,
                "no measurements recognized, storing document record only"
            );
            None
        } else {
            let built = build_report(
                subject_id,
                document_id,
                effective,
                uploaded_at,
                &normalized.measurements,
                self.config,
            );

            for observation in &built.observations {
                put_json(
                    self.store,
                    subject_id,
                    ResourceKind::Observation,
                    observation.id,
                    observation,
                    self.timeout,
                )?;
            }

            if let Err(e) = put_json(
                self.store,
                subject_id,
                ResourceKind::Report,
                built.report.id,
                &built.report,
                self.timeout,
            ) {
                // Orphan observations are harmless and re-creatable; the
                // inverse (a report pointing at missing observations)
                // must never happen, hence this write order.
                tracing::warn!(
                    subject = %subject_id,
                    report = %built.report.id,
                    orphans = built.observations.len(),
                    "report write failed after observations were persisted"
                );
                return Err(e.into());
            }

            Some(built.report.id)
        };

        let record = DocumentRecord {
            id: document_id,
            subject_id,
            uploaded_at,
            fingerprint: content_fingerprint,
            report_id,
            source_file: source_file.map(String::from),
            ocr_confidence: ocr.confidence,
            text_lines: normalized.audit_text.clone(),
            extra_metadata: normalized.metadata.extra.clone(),
        };
        put_json(self.store, subject_id, ResourceKind::Original, document_id, &record, self.timeout)?;

        tracing::info!(
            subject = %subject_id,
            document = %document_id,
            report = ?report_id,
            observations = record.report_id.map(|_| normalized.measurements.len()).unwrap_or(0),
            dropped_rows = normalized.dropped_rows(),
            "ingested document"
        );

        Ok(IngestOutcome { document_id, report_id, was_duplicate: false })
    }
}
