use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw OCR output for one document, as returned by the external OCR
/// capability: reading-order text lines, detected key-value pairs, and
/// zero or more table grids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrOutput {
    pub text_lines: Vec<String>,
    /// Key-value pairs in reading order; keys may repeat.
    pub key_values: Vec<(String, String)>,
    pub tables: Vec<TableGrid>,
    /// Overall extraction confidence reported by the OCR engine, 0.0-1.0.
    pub confidence: Option<f32>,
}

impl OcrOutput {
    pub fn is_empty(&self) -> bool {
        self.text_lines.iter().all(|l| l.trim().is_empty())
            && self.key_values.is_empty()
            && self.tables.is_empty()
    }
}

/// A detected table as a 2-D grid of cell strings. The first row is
/// treated as a header when it matches known column semantics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableGrid {
    pub cells: Vec<Vec<String>>,
}

impl TableGrid {
    pub fn new(cells: Vec<Vec<String>>) -> Self {
        Self { cells }
    }
}

/// One untyped measurement candidate lifted from a table row.
/// Typing (numeric parsing, range parsing, code normalization) happens
/// in the resource builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMeasurement {
    pub label: String,
    pub value: String,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    pub confidence: f32,
}

/// Document-level metadata routed out of the measurement stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub patient_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub document_date: Option<NaiveDate>,
    /// Key-value pairs that matched no known metadata pattern.
    pub extra: Vec<(String, String)>,
}

impl DocumentMetadata {
    pub fn is_empty(&self) -> bool {
        self.patient_name.is_none()
            && self.date_of_birth.is_none()
            && self.document_date.is_none()
            && self.extra.is_empty()
    }
}

/// Anomalies observed while normalizing. Never fatal: normalization
/// degrades instead of failing the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NormalizeWarning {
    /// Table had no recognizable header row; its rows were skipped.
    UnrecognizedTable { table: usize },
    /// A data row could not be mapped to a measurement and was dropped.
    DroppedRow { table: usize, row: usize },
}

/// The normalizer's output: typed candidates plus everything retained
/// for metadata and audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedDocument {
    pub measurements: Vec<CandidateMeasurement>,
    pub metadata: DocumentMetadata,
    /// Free-text lines retained verbatim; not parsed into measurements.
    pub audit_text: Vec<String>,
    pub warnings: Vec<NormalizeWarning>,
    pub source_confidence: f32,
}

impl NormalizedDocument {
    /// Whether ingestion has anything to work with. A document with zero
    /// measurements but usable metadata or audit text still ingests.
    pub fn has_usable_content(&self) -> bool {
        !self.measurements.is_empty()
            || !self.metadata.is_empty()
            || self.audit_text.iter().any(|l| !l.trim().is_empty())
    }

    pub fn dropped_rows(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, NormalizeWarning::DroppedRow { .. }))
            .count()
    }
}
