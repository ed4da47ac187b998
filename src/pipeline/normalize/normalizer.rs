use chrono::NaiveDate;

use super::header::detect_columns;
use super::types::{
    CandidateMeasurement, DocumentMetadata, NormalizeWarning, NormalizedDocument, OcrOutput,
};
use crate::config::EngineConfig;

/// Date formats accepted for document-date metadata values, tried in order.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d.%m.%Y"];

/// Convert raw OCR output into candidate measurements plus document
/// metadata.
///
/// Never fails: a document with no recognizable table degrades to
/// "zero measurements, metadata only", and the caller decides whether
/// that is an error state. Unmappable rows are dropped with a warning
/// rather than aborting the table.
pub fn normalize(ocr: &OcrOutput, config: &EngineConfig) -> NormalizedDocument {
    let source_confidence = ocr.confidence.unwrap_or(1.0);
    let mut doc = NormalizedDocument {
        metadata: route_key_values(&ocr.key_values, config),
        audit_text: ocr.text_lines.clone(),
        source_confidence,
        ..Default::default()
    };

    for (table_idx, grid) in ocr.tables.iter().enumerate() {
        let Some(header) = grid.cells.first() else {
            doc.warnings.push(NormalizeWarning::UnrecognizedTable { table: table_idx });
            continue;
        };
        let Some(columns) = detect_columns(header, &config.header_synonyms) else {
            tracing::debug!(table = table_idx, "table header not recognized, skipping");
            doc.warnings.push(NormalizeWarning::UnrecognizedTable { table: table_idx });
            continue;
        };

        for (row_idx, row) in grid.cells.iter().enumerate().skip(1) {
            let label = cell(row, Some(columns.test));
            let value = cell(row, Some(columns.result));

            match (label, value) {
                (Some(label), Some(value)) => {
                    doc.measurements.push(CandidateMeasurement {
                        label,
                        value,
                        unit: cell(row, columns.unit),
                        reference_range: cell(row, columns.range),
                        confidence: source_confidence,
                    });
                }
                _ => {
                    doc.warnings.push(NormalizeWarning::DroppedRow {
                        table: table_idx,
                        row: row_idx,
                    });
                }
            }
        }
    }

    doc
}

fn cell(row: &[String], idx: Option<usize>) -> Option<String> {
    let idx = idx?;
    let value = row.get(idx)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Route key-value pairs whose key matches a known patient-metadata
/// pattern into document metadata; everything else is retained under
/// `extra` for audit. Date-of-birth patterns are checked before generic
/// date patterns ("Date of Birth" must not claim the document date).
fn route_key_values(pairs: &[(String, String)], config: &EngineConfig) -> DocumentMetadata {
    let keys = &config.metadata_keys;
    let mut metadata = DocumentMetadata::default();

    for (key, value) in pairs {
        let key_lower = key.trim().to_lowercase();
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        if matches_any(&key_lower, &keys.date_of_birth) {
            metadata.date_of_birth.get_or_insert_with(|| value.to_string());
        } else if matches_any(&key_lower, &keys.document_date) {
            if metadata.document_date.is_none() {
                metadata.document_date = parse_date(value);
            }
        } else if matches_any(&key_lower, &keys.patient_name) {
            metadata.patient_name.get_or_insert_with(|| value.to_string());
        } else {
            metadata.extra.push((key.clone(), value.to_string()));
        }
    }

    metadata
}

fn matches_any(key: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|p| key.contains(p.as_str()))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}
