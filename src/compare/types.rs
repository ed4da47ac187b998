use serde::{Deserialize, Serialize};

use crate::models::{Interpretation, Observation, ObservationValue, Report, TrendDirection};

/// Directional delta for one test code between a subject's two most
/// recent reports. Derived on demand, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub code: String,
    pub previous: Option<ObservationValue>,
    pub current: Option<ObservationValue>,
    pub unit: Option<String>,
    pub direction: TrendDirection,
    /// Signed difference (current − previous) when both values are
    /// numeric; omitted otherwise.
    pub magnitude: Option<f64>,
    /// Interpretation flags passed through from the stored observations,
    /// not recomputed.
    pub previous_interpretation: Option<Interpretation>,
    pub current_interpretation: Option<Interpretation>,
    /// Whether either side falls outside its reference range.
    pub out_of_range: bool,
}

/// A report with its observations resolved, as callers and the
/// comparison engine consume it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportWithObservations {
    pub report: Report,
    pub observations: Vec<Observation>,
}
