use std::collections::HashMap;
use std::time::Duration;

use uuid::Uuid;

use super::types::{ComparisonResult, ReportWithObservations};
use super::CompareError;
use crate::config::EngineConfig;
use crate::models::{Observation, ObservationValue, Report, ResourceKind, TrendDirection};
use crate::pipeline::build::CodeNormalizer;
use crate::store::{get_json, ResourceStore};

/// Fetch all of a subject's reports with observations resolved, most
/// recent first. Ordering: effective date, ties broken by upload
/// timestamp (later wins).
pub fn fetch_reports<S: ResourceStore>(
    store: &S,
    subject_id: Uuid,
    timeout: Duration,
) -> Result<Vec<ReportWithObservations>, CompareError> {
    let mut reports: Vec<Report> = Vec::new();
    for id in store.list(subject_id, ResourceKind::Report, timeout)? {
        reports.push(get_json(store, subject_id, ResourceKind::Report, id, timeout)?);
    }
    reports.sort_by(|a, b| {
        (b.effective_date, b.issued).cmp(&(a.effective_date, a.issued))
    });

    reports
        .into_iter()
        .map(|report| {
            let observations = report
                .observation_ids
                .iter()
                .map(|obs_id| {
                    get_json(store, subject_id, ResourceKind::Observation, *obs_id, timeout)
                })
                .collect::<Result<Vec<Observation>, _>>()?;
            Ok(ReportWithObservations { report, observations })
        })
        .collect()
}

/// Compare a subject's two most recent reports per test code.
///
/// One result per code present in either report: codes in the newer
/// report first (in report order), then codes only the older report
/// carries, flagged DISCONTINUED. Missing or single-report history
/// yields the obvious degenerate outputs (empty; everything NEW).
/// `codes` restricts the output; requested codes are themselves run
/// through the synonym table, so "Hgb" selects "Hemoglobin".
///
/// Pure function of stored state: identical state, identical output.
pub fn compare<S: ResourceStore>(
    store: &S,
    config: &EngineConfig,
    subject_id: Uuid,
    codes: Option<&[String]>,
    timeout: Duration,
) -> Result<Vec<ComparisonResult>, CompareError> {
    let reports = fetch_reports(store, subject_id, timeout)?;
    let Some(newest) = reports.first() else {
        return Ok(Vec::new());
    };
    let older = reports.get(1);

    let normalizer = CodeNormalizer::new(config);
    let wanted: Option<Vec<String>> = codes.map(|cs| {
        cs.iter().map(|c| normalizer.normalize(c)).collect()
    });
    let selected = |code: &str| -> bool {
        wanted.as_ref().map(|w| w.iter().any(|c| c == code)).unwrap_or(true)
    };

    let (newer_order, newer_by_code) = index_by_code(&newest.observations);
    let empty: Vec<Observation> = Vec::new();
    let (older_order, older_by_code) =
        index_by_code(older.map(|r| r.observations.as_slice()).unwrap_or(&empty));

    let mut results = Vec::new();

    for code in &newer_order {
        if !selected(code) {
            continue;
        }
        let current = newer_by_code[code.as_str()];
        let previous = older_by_code.get(code.as_str()).copied();
        results.push(compare_pair(code, previous, Some(current), config));
    }

    for code in &older_order {
        if newer_by_code.contains_key(code.as_str()) || !selected(code) {
            continue;
        }
        let previous = older_by_code[code.as_str()];
        results.push(compare_pair(code, Some(previous), None, config));
    }

    tracing::debug!(
        subject = %subject_id,
        results = results.len(),
        "compared most recent reports"
    );
    Ok(results)
}

/// First occurrence per code, preserving report order.
fn index_by_code(observations: &[Observation]) -> (Vec<String>, HashMap<&str, &Observation>) {
    let mut order = Vec::new();
    let mut by_code: HashMap<&str, &Observation> = HashMap::new();
    for obs in observations {
        if !by_code.contains_key(obs.code.as_str()) {
            order.push(obs.code.clone());
            by_code.insert(obs.code.as_str(), obs);
        }
    }
    (order, by_code)
}

fn compare_pair(
    code: &str,
    previous: Option<&Observation>,
    current: Option<&Observation>,
    config: &EngineConfig,
) -> ComparisonResult {
    let direction = match (previous, current) {
        (None, Some(_)) => TrendDirection::New,
        (Some(_), None) => TrendDirection::Discontinued,
        (Some(prev), Some(cur)) => value_direction(&prev.value, &cur.value, config.same_epsilon),
        (None, None) => TrendDirection::Same,
    };

    let magnitude = match (previous, current) {
        (Some(prev), Some(cur)) => match (prev.value.as_numeric(), cur.value.as_numeric()) {
            (Some(p), Some(c)) => Some(c - p),
            _ => None,
        },
        _ => None,
    };

    let previous_interpretation = previous.map(|o| o.interpretation);
    let current_interpretation = current.map(|o| o.interpretation);
    let out_of_range = previous_interpretation.map(|i| i.is_abnormal()).unwrap_or(false)
        || current_interpretation.map(|i| i.is_abnormal()).unwrap_or(false);

    ComparisonResult {
        code: code.to_string(),
        previous: previous.map(|o| o.value.clone()),
        current: current.map(|o| o.value.clone()),
        unit: current.or(previous).and_then(|o| o.unit.clone()),
        direction,
        magnitude,
        previous_interpretation,
        current_interpretation,
        out_of_range,
    }
}

/// UP/DOWN only when the delta exceeds epsilon. Textual pairs report
/// SAME: the direction set has no ordering for text, and abnormality
/// still surfaces through the interpretation flags.
fn value_direction(
    previous: &ObservationValue,
    current: &ObservationValue,
    epsilon: f64,
) -> TrendDirection {
    match (previous.as_numeric(), current.as_numeric()) {
        (Some(p), Some(c)) => {
            let delta = c - p;
            if delta > epsilon {
                TrendDirection::Up
            } else if delta < -epsilon {
                TrendDirection::Down
            } else {
                TrendDirection::Same
            }
        }
        _ => TrendDirection::Same,
    }
}
