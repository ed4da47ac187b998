use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::codes::CodeNormalizer;
use super::ranges::parse_range;
use super::values::parse_numeric;
use crate::config::EngineConfig;
use crate::models::{Interpretation, Observation, ObservationValue, ReferenceRange, Report};
use crate::pipeline::normalize::CandidateMeasurement;

/// One Report plus its Observations, cross-referenced and ready to
/// persist. Construction has no side effects; the caller owns the write.
#[derive(Debug, Clone)]
pub struct BuiltReport {
    pub report: Report,
    pub observations: Vec<Observation>,
}

/// Build the resource graph for one document from its candidate
/// measurements.
///
/// Every observation references the report by id and appears, in input
/// order, in `report.observation_ids`. Callers must pass at least one
/// measurement; zero-measurement documents never create a Report.
pub fn build_report(
    subject_id: Uuid,
    document_id: Uuid,
    effective_date: NaiveDate,
    issued: DateTime<Utc>,
    measurements: &[CandidateMeasurement],
    config: &EngineConfig,
) -> BuiltReport {
    let codes = CodeNormalizer::new(config);
    let report_id = Uuid::new_v4();

    let observations: Vec<Observation> = measurements
        .iter()
        .map(|candidate| build_observation(report_id, candidate, &codes, config))
        .collect();

    let report = Report {
        id: report_id,
        subject_id,
        document_id,
        effective_date,
        issued,
        observation_ids: observations.iter().map(|o| o.id).collect(),
    };

    BuiltReport { report, observations }
}

fn build_observation(
    report_id: Uuid,
    candidate: &CandidateMeasurement,
    codes: &CodeNormalizer,
    config: &EngineConfig,
) -> Observation {
    let value = match parse_numeric(&candidate.value, config.decimal_comma) {
        Some(v) => ObservationValue::Numeric(v),
        None => ObservationValue::Text(candidate.value.trim().to_string()),
    };

    let reference_range = candidate
        .reference_range
        .as_deref()
        .map(|raw| parse_range(raw, config.decimal_comma));

    let interpretation = match (&value, &reference_range) {
        (ObservationValue::Numeric(v), Some(range)) => range.interpret(*v),
        _ => Interpretation::Unknown,
    };

    Observation {
        id: Uuid::new_v4(),
        report_id,
        code: codes.normalize(&candidate.label),
        raw_label: candidate.label.clone(),
        value,
        unit: candidate.unit.clone(),
        reference_range,
        interpretation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(label: &str, value: &str, unit: Option<&str>, range: Option<&str>) -> CandidateMeasurement {
        CandidateMeasurement {
            label: label.into(),
            value: value.into(),
            unit: unit.map(String::from),
            reference_range: range.map(String::from),
            confidence: 0.9,
        }
    }

    fn build(measurements: &[CandidateMeasurement]) -> BuiltReport {
        build_report(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            Utc::now(),
            measurements,
            &EngineConfig::default(),
        )
    }

    #[test]
    fn observations_cross_reference_the_report() {
        let built = build(&[
            candidate("Hemoglobin", "14.5", Some("g/dL"), Some("13.5-17.5")),
            candidate("Glucose", "5.2", Some("mmol/L"), Some("3.9-5.6")),
        ]);

        assert_eq!(built.observations.len(), 2);
        assert_eq!(built.report.observation_ids.len(), 2);
        for (obs, id) in built.observations.iter().zip(&built.report.observation_ids) {
            assert_eq!(obs.report_id, built.report.id);
            assert_eq!(obs.id, *id);
        }
    }

    #[test]
    fn numeric_value_within_range_is_normal() {
        let built = build(&[candidate("Hemoglobin", "14.5", Some("g/dL"), Some("13.5-17.5"))]);
        let obs = &built.observations[0];

        assert_eq!(obs.value, ObservationValue::Numeric(14.5));
        assert_eq!(obs.interpretation, Interpretation::Normal);
        assert_eq!(obs.code, "Hemoglobin");
    }

    #[test]
    fn below_range_is_low() {
        let built = build(&[candidate("Hgb", "11.0", Some("g/dL"), Some("13.5-17.5"))]);
        assert_eq!(built.observations[0].interpretation, Interpretation::Low);
        assert_eq!(built.observations[0].code, "Hemoglobin");
    }

    #[test]
    fn above_range_is_high() {
        let built = build(&[candidate("Glucose", "7.9", None, Some("3.9-5.6"))]);
        assert_eq!(built.observations[0].interpretation, Interpretation::High);
    }

    #[test]
    fn unparsable_value_stays_textual_with_unknown_interpretation() {
        let built = build(&[candidate("Urine Culture", "no growth", None, Some("negative"))]);
        let obs = &built.observations[0];

        assert_eq!(obs.value, ObservationValue::Text("no growth".into()));
        assert_eq!(obs.interpretation, Interpretation::Unknown);
        assert_eq!(
            obs.reference_range,
            Some(ReferenceRange::Text { text: "negative".into() })
        );
    }

    #[test]
    fn numeric_value_without_range_is_unknown() {
        let built = build(&[candidate("TSH", "2.1", Some("mIU/L"), None)]);
        assert_eq!(built.observations[0].interpretation, Interpretation::Unknown);
        assert_eq!(built.observations[0].reference_range, None);
    }

    #[test]
    fn decimal_comma_locale_flows_through() {
        let mut config = EngineConfig::default();
        config.decimal_comma = true;

        let built = build_report(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            Utc::now(),
            &[candidate("Hgb", "14,5", Some("g/dL"), Some("13,5-17,5"))],
            &config,
        );
        let obs = &built.observations[0];

        assert_eq!(obs.value, ObservationValue::Numeric(14.5));
        assert_eq!(obs.interpretation, Interpretation::Normal);
    }

    #[test]
    fn raw_label_is_preserved_alongside_code() {
        let built = build(&[candidate("Hemoglobin (Hgb)", "14.5", None, None)]);
        let obs = &built.observations[0];

        assert_eq!(obs.code, "Hemoglobin");
        assert_eq!(obs.raw_label, "Hemoglobin (Hgb)");
    }

    #[test]
    fn report_carries_effective_date_and_subject() {
        let subject = Uuid::new_v4();
        let document = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2024, 2, 20).unwrap();
        let built = build_report(
            subject,
            document,
            date,
            Utc::now(),
            &[candidate("Hgb", "14.5", None, None)],
            &EngineConfig::default(),
        );

        assert_eq!(built.report.subject_id, subject);
        assert_eq!(built.report.document_id, document);
        assert_eq!(built.report.effective_date, date);
    }
}
