use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Interpretation;

/// A single measured value extracted from a report.
/// Immutable after creation; belongs to exactly one Report, referenced
/// back by id only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub id: Uuid,
    pub report_id: Uuid,
    /// Canonical test code after synonym normalization (e.g. "Hemoglobin").
    pub code: String,
    /// Label exactly as it appeared in the source table.
    pub raw_label: String,
    pub value: ObservationValue,
    pub unit: Option<String>,
    pub reference_range: Option<ReferenceRange>,
    pub interpretation: Interpretation,
}

/// Measured value: numeric when the raw string parsed, textual otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ObservationValue {
    Numeric(f64),
    Text(String),
}

impl ObservationValue {
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Self::Numeric(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

impl std::fmt::Display for ObservationValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Clinically normal interval for a test, as parsed from the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceRange {
    /// "LOW-HIGH" form; bounds are inclusive.
    Interval { low: f64, high: f64 },
    /// "<HIGH" form: values strictly below the bound are normal.
    LessThan { high: f64 },
    /// ">LOW" form: values strictly above the bound are normal.
    GreaterThan { low: f64 },
    /// Free text that did not parse into numeric bounds.
    Text { text: String },
}

impl ReferenceRange {
    /// Derive the interpretation flag for a numeric value against this range.
    pub fn interpret(&self, value: f64) -> Interpretation {
        match self {
            Self::Interval { low, high } => {
                if value < *low {
                    Interpretation::Low
                } else if value > *high {
                    Interpretation::High
                } else {
                    Interpretation::Normal
                }
            }
            Self::LessThan { high } => {
                if value < *high {
                    Interpretation::Normal
                } else {
                    Interpretation::High
                }
            }
            Self::GreaterThan { low } => {
                if value > *low {
                    Interpretation::Normal
                } else {
                    Interpretation::Low
                }
            }
            Self::Text { .. } => Interpretation::Unknown,
        }
    }
}

impl std::fmt::Display for ReferenceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interval { low, high } => write!(f, "{low}-{high}"),
            Self::LessThan { high } => write!(f, "<{high}"),
            Self::GreaterThan { low } => write!(f, ">{low}"),
            Self::Text { text } => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_bounds_are_inclusive() {
        let range = ReferenceRange::Interval { low: 13.5, high: 17.5 };
        assert_eq!(range.interpret(13.5), Interpretation::Normal);
        assert_eq!(range.interpret(17.5), Interpretation::Normal);
        assert_eq!(range.interpret(15.0), Interpretation::Normal);
    }

    #[test]
    fn below_interval_is_low() {
        let range = ReferenceRange::Interval { low: 13.5, high: 17.5 };
        assert_eq!(range.interpret(11.0), Interpretation::Low);
    }

    #[test]
    fn above_interval_is_high() {
        let range = ReferenceRange::Interval { low: 13.5, high: 17.5 };
        assert_eq!(range.interpret(18.2), Interpretation::High);
    }

    #[test]
    fn less_than_bound() {
        let range = ReferenceRange::LessThan { high: 5.0 };
        assert_eq!(range.interpret(4.9), Interpretation::Normal);
        assert_eq!(range.interpret(5.0), Interpretation::High);
        assert_eq!(range.interpret(7.3), Interpretation::High);
    }

    #[test]
    fn greater_than_bound() {
        let range = ReferenceRange::GreaterThan { low: 60.0 };
        assert_eq!(range.interpret(75.0), Interpretation::Normal);
        assert_eq!(range.interpret(60.0), Interpretation::Low);
        assert_eq!(range.interpret(40.0), Interpretation::Low);
    }

    #[test]
    fn textual_range_is_unknown() {
        let range = ReferenceRange::Text { text: "negative".into() };
        assert_eq!(range.interpret(1.0), Interpretation::Unknown);
    }

    #[test]
    fn value_display() {
        assert_eq!(ObservationValue::Numeric(14.5).to_string(), "14.5");
        assert_eq!(ObservationValue::Text("trace".into()).to_string(), "trace");
    }

    #[test]
    fn range_display() {
        assert_eq!(
            ReferenceRange::Interval { low: 13.5, high: 17.5 }.to_string(),
            "13.5-17.5"
        );
        assert_eq!(ReferenceRange::LessThan { high: 5.0 }.to_string(), "<5");
        assert_eq!(ReferenceRange::GreaterThan { low: 60.0 }.to_string(), ">60");
    }

    #[test]
    fn value_serializes_tagged() {
        let json = serde_json::to_string(&ObservationValue::Numeric(14.5)).unwrap();
        assert!(json.contains("\"kind\":\"numeric\""));
        let back: ObservationValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ObservationValue::Numeric(14.5));
    }
}
