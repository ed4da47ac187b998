//! Engine configuration loaded at startup.
//!
//! The normalization vocabulary (test-code synonyms, table-header synonyms,
//! metadata key patterns) and the tunable comparison/assembly parameters
//! live here as explicit data, so normalization stays auditable and
//! testable in isolation. Deployments override the defaults from a JSON
//! file; every field has a serde default.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Column-header synonyms for recognizing lab tables, matched
/// case-insensitively as substrings of header cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderSynonyms {
    #[serde(default = "default_test_headers")]
    pub test: Vec<String>,
    #[serde(default = "default_result_headers")]
    pub result: Vec<String>,
    #[serde(default = "default_unit_headers")]
    pub unit: Vec<String>,
    #[serde(default = "default_range_headers")]
    pub range: Vec<String>,
}

impl Default for HeaderSynonyms {
    fn default() -> Self {
        Self {
            test: default_test_headers(),
            result: default_result_headers(),
            unit: default_unit_headers(),
            range: default_range_headers(),
        }
    }
}

/// Key substrings that route OCR key-value pairs into document metadata
/// instead of measurements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataKeys {
    #[serde(default = "default_name_keys")]
    pub patient_name: Vec<String>,
    #[serde(default = "default_dob_keys")]
    pub date_of_birth: Vec<String>,
    #[serde(default = "default_date_keys")]
    pub document_date: Vec<String>,
}

impl Default for MetadataKeys {
    fn default() -> Self {
        Self {
            patient_name: default_name_keys(),
            date_of_birth: default_dob_keys(),
            document_date: default_date_keys(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Raw label (lowercased, whitespace-collapsed) → canonical test code.
    #[serde(default = "default_code_synonyms")]
    pub code_synonyms: HashMap<String, String>,

    #[serde(default)]
    pub header_synonyms: HeaderSynonyms,

    #[serde(default)]
    pub metadata_keys: MetadataKeys,

    /// When true, numeric values use a decimal comma ("14,5").
    #[serde(default)]
    pub decimal_comma: bool,

    /// Numeric deltas at or below this threshold compare as SAME.
    /// Default only suppresses float noise; widen per assay as needed.
    #[serde(default = "default_same_epsilon")]
    pub same_epsilon: f64,

    /// Character budget for the assembled generation context.
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,

    /// Maximum number of retrieved reference snippets in the context.
    #[serde(default = "default_max_snippets")]
    pub max_snippets: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            code_synonyms: default_code_synonyms(),
            header_synonyms: HeaderSynonyms::default(),
            metadata_keys: MetadataKeys::default(),
            decimal_comma: false,
            same_epsilon: default_same_epsilon(),
            max_context_chars: default_max_context_chars(),
            max_snippets: default_max_snippets(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON string. Missing fields fall back to
    /// the built-in defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file on disk.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

fn default_same_epsilon() -> f64 {
    1e-9
}

fn default_max_context_chars() -> usize {
    6000
}

fn default_max_snippets() -> usize {
    5
}

fn default_test_headers() -> Vec<String> {
    ["test", "test name", "examination", "parameter", "analyte", "investigation"]
        .map(String::from)
        .to_vec()
}

fn default_result_headers() -> Vec<String> {
    ["result", "value", "finding", "reading"].map(String::from).to_vec()
}

fn default_unit_headers() -> Vec<String> {
    ["unit", "units", "uom"].map(String::from).to_vec()
}

fn default_range_headers() -> Vec<String> {
    ["range", "reference", "normal range", "interval", "normal values"]
        .map(String::from)
        .to_vec()
}

fn default_name_keys() -> Vec<String> {
    ["patient name", "name", "patient"].map(String::from).to_vec()
}

fn default_dob_keys() -> Vec<String> {
    ["date of birth", "dob", "birth date", "born"].map(String::from).to_vec()
}

fn default_date_keys() -> Vec<String> {
    ["date", "collected", "reported", "drawn"].map(String::from).to_vec()
}

fn default_code_synonyms() -> HashMap<String, String> {
    let entries: [(&str, &str); 34] = [
        ("hgb", "Hemoglobin"),
        ("hb", "Hemoglobin"),
        ("haemoglobin", "Hemoglobin"),
        ("hemoglobin", "Hemoglobin"),
        ("hemoglobin (hgb)", "Hemoglobin"),
        ("hct", "Hematocrit"),
        ("hematocrit", "Hematocrit"),
        ("haematocrit", "Hematocrit"),
        ("wbc", "White Blood Cell Count"),
        ("white blood cells", "White Blood Cell Count"),
        ("white blood cell count", "White Blood Cell Count"),
        ("leukocytes", "White Blood Cell Count"),
        ("plt", "Platelet Count"),
        ("platelets", "Platelet Count"),
        ("platelet count", "Platelet Count"),
        ("glu", "Glucose"),
        ("glucose", "Glucose"),
        ("blood glucose", "Glucose"),
        ("fasting glucose", "Glucose"),
        ("hba1c", "HbA1c"),
        ("a1c", "HbA1c"),
        ("glycated hemoglobin", "HbA1c"),
        ("cr", "Creatinine"),
        ("creat", "Creatinine"),
        ("creatinine", "Creatinine"),
        ("na", "Sodium"),
        ("sodium", "Sodium"),
        ("k", "Potassium"),
        ("potassium", "Potassium"),
        ("cl", "Chloride"),
        ("chloride", "Chloride"),
        ("tsh", "TSH"),
        ("thyroid stimulating hormone", "TSH"),
        ("total cholesterol", "Total Cholesterol"),
    ];
    entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}
