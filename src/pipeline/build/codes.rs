use std::collections::HashMap;

use crate::config::EngineConfig;

/// Synonym-table-driven test-code normalization.
///
/// The table is explicit configuration loaded at startup; labels it does
/// not know pass through lowercased and whitespace-collapsed, so that
/// identical unmapped labels still match each other across reports.
pub struct CodeNormalizer {
    synonyms: HashMap<String, String>,
}

impl CodeNormalizer {
    pub fn new(config: &EngineConfig) -> Self {
        Self { synonyms: config.code_synonyms.clone() }
    }

    /// Map a raw label to its canonical code.
    /// Lookup order: the collapsed label itself, then the label with a
    /// trailing parenthetical stripped ("Hemoglobin (Hgb)" → "hemoglobin").
    pub fn normalize(&self, raw_label: &str) -> String {
        let key = collapse_whitespace(raw_label).to_lowercase();

        if let Some(canonical) = self.synonyms.get(&key) {
            return canonical.clone();
        }
        if let Some(stripped) = strip_trailing_parenthetical(&key) {
            if let Some(canonical) = self.synonyms.get(&stripped) {
                return canonical.clone();
            }
        }

        key
    }
}

/// Collapse runs of whitespace to single spaces and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_trailing_parenthetical(label: &str) -> Option<String> {
    let open = label.rfind('(')?;
    if !label.ends_with(')') {
        return None;
    }
    let stripped = label[..open].trim_end();
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}
