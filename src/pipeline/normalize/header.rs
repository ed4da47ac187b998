use crate::config::HeaderSynonyms;

/// Positional mapping from header columns to measurement fields.
/// A table is only recognizable when both a test-name column and a
/// result column are present; unit and range are optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub test: usize,
    pub result: usize,
    pub unit: Option<usize>,
    pub range: Option<usize>,
}

/// Match a header row against the configured column synonyms.
/// Matching is case-insensitive substring containment, so "Test Name"
/// and "Reference Range" hit "test" and "range". The first cell matching
/// each semantic wins; a cell is consumed by the first semantic it
/// matches (range before unit, since "Reference Interval" must not be
/// eaten by a generic unit synonym).
pub fn detect_columns(header: &[String], synonyms: &HeaderSynonyms) -> Option<ColumnMap> {
    let mut test = None;
    let mut result = None;
    let mut unit = None;
    let mut range = None;

    for (idx, cell) in header.iter().enumerate() {
        let cell = cell.trim().to_lowercase();
        if cell.is_empty() {
            continue;
        }

        if test.is_none() && matches_any(&cell, &synonyms.test) {
            test = Some(idx);
        } else if range.is_none() && matches_any(&cell, &synonyms.range) {
            range = Some(idx);
        } else if result.is_none() && matches_any(&cell, &synonyms.result) {
            result = Some(idx);
        } else if unit.is_none() && matches_any(&cell, &synonyms.unit) {
            unit = Some(idx);
        }
    }

    match (test, result) {
        (Some(test), Some(result)) => Some(ColumnMap { test, result, unit, range }),
        _ => None,
    }
}

fn matches_any(cell: &str, synonyms: &[String]) -> bool {
    synonyms.iter().any(|s| cell.contains(s.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn canonical_lab_header_is_recognized() {
        let map = detect_columns(
            &header(&["Test", "Result", "Unit", "Reference Range"]),
            &HeaderSynonyms::default(),
        )
        .unwrap();
        assert_eq!(map, ColumnMap { test: 0, result: 1, unit: Some(2), range: Some(3) });
    }

    #[test]
    fn matching_is_case_insensitive() {
        let map = detect_columns(
            &header(&["TEST NAME", "RESULT", "UNITS", "NORMAL RANGE"]),
            &HeaderSynonyms::default(),
        )
        .unwrap();
        assert_eq!(map.test, 0);
        assert_eq!(map.range, Some(3));
    }

    #[test]
    fn columns_in_any_order() {
        let map = detect_columns(
            &header(&["Value", "Parameter", "Range"]),
            &HeaderSynonyms::default(),
        )
        .unwrap();
        assert_eq!(map, ColumnMap { test: 1, result: 0, unit: None, range: Some(2) });
    }

    #[test]
    fn unit_and_range_are_optional() {
        let map =
            detect_columns(&header(&["Test", "Result"]), &HeaderSynonyms::default()).unwrap();
        assert_eq!(map.unit, None);
        assert_eq!(map.range, None);
    }

    #[test]
    fn missing_test_column_is_unrecognizable() {
        assert!(detect_columns(&header(&["Result", "Unit"]), &HeaderSynonyms::default()).is_none());
    }

    #[test]
    fn missing_result_column_is_unrecognizable() {
        assert!(detect_columns(&header(&["Test", "Unit"]), &HeaderSynonyms::default()).is_none());
    }

    #[test]
    fn prose_row_is_unrecognizable() {
        assert!(detect_columns(
            &header(&["The patient was seen today", "No findings"]),
            &HeaderSynonyms::default()
        )
        .is_none());
    }

    #[test]
    fn reference_interval_maps_to_range_not_unit() {
        let map = detect_columns(
            &header(&["Analyte", "Reading", "Reference Interval", "Units"]),
            &HeaderSynonyms::default(),
        )
        .unwrap();
        assert_eq!(map.range, Some(2));
        assert_eq!(map.unit, Some(3));
    }
}
