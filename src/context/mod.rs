//! Bounded context assembly for the downstream generation step.
//!
//! The comparison table always comes first and is never truncated
//! mid-row; retrieved reference snippets fill the remaining budget and
//! are dropped from the end (lowest relevance rank) when space runs out.

pub mod generation;
pub mod prompt;

pub use generation::*;
pub use prompt::*;

use serde::{Deserialize, Serialize};

use crate::compare::ComparisonResult;
use crate::config::EngineConfig;
use crate::models::{Interpretation, TrendDirection};

/// A reference-knowledge passage retrieved by the external capability,
/// ranked most relevant first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    pub text: String,
    pub source: String,
}

/// Hard limits for one assembled context block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextBudget {
    pub max_chars: usize,
    pub max_snippets: usize,
}

impl From<&EngineConfig> for ContextBudget {
    fn from(config: &EngineConfig) -> Self {
        Self { max_chars: config.max_context_chars, max_snippets: config.max_snippets }
    }
}

const COMPARISON_HEADER: &str = "LAB TREND COMPARISON:";
const TABLE_HEADER: &str = "Test | Previous | Current | Unit | Trend | Flag";
const SNIPPETS_HEADER: &str = "REFERENCE NOTES:";

/// Merge comparison results and reference snippets into one bounded
/// text block, handed verbatim to the external generation capability.
pub fn assemble_context(
    results: &[ComparisonResult],
    snippets: &[Snippet],
    budget: &ContextBudget,
) -> String {
    let mut out = String::new();

    if !results.is_empty() {
        push_line(&mut out, COMPARISON_HEADER, budget.max_chars);
        push_line(&mut out, TABLE_HEADER, budget.max_chars);
        for result in results {
            if !push_line(&mut out, &format_row(result), budget.max_chars) {
                tracing::warn!("comparison rows exceed context budget, dropping the tail");
                break;
            }
        }
    }

    let mut wrote_snippet_header = false;
    for snippet in snippets.iter().take(budget.max_snippets) {
        let line = format!("[{}] {}", snippet.source, snippet.text.trim());
        let header_cost = if wrote_snippet_header {
            0
        } else {
            // Separator blank line + section header
            SNIPPETS_HEADER.len() + 2
        };
        if out.len() + header_cost + line.len() + 1 > budget.max_chars {
            break;
        }
        if !wrote_snippet_header {
            if !out.is_empty() {
                out.push('\n');
            }
            push_line(&mut out, SNIPPETS_HEADER, budget.max_chars);
            wrote_snippet_header = true;
        }
        push_line(&mut out, &line, budget.max_chars);
    }

    out
}

/// Render one comparison entry as a single table row.
pub fn format_row(result: &ComparisonResult) -> String {
    let value = |v: &Option<crate::models::ObservationValue>| {
        v.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
    };

    let trend = match result.magnitude {
        Some(m) => format!("{} ({:+})", result.direction, m),
        None => result.direction.to_string(),
    };

    format!(
        "{} | {} | {} | {} | {} | {}",
        result.code,
        value(&result.previous),
        value(&result.current),
        result.unit.as_deref().unwrap_or("-"),
        trend,
        flag_label(result),
    )
}

fn flag_label(result: &ComparisonResult) -> &'static str {
    let interpretation = match result.direction {
        TrendDirection::Discontinued => result.previous_interpretation,
        _ => result.current_interpretation,
    };
    match interpretation {
        Some(Interpretation::Low) => "abnormal-low",
        Some(Interpretation::High) => "abnormal-high",
        Some(Interpretation::Normal) => "normal",
        _ => "unknown",
    }
}

/// Append `line` plus a newline if it fits the budget. Returns whether
/// it was appended.
fn push_line(out: &mut String, line: &str, max_chars: usize) -> bool {
    if out.len() + line.len() + 1 > max_chars {
        return false;
    }
    out.push_str(line);
    out.push('\n');
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ObservationValue;

    fn result(code: &str, previous: Option<f64>, current: Option<f64>) -> ComparisonResult {
        let direction = match (previous, current) {
            (None, Some(_)) => TrendDirection::New,
            (Some(_), None) => TrendDirection::Discontinued,
            (Some(p), Some(c)) if c > p => TrendDirection::Up,
            (Some(p), Some(c)) if c < p => TrendDirection::Down,
            _ => TrendDirection::Same,
        };
        let magnitude = match (previous, current) {
            (Some(p), Some(c)) => Some(c - p),
            _ => None,
        };
        ComparisonResult {
            code: code.to_string(),
            previous: previous.map(ObservationValue::Numeric),
            current: current.map(ObservationValue::Numeric),
            unit: Some("g/dL".into()),
            direction,
            magnitude,
            previous_interpretation: previous.map(|_| Interpretation::Normal),
            current_interpretation: current.map(|_| Interpretation::Low),
            out_of_range: current.is_some(),
        }
    }

    fn snippet(source: &str, text: &str) -> Snippet {
        Snippet { text: text.to_string(), source: source.to_string() }
    }

    fn wide_budget() -> ContextBudget {
        ContextBudget { max_chars: 10_000, max_snippets: 5 }
    }

    #[test]
    fn rows_render_before_snippets() {
        let context = assemble_context(
            &[result("Hemoglobin", Some(14.5), Some(11.0))],
            &[snippet("anemia-guide", "Low hemoglobin may indicate anemia.")],
            &wide_budget(),
        );

        let table_pos = context.find("Hemoglobin | 14.5 | 11 |").unwrap();
        let snippet_pos = context.find("[anemia-guide]").unwrap();
        assert!(table_pos < snippet_pos);
    }

    #[test]
    fn trend_cell_carries_signed_magnitude() {
        let context =
            assemble_context(&[result("Hemoglobin", Some(14.5), Some(11.0))], &[], &wide_budget());
        assert!(context.contains("down (-3.5)"));
        assert!(context.contains("abnormal-low"));
    }

    #[test]
    fn new_and_discontinued_render_placeholders() {
        let context = assemble_context(
            &[result("TSH", None, Some(2.1)), result("Glucose", Some(5.2), None)],
            &[],
            &wide_budget(),
        );
        assert!(context.contains("TSH | - | 2.1"));
        assert!(context.contains("Glucose | 5.2 | -"));
        assert!(context.contains("| new |"));
        assert!(context.contains("| discontinued |"));
    }

    #[test]
    fn output_never_exceeds_budget() {
        let results: Vec<ComparisonResult> = (0..20)
            .map(|i| result(&format!("Test-{i}"), Some(10.0), Some(12.0)))
            .collect();
        let snippets: Vec<Snippet> =
            (0..10).map(|i| snippet(&format!("src-{i}"), &"x".repeat(120))).collect();

        for max_chars in [0, 10, 50, 120, 400, 900] {
            let budget = ContextBudget { max_chars, max_snippets: 10 };
            let context = assemble_context(&results, &snippets, &budget);
            assert!(
                context.len() <= max_chars,
                "budget {max_chars} exceeded: {}",
                context.len()
            );
        }
    }

    #[test]
    fn rows_are_never_truncated_mid_entry() {
        let results: Vec<ComparisonResult> =
            (0..8).map(|i| result(&format!("Analyte-{i}"), Some(1.0), Some(2.0))).collect();
        let budget = ContextBudget { max_chars: 200, max_snippets: 0 };

        let context = assemble_context(&results, &[], &budget);
        for line in context.lines().skip(2) {
            assert!(line.ends_with("abnormal-low"), "truncated row: {line:?}");
        }
    }

    #[test]
    fn snippets_drop_from_the_end_first() {
        let results = vec![result("Hemoglobin", Some(14.5), Some(11.0))];
        let snippets = vec![
            snippet("first", "most relevant passage"),
            snippet("second", "less relevant passage"),
            snippet("third", "least relevant passage"),
        ];
        // Enough room for the table and roughly one snippet
        let table_len =
            assemble_context(&results, &[], &ContextBudget { max_chars: 10_000, max_snippets: 5 })
                .len();
        let budget = ContextBudget { max_chars: table_len + 60, max_snippets: 5 };

        let context = assemble_context(&results, &snippets, &budget);
        assert!(context.contains("[first]"));
        assert!(!context.contains("[third]"));
        assert!(context.contains("Hemoglobin | 14.5 | 11 |"));
    }

    #[test]
    fn snippet_count_is_capped() {
        let snippets: Vec<Snippet> =
            (0..8).map(|i| snippet(&format!("src-{i}"), "short passage")).collect();
        let budget = ContextBudget { max_chars: 10_000, max_snippets: 3 };

        let context = assemble_context(&[], &snippets, &budget);
        assert!(context.contains("[src-2]"));
        assert!(!context.contains("[src-3]"));
    }

    #[test]
    fn empty_inputs_produce_empty_context() {
        assert_eq!(assemble_context(&[], &[], &wide_budget()), "");
    }

    #[test]
    fn source_labels_are_preserved() {
        let context = assemble_context(
            &[],
            &[snippet("WHO anemia factsheet", "Anemia affects 1 in 4 people.")],
            &wide_budget(),
        );
        assert!(context.contains("[WHO anemia factsheet] Anemia affects 1 in 4 people."));
    }

    #[test]
    fn budget_from_config() {
        let config = EngineConfig::default();
        let budget = ContextBudget::from(&config);
        assert_eq!(budget.max_chars, config.max_context_chars);
        assert_eq!(budget.max_snippets, config.max_snippets);
    }
}
