//! Pure projections from session records to displayable rows
//!
//! Nothing here touches the terminal; the renderers in `ui::render` style
//! these rows and the tests check them directly.

use crate::model::{Bug, CkMetricsRow, MetricsComparison};
use crate::text::split_lines;
use crate::util::{expand_tabs, format_number};

pub const NO_BUGS: &str = "No bugs detected for this file.";
pub const NO_CK_METRICS: &str = "No CK metrics available for this file.";

/// One numbered line of a code view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLine {
    pub number: usize,
    pub text: String,
}

/// Number every newline-delimited segment of `text`, starting at 1
pub fn code_lines(text: &str) -> Vec<CodeLine> {
    split_lines(text)
        .into_iter()
        .enumerate()
        .map(|(i, line)| CodeLine {
            number: i + 1,
            text: expand_tabs(line),
        })
        .collect()
}

/// Width of the line-number gutter for `line_count` lines
pub fn gutter_width(line_count: usize) -> usize {
    line_count.max(1).to_string().len()
}

pub fn bug_count_label(count: u32) -> String {
    format!("Bugs Detected: {}", count)
}

/// `L42 NP_ALWAYS_NULL (CORRECTNESS)`
pub fn bug_title(bug: &Bug) -> String {
    let mut title = format!("L{} {}", bug.line, bug.bug_type);
    if !bug.category.is_empty() {
        title.push_str(&format!(" ({})", bug.category));
    }
    title
}

pub fn rating_label(rating: Option<u32>) -> Option<String> {
    rating.filter(|r| *r > 0).map(|r| format!("{}/10", r))
}

/// CK metric lines (`WMC: 14`) or the placeholder when nothing is available
pub fn ck_metric_lines(row: Option<&CkMetricsRow>) -> Vec<String> {
    let fields = row.map(CkMetricsRow::display_fields).unwrap_or_default();
    if fields.is_empty() {
        return vec![NO_CK_METRICS.to_string()];
    }
    fields
        .into_iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect()
}

/// Direction of a metric change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    /// Negative delta, shown in the success colour
    Down,
    /// Positive delta, shown in the danger colour
    Up,
    Flat,
}

impl Trend {
    pub fn from_delta(delta: f64) -> Self {
        if delta < 0.0 {
            Trend::Down
        } else if delta > 0.0 {
            Trend::Up
        } else {
            Trend::Flat
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Down => "↓",
            Trend::Up => "↑",
            Trend::Flat => "→",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub name: String,
    pub before: String,
    pub after: String,
    /// Arrow followed by the absolute delta
    pub change: String,
    pub trend: Trend,
}

/// Rows of the before/after table; empty when the comparison carries an error
pub fn metrics_rows(metrics: &MetricsComparison) -> Vec<MetricRow> {
    if !metrics.is_displayable() {
        return Vec::new();
    }
    metrics
        .improvements
        .iter()
        .map(|(name, m)| {
            let trend = Trend::from_delta(m.delta);
            MetricRow {
                name: name.to_uppercase(),
                before: format_number(m.before),
                after: format_number(m.after),
                change: format!("{} {}", trend.arrow(), format_number(m.delta.abs())),
                trend,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MetricDelta;
    use std::collections::BTreeMap;

    #[test]
    fn test_code_lines_count_matches_segments() {
        let lines = code_lines("a\n\tb\r\n\nc");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1].text, "    b");
        assert_eq!(lines[3].number, 4);
    }

    #[test]
    fn test_gutter_width() {
        assert_eq!(gutter_width(0), 1);
        assert_eq!(gutter_width(9), 1);
        assert_eq!(gutter_width(120), 3);
    }

    #[test]
    fn test_metrics_rows_arrows() {
        let mut improvements = BTreeMap::new();
        improvements.insert(
            "wmc".to_string(),
            MetricDelta {
                before: 10.0,
                after: 8.0,
                delta: -2.0,
            },
        );
        improvements.insert(
            "loc".to_string(),
            MetricDelta {
                before: 100.0,
                after: 101.5,
                delta: 1.5,
            },
        );
        improvements.insert(
            "cbo".to_string(),
            MetricDelta {
                before: 3.0,
                after: 3.0,
                delta: 0.0,
            },
        );
        let metrics = MetricsComparison {
            improvements,
            ..Default::default()
        };

        let rows = metrics_rows(&metrics);
        let by_name = |n: &str| rows.iter().find(|r| r.name == n).unwrap();
        assert_eq!(by_name("WMC").change, "↓ 2");
        assert_eq!(by_name("WMC").trend, Trend::Down);
        assert_eq!(by_name("LOC").change, "↑ 1.5");
        assert_eq!(by_name("LOC").after, "101.5");
        assert_eq!(by_name("CBO").change, "→ 0");
    }

    #[test]
    fn test_metrics_rows_skipped_on_error() {
        let metrics = MetricsComparison {
            error: Some("ck failed".into()),
            ..Default::default()
        };
        assert!(metrics_rows(&metrics).is_empty());
    }

    #[test]
    fn test_ck_metric_lines_placeholder() {
        assert_eq!(ck_metric_lines(None), vec![NO_CK_METRICS.to_string()]);
    }

    #[test]
    fn test_labels() {
        assert_eq!(bug_count_label(3), "Bugs Detected: 3");
        assert_eq!(rating_label(Some(8)), Some("8/10".to_string()));
        assert_eq!(rating_label(Some(0)), None);
        let bug = Bug {
            line: 42,
            bug_type: "NP".into(),
            category: "CORRECTNESS".into(),
            ..Default::default()
        };
        assert_eq!(bug_title(&bug), "L42 NP (CORRECTNESS)");
    }
}
