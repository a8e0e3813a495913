//! Typed records exchanged with the analysis backend
//!
//! Every record received from the backend is kept as a typed value keyed by a
//! stable identifier. Unknown fields on a bug are carried along untouched so
//! the record can be sent back downstream exactly as it arrived.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

// ═══════════════════════════════════════════════════════════════════════════
//  IDENTIFIERS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BugId(Uuid);

impl BugId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BugId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SolutionId(Uuid);

impl SolutionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SolutionId {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ANALYSIS TOOL
// ═══════════════════════════════════════════════════════════════════════════

/// Static analyzer the backend runs over a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisTool {
    #[default]
    Spotbugs,
    Pmd,
}

impl AnalysisTool {
    /// Identifier sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisTool::Spotbugs => "spotbugs",
            AnalysisTool::Pmd => "pmd",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisTool::Spotbugs => "SpotBugs",
            AnalysisTool::Pmd => "PMD",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            AnalysisTool::Spotbugs => AnalysisTool::Pmd,
            AnalysisTool::Pmd => AnalysisTool::Spotbugs,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spotbugs" => Some(AnalysisTool::Spotbugs),
            "pmd" => Some(AnalysisTool::Pmd),
            _ => None,
        }
    }
}

impl fmt::Display for AnalysisTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  BUG
// ═══════════════════════════════════════════════════════════════════════════

/// One static-analysis finding
///
/// The typed fields are a lenient reading of the backend record. The record
/// itself is kept in `received` and is what gets serialized back, so loose
/// values such as `"line": "17"` or `"code_snippet": null` go downstream
/// exactly as they arrived.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "Value")]
pub struct Bug {
    pub file: String,
    pub line: u32,
    pub category: String,
    pub severity: String,
    pub description: String,
    pub code_snippet: String,
    pub bug_type: String,
    /// Fields this client does not interpret
    pub extra: Map<String, Value>,
    /// Record as received; `None` for bugs built locally
    pub received: Option<Value>,
}

#[derive(Deserialize)]
struct BugFields {
    #[serde(default, deserialize_with = "lenient_string")]
    file: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    line: u32,
    #[serde(default, deserialize_with = "lenient_string")]
    category: String,
    #[serde(default, deserialize_with = "lenient_string")]
    severity: String,
    #[serde(default, deserialize_with = "lenient_string")]
    description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    code_snippet: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    bug_type: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<Value> for Bug {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let fields = BugFields::deserialize(&value)?;
        Ok(Bug {
            file: fields.file,
            line: fields.line,
            category: fields.category,
            severity: fields.severity,
            description: fields.description,
            code_snippet: fields.code_snippet,
            bug_type: fields.bug_type,
            extra: fields.extra,
            received: Some(value),
        })
    }
}

impl Serialize for Bug {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if let Some(received) = &self.received {
            return received.serialize(serializer);
        }
        let mut record = self.extra.clone();
        record.insert("file".into(), Value::from(self.file.as_str()));
        record.insert("line".into(), Value::from(self.line));
        record.insert("category".into(), Value::from(self.category.as_str()));
        record.insert("severity".into(), Value::from(self.severity.as_str()));
        record.insert("description".into(), Value::from(self.description.as_str()));
        record.insert("code_snippet".into(), Value::from(self.code_snippet.as_str()));
        record.insert("type".into(), Value::from(self.bug_type.as_str()));
        Value::Object(record).serialize(serializer)
    }
}

/// A bug as held by the session
#[derive(Debug, Clone, PartialEq)]
pub struct BugEntry {
    pub id: BugId,
    pub bug: Bug,
}

impl BugEntry {
    pub fn new(bug: Bug) -> Self {
        Self {
            id: BugId::new(),
            bug,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  SOLUTIONS
// ═══════════════════════════════════════════════════════════════════════════

/// One LLM-proposed fix
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Solution {
    #[serde(default, deserialize_with = "lenient_string")]
    pub solution: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub explanation: String,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: Option<u32>,
}

/// Inline note shown at the bottom of a solution box
#[derive(Debug, Clone, PartialEq)]
pub enum BoxNote {
    Info(String),
    Error(String),
}

/// Per-solution UI state
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionBox {
    pub id: SolutionId,
    /// 1-based display order, the `solution_number` the backend keys on
    pub number: u32,
    pub original_snippet: String,
    pub solution: String,
    pub explanation: String,
    pub rating: Option<u32>,
    /// Text shown before the last feedback round or apply
    pub previous_solution: Option<String>,
    /// Text this box last wrote into the repository file
    pub current_repo_code: Option<String>,
    pub feedback: String,
    pub metrics: Option<MetricsComparison>,
    pub note: Option<BoxNote>,
}

impl SolutionBox {
    pub fn new(number: u32, original_snippet: &str, solution: Solution) -> Self {
        Self {
            id: SolutionId::new(),
            number,
            original_snippet: original_snippet.to_string(),
            solution: solution.solution,
            explanation: solution.explanation,
            rating: solution.rating.filter(|r| *r > 0),
            previous_solution: None,
            current_repo_code: None,
            feedback: String::new(),
            metrics: None,
            note: None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  METRICS
// ═══════════════════════════════════════════════════════════════════════════

/// Before/after value of one code-quality metric
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricDelta {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub before: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub after: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub delta: f64,
}

/// Backend-computed comparison of metrics before and after a fix
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsComparison {
    #[serde(default)]
    pub improvements: BTreeMap<String, MetricDelta>,
    #[serde(default)]
    pub original_metrics: Option<Map<String, Value>>,
    #[serde(default)]
    pub solution_metrics: Option<Map<String, Value>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl MetricsComparison {
    pub fn is_displayable(&self) -> bool {
        self.error.is_none() && !self.improvements.is_empty()
    }
}

/// CK metrics shown next to the file view, in display order
pub const CK_DISPLAY_FIELDS: &[&str] = &[
    "class",
    "wmc",
    "loc",
    "fanin",
    "fanout",
    "returnQty",
    "loopQty",
    "comparisonsQty",
    "tryCatchQty",
    "variablesQty",
];

/// First row of the CK metrics the backend reports for a file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CkMetricsRow(pub Map<String, Value>);

impl CkMetricsRow {
    /// Present display fields as (upper-cased name, value) pairs
    pub fn display_fields(&self) -> Vec<(String, String)> {
        CK_DISPLAY_FIELDS
            .iter()
            .filter_map(|key| {
                let value = self.0.get(*key)?;
                if value.is_null() {
                    return None;
                }
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n
                        .as_f64()
                        .map(crate::util::format_number)
                        .unwrap_or_else(|| n.to_string()),
                    other => other.to_string(),
                };
                Some((key.to_uppercase(), rendered))
            })
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  LENIENT DESERIALIZERS
// ═══════════════════════════════════════════════════════════════════════════
//
// The backend is written in a dynamically typed language: line numbers arrive
// as numbers, numeric strings or null; priorities as strings or numbers.

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value)
        .filter(|n| *n >= 0.0)
        .map(|n| n as u32)
        .unwrap_or(0))
}

fn lenient_rating<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value)
        .filter(|n| *n > 0.0)
        .map(|n| n.round() as u32))
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value).unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bug_parses_backend_shape() {
        let bug: Bug = serde_json::from_value(json!({
            "file": "src/Main.java",
            "line": 42,
            "category": "CORRECTNESS",
            "severity": "1",
            "description": "Null pointer dereference",
            "code_snippet": "String s = null; s.length();",
            "type": "NP_ALWAYS_NULL"
        }))
        .unwrap();
        assert_eq!(bug.line, 42);
        assert_eq!(bug.bug_type, "NP_ALWAYS_NULL");
        assert!(bug.extra.is_empty());
    }

    #[test]
    fn test_bug_tolerates_loose_types() {
        let bug: Bug = serde_json::from_value(json!({
            "file": "A.java",
            "line": "17",
            "severity": 2,
            "code_snippet": null,
            "type": "UnusedLocalVariable"
        }))
        .unwrap();
        assert_eq!(bug.line, 17);
        assert_eq!(bug.severity, "2");
        assert_eq!(bug.code_snippet, "");

        let null_line: Bug = serde_json::from_value(json!({"line": null})).unwrap();
        assert_eq!(null_line.line, 0);
    }

    #[test]
    fn test_bug_loose_values_sent_back_unchanged() {
        let original = json!({
            "file": "A.java",
            "line": "17",
            "severity": 2,
            "code_snippet": null,
            "type": "UnusedLocalVariable"
        });
        let bug: Bug = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(bug.line, 17);
        assert_eq!(serde_json::to_value(&bug).unwrap(), original);
    }

    #[test]
    fn test_local_bug_serializes_typed_fields() {
        let bug = Bug {
            file: "A.java".into(),
            line: 4,
            bug_type: "T".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&bug).unwrap();
        assert_eq!(value["line"], json!(4));
        assert_eq!(value["type"], json!("T"));
        assert_eq!(value["code_snippet"], json!(""));
    }

    #[test]
    fn test_bug_round_trips_unknown_fields() {
        let original = json!({
            "file": "A.java",
            "line": 3,
            "category": "STYLE",
            "severity": "3",
            "description": "d",
            "code_snippet": "x",
            "type": "T",
            "file_path": "cloned_repo/src/A.java"
        });
        let bug: Bug = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(
            bug.extra.get("file_path"),
            Some(&json!("cloned_repo/src/A.java"))
        );
        assert_eq!(serde_json::to_value(&bug).unwrap(), original);
    }

    #[test]
    fn test_solution_rating_optional() {
        let rated: Solution =
            serde_json::from_value(json!({"solution": "a", "explanation": "b", "rating": 8}))
                .unwrap();
        assert_eq!(rated.rating, Some(8));

        let unrated: Solution =
            serde_json::from_value(json!({"solution": "a", "explanation": "b", "rating": 0}))
                .unwrap();
        assert_eq!(unrated.rating, None);

        let missing: Solution = serde_json::from_value(json!({"solution": "a"})).unwrap();
        assert_eq!(missing.rating, None);
        assert_eq!(missing.explanation, "");
    }

    #[test]
    fn test_metrics_comparison_parses_improvements() {
        let metrics: MetricsComparison = serde_json::from_value(json!({
            "original_metrics": {"wmc": 10},
            "solution_metrics": {"wmc": 8},
            "improvements": {
                "wmc": {"before": 10, "after": 8, "delta": -2},
                "loc": {"before": 120, "after": 121, "delta": 1}
            }
        }))
        .unwrap();
        assert!(metrics.is_displayable());
        assert_eq!(metrics.improvements["wmc"].delta, -2.0);
        assert_eq!(metrics.improvements["loc"].after, 121.0);
    }

    #[test]
    fn test_metrics_with_error_not_displayable() {
        let metrics: MetricsComparison =
            serde_json::from_value(json!({"error": "ck failed"})).unwrap();
        assert!(!metrics.is_displayable());
    }

    #[test]
    fn test_ck_row_display_fields_in_fixed_order() {
        let row: CkMetricsRow = serde_json::from_value(json!({
            "loc": 120,
            "class": "com.example.Main",
            "wmc": 14,
            "cbo": 3,
            "fanin": null
        }))
        .unwrap();
        assert_eq!(
            row.display_fields(),
            vec![
                ("CLASS".to_string(), "com.example.Main".to_string()),
                ("WMC".to_string(), "14".to_string()),
                ("LOC".to_string(), "120".to_string()),
            ]
        );
    }

    #[test]
    fn test_analysis_tool_parse_and_toggle() {
        assert_eq!(AnalysisTool::parse("PMD"), Some(AnalysisTool::Pmd));
        assert_eq!(AnalysisTool::parse(" spotbugs "), Some(AnalysisTool::Spotbugs));
        assert_eq!(AnalysisTool::parse("checkstyle"), None);
        assert_eq!(AnalysisTool::Spotbugs.toggle(), AnalysisTool::Pmd);
    }
}
