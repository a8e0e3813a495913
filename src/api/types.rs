//! Wire shapes of the backend endpoints

use crate::model::{Bug, CkMetricsRow, MetricsComparison, Solution};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A decoded reply that may carry a backend-reported error
pub trait BackendReply {
    /// The logical error the backend reported, if any
    fn backend_error(&self) -> Option<String> {
        None
    }
}

/// `None` for absent, empty or null error fields
fn non_empty(error: &Option<String>) -> Option<String> {
    error.as_ref().filter(|e| !e.trim().is_empty()).cloned()
}

// ─────────────────────────────────────────────────────────────────────────────
// /analyze, /files
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl BackendReply for AnalyzeResponse {
    fn backend_error(&self) -> Option<String> {
        non_empty(&self.error)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilesResponse {
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl BackendReply for FilesResponse {
    fn backend_error(&self) -> Option<String> {
        non_empty(&self.error)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// /file_content
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct FileContentRequest {
    pub filename: String,
    /// Omitted on the cache-miss refetch so the backend uses its default tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileContentResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub num_bugs: Option<u32>,
    #[serde(default)]
    pub analysis_tool: Option<String>,
    #[serde(default)]
    pub bugs: Vec<Bug>,
    /// CK metrics rows; an error object in place of the list is ignored
    #[serde(default, deserialize_with = "metrics_rows")]
    pub metrics: Vec<CkMetricsRow>,
    #[serde(default)]
    pub error: Option<String>,
}

impl BackendReply for FileContentResponse {
    fn backend_error(&self) -> Option<String> {
        if let Some(error) = non_empty(&self.error) {
            return Some(error);
        }
        if !self.success {
            return Some("File analysis failed".to_string());
        }
        None
    }
}

fn metrics_rows<'de, D>(deserializer: D) -> Result<Vec<CkMetricsRow>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(CkMetricsRow(map)),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// /send_to_llm, /update_solution
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SendToLlmRequest {
    pub bug: Bug,
    pub file_name: String,
    pub file_content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolutionsResponse {
    #[serde(default)]
    pub solutions: Vec<Solution>,
    #[serde(default)]
    pub error: Option<String>,
}

impl BackendReply for SolutionsResponse {
    fn backend_error(&self) -> Option<String> {
        non_empty(&self.error)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpdateSolutionRequest {
    pub bug_type: String,
    pub description: String,
    pub original_code: String,
    pub current_solution: String,
    pub user_feedback: String,
    pub solution_number: u32,
    pub filename: String,
    pub bug_line: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSolutionResponse {
    #[serde(default)]
    pub updated_solution: String,
    /// Whole file with the updated snippet integrated
    #[serde(default)]
    pub full_solution: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl BackendReply for UpdateSolutionResponse {
    fn backend_error(&self) -> Option<String> {
        non_empty(&self.error)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// /apply_solution, /calculate_metrics
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApplySolutionRequest {
    pub file_path: String,
    pub code_snippet: String,
    pub solution: String,
    pub solution_number: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplySolutionResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub full_solution: Option<String>,
    #[serde(default)]
    pub corrected_code: Option<String>,
    #[serde(default)]
    pub metrics: Option<MetricsComparison>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApplySolutionResponse {
    /// Patched file text, preferring the full solution over the corrected code
    pub fn patched_code(&self) -> Option<&str> {
        self.full_solution
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.corrected_code.as_deref())
    }
}

impl BackendReply for ApplySolutionResponse {
    fn backend_error(&self) -> Option<String> {
        non_empty(&self.error)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CalculateMetricsRequest {
    pub filename: String,
    pub solution_number: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalculateMetricsResponse {
    #[serde(default)]
    pub metrics: Option<MetricsComparison>,
    #[serde(default)]
    pub error: Option<String>,
}

impl BackendReply for CalculateMetricsResponse {
    fn backend_error(&self) -> Option<String> {
        non_empty(&self.error)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// /validate_patch, /commit_changes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidatePatchRequest {
    pub filename: String,
    pub bug_line: u32,
    pub bug_type: String,
    pub original_code: String,
    pub patched_code: String,
    pub tool: String,
}

/// Verdict of a patch validation.
///
/// The backend answers 200 when the bug is gone and 422 when it is still
/// present; both are verdicts, not errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidatePatchResponse {
    #[serde(default)]
    pub bug_fixed: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub other_bugs: Vec<Value>,
}

impl BackendReply for ValidatePatchResponse {}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommitRequest {
    pub commit_message: String,
    pub repo_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl BackendReply for CommitResponse {
    fn backend_error(&self) -> Option<String> {
        if self.success {
            None
        } else if self.message.trim().is_empty() {
            Some("Commit was rejected by the server".to_string())
        } else {
            Some(self.message.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_content_failure_reports_error() {
        let reply: FileContentResponse = serde_json::from_value(json!({
            "success": false,
            "error": "Compilation failed"
        }))
        .unwrap();
        assert_eq!(reply.backend_error(), Some("Compilation failed".to_string()));
    }

    #[test]
    fn test_file_content_tolerates_metrics_error_object() {
        let reply: FileContentResponse = serde_json::from_value(json!({
            "success": true,
            "content": "class A {}",
            "bugs": [],
            "num_bugs": 0,
            "metrics": {"error": "ck unavailable"},
            "analysis_tool": "Pmd"
        }))
        .unwrap();
        assert!(reply.metrics.is_empty());
        assert_eq!(reply.backend_error(), None);
    }

    #[test]
    fn test_file_content_request_omits_missing_tool() {
        let req = FileContentRequest {
            filename: "A.java".into(),
            tool: None,
        };
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({"filename": "A.java"}));
    }

    #[test]
    fn test_apply_response_prefers_full_solution() {
        let reply: ApplySolutionResponse = serde_json::from_value(json!({
            "full_solution": "full",
            "corrected_code": "partial"
        }))
        .unwrap();
        assert_eq!(reply.patched_code(), Some("full"));

        let fallback: ApplySolutionResponse =
            serde_json::from_value(json!({"corrected_code": "partial"})).unwrap();
        assert_eq!(fallback.patched_code(), Some("partial"));
    }

    #[test]
    fn test_commit_failure_uses_message() {
        let reply: CommitResponse =
            serde_json::from_value(json!({"success": false, "message": "Error: no remote"}))
                .unwrap();
        assert_eq!(reply.backend_error(), Some("Error: no remote".to_string()));

        let ok: CommitResponse =
            serde_json::from_value(json!({"success": true, "message": "pushed"})).unwrap();
        assert_eq!(ok.backend_error(), None);
    }

    #[test]
    fn test_empty_error_string_is_not_an_error() {
        let reply: SolutionsResponse =
            serde_json::from_value(json!({"solutions": [], "error": ""})).unwrap();
        assert_eq!(reply.backend_error(), None);
    }
}
