//! LLM dispatch: candidate fixes for one bug, feedback rounds on a
//! candidate, and on-demand metrics for a candidate.

use super::Presentation;
use crate::api::{
    ApiError, BackendClient, CalculateMetricsRequest, FileContentRequest, SendToLlmRequest,
    UpdateSolutionRequest,
};
use crate::model::{Bug, BugId, BoxNote, MetricsComparison, Solution, SolutionBox, SolutionId};
use crate::session::{Dispatch, Session};
use crate::text::strip_code_fences;
use thiserror::Error;

pub const UPDATED: &str = "Solution updated successfully!";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no file selected")]
    NoSelection,

    #[error("bug is no longer listed")]
    BugNotFound,

    #[error("solution is no longer listed")]
    SolutionNotFound,

    #[error("feedback is empty")]
    EmptyFeedback,

    #[error("file content fetch failed: {0}")]
    FetchContent(#[source] ApiError),

    #[error("solution generation failed: {0}")]
    Generate(#[source] ApiError),

    #[error("solution update failed: {0}")]
    Update(#[source] ApiError),

    #[error("metric calculation failed: {0}")]
    Metrics(#[source] ApiError),
}

impl DispatchError {
    pub fn user_message(&self) -> String {
        match self {
            Self::NoSelection => "Please select a file first.".into(),
            Self::BugNotFound => "That bug is no longer listed. View the file again.".into(),
            Self::SolutionNotFound => "That solution is no longer shown.".into(),
            Self::EmptyFeedback => "Please provide feedback before submitting.".into(),
            Self::FetchContent(e) => format!("Error fetching file content: {}", e.user_message()),
            Self::Generate(e) | Self::Metrics(e) => format!("Error: {}", e.user_message()),
            Self::Update(e) if e.is_backend() => {
                format!("Error updating solution: {}", e.user_message())
            }
            Self::Update(e) => format!("Failed to update solution: {}", e.user_message()),
        }
    }

    pub fn presentation(&self) -> Presentation {
        match self {
            Self::Generate(_) | Self::Metrics(_) => Presentation::Inline,
            _ => Presentation::Blocking,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Send to LLM
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub bug_id: BugId,
    pub bug: Bug,
    pub filename: String,
    /// Raw content of `filename` when already cached
    pub cached_content: Option<String>,
}

pub fn prepare(session: &Session, bug_id: BugId) -> Result<DispatchRequest, DispatchError> {
    let filename = session.selected_file().ok_or(DispatchError::NoSelection)?;
    let entry = session.bug(bug_id).ok_or(DispatchError::BugNotFound)?;
    Ok(DispatchRequest {
        bug_id,
        bug: entry.bug.clone(),
        filename: filename.to_string(),
        cached_content: session.cached_content(filename).map(str::to_string),
    })
}

#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub bug_id: BugId,
    pub bug: Bug,
    pub filename: String,
    pub solutions: Vec<Solution>,
}

pub async fn run(
    client: &BackendClient,
    request: DispatchRequest,
) -> Result<DispatchOutcome, DispatchError> {
    let file_content = match request.cached_content {
        Some(content) => content,
        None => {
            tracing::debug!(file = %request.filename, "raw content not cached, refetching");
            let reply = client
                .file_content(&FileContentRequest {
                    filename: request.filename.clone(),
                    tool: None,
                })
                .await
                .map_err(DispatchError::FetchContent)?;
            strip_code_fences(&reply.content)
        }
    };

    let reply = client
        .send_to_llm(&SendToLlmRequest {
            bug: request.bug.clone(),
            file_name: request.filename.clone(),
            file_content,
        })
        .await
        .map_err(DispatchError::Generate)?;

    tracing::info!(
        bug_type = %request.bug.bug_type,
        line = request.bug.line,
        solutions = reply.solutions.len(),
        "candidate fixes received"
    );
    Ok(DispatchOutcome {
        bug_id: request.bug_id,
        bug: request.bug,
        filename: request.filename,
        solutions: reply.solutions,
    })
}

/// Replace the shown candidates. Returns false when the bug left the list.
pub fn record(session: &mut Session, outcome: DispatchOutcome) -> bool {
    if session.bug(outcome.bug_id).is_none() {
        tracing::debug!("dropping candidates for a bug no longer listed");
        return false;
    }
    let boxes = outcome
        .solutions
        .into_iter()
        .zip(1u32..)
        .map(|(solution, number)| SolutionBox::new(number, &outcome.bug.code_snippet, solution))
        .collect();
    session.dispatch = Some(Dispatch {
        bug_id: outcome.bug_id,
        bug: outcome.bug,
        filename: outcome.filename,
        boxes,
    });
    session.patched = None;
    session.apply_failed = false;
    true
}

// ─────────────────────────────────────────────────────────────────────────────
// Feedback
// ─────────────────────────────────────────────────────────────────────────────

pub fn prepare_feedback(
    session: &Session,
    id: SolutionId,
) -> Result<UpdateSolutionRequest, DispatchError> {
    let dispatch = session
        .dispatch
        .as_ref()
        .ok_or(DispatchError::SolutionNotFound)?;
    let solution = session
        .solution_box(id)
        .ok_or(DispatchError::SolutionNotFound)?;

    let feedback = solution.feedback.trim();
    if feedback.is_empty() {
        return Err(DispatchError::EmptyFeedback);
    }

    Ok(UpdateSolutionRequest {
        bug_type: dispatch.bug.bug_type.clone(),
        description: dispatch.bug.description.clone(),
        original_code: session.raw_content().unwrap_or_default().to_string(),
        current_solution: solution.solution.clone(),
        user_feedback: feedback.to_string(),
        solution_number: solution.number,
        filename: dispatch.bug.file.clone(),
        bug_line: dispatch.bug.line,
    })
}

pub async fn run_feedback(
    client: &BackendClient,
    request: UpdateSolutionRequest,
) -> Result<String, DispatchError> {
    let reply = client
        .update_solution(&request)
        .await
        .map_err(DispatchError::Update)?;
    Ok(reply.updated_solution)
}

/// Swap in the regenerated text, keeping the old one as previous solution
pub fn record_feedback(session: &mut Session, id: SolutionId, updated: String) -> bool {
    let Some(solution) = session.solution_box_mut(id) else {
        return false;
    };
    let previous = std::mem::replace(&mut solution.solution, updated);
    solution.previous_solution = Some(previous);
    solution.feedback.clear();
    solution.note = Some(BoxNote::Info(UPDATED.to_string()));
    true
}

// ─────────────────────────────────────────────────────────────────────────────
// Metrics
// ─────────────────────────────────────────────────────────────────────────────

pub fn prepare_metrics(
    session: &Session,
    id: SolutionId,
) -> Result<CalculateMetricsRequest, DispatchError> {
    let dispatch = session
        .dispatch
        .as_ref()
        .ok_or(DispatchError::SolutionNotFound)?;
    let solution = session
        .solution_box(id)
        .ok_or(DispatchError::SolutionNotFound)?;
    Ok(CalculateMetricsRequest {
        filename: dispatch.filename.clone(),
        solution_number: solution.number,
    })
}

pub async fn run_metrics(
    client: &BackendClient,
    request: CalculateMetricsRequest,
) -> Result<Option<MetricsComparison>, DispatchError> {
    let reply = client
        .calculate_metrics(&request)
        .await
        .map_err(DispatchError::Metrics)?;
    Ok(reply.metrics)
}

/// Attach metrics, or the failure line, to the box
pub fn record_metrics(
    session: &mut Session,
    id: SolutionId,
    result: Result<Option<MetricsComparison>, DispatchError>,
) -> bool {
    let Some(solution) = session.solution_box_mut(id) else {
        return false;
    };
    match result {
        Ok(Some(metrics)) => match metrics.error.clone() {
            Some(error) => solution.note = Some(BoxNote::Error(format!("Error: {}", error))),
            None => {
                solution.metrics = Some(metrics);
                solution.note = None;
            }
        },
        Ok(None) => solution.note = Some(BoxNote::Info("No metrics available".into())),
        Err(e) => solution.note = Some(BoxNote::Error(e.user_message())),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ViewedFile;

    fn session_with_dispatch() -> (Session, SolutionId) {
        let mut session = Session::default();
        session.select_file("src/A.java");
        session.show_file(
            ViewedFile {
                filename: "src/A.java".into(),
                content: "class A { int x; }".into(),
                analysis_tool: None,
                ck_metrics: None,
            },
            vec![Bug {
                file: "src/A.java".into(),
                line: 7,
                bug_type: "URF_UNREAD_FIELD".into(),
                description: "Unread field".into(),
                code_snippet: "int x;".into(),
                ..Default::default()
            }],
            Some(1),
        );
        let bug_id = session.bugs()[0].id;
        let outcome = DispatchOutcome {
            bug_id,
            bug: session.bugs()[0].bug.clone(),
            filename: "src/A.java".into(),
            solutions: vec![
                Solution {
                    solution: "/* removed */".into(),
                    explanation: "drop it".into(),
                    rating: Some(7),
                },
                Solution::default(),
            ],
        };
        assert!(record(&mut session, outcome));
        let id = session.dispatch.as_ref().unwrap().boxes[0].id;
        (session, id)
    }

    #[test]
    fn test_prepare_requires_selected_file() {
        let session = Session::default();
        let err = prepare(&session, BugId::new()).unwrap_err();
        assert_eq!(err.user_message(), "Please select a file first.");
    }

    #[test]
    fn test_prepare_uses_cached_content() {
        let (session, _) = session_with_dispatch();
        let bug_id = session.bugs()[0].id;
        let req = prepare(&session, bug_id).unwrap();
        assert_eq!(req.cached_content.as_deref(), Some("class A { int x; }"));
    }

    #[test]
    fn test_record_numbers_boxes_in_order() {
        let (session, _) = session_with_dispatch();
        let boxes = &session.dispatch.as_ref().unwrap().boxes;
        assert_eq!(boxes.iter().map(|b| b.number).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(boxes[0].original_snippet, "int x;");
    }

    #[test]
    fn test_blank_feedback_rejected() {
        let (mut session, id) = session_with_dispatch();
        session.solution_box_mut(id).unwrap().feedback = "   \n".into();
        let err = prepare_feedback(&session, id).unwrap_err();
        assert!(matches!(err, DispatchError::EmptyFeedback));
        assert_eq!(err.presentation(), Presentation::Blocking);
    }

    #[test]
    fn test_feedback_request_fields() {
        let (mut session, id) = session_with_dispatch();
        session.solution_box_mut(id).unwrap().feedback = "  keep the field  ".into();
        let req = prepare_feedback(&session, id).unwrap();
        assert_eq!(req.user_feedback, "keep the field");
        assert_eq!(req.original_code, "class A { int x; }");
        assert_eq!(req.current_solution, "/* removed */");
        assert_eq!(req.solution_number, 1);
        assert_eq!(req.bug_line, 7);
        assert_eq!(req.filename, "src/A.java");
    }

    #[test]
    fn test_record_feedback_keeps_previous() {
        let (mut session, id) = session_with_dispatch();
        session.solution_box_mut(id).unwrap().feedback = "x".into();
        assert!(record_feedback(&mut session, id, "int x = 0;".into()));
        let b = session.solution_box(id).unwrap();
        assert_eq!(b.solution, "int x = 0;");
        assert_eq!(b.previous_solution.as_deref(), Some("/* removed */"));
        assert!(b.feedback.is_empty());
        assert_eq!(b.note, Some(BoxNote::Info(UPDATED.into())));
    }

    #[test]
    fn test_record_metrics_error_note() {
        let (mut session, id) = session_with_dispatch();
        let metrics = MetricsComparison {
            error: Some("ck failed".into()),
            ..Default::default()
        };
        record_metrics(&mut session, id, Ok(Some(metrics)));
        let b = session.solution_box(id).unwrap();
        assert!(b.metrics.is_none());
        assert_eq!(b.note, Some(BoxNote::Error("Error: ck failed".into())));
    }

    #[test]
    fn test_update_error_wording() {
        let backend = DispatchError::Update(ApiError::Backend("Missing fields".into()));
        assert_eq!(backend.user_message(), "Error updating solution: Missing fields");
    }
}
