//! Solution application
//!
//! Applying a candidate sends `{file_path, code_snippet, solution}` where
//! `code_snippet` must be text that is really in the repository file right
//! now. Candidates for it are tried in a fixed order and, unless disabled,
//! each one is checked against a fresh copy of the file first.

use super::Presentation;
use crate::api::{ApiError, ApplySolutionRequest, BackendClient, FileContentRequest};
use crate::model::{BoxNote, MetricsComparison, SolutionId};
use crate::session::{PatchedPreview, Session};
use crate::text::strip_code_fences;
use thiserror::Error;

pub const APPLY_FAILED: &str = "Failed to apply solution";

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("no file selected")]
    NoSelection,

    #[error("solution is no longer listed")]
    SolutionNotFound,

    #[error("could not read the current file: {0}")]
    FetchCurrent(#[source] ApiError),

    /// No candidate occurs in the current file
    #[error("replace target not found in current file")]
    TargetMismatch,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("backend returned no patched code")]
    EmptyResult,
}

impl ApplyError {
    pub fn user_message(&self) -> String {
        match self {
            Self::NoSelection => "Please select a file first.".into(),
            Self::SolutionNotFound => "That solution is no longer shown.".into(),
            Self::FetchCurrent(e) => format!("Error fetching file content: {}", e.user_message()),
            Self::TargetMismatch => {
                "The code to replace no longer matches the repository file.".into()
            }
            Self::Api(e) => format!("Error: {}", e.user_message()),
            Self::EmptyResult => format!("Error: {}", self),
        }
    }

    pub fn presentation(&self) -> Presentation {
        match self {
            Self::NoSelection | Self::SolutionNotFound => Presentation::Blocking,
            _ => Presentation::Inline,
        }
    }
}

/// Root `path` under the clone prefix exactly once.
///
/// A missing path or a bare filename resolves to the selected file.
pub fn normalize_path(path: Option<&str>, selected: &str, clone_prefix: &str) -> String {
    let prefix = clone_prefix.trim_end_matches('/');
    let path = match path.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) if p.contains('/') => p,
        _ => selected.trim(),
    };
    let path = path.trim_start_matches("./").trim_start_matches('/');

    if prefix.is_empty() {
        return path.to_string();
    }
    match path.strip_prefix(prefix) {
        Some(rest) if rest.starts_with('/') => path.to_string(),
        _ => format!("{}/{}", prefix, path),
    }
}

/// Where a replace-target candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    /// Text this box last wrote into the file
    RepoCode,
    /// Snippet the analyzer reported
    OriginalSnippet,
    /// Patched file currently shown
    Preview,
    PreviousSolution,
    CurrentSolution,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub source: CandidateSource,
    pub text: String,
}

/// Text with every whitespace character removed.
///
/// The backend reformats the file after each apply, so indentation, line
/// breaks and operator spacing of written code differ from what was sent.
fn squash_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// First candidate present in `current` (ignoring whitespace), or the first
/// non-empty one when there is nothing to verify against
pub fn resolve_target<'a>(candidates: &'a [Candidate], current: Option<&str>) -> Option<&'a Candidate> {
    let mut usable = candidates.iter().filter(|c| !c.text.trim().is_empty());
    match current {
        Some(content) => {
            let content = squash_whitespace(content);
            usable.find(|c| content.contains(&squash_whitespace(&c.text)))
        }
        None => usable.next(),
    }
}

#[derive(Debug, Clone)]
pub struct ApplyRequest {
    pub solution_id: SolutionId,
    /// Name used with `/file_content`
    pub filename: String,
    /// Analyzer of the session, reused for the verification fetch
    pub tool: String,
    /// Clone-rooted path sent to `/apply_solution`
    pub file_path: String,
    pub candidates: Vec<Candidate>,
    pub solution: String,
    pub solution_number: u32,
    pub verify: bool,
}

pub fn prepare(
    session: &Session,
    id: SolutionId,
    clone_prefix: &str,
    verify: bool,
) -> Result<ApplyRequest, ApplyError> {
    let selected = session.selected_file().ok_or(ApplyError::NoSelection)?;
    let dispatch = session
        .dispatch
        .as_ref()
        .ok_or(ApplyError::SolutionNotFound)?;
    let solution = session.solution_box(id).ok_or(ApplyError::SolutionNotFound)?;

    let bug_path = dispatch.bug.extra.get("file_path").and_then(|v| v.as_str());
    let current = solution.solution.trim().to_string();

    let mut candidates = Vec::new();
    let mut push = |source: CandidateSource, text: Option<&str>| {
        if let Some(text) = text {
            candidates.push(Candidate {
                source,
                text: text.trim().to_string(),
            });
        }
    };
    push(CandidateSource::RepoCode, solution.current_repo_code.as_deref());
    push(CandidateSource::OriginalSnippet, Some(solution.original_snippet.as_str()));
    push(CandidateSource::Preview, session.preview_for(id));
    push(CandidateSource::PreviousSolution, solution.previous_solution.as_deref());
    push(CandidateSource::CurrentSolution, Some(current.as_str()));

    Ok(ApplyRequest {
        solution_id: id,
        filename: dispatch.filename.clone(),
        tool: session.tool.as_str().to_string(),
        file_path: normalize_path(bug_path, selected, clone_prefix),
        candidates,
        solution: current,
        solution_number: solution.number,
        verify,
    })
}

#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub solution_id: SolutionId,
    pub filename: String,
    pub replaced: CandidateSource,
    pub solution: String,
    pub message: String,
    pub patched_text: String,
    pub metrics: Option<MetricsComparison>,
}

pub async fn run(client: &BackendClient, request: ApplyRequest) -> Result<ApplyOutcome, ApplyError> {
    let current = if request.verify {
        let reply = client
            .file_content(&FileContentRequest {
                filename: request.filename.clone(),
                tool: Some(request.tool.clone()),
            })
            .await
            .map_err(ApplyError::FetchCurrent)?;
        Some(strip_code_fences(&reply.content))
    } else {
        None
    };

    let target = resolve_target(&request.candidates, current.as_deref()).ok_or_else(|| {
        tracing::warn!(file = %request.file_path, "no replace candidate matches the current file");
        ApplyError::TargetMismatch
    })?;
    tracing::debug!(source = ?target.source, verified = request.verify, "replace target resolved");

    let reply = client
        .apply_solution(&ApplySolutionRequest {
            file_path: request.file_path.clone(),
            code_snippet: target.text.clone(),
            solution: request.solution.clone(),
            solution_number: request.solution_number,
        })
        .await?;

    let patched = reply.patched_code().ok_or(ApplyError::EmptyResult)?;
    Ok(ApplyOutcome {
        solution_id: request.solution_id,
        filename: request.filename,
        replaced: target.source,
        solution: request.solution,
        message: reply.message.clone().unwrap_or_default(),
        patched_text: strip_code_fences(patched),
        metrics: reply.metrics,
    })
}

/// Show the patched file and remember what was written
pub fn record(session: &mut Session, outcome: ApplyOutcome) -> bool {
    let Some(solution) = session.solution_box_mut(outcome.solution_id) else {
        return false;
    };
    solution.current_repo_code = Some(outcome.solution.clone());
    solution.previous_solution = Some(outcome.solution);
    solution.note = None;

    session.apply_failed = false;
    session.patched = Some(PatchedPreview {
        filename: outcome.filename,
        solution_id: outcome.solution_id,
        message: outcome.message,
        text: outcome.patched_text,
        metrics: outcome.metrics.filter(|m| m.error.is_none()),
    });
    true
}

pub fn record_failure(session: &mut Session, id: SolutionId, error: &ApplyError) {
    session.patched = None;
    session.apply_failed = true;
    if let Some(solution) = session.solution_box_mut(id) {
        solution.note = Some(BoxNote::Error(error.user_message()));
    }
}
