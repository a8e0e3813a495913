//! Patch validation: rerun analysis on the patched file and drop the bug
//! from the list when the backend confirms it is gone.

use super::Presentation;
use crate::api::{ApiError, BackendClient, ValidatePatchRequest};
use crate::model::{AnalysisTool, BugId};
use crate::session::Session;
use crate::text::strip_line_number_artifact;
use std::time::Duration;
use thiserror::Error;

/// How long the verdict banner stays up
pub const BANNER_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("bug is no longer listed")]
    BugNotFound,

    #[error("original or patched code unavailable")]
    MissingCode,

    #[error("validation request failed: {0}")]
    Api(#[from] ApiError),
}

impl ValidateError {
    pub fn user_message(&self) -> String {
        match self {
            Self::BugNotFound => "That bug is no longer listed.".into(),
            Self::MissingCode => "Could not retrieve original or patched code. Please try again.".into(),
            Self::Api(_) => "Error validating bug. Please try again.".into(),
        }
    }

    pub fn presentation(&self) -> Presentation {
        Presentation::Blocking
    }
}

#[derive(Debug, Clone)]
pub struct ValidateRequest {
    pub bug_id: BugId,
    pub payload: ValidatePatchRequest,
}

pub fn prepare(session: &Session, bug_id: BugId) -> Result<ValidateRequest, ValidateError> {
    let entry = session.bug(bug_id).ok_or(ValidateError::BugNotFound)?;
    let viewed = session.viewed().ok_or(ValidateError::MissingCode)?;

    let original = viewed.content.trim();
    let patched = session
        .patched
        .as_ref()
        .map(|p| strip_line_number_artifact(&p.text))
        .unwrap_or_default();
    if original.is_empty() || patched.is_empty() {
        return Err(ValidateError::MissingCode);
    }

    let tool = viewed
        .analysis_tool
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| AnalysisTool::default().as_str().to_string());

    Ok(ValidateRequest {
        bug_id,
        payload: ValidatePatchRequest {
            filename: viewed.filename.clone(),
            bug_line: entry.bug.line,
            bug_type: entry.bug.bug_type.clone(),
            original_code: original.to_string(),
            patched_code: patched.to_string(),
            tool,
        },
    })
}

#[derive(Debug, Clone)]
pub struct Verdict {
    pub bug_id: BugId,
    pub bug_fixed: bool,
    pub message: String,
}

pub async fn run(client: &BackendClient, request: ValidateRequest) -> Result<Verdict, ValidateError> {
    let reply = client.validate_patch(&request.payload).await?;
    tracing::info!(
        bug_type = %request.payload.bug_type,
        line = request.payload.bug_line,
        fixed = reply.bug_fixed,
        other_bugs = reply.other_bugs.len(),
        "validation verdict"
    );
    Ok(Verdict {
        bug_id: request.bug_id,
        bug_fixed: reply.bug_fixed,
        message: reply.message,
    })
}

/// Apply the verdict; only a confirmed fix touches the bug list
pub fn record(session: &mut Session, verdict: &Verdict) {
    if verdict.bug_fixed {
        session.remove_fixed_bug(verdict.bug_id);
    }
}
