//! Commit flow: confirm, then have the backend commit and push the clone

use super::Presentation;
use crate::api::{ApiError, BackendClient, CommitRequest};
use crate::session::Session;
use thiserror::Error;

pub const DEFAULT_MESSAGE: &str = "Automated bug fixes applied";

/// Shown in the confirmation modal
pub const CHECKLIST: &[&str] = &[
    "All bugs have been fixed and validated",
    "Changes have been tested",
    "The session will reset after committing",
];

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("commit failed: {0}")]
    Api(#[from] ApiError),
}

impl CommitError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => format!("Commit failed: {}", e.user_message()),
        }
    }

    pub fn presentation(&self) -> Presentation {
        Presentation::Blocking
    }
}

/// Build the request. A blank message falls back to `default_message`; the
/// repository URL is the analyzed one, else whatever is in the intake field.
pub fn prepare(
    session: &Session,
    message: &str,
    default_message: &str,
    intake_url: &str,
) -> CommitRequest {
    let message = message.trim();
    CommitRequest {
        commit_message: if message.is_empty() {
            default_message.to_string()
        } else {
            message.to_string()
        },
        repo_url: session
            .repo
            .as_ref()
            .map(|r| r.url.clone())
            .unwrap_or_else(|| intake_url.trim().to_string()),
    }
}

/// Commit and push; returns the server's confirmation text
pub async fn run(client: &BackendClient, request: CommitRequest) -> Result<String, CommitError> {
    let reply = client.commit_changes(&request).await?;
    tracing::info!(repo = %request.repo_url, "changes committed");
    Ok(reply.message)
}

/// A successful commit ends the session
pub fn record(session: &mut Session) {
    *session = Session::new(session.tool);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnalysisTool;
    use crate::workflow::intake::parse_repo_url;

    #[test]
    fn test_prepare_uses_analyzed_repo() {
        let mut session = Session::default();
        session.reset_for_repo(parse_repo_url("https://github.com/o/r").unwrap(), vec![]);
        let req = prepare(&session, "Fix NPE", DEFAULT_MESSAGE, "ignored");
        assert_eq!(req.commit_message, "Fix NPE");
        assert_eq!(req.repo_url, "https://github.com/o/r");
    }

    #[test]
    fn test_prepare_blank_message_and_no_repo() {
        let session = Session::default();
        let req = prepare(&session, "   ", DEFAULT_MESSAGE, " https://github.com/a/b ");
        assert_eq!(req.commit_message, DEFAULT_MESSAGE);
        assert_eq!(req.repo_url, "https://github.com/a/b");
    }

    #[test]
    fn test_record_resets_but_keeps_tool() {
        let mut session = Session::new(AnalysisTool::Pmd);
        session.reset_for_repo(parse_repo_url("github.com/o/r").unwrap(), vec!["A.java".into()]);
        record(&mut session);
        assert!(session.repo.is_none());
        assert!(session.files.is_empty());
        assert_eq!(session.tool, AnalysisTool::Pmd);
    }

    #[test]
    fn test_failure_wording() {
        let err = CommitError::Api(ApiError::Backend("No changes to commit".into()));
        assert_eq!(err.user_message(), "Commit failed: No changes to commit");
    }
}
