//! Repository intake: validate a GitHub URL, have the backend clone and
//! analyze it, then list the Java files available for viewing.

use super::Presentation;
use crate::api::{ApiError, BackendClient};
use crate::session::{RepoRef, Session};
use thiserror::Error;

pub const NO_FILES: &str = "No Java files found in the repository.";

/// Backend text emitted when the previous clone could not be removed
const STALE_CLONE_MARKER: &str = "Failed to clear previous cloned repo folder";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Invalid GitHub repository URL.")]
    InvalidUrl,

    /// The backend could not clear the previous clone
    #[error("stale clone folder: {0}")]
    StaleClone(String),

    #[error("analysis failed: {0}")]
    Analyze(#[source] ApiError),

    #[error("file listing failed: {0}")]
    ListFiles(#[source] ApiError),
}

impl IntakeError {
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidUrl => "Invalid GitHub repository URL.".into(),
            Self::StaleClone(_) => {
                "Unable to access repository folder. Restart the session and try again.".into()
            }
            Self::Analyze(e) => format!("Error: {}", e.user_message()),
            Self::ListFiles(e) => format!("Error fetching Java files: {}", e.user_message()),
        }
    }

    pub fn presentation(&self) -> Presentation {
        match self {
            Self::StaleClone(_) => Presentation::Blocking,
            _ => Presentation::Inline,
        }
    }
}

/// Extract owner and repository from anything containing
/// `github.com/<owner>/<repo>`.
///
/// A trailing `.git`, query string, fragment and further path segments are
/// ignored. The URL itself is kept verbatim for the backend.
pub fn parse_repo_url(url: &str) -> Option<RepoRef> {
    let trimmed = url.trim();
    let (_, rest) = trimmed.split_once("github.com/")?;
    let rest = rest.split(['?', '#']).next().unwrap_or_default();

    let mut segments = rest.split('/');
    let owner = segments.next()?.trim();
    let name = segments.next()?.trim();
    let name = name.strip_suffix(".git").unwrap_or(name);
    if owner.is_empty() || name.is_empty() {
        return None;
    }

    Some(RepoRef {
        url: trimmed.to_string(),
        owner: owner.to_string(),
        name: name.to_string(),
    })
}

pub fn prepare(url: &str) -> Result<RepoRef, IntakeError> {
    parse_repo_url(url).ok_or(IntakeError::InvalidUrl)
}

#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    pub repo: RepoRef,
    pub message: Option<String>,
    pub files: Vec<String>,
}

impl IntakeOutcome {
    /// Status line to show once the outcome is recorded
    pub fn status(&self) -> String {
        if self.files.is_empty() {
            NO_FILES.to_string()
        } else {
            self.message
                .clone()
                .unwrap_or_else(|| format!("{} Java files found", self.files.len()))
        }
    }
}

/// Submit the repository for analysis, then list its files
pub async fn run(client: &BackendClient, repo: RepoRef) -> Result<IntakeOutcome, IntakeError> {
    tracing::info!(repo = %repo.full_name(), "analyzing repository");
    let analysis = client.analyze(&repo.url).await.map_err(|e| match e {
        ApiError::Backend(msg) if msg.contains(STALE_CLONE_MARKER) => IntakeError::StaleClone(msg),
        other => IntakeError::Analyze(other),
    })?;

    let listing = client
        .list_files(&repo.full_name())
        .await
        .map_err(IntakeError::ListFiles)?;

    tracing::info!(files = listing.files.len(), "repository file list received");
    Ok(IntakeOutcome {
        repo,
        message: analysis.message,
        files: listing.files,
    })
}

/// Install the analyzed repository; every per-file state is reset
pub fn record(session: &mut Session, outcome: &IntakeOutcome) {
    session.reset_for_repo(outcome.repo.clone(), outcome.files.clone());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_https_url() {
        let repo = parse_repo_url("https://github.com/apache/commons-lang").unwrap();
        assert_eq!(repo.owner, "apache");
        assert_eq!(repo.name, "commons-lang");
        assert_eq!(repo.full_name(), "apache/commons-lang");
        assert_eq!(repo.url, "https://github.com/apache/commons-lang");
    }

    #[test]
    fn test_parse_strips_git_suffix_and_extra_segments() {
        let repo = parse_repo_url("https://github.com/o/r.git").unwrap();
        assert_eq!(repo.name, "r");

        let repo = parse_repo_url("github.com/o/r/tree/main/src?tab=readme#top").unwrap();
        assert_eq!(repo.full_name(), "o/r");

        let repo = parse_repo_url("https://github.com/o/r?x=1").unwrap();
        assert_eq!(repo.name, "r");
    }

    #[test]
    fn test_parse_rejects_non_github_and_incomplete() {
        assert!(parse_repo_url("https://gitlab.com/o/r").is_none());
        assert!(parse_repo_url("https://github.com/onlyowner").is_none());
        assert!(parse_repo_url("https://github.com//r").is_none());
        assert!(parse_repo_url("").is_none());
    }

    #[test]
    fn test_prepare_invalid_url_message() {
        let err = prepare("not a url").unwrap_err();
        assert_eq!(err.user_message(), "Invalid GitHub repository URL.");
        assert_eq!(err.presentation(), Presentation::Inline);
    }

    #[test]
    fn test_stale_clone_is_blocking() {
        let err = IntakeError::StaleClone(format!("{STALE_CLONE_MARKER}: busy"));
        assert_eq!(err.presentation(), Presentation::Blocking);
        assert!(err.user_message().starts_with("Unable to access repository folder"));
    }

    #[test]
    fn test_outcome_status_empty_files() {
        let outcome = IntakeOutcome {
            repo: parse_repo_url("github.com/o/r").unwrap(),
            message: Some("Files fetched successfully.".into()),
            files: vec![],
        };
        assert_eq!(outcome.status(), NO_FILES);
    }
}
