//! File viewer: fetch one file with its findings and CK metrics

use super::Presentation;
use crate::api::{ApiError, BackendClient, FileContentRequest};
use crate::model::Bug;
use crate::session::{Session, ViewedFile};
use crate::text::{is_java_version_mismatch, strip_code_fences};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("no file selected")]
    NoSelection,

    /// Analysis failed because the backend's Java toolchain does not fit the project
    #[error("java toolchain mismatch: {0}")]
    JavaMismatch(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ViewerError {
    pub fn user_message(&self) -> String {
        match self {
            Self::NoSelection => "Please select a file.".into(),
            Self::JavaMismatch(detail) => {
                format!("Java version compatibility issue detected: {}", detail)
            }
            Self::Api(ApiError::Backend(msg)) => msg.clone(),
            Self::Api(e) => format!("Error: {}", e.user_message()),
        }
    }

    pub fn presentation(&self) -> Presentation {
        match self {
            Self::NoSelection | Self::JavaMismatch(_) => Presentation::Blocking,
            Self::Api(_) => Presentation::Inline,
        }
    }
}

pub fn prepare(session: &Session) -> Result<FileContentRequest, ViewerError> {
    let filename = session.selected_file().ok_or(ViewerError::NoSelection)?;
    Ok(FileContentRequest {
        filename: filename.to_string(),
        tool: Some(session.tool.as_str().to_string()),
    })
}

/// A fetched file ready to be shown
#[derive(Debug, Clone)]
pub struct FileView {
    pub viewed: ViewedFile,
    pub bugs: Vec<Bug>,
    pub num_bugs: Option<u32>,
}

pub async fn run(
    client: &BackendClient,
    request: FileContentRequest,
) -> Result<FileView, ViewerError> {
    let reply = client.file_content(&request).await.map_err(|e| match e {
        ApiError::Backend(msg) if is_java_version_mismatch(&msg) => ViewerError::JavaMismatch(msg),
        other => ViewerError::Api(other),
    })?;

    tracing::debug!(
        file = %request.filename,
        bugs = reply.bugs.len(),
        tool = reply.analysis_tool.as_deref().unwrap_or("-"),
        "file content received"
    );

    Ok(FileView {
        viewed: ViewedFile {
            filename: request.filename,
            content: strip_code_fences(&reply.content),
            analysis_tool: reply.analysis_tool,
            ck_metrics: reply.metrics.into_iter().next(),
        },
        bugs: reply.bugs,
        num_bugs: reply.num_bugs,
    })
}

/// Show the file. Returns false when the selection moved on meanwhile.
pub fn record(session: &mut Session, view: FileView) -> bool {
    if session.selected_file() != Some(view.viewed.filename.as_str()) {
        tracing::debug!(file = %view.viewed.filename, "dropping stale file view");
        return false;
    }
    session.show_file(view.viewed, view.bugs, view.num_bugs);
    true
}
