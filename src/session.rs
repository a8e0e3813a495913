//! In-memory state of one bug-fixing session
//!
//! Everything the UI shows is derived from a [`Session`]. Workflow operations
//! take the session explicitly; nothing lives in globals.

use crate::model::{
    AnalysisTool, Bug, BugEntry, BugId, CkMetricsRow, MetricsComparison, SolutionBox, SolutionId,
};
use chrono::{DateTime, Local};

/// A repository accepted by intake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// URL exactly as the user entered it (sent to `/analyze` and `/commit_changes`)
    pub url: String,
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// `owner/repo`, the key `/files` expects
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// The file currently shown in the code view
#[derive(Debug, Clone, PartialEq)]
pub struct ViewedFile {
    pub filename: String,
    /// Fence-stripped content; doubles as the raw content cache
    pub content: String,
    pub analysis_tool: Option<String>,
    pub ck_metrics: Option<CkMetricsRow>,
}

/// Candidate fixes for one bug
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub bug_id: BugId,
    pub bug: Bug,
    /// File selected when the dispatch was made
    pub filename: String,
    pub boxes: Vec<SolutionBox>,
}

impl Dispatch {
    pub fn description(&self) -> &str {
        if self.bug.description.trim().is_empty() {
            "No description available."
        } else {
            &self.bug.description
        }
    }
}

/// Result of the last successful apply
#[derive(Debug, Clone, PartialEq)]
pub struct PatchedPreview {
    pub filename: String,
    pub solution_id: SolutionId,
    pub message: String,
    /// Fence-stripped, trimmed patched file
    pub text: String,
    pub metrics: Option<MetricsComparison>,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub repo: Option<RepoRef>,
    pub tool: AnalysisTool,
    pub files: Vec<String>,
    selected_file: Option<String>,
    viewed: Option<ViewedFile>,
    bugs: Vec<BugEntry>,
    bug_count: u32,
    pub dispatch: Option<Dispatch>,
    pub patched: Option<PatchedPreview>,
    /// The last apply failed; the patched pane shows the failure line
    pub apply_failed: bool,
    pub analyzed_at: Option<DateTime<Local>>,
}

impl Session {
    pub fn new(tool: AnalysisTool) -> Self {
        Self {
            tool,
            ..Default::default()
        }
    }

    /// Start over for a freshly analyzed repository
    pub fn reset_for_repo(&mut self, repo: RepoRef, files: Vec<String>) {
        *self = Self {
            repo: Some(repo),
            tool: self.tool,
            files,
            analyzed_at: Some(Local::now()),
            ..Default::default()
        };
    }

    // ─────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────

    pub fn selected_file(&self) -> Option<&str> {
        self.selected_file.as_deref()
    }

    /// Last write wins
    pub fn select_file(&mut self, filename: &str) {
        let filename = filename.trim();
        self.selected_file = if filename.is_empty() {
            None
        } else {
            Some(filename.to_string())
        };
    }

    // ─────────────────────────────────────────────────────────────────────
    // Viewed file and raw content cache
    // ─────────────────────────────────────────────────────────────────────

    pub fn viewed(&self) -> Option<&ViewedFile> {
        self.viewed.as_ref()
    }

    /// Replace the viewed file; the previous file's cache, bugs, candidate
    /// fixes and preview are discarded.
    pub fn show_file(&mut self, viewed: ViewedFile, bugs: Vec<Bug>, num_bugs: Option<u32>) {
        self.viewed = Some(viewed);
        self.set_bugs(bugs, num_bugs);
        self.dispatch = None;
        self.patched = None;
        self.apply_failed = false;
    }

    /// Cached raw content, only when it belongs to `filename`
    pub fn cached_content(&self, filename: &str) -> Option<&str> {
        self.viewed
            .as_ref()
            .filter(|v| v.filename == filename)
            .map(|v| v.content.as_str())
    }

    /// Raw content of whatever file was viewed last
    pub fn raw_content(&self) -> Option<&str> {
        self.viewed.as_ref().map(|v| v.content.as_str())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Bugs
    // ─────────────────────────────────────────────────────────────────────

    pub fn bugs(&self) -> &[BugEntry] {
        &self.bugs
    }

    pub fn bug_count(&self) -> u32 {
        self.bug_count
    }

    pub fn bug(&self, id: BugId) -> Option<&BugEntry> {
        self.bugs.iter().find(|entry| entry.id == id)
    }

    /// Store bugs ordered by line. Equal lines keep backend order.
    fn set_bugs(&mut self, bugs: Vec<Bug>, num_bugs: Option<u32>) {
        let mut entries: Vec<BugEntry> = bugs.into_iter().map(BugEntry::new).collect();
        entries.sort_by_key(|entry| entry.bug.line);
        self.bug_count = num_bugs.unwrap_or(entries.len() as u32);
        self.bugs = entries;
    }

    /// Drop a bug confirmed fixed. The displayed count never goes below zero.
    pub fn remove_fixed_bug(&mut self, id: BugId) -> bool {
        let before = self.bugs.len();
        self.bugs.retain(|entry| entry.id != id);
        let removed = self.bugs.len() != before;
        if removed {
            self.bug_count = self.bug_count.saturating_sub(1);
        }
        removed
    }

    // ─────────────────────────────────────────────────────────────────────
    // Solutions
    // ─────────────────────────────────────────────────────────────────────

    pub fn solution_box(&self, id: SolutionId) -> Option<&SolutionBox> {
        self.dispatch
            .as_ref()
            .and_then(|d| d.boxes.iter().find(|b| b.id == id))
    }

    pub fn solution_box_mut(&mut self, id: SolutionId) -> Option<&mut SolutionBox> {
        self.dispatch
            .as_mut()
            .and_then(|d| d.boxes.iter_mut().find(|b| b.id == id))
    }

    /// Preview text when it was produced by `id`
    pub fn preview_for(&self, id: SolutionId) -> Option<&str> {
        self.patched
            .as_ref()
            .filter(|p| p.solution_id == id)
            .map(|p| p.text.as_str())
    }
}
