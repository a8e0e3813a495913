//! bugpatch UI - files and findings on the left, the working pane on the right
//!
//! Layout:
//! ╔══════════════════════════════════════════════════════════════╗
//! ║  bugpatch   owner/repo · SpotBugs · src/Main.java   ⠋ ...    ║
//! ╠═══════════════════════════╦══════════════════════════════════╣
//! ║  REPOSITORY               ║  CODE │ SOLUTIONS │ PATCHED      ║
//! ║  https://github.com/o/r   ║   1  package com.example;        ║
//! ║  FILES                    ║   2                              ║
//! ║  ▸ src/Main.java          ║   3  public class Main {         ║
//! ║  BUGS DETECTED: 3         ║  ...                             ║
//! ║  ▸ L12 NP_NULL_ON_SOME... ║                                  ║
//! ╠═══════════════════════════╩══════════════════════════════════╣
//! ║  ↵ view  s solve  v validate  c commit  ? help  q quit       ║
//! ╚══════════════════════════════════════════════════════════════╝

pub mod helpers;
pub mod render;
pub mod theme;

pub use render::render;

use crate::config::Config;
use crate::model::{AnalysisTool, BugId, SolutionId};
use crate::session::Session;
use crate::workflow::{validate, Presentation};
use std::time::Instant;

/// Panel that receives navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Files,
    Bugs,
    Pane,
}

impl Focus {
    pub fn next(&self) -> Self {
        match self {
            Focus::Files => Focus::Bugs,
            Focus::Bugs => Focus::Pane,
            Focus::Pane => Focus::Files,
        }
    }
}

/// Content of the right-hand pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RightPane {
    #[default]
    Code,
    Solutions,
    Patched,
}

impl RightPane {
    pub const ALL: [RightPane; 3] = [RightPane::Code, RightPane::Solutions, RightPane::Patched];

    pub fn label(&self) -> &'static str {
        match self {
            RightPane::Code => "CODE",
            RightPane::Solutions => "SOLUTIONS",
            RightPane::Patched => "PATCHED",
        }
    }
}

/// Input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing the repository URL
    RepoUrl,
    /// Typing feedback for the selected solution
    Feedback,
}

/// Loading state for background tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadingState {
    #[default]
    None,
    Analyzing,
    LoadingFile,
    GeneratingSolutions,
    UpdatingSolution,
    CalculatingMetrics,
    Applying,
    Validating,
    Committing,
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        !matches!(self, LoadingState::None)
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoadingState::None => "",
            LoadingState::Analyzing => "Cloning and analyzing repository...",
            LoadingState::LoadingFile => "Analyzing file...",
            LoadingState::GeneratingSolutions => "Generating solutions...",
            LoadingState::UpdatingSolution => "Updating...",
            LoadingState::CalculatingMetrics => "Calculating...",
            LoadingState::Applying => "Applying solution and calculating metrics...",
            LoadingState::Validating => "Validating patch...",
            LoadingState::Committing => "Committing changes...",
        }
    }
}

/// Spinner animation frames (braille pattern)
pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Overlay state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Overlay {
    #[default]
    None,
    Help {
        scroll: usize,
    },
    /// Message that must be dismissed
    Alert {
        message: String,
    },
    /// Analysis failed on the backend's Java toolchain
    JavaWarning {
        detail: String,
    },
    /// Commit confirmation with an editable message
    CommitConfirm {
        message: String,
    },
}

/// Toast notification kind - affects duration and styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Error,
}

impl ToastKind {
    /// Duration in seconds before toast expires
    pub fn duration_secs(&self) -> u64 {
        match self {
            ToastKind::Info => 3,
            ToastKind::Success => 3,
            ToastKind::Error => 10,
        }
    }
}

/// Toast notification
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub created_at: Instant,
    pub kind: ToastKind,
}

impl Toast {
    pub fn new(message: &str, kind: ToastKind) -> Self {
        Self {
            message: message.to_string(),
            created_at: Instant::now(),
            kind,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed().as_secs() >= self.kind.duration_secs()
    }
}

/// Validation verdict shown above the patched code
#[derive(Debug, Clone)]
pub struct Banner {
    pub message: String,
    pub success: bool,
    pub created_at: Instant,
}

impl Banner {
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= validate::BANNER_DURATION
    }
}

/// Inline message under the pane that triggered it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

pub struct App {
    pub config: Config,
    pub session: Session,
    pub focus: Focus,
    pub pane: RightPane,
    pub input_mode: InputMode,
    pub overlay: Overlay,
    pub loading: LoadingState,
    pub loading_frame: usize,
    /// Repository URL field
    pub repo_input: String,
    pub file_cursor: usize,
    pub bug_cursor: usize,
    pub solution_cursor: usize,
    pub code_scroll: usize,
    pub solutions_scroll: usize,
    pub patched_scroll: usize,
    pub status: Option<StatusLine>,
    pub banner: Option<Banner>,
    pub toast: Option<Toast>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, session: Session) -> Self {
        Self {
            config,
            session,
            focus: Focus::default(),
            pane: RightPane::default(),
            input_mode: InputMode::default(),
            overlay: Overlay::default(),
            loading: LoadingState::default(),
            loading_frame: 0,
            repo_input: String::new(),
            file_cursor: 0,
            bug_cursor: 0,
            solution_cursor: 0,
            code_scroll: 0,
            solutions_scroll: 0,
            patched_scroll: 0,
            status: None,
            banner: None,
            toast: None,
            should_quit: false,
        }
    }

    /// Tick the loading animation
    pub fn tick_loading(&mut self) {
        if self.loading.is_loading() {
            self.loading_frame = self.loading_frame.wrapping_add(1);
        }
    }

    /// Clear expired toast and validation banner
    pub fn clear_expired_toast(&mut self) {
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
        if self.banner.as_ref().is_some_and(Banner::is_expired) {
            self.banner = None;
        }
    }

    pub fn show_toast(&mut self, message: &str, kind: ToastKind) {
        self.toast = Some(Toast::new(message, kind));
    }

    pub fn show_banner(&mut self, message: &str, success: bool) {
        self.banner = Some(Banner {
            message: message.to_string(),
            success,
            created_at: Instant::now(),
        });
    }

    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error,
        });
    }

    /// Blocking alert the user must dismiss
    pub fn alert(&mut self, message: impl Into<String>) {
        self.overlay = Overlay::Alert {
            message: message.into(),
        };
    }

    /// Surface a workflow failure the way its stage asks for
    pub fn report(&mut self, presentation: Presentation, message: String) {
        match presentation {
            Presentation::Inline => self.set_status(message, true),
            Presentation::Blocking => self.alert(message),
        }
    }

    /// Close overlay
    pub fn close_overlay(&mut self) {
        self.overlay = Overlay::None;
    }

    pub fn toggle_help(&mut self) {
        self.overlay = match self.overlay {
            Overlay::Help { .. } => Overlay::None,
            _ => Overlay::Help { scroll: 0 },
        };
    }

    pub fn open_commit(&mut self) {
        self.overlay = Overlay::CommitConfirm {
            message: self.config.commit_message.clone(),
        };
    }

    pub fn toggle_tool(&mut self) {
        self.session.tool = self.session.tool.toggle();
        self.show_toast(
            &format!("Analysis tool: {}", self.session.tool.label()),
            ToastKind::Info,
        );
    }

    pub fn tool(&self) -> AnalysisTool {
        self.session.tool
    }

    // ─────────────────────────────────────────────────────────────────────
    // Selection helpers
    // ─────────────────────────────────────────────────────────────────────

    pub fn highlighted_file(&self) -> Option<&str> {
        self.session.files.get(self.file_cursor).map(String::as_str)
    }

    pub fn highlighted_bug(&self) -> Option<BugId> {
        self.session.bugs().get(self.bug_cursor).map(|entry| entry.id)
    }

    /// Bug a validate press applies to: the highlighted row while the bug
    /// list has focus, else the dispatched bug if it is still listed, else the
    /// highlighted row
    pub fn validation_target(&self) -> Option<BugId> {
        if self.focus == Focus::Bugs {
            if let Some(id) = self.highlighted_bug() {
                return Some(id);
            }
        }
        self.session
            .dispatch
            .as_ref()
            .map(|d| d.bug_id)
            .filter(|id| self.session.bug(*id).is_some())
            .or_else(|| self.highlighted_bug())
    }

    pub fn highlighted_solution(&self) -> Option<SolutionId> {
        self.session
            .dispatch
            .as_ref()
            .and_then(|d| d.boxes.get(self.solution_cursor))
            .map(|b| b.id)
    }

    fn solution_count(&self) -> usize {
        self.session
            .dispatch
            .as_ref()
            .map(|d| d.boxes.len())
            .unwrap_or(0)
    }

    pub fn move_down(&mut self) {
        match self.focus {
            Focus::Files => step(&mut self.file_cursor, self.session.files.len(), 1),
            Focus::Bugs => step(&mut self.bug_cursor, self.session.bugs().len(), 1),
            Focus::Pane => self.scroll_pane(1),
        }
    }

    pub fn move_up(&mut self) {
        match self.focus {
            Focus::Files => step(&mut self.file_cursor, self.session.files.len(), -1),
            Focus::Bugs => step(&mut self.bug_cursor, self.session.bugs().len(), -1),
            Focus::Pane => self.scroll_pane(-1),
        }
    }

    pub fn scroll_pane(&mut self, delta: isize) {
        let scroll = match self.pane {
            RightPane::Code => &mut self.code_scroll,
            RightPane::Solutions => &mut self.solutions_scroll,
            RightPane::Patched => &mut self.patched_scroll,
        };
        *scroll = scroll.saturating_add_signed(delta);
    }

    /// Move between solution boxes
    pub fn select_solution(&mut self, delta: isize) {
        let before = self.solution_cursor;
        let count = self.solution_count();
        step(&mut self.solution_cursor, count, delta);
        if before != self.solution_cursor {
            self.solutions_scroll = 0;
        }
    }

    pub fn show_pane(&mut self, pane: RightPane) {
        self.pane = pane;
        self.focus = Focus::Pane;
    }

    /// Keep cursors inside the lists after the session changed
    pub fn clamp_cursors(&mut self) {
        clamp(&mut self.file_cursor, self.session.files.len());
        clamp(&mut self.bug_cursor, self.session.bugs().len());
        let count = self.solution_count();
        clamp(&mut self.solution_cursor, count);
    }

    /// Feedback text of the highlighted solution
    pub fn feedback_mut(&mut self) -> Option<&mut String> {
        let id = self.highlighted_solution()?;
        self.session.solution_box_mut(id).map(|b| &mut b.feedback)
    }
}

fn step(cursor: &mut usize, len: usize, delta: isize) {
    if len == 0 {
        *cursor = 0;
        return;
    }
    *cursor = cursor.saturating_add_signed(delta).min(len - 1);
}

fn clamp(cursor: &mut usize, len: usize) {
    *cursor = (*cursor).min(len.saturating_sub(1));
}
