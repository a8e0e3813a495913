//! Background task handling for bugpatch
//!
//! Channel sends use `let _ =`: the receiver only goes away when the app is
//! shutting down, and then nobody needs the result.

use crate::app::messages::BackgroundMessage;
use crate::ui::{App, LoadingState, RightPane, ToastKind};
use crate::util::truncate;
use crate::workflow::viewer::ViewerError;
use crate::workflow::{apply, commit, dispatch, intake, validate, viewer};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::mpsc;

pub fn drain_messages(app: &mut App, rx: &mpsc::Receiver<BackgroundMessage>) {
    while let Ok(msg) = rx.try_recv() {
        app.loading = LoadingState::None;
        handle_message(app, msg);
        app.clamp_cursors();
    }
}

pub fn handle_message(app: &mut App, msg: BackgroundMessage) {
    match msg {
        BackgroundMessage::IntakeDone(Ok(outcome)) => {
            intake::record(&mut app.session, &outcome);
            app.file_cursor = 0;
            app.bug_cursor = 0;
            app.solution_cursor = 0;
            app.code_scroll = 0;
            app.pane = RightPane::Code;
            app.banner = None;
            app.set_status(outcome.status(), false);
        }
        BackgroundMessage::IntakeDone(Err(e)) => {
            tracing::warn!(error = %e, "repository intake failed");
            app.report(e.presentation(), e.user_message());
        }

        BackgroundMessage::FileLoaded(Ok(view)) => {
            if viewer::record(&mut app.session, view) {
                app.bug_cursor = 0;
                app.solution_cursor = 0;
                app.code_scroll = 0;
                app.patched_scroll = 0;
                app.banner = None;
                app.pane = RightPane::Code;
            }
        }
        BackgroundMessage::FileLoaded(Err(ViewerError::JavaMismatch(detail))) => {
            tracing::warn!("backend java toolchain cannot analyze this project");
            app.overlay = crate::ui::Overlay::JavaWarning { detail };
        }
        BackgroundMessage::FileLoaded(Err(e)) => {
            app.report(e.presentation(), e.user_message());
        }

        BackgroundMessage::SolutionsReady(Ok(outcome)) => {
            let count = outcome.solutions.len();
            if dispatch::record(&mut app.session, outcome) {
                app.solution_cursor = 0;
                app.solutions_scroll = 0;
                app.show_pane(RightPane::Solutions);
                app.show_toast(&format!("{} solutions ready", count), ToastKind::Success);
            }
        }
        BackgroundMessage::SolutionsReady(Err(e)) => {
            tracing::warn!(error = %e, "solution generation failed");
            app.report(e.presentation(), e.user_message());
        }

        BackgroundMessage::SolutionUpdated { id, result } => match result {
            Ok(updated) => {
                if dispatch::record_feedback(&mut app.session, id, updated) {
                    app.alert(dispatch::UPDATED);
                }
            }
            Err(e) => app.report(e.presentation(), e.user_message()),
        },

        BackgroundMessage::MetricsReady { id, result } => {
            dispatch::record_metrics(&mut app.session, id, result);
        }

        BackgroundMessage::Applied { id, result } => match result {
            Ok(outcome) => {
                if apply::record(&mut app.session, outcome) {
                    app.patched_scroll = 0;
                    app.banner = None;
                    app.show_pane(RightPane::Patched);
                    app.show_toast("Solution applied", ToastKind::Success);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "apply failed");
                apply::record_failure(&mut app.session, id, &e);
                app.report(e.presentation(), e.user_message());
            }
        },

        BackgroundMessage::Validated(Ok(verdict)) => {
            validate::record(&mut app.session, &verdict);
            app.show_banner(&verdict.message, verdict.bug_fixed);
            app.pane = RightPane::Patched;
        }
        BackgroundMessage::Validated(Err(e)) => {
            tracing::warn!(error = %e, "validation failed");
            app.report(e.presentation(), e.user_message());
        }

        BackgroundMessage::Committed(Ok(message)) => {
            commit::record(&mut app.session);
            app.repo_input.clear();
            app.focus = Default::default();
            app.pane = RightPane::Code;
            app.banner = None;
            app.status = None;
            app.alert(if message.trim().is_empty() {
                "Changes committed successfully".to_string()
            } else {
                message
            });
        }
        BackgroundMessage::Committed(Err(e)) => {
            tracing::warn!(error = %e, "commit failed");
            app.report(e.presentation(), e.user_message());
        }

        BackgroundMessage::Error(e) => {
            tracing::error!(error = %e, "background task failed");
            app.show_toast(&truncate(&e, 120), ToastKind::Error);
        }
    }
}

/// Run `fut` on the runtime, turning a panic into an error message
pub fn spawn_background<F>(tx: mpsc::Sender<BackgroundMessage>, task_name: &'static str, fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(panic) = AssertUnwindSafe(fut).catch_unwind().await {
            let detail = if let Some(s) = panic.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            };
            let _ = tx.send(BackgroundMessage::Error(format!(
                "Background task '{}' crashed unexpectedly: {}",
                task_name, detail
            )));
        }
    });
}
