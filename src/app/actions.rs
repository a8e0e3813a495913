//! User actions: validate locally, mark loading, run the stage in the background
//!
//! One backend operation is in flight at a time. Every action checks that
//! first so a second request cannot clear the spinner of the first.

use crate::app::background::spawn_background;
use crate::app::messages::BackgroundMessage;
use crate::app::RuntimeContext;
use crate::ui::{App, LoadingState, ToastKind};
use crate::workflow::{apply, commit, dispatch, intake, validate, viewer};

fn busy(app: &mut App) -> bool {
    if app.loading.is_loading() {
        let message = format!("Please wait: {}", app.loading.label());
        app.show_toast(&message, ToastKind::Info);
        return true;
    }
    false
}

fn begin(app: &mut App, state: LoadingState) {
    app.loading = state;
    app.loading_frame = 0;
    app.status = None;
}

/// Analyze the repository in the URL field
pub fn start_intake(app: &mut App, ctx: &RuntimeContext) {
    if busy(app) {
        return;
    }
    let repo = match intake::prepare(&app.repo_input) {
        Ok(repo) => repo,
        Err(e) => {
            app.report(e.presentation(), e.user_message());
            return;
        }
    };

    begin(app, LoadingState::Analyzing);
    let client = ctx.client.clone();
    let tx = ctx.tx.clone();
    spawn_background(ctx.tx.clone(), "intake", async move {
        let result = intake::run(&client, repo).await;
        let _ = tx.send(BackgroundMessage::IntakeDone(result));
    });
}

/// Select the highlighted file and fetch it with its findings
pub fn view_file(app: &mut App, ctx: &RuntimeContext) {
    if busy(app) {
        return;
    }
    if let Some(file) = app.highlighted_file().map(str::to_string) {
        app.session.select_file(&file);
    }
    let request = match viewer::prepare(&app.session) {
        Ok(request) => request,
        Err(e) => {
            app.report(e.presentation(), e.user_message());
            return;
        }
    };

    begin(app, LoadingState::LoadingFile);
    let client = ctx.client.clone();
    let tx = ctx.tx.clone();
    spawn_background(ctx.tx.clone(), "file_content", async move {
        let result = viewer::run(&client, request).await;
        let _ = tx.send(BackgroundMessage::FileLoaded(result));
    });
}

/// Ask the LLM for candidate fixes to the highlighted bug
pub fn send_to_llm(app: &mut App, ctx: &RuntimeContext) {
    if busy(app) {
        return;
    }
    let Some(bug_id) = app.highlighted_bug() else {
        app.alert(crate::view::NO_BUGS);
        return;
    };
    let request = match dispatch::prepare(&app.session, bug_id) {
        Ok(request) => request,
        Err(e) => {
            app.report(e.presentation(), e.user_message());
            return;
        }
    };

    begin(app, LoadingState::GeneratingSolutions);
    let client = ctx.client.clone();
    let tx = ctx.tx.clone();
    spawn_background(ctx.tx.clone(), "send_to_llm", async move {
        let result = dispatch::run(&client, request).await;
        let _ = tx.send(BackgroundMessage::SolutionsReady(result));
    });
}

/// Regenerate the highlighted solution from the typed feedback
pub fn submit_feedback(app: &mut App, ctx: &RuntimeContext) {
    if busy(app) {
        return;
    }
    let Some(id) = app.highlighted_solution() else {
        return;
    };
    let request = match dispatch::prepare_feedback(&app.session, id) {
        Ok(request) => request,
        Err(e) => {
            app.report(e.presentation(), e.user_message());
            return;
        }
    };

    begin(app, LoadingState::UpdatingSolution);
    let client = ctx.client.clone();
    let tx = ctx.tx.clone();
    spawn_background(ctx.tx.clone(), "update_solution", async move {
        let result = dispatch::run_feedback(&client, request).await;
        let _ = tx.send(BackgroundMessage::SolutionUpdated { id, result });
    });
}

pub fn calculate_metrics(app: &mut App, ctx: &RuntimeContext) {
    if busy(app) {
        return;
    }
    let Some(id) = app.highlighted_solution() else {
        return;
    };
    let request = match dispatch::prepare_metrics(&app.session, id) {
        Ok(request) => request,
        Err(e) => {
            app.report(e.presentation(), e.user_message());
            return;
        }
    };

    begin(app, LoadingState::CalculatingMetrics);
    let client = ctx.client.clone();
    let tx = ctx.tx.clone();
    spawn_background(ctx.tx.clone(), "calculate_metrics", async move {
        let result = dispatch::run_metrics(&client, request).await;
        let _ = tx.send(BackgroundMessage::MetricsReady { id, result });
    });
}

/// Write the highlighted solution into the cloned repository
pub fn apply_solution(app: &mut App, ctx: &RuntimeContext) {
    if busy(app) {
        return;
    }
    let Some(id) = app.highlighted_solution() else {
        return;
    };
    let request = match apply::prepare(
        &app.session,
        id,
        &app.config.clone_prefix,
        app.config.verify_apply_target,
    ) {
        Ok(request) => request,
        Err(e) => {
            app.report(e.presentation(), e.user_message());
            return;
        }
    };

    begin(app, LoadingState::Applying);
    let client = ctx.client.clone();
    let tx = ctx.tx.clone();
    spawn_background(ctx.tx.clone(), "apply_solution", async move {
        let result = apply::run(&client, request).await;
        let _ = tx.send(BackgroundMessage::Applied { id, result });
    });
}

/// Re-analyze the patched file for the highlighted bug
pub fn validate_patch(app: &mut App, ctx: &RuntimeContext) {
    if busy(app) {
        return;
    }
    let Some(bug_id) = app.validation_target() else {
        app.alert(crate::view::NO_BUGS);
        return;
    };
    let request = match validate::prepare(&app.session, bug_id) {
        Ok(request) => request,
        Err(e) => {
            app.report(e.presentation(), e.user_message());
            return;
        }
    };

    begin(app, LoadingState::Validating);
    let client = ctx.client.clone();
    let tx = ctx.tx.clone();
    spawn_background(ctx.tx.clone(), "validate_patch", async move {
        let result = validate::run(&client, request).await;
        let _ = tx.send(BackgroundMessage::Validated(result));
    });
}

/// Commit and push with the message from the confirmation modal
pub fn commit_changes(app: &mut App, ctx: &RuntimeContext, message: &str) {
    if busy(app) {
        return;
    }
    let request = commit::prepare(
        &app.session,
        message,
        &app.config.commit_message,
        &app.repo_input,
    );
    app.close_overlay();

    begin(app, LoadingState::Committing);
    let client = ctx.client.clone();
    let tx = ctx.tx.clone();
    spawn_background(ctx.tx.clone(), "commit_changes", async move {
        let result = commit::run(&client, request).await;
        let _ = tx.send(BackgroundMessage::Committed(result));
    });
}
