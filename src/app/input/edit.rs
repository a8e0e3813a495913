use crate::app::{actions, RuntimeContext};
use crate::ui::{App, InputMode};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Typing into the repository URL field
pub(super) fn handle_repo_url_input(
    app: &mut App,
    key: KeyEvent,
    ctx: &RuntimeContext,
) -> Result<()> {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            actions::start_intake(app, ctx);
        }
        KeyCode::Backspace => {
            app.repo_input.pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.repo_input.clear();
        }
        KeyCode::Char(c) => app.repo_input.push(c),
        _ => {}
    }
    Ok(())
}

/// Typing feedback for the highlighted solution
pub(super) fn handle_feedback_input(
    app: &mut App,
    key: KeyEvent,
    ctx: &RuntimeContext,
) -> Result<()> {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            actions::submit_feedback(app, ctx);
        }
        KeyCode::Backspace => {
            if let Some(feedback) = app.feedback_mut() {
                feedback.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(feedback) = app.feedback_mut() {
                feedback.push(c);
            }
        }
        _ => {}
    }
    Ok(())
}
