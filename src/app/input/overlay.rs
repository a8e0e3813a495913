use crate::app::{actions, RuntimeContext};
use crate::ui::{App, Overlay};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

/// Handle key events when an overlay is active
pub(super) fn handle_overlay_input(
    app: &mut App,
    key: KeyEvent,
    ctx: &RuntimeContext,
) -> Result<()> {
    match &mut app.overlay {
        Overlay::Help { scroll } => match key.code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => app.close_overlay(),
            KeyCode::Down | KeyCode::Char('j') => *scroll += 1,
            KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
            _ => {}
        },
        Overlay::Alert { .. } | Overlay::JavaWarning { .. } => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                app.close_overlay();
            }
        }
        Overlay::CommitConfirm { message } => match key.code {
            KeyCode::Esc => app.close_overlay(),
            KeyCode::Enter => {
                let message = message.clone();
                actions::commit_changes(app, ctx, &message);
            }
            KeyCode::Backspace => {
                message.pop();
            }
            KeyCode::Char(c) => message.push(c),
            _ => {}
        },
        Overlay::None => {}
    }
    Ok(())
}
