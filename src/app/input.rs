//! Input handling for the bugpatch TUI

use crate::app::RuntimeContext;
use crate::ui::render::commit_modal_area;
use crate::ui::{helpers, App, Focus, InputMode, Overlay};
use anyhow::Result;
use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

mod edit;
mod normal;
mod overlay;

use edit::{handle_feedback_input, handle_repo_url_input};
use normal::handle_normal_mode;
use overlay::handle_overlay_input;

// ═══════════════════════════════════════════════════════════════════════════
//  MAIN INPUT DISPATCHER
// ═══════════════════════════════════════════════════════════════════════════

/// Main key event handler - dispatches to mode-specific handlers
pub fn handle_key_event(app: &mut App, key: KeyEvent, ctx: &RuntimeContext) -> Result<()> {
    match app.input_mode {
        InputMode::RepoUrl => return handle_repo_url_input(app, key, ctx),
        InputMode::Feedback => return handle_feedback_input(app, key, ctx),
        InputMode::Normal => {}
    }

    if app.overlay != Overlay::None {
        return handle_overlay_input(app, key, ctx);
    }

    handle_normal_mode(app, key, ctx)
}

/// Wheel scrolls the focused pane; a click outside the commit modal cancels it
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, screen: Rect) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if matches!(app.overlay, Overlay::CommitConfirm { .. })
                && !helpers::contains(commit_modal_area(screen), mouse.column, mouse.row)
            {
                app.close_overlay();
            }
        }
        MouseEventKind::ScrollDown if app.overlay == Overlay::None => {
            if app.focus == Focus::Pane {
                app.scroll_pane(3);
            } else {
                app.move_down();
            }
        }
        MouseEventKind::ScrollUp if app.overlay == Overlay::None => {
            if app.focus == Focus::Pane {
                app.scroll_pane(-3);
            } else {
                app.move_up();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::Session;
    use crossterm::event::KeyModifiers;

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_click_outside_commit_modal_cancels() {
        let screen = Rect::new(0, 0, 120, 40);
        let mut app = App::new(Config::default(), Session::default());
        app.open_commit();

        let inside = commit_modal_area(screen);
        handle_mouse_event(&mut app, click(inside.x + 1, inside.y + 1), screen);
        assert!(matches!(app.overlay, Overlay::CommitConfirm { .. }));

        handle_mouse_event(&mut app, click(0, 0), screen);
        assert_eq!(app.overlay, Overlay::None);
    }
}
