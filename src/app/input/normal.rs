use crate::app::{actions, RuntimeContext};
use crate::ui::{App, Focus, InputMode, RightPane};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

const PAGE: isize = 10;

/// Handle key events in normal mode (no overlay, not typing)
pub(super) fn handle_normal_mode(app: &mut App, key: KeyEvent, ctx: &RuntimeContext) -> Result<()> {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Esc => app.status = None,
        KeyCode::Tab => app.focus = app.focus.next(),

        KeyCode::Down | KeyCode::Char('j') => app.move_down(),
        KeyCode::Up | KeyCode::Char('k') => app.move_up(),
        KeyCode::PageDown => app.scroll_pane(PAGE),
        KeyCode::PageUp => app.scroll_pane(-PAGE),

        KeyCode::Char('1') => app.show_pane(RightPane::Code),
        KeyCode::Char('2') => app.show_pane(RightPane::Solutions),
        KeyCode::Char('3') => app.show_pane(RightPane::Patched),

        KeyCode::Char('u') => app.input_mode = InputMode::RepoUrl,
        KeyCode::Char('t') => app.toggle_tool(),
        KeyCode::Char('c') => app.open_commit(),

        KeyCode::Enter => match app.focus {
            Focus::Files => actions::view_file(app, ctx),
            Focus::Bugs => actions::send_to_llm(app, ctx),
            Focus::Pane => {}
        },
        KeyCode::Char('s') => actions::send_to_llm(app, ctx),
        KeyCode::Char('v') => actions::validate_patch(app, ctx),

        KeyCode::Char('[') => app.select_solution(-1),
        KeyCode::Char(']') => app.select_solution(1),
        KeyCode::Char('f') => {
            if app.highlighted_solution().is_some() {
                app.show_pane(RightPane::Solutions);
                app.input_mode = InputMode::Feedback;
            }
        }
        KeyCode::Char('m') => actions::calculate_metrics(app, ctx),
        KeyCode::Char('a') => actions::apply_solution(app, ctx),
        _ => {}
    }
    Ok(())
}
