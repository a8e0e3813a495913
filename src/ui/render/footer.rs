use crate::ui::theme::Theme;
use crate::ui::{App, Focus, InputMode, RightPane};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Key hints for the current context, most specific first
fn hints(app: &App) -> Vec<(&'static str, &'static str)> {
    match app.input_mode {
        InputMode::RepoUrl => return vec![("↵", "analyze"), ("Esc", "cancel")],
        InputMode::Feedback => return vec![("↵", "submit"), ("Esc", "cancel")],
        InputMode::Normal => {}
    }

    let mut hints = match app.focus {
        Focus::Files => vec![("↵", "view"), ("u", "repo url")],
        Focus::Bugs => vec![("s", "solve"), ("v", "validate")],
        Focus::Pane => match app.pane {
            RightPane::Code => vec![("↑↓", "scroll")],
            RightPane::Solutions => vec![
                ("[ ]", "solution"),
                ("f", "feedback"),
                ("m", "metrics"),
                ("a", "apply"),
            ],
            RightPane::Patched => vec![("v", "validate")],
        },
    };
    hints.push(("t", "tool"));
    hints.push(("c", "commit"));
    hints
}

pub(super) fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled("  ", Style::default())];

    if let Some(status) = &app.status {
        let style = if status.is_error {
            Theme::error()
        } else {
            Theme::text_muted()
        };
        spans.push(Span::styled(status.text.clone(), style));
    }

    let mut buttons = Vec::new();
    for (key, label) in hints(app) {
        buttons.push(Span::styled(
            format!(" {} ", key),
            Style::default().fg(Theme::GREY_900).bg(Theme::GREY_500),
        ));
        buttons.push(Span::styled(
            format!(" {} ", label),
            Style::default().fg(Theme::GREY_500),
        ));
    }

    // Help and quit (always shown)
    buttons.push(Span::styled(
        " ? ",
        Style::default().fg(Theme::GREY_900).bg(Theme::GREY_500),
    ));
    buttons.push(Span::styled(" help ", Style::default().fg(Theme::GREY_500)));
    buttons.push(Span::styled(
        " q ",
        Style::default().fg(Theme::GREY_900).bg(Theme::GREY_600),
    ));
    buttons.push(Span::styled(" quit ", Style::default().fg(Theme::GREY_600)));
    buttons.push(Span::styled(" ", Style::default()));

    let status_len: usize = spans.iter().map(|s| s.content.width()).sum();
    let buttons_len: usize = buttons.iter().map(|s| s.content.width()).sum();
    let spacer_len = (area.width as usize).saturating_sub(status_len + buttons_len);
    if spacer_len > 0 {
        spans.push(Span::styled(" ".repeat(spacer_len), Style::default()));
    }
    spans.extend(buttons);

    let footer = Paragraph::new(vec![Line::from(""), Line::from(spans)])
        .style(Style::default().bg(Theme::GREY_900));
    frame.render_widget(footer, area);
}
