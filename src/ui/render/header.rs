use crate::ui::theme::Theme;
use crate::ui::{App, SPINNER_FRAMES};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub(super) const LOGO: &str = "b u g p a t c h";

pub(super) fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        format!("   {}", LOGO),
        Style::default()
            .fg(Theme::WHITE)
            .add_modifier(Modifier::BOLD),
    )];

    let sep = || Span::styled(format!("  {}  ", Theme::DOT_SEPARATOR), Theme::text_dim());

    if let Some(repo) = &app.session.repo {
        spans.push(sep());
        spans.push(Span::styled(repo.full_name(), Theme::text()));
    }
    spans.push(sep());
    spans.push(Span::styled(app.tool().label(), Theme::text_muted()));
    if let Some(file) = app.session.selected_file() {
        spans.push(sep());
        spans.push(Span::styled(file.to_string(), Theme::text_muted()));
    }

    if app.loading.is_loading() {
        let frame_ch = SPINNER_FRAMES[app.loading_frame % SPINNER_FRAMES.len()];
        spans.push(Span::styled(
            format!("   {} {}", frame_ch, app.loading.label()),
            Style::default().fg(Theme::GREY_200),
        ));
    }

    let lines = vec![Line::from(""), Line::from(spans)];

    let header = Paragraph::new(lines).style(Style::default().bg(Theme::BG));
    frame.render_widget(header, area);
}
