use crate::model::{BoxNote, MetricsComparison, SolutionBox};
use crate::session::Dispatch;
use crate::ui::helpers::{wrap_paragraphs, wrap_text};
use crate::ui::theme::Theme;
use crate::ui::{App, Focus, InputMode, RightPane};
use crate::util::truncate_width;
use crate::view::{self, MetricRow};
use crate::workflow::{apply::APPLY_FAILED, intake::NO_FILES};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs},
    Frame,
};

const URL_PLACEHOLDER: &str = "https://github.com/owner/repo";

pub(super) fn render_main(frame: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(36), Constraint::Percentage(64)])
        .split(area);

    render_left(frame, columns[0], app);
    render_right(frame, columns[1], app);
}

fn panel(title: String, active: bool) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .title_style(if active { Theme::title() } else { Theme::text_muted() })
        .borders(Borders::ALL)
        .border_style(if active {
            Theme::border_active()
        } else {
            Theme::border()
        })
}

// ─────────────────────────────────────────────────────────────────────────
// Left column: repository, files, bugs
// ─────────────────────────────────────────────────────────────────────────

fn render_left(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Percentage(45),
            Constraint::Min(5),
        ])
        .split(area);

    render_repo_input(frame, rows[0], app);
    render_files(frame, rows[1], app);
    render_bugs(frame, rows[2], app);
}

fn render_repo_input(frame: &mut Frame, area: Rect, app: &App) {
    let editing = app.input_mode == InputMode::RepoUrl;
    let width = area.width.saturating_sub(4) as usize;
    let line = if editing {
        let count = app.repo_input.chars().count();
        let tail: String = app
            .repo_input
            .chars()
            .skip(count.saturating_sub(width.saturating_sub(1)))
            .collect();
        Line::from(vec![
            Span::styled(tail, Style::default().fg(Theme::WHITE)),
            Span::styled("▏", Theme::text_muted()),
        ])
    } else if app.repo_input.is_empty() {
        Line::from(Span::styled(URL_PLACEHOLDER, Theme::text_dim()))
    } else {
        Line::from(Span::styled(
            truncate_width(&app.repo_input, width),
            Theme::text(),
        ))
    };
    frame.render_widget(
        Paragraph::new(line).block(panel("REPOSITORY".into(), editing)),
        area,
    );
}

fn list_lines(items: &[String], cursor: usize, active: bool, area: Rect) -> Vec<Line<'static>> {
    let visible = area.height.saturating_sub(2) as usize;
    let width = area.width.saturating_sub(5) as usize;
    let start = (cursor + 1).saturating_sub(visible);
    items
        .iter()
        .enumerate()
        .skip(start)
        .take(visible)
        .map(|(i, item)| {
            let selected = i == cursor;
            let marker = if selected {
                format!("{} ", Theme::ARROW_RIGHT)
            } else {
                "  ".to_string()
            };
            let style = match (selected, active) {
                (true, true) => Theme::selected(),
                (true, false) => Theme::bold(),
                _ => Theme::text(),
            };
            Line::from(vec![
                Span::styled(marker, Theme::text_muted()),
                Span::styled(truncate_width(item, width), style),
            ])
        })
        .collect()
}

fn render_files(frame: &mut Frame, area: Rect, app: &App) {
    let active = app.focus == Focus::Files && app.input_mode == InputMode::Normal;
    let files = &app.session.files;
    let lines = if app.session.repo.is_none() {
        vec![Line::from(Span::styled(
            "  Press u to enter a repository URL",
            Theme::text_dim(),
        ))]
    } else if files.is_empty() {
        vec![Line::from(Span::styled(format!("  {}", NO_FILES), Theme::text_dim()))]
    } else {
        list_lines(files, app.file_cursor, active, area)
    };
    let title = if files.is_empty() {
        "FILES".to_string()
    } else {
        format!("FILES ({})", files.len())
    };
    frame.render_widget(Paragraph::new(lines).block(panel(title, active)), area);
}

fn render_bugs(frame: &mut Frame, area: Rect, app: &App) {
    let active = app.focus == Focus::Bugs && app.input_mode == InputMode::Normal;
    let title = view::bug_count_label(app.session.bug_count());
    let lines = if app.session.viewed().is_none() {
        vec![Line::from(Span::styled(
            "  View a file to list its bugs",
            Theme::text_dim(),
        ))]
    } else if app.session.bugs().is_empty() {
        vec![Line::from(Span::styled(
            format!("  {}", view::NO_BUGS),
            Theme::text_dim(),
        ))]
    } else {
        let titles: Vec<String> = app
            .session
            .bugs()
            .iter()
            .map(|entry| view::bug_title(&entry.bug))
            .collect();
        list_lines(&titles, app.bug_cursor, active, area)
    };
    frame.render_widget(Paragraph::new(lines).block(panel(title, active)), area);
}

// ─────────────────────────────────────────────────────────────────────────
// Right column: code, solutions, patched
// ─────────────────────────────────────────────────────────────────────────

fn render_right(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    let titles: Vec<Line> = RightPane::ALL
        .iter()
        .enumerate()
        .map(|(i, pane)| Line::from(format!("{} {}", i + 1, pane.label())))
        .collect();
    let selected = RightPane::ALL
        .iter()
        .position(|p| *p == app.pane)
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Theme::text_dim())
        .highlight_style(Theme::title().add_modifier(Modifier::UNDERLINED))
        .divider(Span::styled("│", Theme::text_dim()));
    frame.render_widget(tabs, rows[0]);

    match app.pane {
        RightPane::Code => render_code_pane(frame, rows[1], app),
        RightPane::Solutions => render_solutions_pane(frame, rows[1], app),
        RightPane::Patched => render_patched_pane(frame, rows[1], app),
    }
}

/// Numbered code lines; lines with a reported bug get a marker in the gutter
fn code_view_lines(text: &str, bug_lines: &[u32]) -> Vec<Line<'static>> {
    let lines = view::code_lines(text);
    let gutter = view::gutter_width(lines.len());
    lines
        .into_iter()
        .map(|line| {
            let flagged = bug_lines.contains(&(line.number as u32));
            let marker = if flagged {
                Span::styled(format!("{} ", Theme::BULLET_FILLED), Style::default().fg(Theme::YELLOW))
            } else {
                Span::raw("  ")
            };
            Line::from(vec![
                marker,
                Span::styled(
                    format!("{:>width$}  ", line.number, width = gutter),
                    Theme::text_dim(),
                ),
                Span::styled(line.text, if flagged { Theme::bold() } else { Theme::text() }),
            ])
        })
        .collect()
}

fn placeholder(frame: &mut Frame, area: Rect, block: Block<'static>, text: &str) {
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(format!("  {}", text), Theme::text_dim())))
            .block(block),
        area,
    );
}

fn render_code_pane(frame: &mut Frame, area: Rect, app: &App) {
    let active = app.focus == Focus::Pane;
    let Some(viewed) = app.session.viewed() else {
        placeholder(
            frame,
            area,
            panel("CODE".into(), active),
            "Select a file and press ↵ to view it",
        );
        return;
    };

    let ck_lines = view::ck_metric_lines(viewed.ck_metrics.as_ref());
    let ck_height = (ck_lines.len() as u16 + 2).min(area.height / 3).max(3);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(ck_height)])
        .split(area);

    let bug_lines: Vec<u32> = app.session.bugs().iter().map(|b| b.bug.line).collect();
    let code = code_view_lines(&viewed.content, &bug_lines);
    let scroll = app.code_scroll.min(code.len().saturating_sub(1));
    frame.render_widget(
        Paragraph::new(code)
            .block(panel(viewed.filename.clone(), active))
            .scroll((scroll as u16, 0)),
        rows[0],
    );

    let ck: Vec<Line> = ck_lines
        .into_iter()
        .map(|l| Line::from(Span::styled(format!("  {}", l), Theme::text_muted())))
        .collect();
    frame.render_widget(
        Paragraph::new(ck).block(panel("CK METRICS".into(), false)),
        rows[1],
    );
}

fn render_solutions_pane(frame: &mut Frame, area: Rect, app: &App) {
    let active = app.focus == Focus::Pane;
    let Some(dispatch) = app.session.dispatch.as_ref() else {
        placeholder(
            frame,
            area,
            panel("SOLUTIONS".into(), active),
            "Send a bug to the LLM to see candidate fixes (s)",
        );
        return;
    };

    let width = area.width.saturating_sub(6) as usize;
    let lines = solution_lines(app, dispatch, width);
    let scroll = app.solutions_scroll.min(lines.len().saturating_sub(1));
    frame.render_widget(
        Paragraph::new(lines)
            .block(panel(
                format!("SOLUTIONS {} {}", Theme::DOT_SEPARATOR, view::bug_title(&dispatch.bug)),
                active,
            ))
            .scroll((scroll as u16, 0)),
        area,
    );
}

fn solution_lines(app: &App, dispatch: &Dispatch, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for part in wrap_text(dispatch.description(), width) {
        lines.push(Line::from(Span::styled(format!("  {}", part), Theme::text_muted())));
    }
    lines.push(Line::from(""));

    if dispatch.boxes.is_empty() {
        lines.push(Line::from(Span::styled(
            "  The LLM returned no solutions.",
            Theme::text_dim(),
        )));
        return lines;
    }

    // Selector row: [1] 2 3
    let mut selector = vec![Span::raw("  ")];
    for (i, b) in dispatch.boxes.iter().enumerate() {
        let style = if i == app.solution_cursor {
            Theme::selected()
        } else {
            Theme::text_dim()
        };
        selector.push(Span::styled(format!(" Solution {} ", b.number), style));
        selector.push(Span::raw(" "));
    }
    lines.push(Line::from(selector));
    lines.push(Line::from(""));

    if let Some(b) = dispatch.boxes.get(app.solution_cursor) {
        lines.extend(box_lines(app, b, width));
    }
    lines
}

fn box_lines(app: &App, b: &SolutionBox, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let mut header = vec![Span::styled(format!("  Solution {}", b.number), Theme::title())];
    if let Some(rating) = view::rating_label(b.rating) {
        header.push(Span::styled(format!("   Rating {}", rating), Theme::text_muted()));
    }
    lines.push(Line::from(header));
    lines.push(Line::from(""));

    for line in view::code_lines(&b.solution) {
        lines.push(Line::from(Span::styled(
            format!("  │ {}", line.text),
            Style::default().fg(Theme::GREY_50).bg(Theme::GREY_800),
        )));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled("  Explanation", Theme::bold())));
    for part in wrap_paragraphs(&b.explanation, width) {
        lines.push(Line::from(Span::styled(format!("  {}", part), Theme::text())));
    }
    lines.push(Line::from(""));

    let editing = app.input_mode == InputMode::Feedback;
    lines.push(Line::from(Span::styled("  Feedback", Theme::bold())));
    if editing || !b.feedback.is_empty() {
        let cursor = if editing { "▏" } else { "" };
        lines.push(Line::from(Span::styled(
            format!("  {}{}", b.feedback, cursor),
            Style::default().fg(Theme::WHITE).bg(Theme::GREY_700),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "  press f to ask for a revised solution",
            Theme::text_dim(),
        )));
    }

    if let Some(metrics) = &b.metrics {
        lines.push(Line::from(""));
        lines.extend(metric_text_lines(metrics));
    }

    if let Some(note) = &b.note {
        lines.push(Line::from(""));
        let (text, style) = match note {
            BoxNote::Info(t) => (t, Theme::success()),
            BoxNote::Error(t) => (t, Theme::error()),
        };
        for part in wrap_text(text, width) {
            lines.push(Line::from(Span::styled(format!("  {}", part), style)));
        }
    }
    lines
}

/// Metrics table rendered as aligned text, for use inside a scrolled paragraph
fn metric_text_lines(metrics: &MetricsComparison) -> Vec<Line<'static>> {
    let rows = view::metrics_rows(metrics);
    if rows.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![Line::from(Span::styled("  Metrics Comparison", Theme::bold()))];
    lines.push(Line::from(Span::styled(
        format!("  {:<8}{:>10}{:>10}  {}", "Metric", "Before", "After", "Change"),
        Theme::text_muted(),
    )));
    for row in rows {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<8}{:>10}{:>10}  ", row.name, row.before, row.after),
                Theme::text(),
            ),
            Span::styled(row.change.clone(), Theme::trend(row.trend)),
        ]));
    }
    lines
}

fn metrics_table(rows: Vec<MetricRow>) -> Table<'static> {
    let header = Row::new(vec!["Metric", "Before", "After", "Change"]).style(Theme::text_muted());
    let body: Vec<Row> = rows
        .into_iter()
        .map(|row| {
            let trend = Theme::trend(row.trend);
            Row::new(vec![
                Cell::from(row.name),
                Cell::from(row.before),
                Cell::from(row.after),
                Cell::from(row.change).style(trend),
            ])
            .style(Theme::text())
        })
        .collect();
    Table::new(
        body,
        [
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Min(8),
        ],
    )
    .header(header)
    .block(panel("Metrics Comparison".into(), false))
}

fn render_patched_pane(frame: &mut Frame, area: Rect, app: &App) {
    let active = app.focus == Focus::Pane;

    if app.session.apply_failed {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(format!("  {}", APPLY_FAILED), Theme::error())))
                .block(panel("PATCHED".into(), active)),
            area,
        );
        return;
    }
    let Some(patched) = app.session.patched.as_ref() else {
        placeholder(
            frame,
            area,
            panel("PATCHED".into(), active),
            "Apply a solution to preview the patched file (a)",
        );
        return;
    };

    let rows = patched
        .metrics
        .as_ref()
        .map(view::metrics_rows)
        .unwrap_or_default();
    let banner_height = if app.banner.is_some() { 1 } else { 0 };
    let table_height = if rows.is_empty() {
        0
    } else {
        (rows.len() as u16 + 3).min(area.height / 2)
    };
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Min(3),
            Constraint::Length(table_height),
        ])
        .split(area);

    if let Some(banner) = &app.banner {
        let (mark, bg) = if banner.success {
            (Theme::CHECK_MARK, Theme::GREEN)
        } else {
            (Theme::CROSS_MARK, Theme::RED)
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {} {}", mark, banner.message),
                Style::default().fg(Theme::WHITE).bg(bg).add_modifier(Modifier::BOLD),
            )))
            .style(Style::default().bg(bg)),
            parts[0],
        );
    }

    let code = code_view_lines(&patched.text, &[]);
    let scroll = app.patched_scroll.min(code.len().saturating_sub(1));
    let title = if patched.message.is_empty() {
        format!("PATCHED {} {}", Theme::DOT_SEPARATOR, patched.filename)
    } else {
        format!(
            "PATCHED {} {} {} {}",
            Theme::DOT_SEPARATOR,
            patched.filename,
            Theme::DOT_SEPARATOR,
            patched.message
        )
    };
    frame.render_widget(
        Paragraph::new(code)
            .block(panel(title, active))
            .scroll((scroll as u16, 0)),
        parts[1],
    );

    if !rows.is_empty() {
        frame.render_widget(metrics_table(rows), parts[2]);
    }
}
