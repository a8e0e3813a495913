use crate::text::JAVA_REMEDIATION_HINTS;
use crate::ui::helpers::{centered_fixed, centered_rect, wrap_paragraphs, wrap_text};
use crate::ui::theme::Theme;
use crate::workflow::commit::CHECKLIST;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const COMMIT_WIDTH: u16 = 64;
const COMMIT_HEIGHT: u16 = 16;

/// Screen area of the commit confirmation, used for click-outside dismissal
pub fn commit_modal_area(screen: Rect) -> Rect {
    centered_fixed(COMMIT_WIDTH, COMMIT_HEIGHT, screen)
}

fn overlay_block(title: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(Theme::GREY_100))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Theme::GREY_400))
        .style(Style::default().bg(Theme::GREY_900))
}

fn dismiss_line() -> Line<'static> {
    Line::from(vec![
        Span::styled("  ", Style::default()),
        Span::styled(
            " ↵ ",
            Style::default().fg(Theme::GREY_900).bg(Theme::GREY_300),
        ),
        Span::styled(" ok ", Theme::text_muted()),
    ])
}

pub(super) fn render_help(frame: &mut Frame, scroll: usize) {
    let area = centered_rect(55, 80, frame.area());
    frame.render_widget(Clear, area);

    fn section_start(title: &str) -> Vec<Line<'static>> {
        vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("    ╭─ ".to_string(), Style::default().fg(Theme::GREY_600)),
                Span::styled(
                    title.to_string(),
                    Style::default()
                        .fg(Theme::WHITE)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    " ─────────────────────────╮".to_string(),
                    Style::default().fg(Theme::GREY_600),
                ),
            ]),
        ]
    }

    fn key_row(key: &str, desc: &str) -> Line<'static> {
        Line::from(vec![
            Span::styled("    │  ".to_string(), Style::default().fg(Theme::GREY_600)),
            Span::styled(
                format!(" {} ", key),
                Style::default().fg(Theme::GREY_900).bg(Theme::GREY_300),
            ),
            Span::styled(format!("  {}", desc), Style::default().fg(Theme::GREY_200)),
        ])
    }

    fn section_end() -> Line<'static> {
        Line::from(vec![Span::styled(
            "    ╰─────────────────────────────────────╯".to_string(),
            Style::default().fg(Theme::GREY_600),
        )])
    }

    let mut help_text: Vec<Line<'static>> = vec![Line::from("")];

    help_text.extend(section_start("Navigation"));
    help_text.push(key_row("↑↓", "Move or scroll"));
    help_text.push(key_row("Tab", "Switch between panels"));
    help_text.push(key_row("1 2 3", "Code / Solutions / Patched"));
    help_text.push(key_row("Esc", "Go back / cancel"));
    help_text.push(section_end());

    help_text.extend(section_start("Repository"));
    help_text.push(key_row("u", "Enter repository URL"));
    help_text.push(key_row("t", "Toggle SpotBugs / PMD"));
    help_text.push(key_row("↵", "View highlighted file"));
    help_text.push(section_end());

    help_text.extend(section_start("Bugs"));
    help_text.push(key_row("s", "Send bug to the LLM"));
    help_text.push(key_row("v", "Validate the patched file"));
    help_text.push(section_end());

    help_text.extend(section_start("Solutions"));
    help_text.push(key_row("[ ]", "Previous / next solution"));
    help_text.push(key_row("f", "Write feedback and regenerate"));
    help_text.push(key_row("m", "Calculate metrics"));
    help_text.push(key_row("a", "Apply to the repository"));
    help_text.push(section_end());

    help_text.extend(section_start("Session"));
    help_text.push(key_row("c", "Commit and push"));
    help_text.push(key_row("?", "Show help"));
    help_text.push(key_row("q", "Quit"));
    help_text.push(section_end());

    let max_scroll = help_text.len().saturating_sub(area.height.saturating_sub(2) as usize);
    let block = Paragraph::new(help_text)
        .block(overlay_block("Help"))
        .scroll((scroll.min(max_scroll) as u16, 0));

    frame.render_widget(block, area);
}

pub(super) fn render_alert(frame: &mut Frame, message: &str) {
    let width = 60u16.min(frame.area().width);
    let text_width = width.saturating_sub(6) as usize;
    let wrapped = wrap_paragraphs(message, text_width);
    let height = (wrapped.len() as u16).saturating_add(5);
    let area = centered_fixed(width, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];
    lines.extend(
        wrapped
            .into_iter()
            .map(|l| Line::from(Span::styled(format!("  {}", l), Theme::text()))),
    );
    lines.push(Line::from(""));
    lines.push(dismiss_line());

    frame.render_widget(Paragraph::new(lines).block(overlay_block("Notice")), area);
}

pub(super) fn render_java_warning(frame: &mut Frame, detail: &str) {
    let area = centered_rect(70, 70, frame.area());
    frame.render_widget(Clear, area);
    let text_width = area.width.saturating_sub(8) as usize;

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("  {} ", Theme::WARNING_MARK), Style::default().fg(Theme::YELLOW)),
            Span::styled(
                "The backend's Java version cannot analyze this project",
                Theme::bold(),
            ),
        ]),
        Line::from(""),
    ];
    for hint in JAVA_REMEDIATION_HINTS {
        for (i, part) in wrap_text(hint, text_width).into_iter().enumerate() {
            let bullet = if i == 0 {
                format!("  {} ", Theme::BULLET_FILLED)
            } else {
                "    ".to_string()
            };
            lines.push(Line::from(vec![
                Span::styled(bullet, Theme::text_dim()),
                Span::styled(part, Theme::text()),
            ]));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  Details", Theme::text_muted())));
    for part in wrap_paragraphs(detail, text_width) {
        lines.push(Line::from(Span::styled(format!("  {}", part), Theme::text_dim())));
    }
    lines.push(Line::from(""));
    lines.push(dismiss_line());

    frame.render_widget(
        Paragraph::new(lines).block(overlay_block("Java Version Mismatch")),
        area,
    );
}

pub(super) fn render_commit(frame: &mut Frame, message: &str) {
    let area = commit_modal_area(frame.area());
    frame.render_widget(Clear, area);
    let field_width = area.width.saturating_sub(8) as usize;

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("  Before committing, confirm:", Theme::text_muted())),
    ];
    for item in CHECKLIST {
        lines.push(Line::from(vec![
            Span::styled(format!("    {} ", Theme::CHECK_MARK), Theme::success()),
            Span::styled(item.to_string(), Theme::text()),
        ]));
    }

    // Show the tail of long messages so the cursor stays visible
    let shown: String = {
        let count = message.chars().count();
        message.chars().skip(count.saturating_sub(field_width)).collect()
    };
    lines.extend([
        Line::from(""),
        Line::from(Span::styled("  Commit message", Theme::text_muted())),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(
                format!(" {:<width$}", format!("{}▏", shown), width = field_width),
                Style::default().fg(Theme::WHITE).bg(Theme::GREY_700),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(
                " Esc ",
                Style::default().fg(Theme::GREY_900).bg(Theme::GREY_600),
            ),
            Span::styled(" Cancel ", Style::default().fg(Theme::GREY_500)),
            Span::styled("  ", Style::default()),
            Span::styled(
                " ↵ ",
                Style::default().fg(Theme::GREY_900).bg(Theme::GREEN),
            ),
            Span::styled(" Commit ", Theme::text()),
        ]),
    ]);

    frame.render_widget(
        Paragraph::new(lines).block(overlay_block("Commit Changes")),
        area,
    );
}
