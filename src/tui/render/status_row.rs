use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, InputPurpose, Mode, StatusKind};

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let line = match &app.mode {
        Mode::Navigate => {
            if let Some(status) = &app.status {
                let fg = match status.kind {
                    StatusKind::Info => app.theme.text,
                    StatusKind::Error => app.theme.red,
                };
                Line::from(Span::styled(
                    status.text.clone(),
                    Style::default().fg(fg).bg(bg),
                ))
            } else if let Some(preview) = app.gesture.preview() {
                Line::from(Span::styled(
                    format!("dragging {}", preview.label),
                    Style::default().fg(app.theme.yellow).bg(bg),
                ))
            } else {
                // Empty in navigate mode
                Line::from(Span::styled(" ".repeat(width), Style::default().bg(bg)))
            }
        }
        Mode::Input { purpose, buffer } => {
            let prompt = match purpose {
                InputPurpose::Add => format!("new {}", app.kind),
                InputPurpose::Rename { .. } => "rename".to_string(),
            };
            let spans = vec![
                Span::styled(
                    format!("{}: {}", prompt, buffer),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
            ];
            with_hint(app, spans, "Enter save  Esc cancel", width)
        }
        Mode::Confirm { name, .. } => {
            let spans = vec![Span::styled(
                format!("delete {}? y/n", name),
                Style::default().fg(app.theme.yellow).bg(bg),
            )];
            Line::from(spans)
        }
    };

    let paragraph = Paragraph::new(line).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// Right-align a dim hint after `spans` when it fits.
fn with_hint<'a>(app: &App, mut spans: Vec<Span<'a>>, hint: &'a str, width: usize) -> Line<'a> {
    let bg = app.theme.background;
    let content_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let hint_width = hint.chars().count();
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
    }
    Line::from(spans)
}
