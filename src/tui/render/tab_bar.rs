use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::item::EntityKind;
use crate::tui::app::App;
use crate::util::unicode::{display_width, truncate_to_width};

/// Render the tab bar: one tab per entity kind, with separator line below
pub fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // tabs
            Constraint::Length(1), // separator
        ])
        .split(area);

    let sep_cols = render_tabs(frame, app, chunks[0]);
    render_separator(frame, app, chunks[1], &sep_cols);
}

/// Render tabs and return the column positions of each separator character.
fn render_tabs(frame: &mut Frame, app: &App, area: Rect) -> Vec<usize> {
    let bg_style = Style::default().bg(app.theme.background);
    let sep = Span::styled(
        "\u{2502}",
        Style::default().fg(app.theme.dim).bg(app.theme.background),
    );

    let mut spans: Vec<Span> = vec![Span::styled(" ", bg_style)];
    let mut sep_cols: Vec<usize> = Vec::new();
    for kind in EntityKind::ALL {
        spans.push(Span::styled(
            format!(" {} ", kind.plural()),
            tab_style(app, app.kind == kind),
        ));
        sep_cols.push(spans.iter().map(|s| s.content.chars().count()).sum());
        spans.push(sep.clone());
    }

    let tabs = Paragraph::new(Line::from(spans)).style(bg_style);
    frame.render_widget(tabs, area);
    sep_cols
}

/// The separator doubles as the scope header on the subcategory tab.
fn render_separator(frame: &mut Frame, app: &App, area: Rect, sep_cols: &[usize]) {
    let width = area.width as usize;
    let bg = app.theme.background;

    let label = match app.kind {
        EntityKind::Subcategory => Some(match app.selected_category() {
            Some(category) => format!("in {}", category.name),
            None => "no categories".to_string(),
        }),
        _ => None,
    };
    let label = label.map(|l| truncate_to_width(&l, width.saturating_sub(4)));
    let label_width = label.as_deref().map_or(0, display_width);
    let separator_end = match label {
        Some(_) => width.saturating_sub(label_width + 2),
        None => width,
    };

    let mut line = String::with_capacity(separator_end * 3);
    for col in 0..separator_end {
        if sep_cols.contains(&col) {
            line.push('\u{2534}');
        } else {
            line.push('\u{2500}');
        }
    }
    let mut spans = vec![Span::styled(line, Style::default().fg(app.theme.dim).bg(bg))];
    if let Some(label) = label {
        spans.push(Span::styled(" ", Style::default().bg(bg)));
        spans.push(Span::styled(
            label,
            Style::default().fg(app.theme.highlight).bg(bg),
        ));
        spans.push(Span::styled(" ", Style::default().bg(bg)));
    }
    let sep_widget = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(sep_widget, area);
}

/// Style for a tab: highlighted if current, normal otherwise
fn tab_style(app: &App, is_current: bool) -> Style {
    if is_current {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.dim).bg(app.theme.background)
    }
}
