use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::item::EntityKind;
use crate::tui::app::App;
use crate::util::unicode::{display_width, truncate_to_width};

/// Render the current kind's list, scrolled to keep the cursor visible.
/// Records the area on the app for mouse hit-testing.
pub fn render_list_view(frame: &mut Frame, app: &mut App, area: Rect) {
    app.list_area = area;
    let bg = app.theme.background;
    let height = area.height as usize;
    let len = app.list().items.len();

    if len == 0 {
        let text = match app.kind {
            EntityKind::Subcategory if app.selected_category().is_none() => {
                "add a category first".to_string()
            }
            kind => format!("no {} yet: press a to add", kind.plural()),
        };
        let line = Line::from(Span::styled(
            format!("  {}", text),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
        frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
        return;
    }

    let cursor = app.cursor();
    let mut scroll = app.scroll().min(len.saturating_sub(height));
    if cursor < scroll {
        scroll = cursor;
    } else if height > 0 && cursor >= scroll + height {
        scroll = cursor + 1 - height;
    }
    app.set_scroll(scroll);

    let source = app.gesture.source().map(|s| s.id.clone());
    let target = app.gesture.drop_target().map(|t| t.id.clone());
    let width = area.width as usize;

    let lines: Vec<Line> = app
        .list()
        .items
        .iter()
        .enumerate()
        .skip(scroll)
        .take(height)
        .map(|(idx, item)| {
            let is_cursor = idx == cursor;
            let is_source = source.as_deref() == Some(item.id.as_str());
            let is_target = target.as_deref() == Some(item.id.as_str());

            let row_bg = if is_target {
                app.theme.drop_bg
            } else if is_cursor {
                app.theme.selection_bg
            } else {
                bg
            };
            let name_fg = if is_source {
                app.theme.highlight
            } else if item.hidden {
                app.theme.dim
            } else if is_cursor {
                app.theme.text_bright
            } else {
                app.theme.text
            };

            let mut suffix = String::new();
            if item.hidden {
                suffix.push_str("  (hidden)");
            }
            if is_source {
                suffix.push_str("  (moving)");
            }
            if is_target {
                suffix.push_str("  \u{2190} here");
            }

            let budget = width.saturating_sub(4 + display_width(&suffix));
            let marker = if is_cursor { "\u{25B8}" } else { " " };
            let mut name_style = Style::default().fg(name_fg).bg(row_bg);
            if is_cursor {
                name_style = name_style.add_modifier(Modifier::BOLD);
            }
            Line::from(vec![
                Span::styled(
                    marker,
                    Style::default().fg(app.theme.highlight).bg(row_bg),
                ),
                Span::styled(" ", Style::default().bg(row_bg)),
                Span::styled("\u{2261}", Style::default().fg(app.theme.dim).bg(row_bg)),
                Span::styled(" ", Style::default().bg(row_bg)),
                Span::styled(truncate_to_width(&item.name, budget), name_style),
                Span::styled(suffix, Style::default().fg(app.theme.dim).bg(row_bg)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tui::app::test_support::sample_app;
    use crate::tui::render::test_helpers::render_to_string;

    #[test]
    fn scrolls_to_keep_cursor_visible() {
        let mut app = sample_app();
        app.move_cursor(2);
        let out = render_to_string(30, 2, |frame, area| render_list_view(frame, &mut app, area));
        assert_snapshot!(out, @r"
          ≡ Pousadas
        ▸ ≡ Passeios  (hidden)
        ");
        assert_eq!(app.scroll(), 1);
        assert_eq!(app.hit_test(2, 1), Some((2, crate::tui::app::Zone::Handle)));
    }

    #[test]
    fn narrow_rows_truncate_names() {
        let mut app = sample_app();
        let out = render_to_string(10, 1, |frame, area| render_list_view(frame, &mut app, area));
        assert_snapshot!(out, @"▸ ≡ Resta…");
    }

    #[test]
    fn empty_list_hint() {
        let mut app = sample_app();
        app.next_kind();
        app.switch_category(2);
        let out = render_to_string(40, 1, |frame, area| render_list_view(frame, &mut app, area));
        assert_snapshot!(out, @"  no subcategories yet: press a to add");
    }
}
