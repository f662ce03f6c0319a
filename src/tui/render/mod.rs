pub mod list_view;
pub mod status_row;
pub mod tab_bar;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::App;

/// Main render function: tab bar, list, status row
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // tab bar + separator
            Constraint::Min(1),    // list
            Constraint::Length(1), // status row
        ])
        .split(area);

    tab_bar::render_tab_bar(frame, app, chunks[0]);
    list_view::render_list_view(frame, app, chunks[1]);
    status_row::render_status_row(frame, app, chunks[2]);
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::test_helpers::*;
    use super::*;
    use crate::gesture::ItemRef;
    use crate::model::item::EntityKind;
    use crate::tui::app::test_support::sample_app;

    #[test]
    fn categories_tab() {
        let mut app = sample_app();
        let out = render_to_string(50, 8, |frame, _| render(frame, &mut app));
        assert_snapshot!(out, @r"
          categories │ subcategories │ locations │
        ─────────────┴───────────────┴────────────────────
        ▸ ≡ Restaurantes
          ≡ Pousadas
          ≡ Passeios  (hidden)
        ");
    }

    #[test]
    fn subcategories_are_scoped_to_the_selected_category() {
        let mut app = sample_app();
        app.next_kind();
        let out = render_to_string(50, 8, |frame, _| render(frame, &mut app));
        assert_snapshot!(out, @r"
          categories │ subcategories │ locations │
        ─────────────┴───────────────┴─── in Restaurantes
        ▸ ≡ Pizzarias
          ≡ Cafeterias
        ");
    }

    #[test]
    fn drag_marks_source_and_drop_target() {
        let mut app = sample_app();
        app.gesture
            .drag_start(ItemRef::new(EntityKind::Category, "c3"), "Passeios");
        app.gesture
            .drag_over(&ItemRef::new(EntityKind::Category, "c1"));
        let out = render_to_string(50, 8, |frame, _| render(frame, &mut app));
        assert_snapshot!(out, @r"
          categories │ subcategories │ locations │
        ─────────────┴───────────────┴────────────────────
        ▸ ≡ Restaurantes  ← here
          ≡ Pousadas
          ≡ Passeios  (hidden)  (moving)


        dragging Passeios
        ");
    }

    #[test]
    fn list_area_is_recorded_for_hit_testing() {
        let mut app = sample_app();
        render_to_string(50, 8, |frame, _| render(frame, &mut app));
        assert_eq!(app.list_area, ratatui::layout::Rect::new(0, 2, 50, 5));
    }
}
