use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use super::app::{App, InputPurpose, Mode, Zone};
use crate::gesture::{Modality, Point};
use crate::ops::reorder::{Direction, Extreme};
use crate::util::unicode::pop_grapheme;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    let key = normalize_key(key);
    match &app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Input { .. } => handle_input(app, key),
        Mode::Confirm { .. } => handle_confirm(app, key),
    }
}

/// Kitty-protocol terminals send `Char('k') + SHIFT` for `K`.
fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
        && c.is_ascii_lowercase()
    {
        key.code = KeyCode::Char(c.to_ascii_uppercase());
    }
    key
}

fn handle_navigate(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc => {
            if !app.gesture.is_idle() {
                app.gesture.cancel();
            }
            app.status = None;
        }
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1),
        KeyCode::Char('g') | KeyCode::Home => app.move_cursor(isize::MIN),
        KeyCode::Char('G') | KeyCode::End => app.move_cursor(isize::MAX),
        KeyCode::Tab => app.next_kind(),
        KeyCode::Char('[') => app.switch_category(-1),
        KeyCode::Char(']') => app.switch_category(1),
        KeyCode::Char(' ') | KeyCode::Enter => app.tap_cursor(),
        KeyCode::Char('K') => app.swap(Direction::Up),
        KeyCode::Char('J') => app.swap(Direction::Down),
        KeyCode::Char('t') => app.move_to_extreme(Extreme::Top),
        KeyCode::Char('b') => app.move_to_extreme(Extreme::Bottom),
        KeyCode::Char('n') => app.normalize(),
        KeyCode::Char('u') => app.undo(),
        KeyCode::Char('h') => app.toggle_hidden(),
        KeyCode::Char('a') => {
            app.mode = Mode::Input {
                purpose: InputPurpose::Add,
                buffer: String::new(),
            };
        }
        KeyCode::Char('r') => {
            if let Some(item) = app.cursor_item().cloned() {
                app.mode = Mode::Input {
                    purpose: InputPurpose::Rename { id: item.id },
                    buffer: item.name,
                };
            }
        }
        KeyCode::Char('d') => {
            if let Some(item) = app.cursor_item().cloned() {
                app.mode = Mode::Confirm {
                    id: item.id,
                    name: item.name,
                };
            }
        }
        _ => {}
    }
}

fn handle_input(app: &mut App, key: KeyEvent) {
    let Mode::Input { purpose, buffer } = &mut app.mode else {
        return;
    };
    match key.code {
        KeyCode::Esc => app.mode = Mode::Navigate,
        KeyCode::Enter => {
            let purpose = purpose.clone();
            let text = std::mem::take(buffer);
            app.mode = Mode::Navigate;
            match purpose {
                InputPurpose::Add => app.add(&text),
                InputPurpose::Rename { id } => app.rename(&id, &text),
            }
        }
        KeyCode::Backspace => pop_grapheme(buffer),
        KeyCode::Char(c) => buffer.push(c),
        _ => {}
    }
}

fn handle_confirm(app: &mut App, key: KeyEvent) {
    let Mode::Confirm { id, .. } = &app.mode else {
        return;
    };
    let id = id.clone();
    app.mode = Mode::Navigate;
    if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
        app.delete(&id);
    }
}

// ---------------------------------------------------------------------------
// Mouse
// ---------------------------------------------------------------------------

/// Handle a mouse event. Press-and-hold on the `≡` grip is a long-press
/// drag (a quick click there is a tap); dragging a row by its name is
/// drag-and-drop.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent, now: Instant) {
    if app.mode != Mode::Navigate {
        return;
    }
    let at = Point::new(mouse.column, mouse.row);
    let hit = app.hit_test(mouse.column, mouse.row);
    let hit_item = hit.and_then(|(idx, _)| app.item_ref(idx));

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let Some((idx, zone)) = hit else {
                return;
            };
            let Some(item) = app.item_ref(idx) else {
                return;
            };
            match zone {
                Zone::Handle => app.gesture.pointer_down(item, at, now),
                Zone::Name => {
                    app.set_cursor(idx);
                    app.set_pending_drag(Some(item));
                }
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => match app.gesture.modality() {
            Some(Modality::Drag) => {
                if let Some(item) = &hit_item {
                    app.gesture.drag_over(item);
                }
            }
            Some(Modality::LongPress) => app.gesture.pointer_move(at, hit_item),
            _ => {
                if let Some(source) = app.take_pending_drag() {
                    let label = app
                        .list()
                        .items
                        .iter()
                        .find(|i| i.id == source.id)
                        .map(|i| i.name.clone())
                        .unwrap_or_default();
                    app.gesture.drag_start(source, &label);
                    if let Some(item) = &hit_item {
                        app.gesture.drag_over(item);
                    }
                } else {
                    app.gesture.pointer_move(at, hit_item);
                }
            }
        },
        MouseEventKind::Up(MouseButton::Left) => {
            app.set_pending_drag(None);
            if app.gesture.modality() == Some(Modality::Drag) {
                let commit = match &hit_item {
                    Some(item) => app.gesture.drop_on(item),
                    None => {
                        app.gesture.drag_end();
                        None
                    }
                };
                if let Some(commit) = commit {
                    app.apply_commit(commit);
                }
            } else {
                let release = app.gesture.pointer_up(now);
                app.release(release);
            }
        }
        // the list view scrolls to keep the cursor visible
        MouseEventKind::ScrollDown if !app.gesture.scroll_suppressed() => app.move_cursor(1),
        MouseEventKind::ScrollUp if !app.gesture.scroll_suppressed() => app.move_cursor(-1),
        _ => {}
    }
}
