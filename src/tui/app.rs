use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use tracing::{info, warn};

use super::theme::Theme;
use super::{input, render};
use crate::io::json_store::JsonStore;
use crate::io::watcher::GuideWatcher;
use crate::io::workspace_io::{discover_workspace, load_workspace};
use crate::logging;
use crate::gesture::{Commit, ItemRef, PressRelease, ReorderInput, TapOutcome};
use crate::io::lock::FileLock;
use crate::io::state::{
    ConsoleState, read_console_state, read_undo, write_console_state, write_undo,
};
use crate::io::store::Store;
use crate::model::item::{EntityKind, OrderedItem, Scope};
use crate::model::workspace::Workspace;
use crate::ops::list::OrderedList;
use crate::ops::reorder::{Direction, Extreme};
use crate::ops::undo::UndoBuffer;

/// Current interaction mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing a name in the status row
    Input {
        purpose: InputPurpose,
        buffer: String,
    },
    /// Waiting for y/n on a delete
    Confirm { id: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPurpose {
    Add,
    Rename { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// One-line message in the status row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub kind: StatusKind,
}

impl Status {
    pub fn info(text: impl Into<String>) -> Self {
        Status {
            text: text.into(),
            kind: StatusKind::Info,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Status {
            text: text.into(),
            kind: StatusKind::Error,
        }
    }
}

/// Which part of a list row the pointer is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// The `≡` grip: press-and-hold or tap
    Handle,
    /// Anywhere else on the row: drag-and-drop
    Name,
}

/// Column of the `≡` grip within a list row
pub const HANDLE_COL: u16 = 2;

fn slot(kind: EntityKind) -> usize {
    match kind {
        EntityKind::Category => 0,
        EntityKind::Subcategory => 1,
        EntityKind::Location => 2,
    }
}

/// Main application state
pub struct App {
    pub workspace: Workspace,
    pub store: Box<dyn Store>,
    pub undo: UndoBuffer,
    pub kind: EntityKind,
    pub categories: OrderedList,
    pub subcategories: OrderedList,
    pub locations: OrderedList,
    /// Index into `categories.items` of the category whose subcategories show
    pub category_idx: usize,
    /// Per-kind cursor
    pub cursors: [usize; 3],
    /// Per-kind scroll offset (first visible row)
    pub scrolls: [usize; 3],
    pub gesture: ReorderInput,
    pub mode: Mode,
    pub status: Option<Status>,
    pub should_quit: bool,
    pub theme: Theme,
    /// Where the list was last drawn, for mouse hit-testing
    pub list_area: Rect,
    /// Take the guide/ lock around writes
    pub lock_writes: bool,
    /// Row pressed on its name, waiting to see if the pointer drags
    pending_drag: Option<ItemRef>,
}

impl App {
    pub fn new(workspace: Workspace, store: Box<dyn Store>, undo: UndoBuffer) -> Self {
        let theme = Theme::from_config(&workspace.config.ui);
        let gesture = ReorderInput::new(&workspace.config.interaction);
        let mut app = App {
            workspace,
            store,
            undo,
            kind: EntityKind::Category,
            categories: OrderedList::new(Scope::global(EntityKind::Category)),
            subcategories: OrderedList::new(Scope::within("")),
            locations: OrderedList::new(Scope::global(EntityKind::Location)),
            category_idx: 0,
            cursors: [0; 3],
            scrolls: [0; 3],
            gesture,
            mode: Mode::Navigate,
            status: None,
            should_quit: false,
            theme,
            list_area: Rect::default(),
            lock_writes: false,
            pending_drag: None,
        };
        app.refresh_all();
        app
    }

    /// Restore the tab and category saved by a previous session.
    pub fn restore(&mut self, state: &ConsoleState) {
        self.kind = state.kind;
        if let Some(id) = &state.category
            && let Some(idx) = self.categories.position(id)
        {
            self.category_idx = idx;
        }
        self.sync_subcategory_scope();
        self.subcategories.refresh(self.store.as_ref());
        self.clamp_cursor();
    }

    pub fn console_state(&self) -> ConsoleState {
        ConsoleState {
            kind: self.kind,
            category: self.selected_category().map(|c| c.id.clone()),
        }
    }

    // -----------------------------------------------------------------------
    // Lists and cursor
    // -----------------------------------------------------------------------

    pub fn list(&self) -> &OrderedList {
        match self.kind {
            EntityKind::Category => &self.categories,
            EntityKind::Subcategory => &self.subcategories,
            EntityKind::Location => &self.locations,
        }
    }

    pub fn selected_category(&self) -> Option<&OrderedItem> {
        self.categories.items.get(self.category_idx)
    }

    pub fn cursor(&self) -> usize {
        self.cursors[slot(self.kind)]
    }

    pub fn scroll(&self) -> usize {
        self.scrolls[slot(self.kind)]
    }

    pub fn set_scroll(&mut self, offset: usize) {
        self.scrolls[slot(self.kind)] = offset;
    }

    pub fn cursor_item(&self) -> Option<&OrderedItem> {
        self.list().items.get(self.cursor())
    }

    pub fn set_cursor(&mut self, idx: usize) {
        let len = self.list().items.len();
        self.cursors[slot(self.kind)] = idx.min(len.saturating_sub(1));
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.list().items.len();
        if len == 0 {
            return;
        }
        let next = self.cursor().saturating_add_signed(delta).min(len - 1);
        self.cursors[slot(self.kind)] = next;
    }

    fn clamp_cursor(&mut self) {
        for kind in EntityKind::ALL {
            let len = match kind {
                EntityKind::Category => self.categories.items.len(),
                EntityKind::Subcategory => self.subcategories.items.len(),
                EntityKind::Location => self.locations.items.len(),
            };
            let cursor = &mut self.cursors[slot(kind)];
            *cursor = (*cursor).min(len.saturating_sub(1));
        }
        if self.category_idx >= self.categories.items.len() {
            self.category_idx = self.categories.items.len().saturating_sub(1);
        }
    }

    /// Put the cursor on `id`, if it is in the current list.
    pub fn follow(&mut self, id: &str) {
        if let Some(pos) = self.list().position(id) {
            self.cursors[slot(self.kind)] = pos;
        }
    }

    pub fn next_kind(&mut self) {
        self.gesture.cancel();
        self.pending_drag = None;
        self.kind = self.kind.next();
        self.status = None;
    }

    /// Step the subcategory tab to another category (wraps).
    pub fn switch_category(&mut self, delta: isize) {
        let len = self.categories.items.len();
        if len == 0 {
            return;
        }
        self.gesture.cancel();
        self.category_idx = (self.category_idx as isize + delta).rem_euclid(len as isize) as usize;
        self.cursors[slot(EntityKind::Subcategory)] = 0;
        self.scrolls[slot(EntityKind::Subcategory)] = 0;
        self.sync_subcategory_scope();
        self.subcategories.refresh(self.store.as_ref());
    }

    fn sync_subcategory_scope(&mut self) {
        let key = self
            .selected_category()
            .map(|c| c.id.clone())
            .unwrap_or_default();
        self.subcategories.scope = Scope::within(&key);
    }

    pub fn refresh_all(&mut self) {
        let store = self.store.as_ref();
        self.categories.refresh(store);
        self.locations.refresh(store);
        self.clamp_cursor();
        self.sync_subcategory_scope();
        self.subcategories.refresh(self.store.as_ref());
        self.clamp_cursor();
    }

    /// Another process changed the data file.
    pub fn reload_from_disk(&mut self) {
        if let Err(e) = self.store.reload() {
            warn!(error = %e, "reload failed");
            self.status = Some(Status::error(e.to_string()));
            return;
        }
        self.refresh_all();
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Run a write against the current list, holding the guide lock and
    /// starting from the file's latest contents.
    fn write<T>(
        &mut self,
        f: impl FnOnce(&mut dyn Store, &mut UndoBuffer, &mut OrderedList) -> T,
    ) -> Option<T> {
        let _lock = if self.lock_writes {
            match FileLock::acquire_default(&self.workspace.guide_dir) {
                Ok(lock) => Some(lock),
                Err(e) => {
                    self.status = Some(Status::error(e.to_string()));
                    return None;
                }
            }
        } else {
            None
        };
        if let Err(e) = self.store.reload() {
            self.status = Some(Status::error(e.to_string()));
            return None;
        }
        if self.lock_writes {
            // another process may have used the slot since we last looked
            self.undo = read_undo(&self.workspace.guide_dir);
        }
        let selected = self.selected_category().map(|c| c.id.clone());
        let list = match self.kind {
            EntityKind::Category => &mut self.categories,
            EntityKind::Subcategory => &mut self.subcategories,
            EntityKind::Location => &mut self.locations,
        };
        let out = f(self.store.as_mut(), &mut self.undo, list);
        self.status = list.error.clone().map(Status::error);
        if self.kind == EntityKind::Category {
            // keep the subcategory tab on the same category after it moves
            self.clamp_cursor();
            if let Some(id) = selected
                && let Some(idx) = self.categories.position(&id)
            {
                self.category_idx = idx;
            }
            self.sync_subcategory_scope();
            self.subcategories.refresh(self.store.as_ref());
        }
        self.clamp_cursor();
        if self.lock_writes
            && let Err(e) = write_undo(&self.workspace.guide_dir, &self.undo)
        {
            warn!(error = %e, "could not save undo buffer");
        }
        Some(out)
    }

    fn info_if_ok(&mut self, text: String) {
        if self.status.is_none() {
            self.status = Some(Status::info(text));
        }
    }

    fn name_of(&self, id: &str) -> String {
        self.list()
            .items
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn apply_commit(&mut self, commit: Commit) {
        if commit.kind != self.kind {
            return;
        }
        let name = self.name_of(&commit.source_id);
        let moved = self.write(|store, undo, list| {
            list.reorder(store, undo, &commit.source_id, &commit.target_id)
        });
        if moved == Some(true) {
            self.follow(&commit.source_id);
            self.info_if_ok(format!("moved {}", name));
        }
    }

    pub fn swap(&mut self, direction: Direction) {
        let Some(item) = self.cursor_item().cloned() else {
            return;
        };
        self.write(|store, _, list| list.swap_with_neighbor(store, &item.id, direction));
        self.follow(&item.id);
    }

    pub fn move_to_extreme(&mut self, extreme: Extreme) {
        let Some(item) = self.cursor_item().cloned() else {
            return;
        };
        self.write(|store, _, list| list.move_to_extreme(store, &item.id, extreme));
        self.follow(&item.id);
    }

    pub fn normalize(&mut self) {
        if self.write(|store, _, list| list.normalize(store)) == Some(true) {
            self.info_if_ok("renumbered".to_string());
        }
    }

    pub fn undo(&mut self) {
        match self.write(|store, undo, list| list.undo(store, undo)) {
            Some(true) => self.info_if_ok("undone".to_string()),
            Some(false) => self.info_if_ok("nothing to undo".to_string()),
            None => {}
        }
    }

    pub fn toggle_hidden(&mut self) {
        let Some(item) = self.cursor_item().cloned() else {
            return;
        };
        self.write(|store, _, list| list.set_hidden(store, &item.id, !item.hidden));
    }

    pub fn add(&mut self, name: &str) {
        if self.kind == EntityKind::Subcategory && self.selected_category().is_none() {
            self.status = Some(Status::error("add a category first"));
            return;
        }
        let added = self.write(|store, _, list| list.add(store, name)).flatten();
        if let Some(item) = added {
            self.follow(&item.id);
            self.info_if_ok(format!("added {}", item.name));
        }
    }

    pub fn rename(&mut self, id: &str, name: &str) {
        self.write(|store, _, list| list.rename(store, id, name));
    }

    pub fn delete(&mut self, id: &str) {
        let name = self.name_of(id);
        if self.write(|store, _, list| list.delete(store, id)) == Some(true) {
            self.info_if_ok(format!("deleted {}", name));
        }
    }

    // -----------------------------------------------------------------------
    // Gestures
    // -----------------------------------------------------------------------

    pub fn item_ref(&self, idx: usize) -> Option<ItemRef> {
        self.list()
            .items
            .get(idx)
            .map(|i| ItemRef::new(self.kind, &i.id))
    }

    pub fn tap(&mut self, item: ItemRef) {
        let name = self.name_of(&item.id);
        match self.gesture.tap(item) {
            TapOutcome::Selected => {
                self.status = Some(Status::info(format!(
                    "{} selected: pick where it goes",
                    name
                )));
            }
            TapOutcome::Cancelled => self.status = None,
            TapOutcome::Committed(commit) => {
                self.status = None;
                self.apply_commit(commit);
            }
            TapOutcome::Ignored => {}
        }
    }

    /// Tap-select the row under the cursor.
    pub fn tap_cursor(&mut self) {
        if let Some(item) = self.item_ref(self.cursor()) {
            self.tap(item);
        }
    }

    pub fn release(&mut self, release: PressRelease) {
        match release {
            PressRelease::Committed(commit) => self.apply_commit(commit),
            PressRelease::Tap(item) => self.tap(item),
            PressRelease::Nothing => {}
        }
    }

    /// Advance gesture timers.
    pub fn tick(&mut self, now: Instant) {
        if self.gesture.tick(now)
            && let Some(source) = self.gesture.source()
        {
            let name = self.name_of(&source.id);
            self.status = Some(Status::info(format!("moving {}", name)));
        }
    }

    pub fn set_pending_drag(&mut self, item: Option<ItemRef>) {
        self.pending_drag = item;
    }

    pub fn take_pending_drag(&mut self) -> Option<ItemRef> {
        self.pending_drag.take()
    }

    /// Map a screen cell to a list row and the zone within it.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<(usize, Zone)> {
        let area = self.list_area;
        if col < area.x || col >= area.x + area.width || row < area.y || row >= area.y + area.height
        {
            return None;
        }
        let idx = self.scroll() + (row - area.y) as usize;
        if idx >= self.list().items.len() {
            return None;
        }
        let zone = if col - area.x == HANDLE_COL {
            Zone::Handle
        } else {
            Zone::Name
        };
        Some((idx, zone))
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run the console on the guide found from `dir` (or the working directory).
pub fn run(dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let start = match dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let root = discover_workspace(&start)?;
    let workspace = load_workspace(&root)?;
    logging::init_console(&workspace.log_path(), &workspace.config.log.level)?;
    info!(root = %workspace.root.display(), "console started");

    let store = JsonStore::open(&workspace.data_path())?;
    let undo = read_undo(&workspace.guide_dir);
    let watcher = match GuideWatcher::start(&workspace.guide_dir, &workspace.config.store.data_file)
    {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            warn!(error = %e, "file watcher unavailable");
            None
        }
    };

    let mut app = App::new(workspace, Box::new(store), undo);
    app.lock_writes = true;
    if let Some(state) = read_console_state(&app.workspace.guide_dir) {
        app.restore(&state);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    if let Err(e) = write_console_state(&app.workspace.guide_dir, &app.console_state()) {
        warn!(error = %e, "could not save console state");
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&GuideWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        // wake up in time to arm a pending long press
        let mut timeout = Duration::from_millis(250);
        if let Some(deadline) = app.gesture.long_press_deadline() {
            timeout = timeout.min(deadline.saturating_duration_since(Instant::now()));
        }

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key);
                }
                Event::Mouse(mouse) => input::handle_mouse(app, mouse, Instant::now()),
                Event::Resize(..) | Event::FocusLost => app.gesture.pointer_cancel(),
                _ => {}
            }
        }
        app.tick(Instant::now());

        if let Some(watcher) = watcher
            && !watcher.poll().is_empty()
        {
            app.reload_from_disk();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
