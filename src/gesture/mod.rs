//! Pointer and keyboard gestures that pick a (source, target) pair.
//!
//! Drag-and-drop, tap-to-select and long-press all drive one state machine,
//! `Idle -> Armed(source) -> Idle`. A session ends in at most one [`Commit`],
//! which the caller hands to the reorder engine. Only one session is armed at
//! a time, and a commit always pairs items of the same kind.

mod drag;
mod long_press;
mod tap;

use std::time::{Duration, Instant};

use crate::model::config::InteractionConfig;
use crate::model::item::EntityKind;

pub use long_press::PressRelease;
pub use tap::TapOutcome;

/// An item as seen by the gesture layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    pub kind: EntityKind,
    pub id: String,
}

impl ItemRef {
    pub fn new(kind: EntityKind, id: &str) -> Self {
        ItemRef {
            kind,
            id: id.to_string(),
        }
    }
}

/// A finished gesture: move `source_id` to `target_id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub kind: EntityKind,
    pub source_id: String,
    pub target_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    Drag,
    Tap,
    LongPress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Armed { source: ItemRef, via: Modality },
}

/// What follows the pointer while dragging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPreview {
    pub label: String,
}

/// Pointer position in terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub fn new(x: u16, y: u16) -> Self {
        Point { x, y }
    }
}

/// A press on a handle that has not turned into a drag yet
#[derive(Debug, Clone)]
struct Press {
    item: ItemRef,
    origin: Point,
    started: Instant,
    /// A tap selection is armed; this press can only complete it
    tap_only: bool,
}

#[derive(Debug)]
pub struct ReorderInput {
    delay: Duration,
    threshold: u16,
    phase: Phase,
    drop_target: Option<ItemRef>,
    preview: Option<DragPreview>,
    press: Option<Press>,
    scroll_suppressed: bool,
}

impl ReorderInput {
    pub fn new(config: &InteractionConfig) -> Self {
        Self::with_timing(config.long_press_delay(), config.move_threshold)
    }

    pub fn with_timing(delay: Duration, threshold: u16) -> Self {
        ReorderInput {
            delay,
            threshold,
            phase: Phase::Idle,
            drop_target: None,
            preview: None,
            press: None,
            scroll_suppressed: false,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// The armed source, if any
    pub fn source(&self) -> Option<&ItemRef> {
        match &self.phase {
            Phase::Armed { source, .. } => Some(source),
            Phase::Idle => None,
        }
    }

    pub fn modality(&self) -> Option<Modality> {
        match &self.phase {
            Phase::Armed { via, .. } => Some(*via),
            Phase::Idle => None,
        }
    }

    /// Current drop candidate (highlight only)
    pub fn drop_target(&self) -> Option<&ItemRef> {
        self.drop_target.as_ref()
    }

    pub fn preview(&self) -> Option<&DragPreview> {
        self.preview.as_ref()
    }

    /// True while a long-press drag owns the pointer and scrolling is off
    pub fn scroll_suppressed(&self) -> bool {
        self.scroll_suppressed
    }

    /// Abandon whatever is in progress without committing.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
        self.drop_target = None;
        self.preview = None;
        self.press = None;
        self.scroll_suppressed = false;
    }

    fn arm(&mut self, source: ItemRef, via: Modality) {
        self.cancel();
        self.phase = Phase::Armed { source, via };
    }

    fn armed_via(&self, modality: Modality) -> bool {
        self.modality() == Some(modality)
    }

    /// End the session, producing a commit if `target` is a different item
    /// of the source's kind.
    fn commit_to(&mut self, target: &ItemRef) -> Option<Commit> {
        let source = self.source().cloned();
        self.cancel();
        let source = source?;
        if source.kind != target.kind || source.id == target.id {
            return None;
        }
        Some(Commit {
            kind: source.kind,
            source_id: source.id,
            target_id: target.id.clone(),
        })
    }
}
