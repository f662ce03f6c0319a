use std::time::Instant;

use tracing::debug;

use super::{Commit, ItemRef, Modality, Point, Press, ReorderInput};

/// What a pointer release on a handle amounts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PressRelease {
    Committed(Commit),
    /// Released before the hold time without moving: treat as a tap
    Tap(ItemRef),
    Nothing,
}

impl ReorderInput {
    /// Pointer pressed on `item`'s handle.
    ///
    /// Coarse pointers (zero delay) arm at once; fine pointers must hold
    /// until [`tick`](Self::tick) sees the delay elapse.
    pub fn pointer_down(&mut self, item: ItemRef, at: Point, now: Instant) {
        if self.armed_via(Modality::Drag) || self.armed_via(Modality::LongPress) {
            return;
        }
        let tap_only = self.armed_via(Modality::Tap);
        self.press = Some(Press {
            item,
            origin: at,
            started: now,
            tap_only,
        });
        if !tap_only && self.delay.is_zero() {
            self.activate();
        }
    }

    /// When the pending press will turn into a drag, if one is pending
    pub fn long_press_deadline(&self) -> Option<Instant> {
        self.press
            .as_ref()
            .filter(|p| !p.tap_only)
            .map(|p| p.started + self.delay)
    }

    /// Advance the hold timer. Returns true if the press armed just now.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.long_press_deadline() {
            Some(deadline) if now >= deadline => {
                self.activate();
                true
            }
            _ => false,
        }
    }

    fn activate(&mut self) {
        let Some(press) = self.press.take() else {
            return;
        };
        debug!(kind = %press.item.kind, id = %press.item.id, "long press armed");
        self.arm(press.item, Modality::LongPress);
        self.scroll_suppressed = true;
    }

    /// Pointer moved to `at`; `hit` is the row under it, if any.
    ///
    /// Before arming, moving past the threshold in either axis abandons the
    /// press. After arming, the row under the pointer becomes the drop
    /// candidate; moving over nothing keeps the last candidate.
    pub fn pointer_move(&mut self, at: Point, hit: Option<ItemRef>) {
        if let Some(press) = &self.press {
            let dx = at.x.abs_diff(press.origin.x);
            let dy = at.y.abs_diff(press.origin.y);
            if dx > self.threshold || dy > self.threshold {
                debug!("press moved, treating as scroll");
                self.press = None;
            }
            return;
        }
        if !self.armed_via(Modality::LongPress) {
            return;
        }
        if let Some(hit) = hit
            && self.source().is_some_and(|s| s.kind == hit.kind)
        {
            self.drop_target = Some(hit);
        }
    }

    /// Pointer released.
    pub fn pointer_up(&mut self, now: Instant) -> PressRelease {
        self.tick(now);
        if self.armed_via(Modality::LongPress) {
            let target = self.drop_target.clone();
            let commit = match target {
                Some(target) => self.commit_to(&target),
                None => {
                    self.cancel();
                    None
                }
            };
            return match commit {
                Some(commit) => PressRelease::Committed(commit),
                None => PressRelease::Nothing,
            };
        }
        match self.press.take() {
            Some(press) => PressRelease::Tap(press.item),
            None => PressRelease::Nothing,
        }
    }

    /// The pointer was taken away (focus lost, terminal resized). Never commits.
    pub fn pointer_cancel(&mut self) {
        self.press = None;
        if self.armed_via(Modality::LongPress) {
            self.cancel();
        }
    }
}
