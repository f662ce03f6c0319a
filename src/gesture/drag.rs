use tracing::debug;

use super::{Commit, DragPreview, ItemRef, Modality, ReorderInput};

impl ReorderInput {
    /// Pick up `item`. Replaces any session in progress.
    pub fn drag_start(&mut self, item: ItemRef, label: &str) {
        debug!(kind = %item.kind, id = %item.id, "drag start");
        self.arm(item, Modality::Drag);
        self.preview = Some(DragPreview {
            label: label.to_string(),
        });
    }

    /// The pointer is over `item`. Only moves the highlight.
    pub fn drag_over(&mut self, item: &ItemRef) {
        if !self.armed_via(Modality::Drag) {
            return;
        }
        if self.source().is_some_and(|s| s.kind == item.kind) {
            self.drop_target = Some(item.clone());
        }
    }

    /// Released over `item`.
    pub fn drop_on(&mut self, item: &ItemRef) -> Option<Commit> {
        if !self.armed_via(Modality::Drag) {
            return None;
        }
        self.commit_to(item)
    }

    /// Released anywhere else.
    pub fn drag_end(&mut self) {
        if self.armed_via(Modality::Drag) {
            self.cancel();
        }
    }
}
