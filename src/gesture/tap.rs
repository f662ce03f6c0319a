use super::{Commit, ItemRef, Modality, Phase, ReorderInput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    /// The item is now the selected source
    Selected,
    /// The selected item was tapped again
    Cancelled,
    Committed(Commit),
    /// A drag or long-press owns the session
    Ignored,
}

impl ReorderInput {
    /// Tap-to-select: the first tap selects, a tap on another item of the
    /// same kind moves the selection there, a tap on the selection cancels.
    /// Tapping an item of a different kind selects it instead.
    pub fn tap(&mut self, item: ItemRef) -> TapOutcome {
        match &self.phase {
            Phase::Idle => {
                self.arm(item, Modality::Tap);
                TapOutcome::Selected
            }
            Phase::Armed {
                source,
                via: Modality::Tap,
            } => {
                if source.kind != item.kind {
                    self.arm(item, Modality::Tap);
                    TapOutcome::Selected
                } else if source.id == item.id {
                    self.cancel();
                    TapOutcome::Cancelled
                } else {
                    match self.commit_to(&item) {
                        Some(commit) => TapOutcome::Committed(commit),
                        None => TapOutcome::Cancelled,
                    }
                }
            }
            Phase::Armed { .. } => TapOutcome::Ignored,
        }
    }
}
