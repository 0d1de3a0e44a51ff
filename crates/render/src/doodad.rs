use crate::frame::{DoodadRef, FrameOutput};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Read-only view of the doodad view-dirty signal.
#[derive(Debug, Clone)]
pub struct ViewDirtyQuery(Arc<AtomicBool>);

impl ViewDirtyQuery {
    pub fn is_dirty(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Doodad visibility set, rebuilt from chunk pushes whenever the view changed.
///
/// Owns the view-dirty signal: [`mark_view_changed`](Self::mark_view_changed)
/// sets it and only [`end_frame`](Self::end_frame) clears it. Area culling
/// reads it through a [`ViewDirtyQuery`].
#[derive(Debug)]
pub struct DoodadVisibility {
    view_dirty: Arc<AtomicBool>,
    visible: BTreeSet<DoodadRef>,
}

impl DoodadVisibility {
    /// Starts dirty so the first frame builds the set.
    pub fn new() -> Self {
        Self {
            view_dirty: Arc::new(AtomicBool::new(true)),
            visible: BTreeSet::new(),
        }
    }

    pub fn query(&self) -> ViewDirtyQuery {
        ViewDirtyQuery(Arc::clone(&self.view_dirty))
    }

    pub fn mark_view_changed(&self) {
        self.view_dirty.store(true, Ordering::Release);
    }

    pub fn is_view_dirty(&self) -> bool {
        self.view_dirty.load(Ordering::Acquire)
    }

    /// Adopt the references pushed this frame if the view was dirty, then
    /// clear the signal. Returns the size of the visible set.
    pub fn end_frame(&mut self, output: &FrameOutput) -> usize {
        if self.view_dirty.swap(false, Ordering::AcqRel) {
            self.visible = output.doodad_refs.iter().copied().collect();
            tracing::trace!(visible = self.visible.len(), "doodad visibility rebuilt");
        }
        self.visible.len()
    }

    pub fn visible(&self) -> &BTreeSet<DoodadRef> {
        &self.visible
    }
}

impl Default for DoodadVisibility {
    fn default() -> Self {
        Self::new()
    }
}
