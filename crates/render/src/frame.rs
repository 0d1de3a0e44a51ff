use crate::device::{BufferId, GraphicsDevice};
use crate::mesh::ChunkMesh;
use terrastream_common::{AreaIndex, Camera};

/// Everything one area needs for a frame, passed explicitly instead of
/// reaching for process-wide state.
pub struct FrameContext<'a> {
    pub camera: &'a dyn Camera,
    pub device: &'a dyn GraphicsDevice,
    /// Index topology shared by every chunk of every area.
    pub mesh: &'a mut ChunkMesh,
    pub output: &'a mut FrameOutput,
    /// Culling is suppressed while the streaming manager performs its first load.
    pub initial_load: bool,
    /// Snapshot of the doodad view-dirty signal for this frame.
    pub view_dirty: bool,
}

/// A chunk draw recorded for submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkDraw {
    pub area: AreaIndex,
    pub chunk: usize,
    pub buffer: BufferId,
    pub first_vertex: u32,
    pub vertex_count: u32,
    pub index_count: u32,
}

/// A model instance that may be visible this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DoodadRef {
    pub area: AreaIndex,
    pub id: u32,
}

/// Per-frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Areas that passed the loaded/valid gate.
    pub areas_visited: usize,
    pub areas_culled: usize,
    /// Areas outside the frustum whose models may still be visible.
    pub areas_doodads_only: usize,
    pub chunks_dispatched: usize,
    pub chunks_drawn: usize,
    pub doodad_pushes: usize,
    pub buffers_created: usize,
    pub buffer_uploads: usize,
}

impl std::ops::AddAssign for FrameStats {
    fn add_assign(&mut self, rhs: Self) {
        self.areas_visited += rhs.areas_visited;
        self.areas_culled += rhs.areas_culled;
        self.areas_doodads_only += rhs.areas_doodads_only;
        self.chunks_dispatched += rhs.chunks_dispatched;
        self.chunks_drawn += rhs.chunks_drawn;
        self.doodad_pushes += rhs.doodad_pushes;
        self.buffers_created += rhs.buffers_created;
        self.buffer_uploads += rhs.buffer_uploads;
    }
}

/// Result of one frame: draws to submit and doodads to consider.
#[derive(Debug, Clone, Default)]
pub struct FrameOutput {
    pub draws: Vec<ChunkDraw>,
    pub doodad_refs: Vec<DoodadRef>,
    pub stats: FrameStats,
}

impl FrameOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// No chunk of any area did any work.
    pub fn is_idle(&self) -> bool {
        self.draws.is_empty()
            && self.doodad_refs.is_empty()
            && self.stats.chunks_dispatched == 0
            && self.stats.doodad_pushes == 0
    }
}
