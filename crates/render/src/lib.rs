//! Area and chunk rendering for the streamed terrain grid.
//!
//! # Invariants
//! - An area performs no graphics-device calls until its first frame after
//!   the payload was bound.
//! - An area's chunk slots are either all populated or all empty.
//! - GPU resources are only released on the thread that drains the
//!   [`RenderQueue`].
//! - Every operation on an area that is not ready for it is a silent no-op.

pub mod area;
pub mod chunk;
pub mod device;
pub mod doodad;
pub mod frame;
pub mod mesh;
pub mod queue;

pub use area::{AreaState, MapAreaRender};
pub use chunk::{ChunkSlots, MapChunkRender};
pub use device::{BufferId, DeviceCounters, GraphicsDevice, HeadlessDevice, VertexBuffer};
pub use doodad::{DoodadVisibility, ViewDirtyQuery};
pub use frame::{ChunkDraw, DoodadRef, FrameContext, FrameOutput, FrameStats};
pub use mesh::ChunkMesh;
pub use queue::{RenderQueue, RenderQueueHandle};

pub fn crate_info() -> &'static str {
    "terrastream-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
