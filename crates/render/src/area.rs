use crate::chunk::{ChunkSlots, MapChunkRender};
use crate::device::VertexBuffer;
use crate::frame::FrameContext;
use crate::queue::RenderQueueHandle;
use terrastream_common::{AreaIndex, BoundingBox, CHUNKS_PER_AREA};
use terrastream_terrain::{AreaData, TerrainChangeParams, TextureChangeParams};

/// Lifecycle of an area. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaState {
    Unloaded,
    /// The payload was invalid or incomplete. Terminal.
    Invalid,
    /// Chunks are bound; the GPU buffer is created on the next frame.
    AsyncLoaded,
    /// GPU buffer created and uploaded.
    SyncLoaded,
    Disposed,
}

/// Renderer for one area (tile) of the world grid.
///
/// Loading happens in two phases: [`async_loaded`](Self::async_loaded) binds
/// the payload without touching the graphics device, then the first
/// [`on_frame`](Self::on_frame) on the render thread creates and fills the
/// vertex buffer. Every operation is a silent no-op until the area is ready
/// for it.
pub struct MapAreaRender {
    index: AreaIndex,
    state: AreaState,
    data: Option<Box<dyn AreaData>>,
    vertex_buffer: Option<Box<dyn VertexBuffer>>,
    chunks: ChunkSlots,
    bounding_box: BoundingBox,
    model_box: BoundingBox,
    dirty: bool,
    release_queue: RenderQueueHandle,
}

impl MapAreaRender {
    pub fn new(index: AreaIndex, release_queue: RenderQueueHandle) -> Self {
        Self {
            index,
            state: AreaState::Unloaded,
            data: None,
            vertex_buffer: None,
            chunks: ChunkSlots::new(),
            bounding_box: BoundingBox::default(),
            model_box: BoundingBox::default(),
            dirty: false,
            release_queue,
        }
    }

    /// Accept the payload produced off the render thread.
    ///
    /// An invalid payload is kept but leaves the area inert. A payload that
    /// arrives after [`dispose`](Self::dispose) is dropped.
    pub fn async_loaded(&mut self, payload: Box<dyn AreaData>) {
        match self.state {
            AreaState::Unloaded => {}
            AreaState::Disposed => {
                tracing::debug!(index = %self.index, "payload arrived after dispose; dropped");
                return;
            }
            state => {
                tracing::warn!(index = %self.index, ?state, "area already loaded; payload dropped");
                return;
            }
        }

        if !payload.is_valid() {
            tracing::debug!(index = %self.index, "area payload invalid");
            self.data = Some(payload);
            self.state = AreaState::Invalid;
            return;
        }

        let mut chunks = Vec::with_capacity(CHUNKS_PER_AREA);
        for i in 0..CHUNKS_PER_AREA {
            let Some(data) = payload.chunk(i) else {
                tracing::error!(index = %self.index, chunk = i, "payload is missing a chunk; area load failed");
                self.data = Some(payload);
                self.state = AreaState::Invalid;
                return;
            };
            chunks.push(MapChunkRender::on_async_load(data, self.index));
        }
        self.chunks.fill(chunks);
        self.bounding_box = payload.bounding_box();
        self.model_box = payload.model_box();
        self.data = Some(payload);
        self.state = AreaState::AsyncLoaded;
        tracing::debug!(index = %self.index, "area async loaded");
    }

    pub fn on_frame(&mut self, ctx: &mut FrameContext<'_>) {
        if !matches!(self.state, AreaState::AsyncLoaded | AreaState::SyncLoaded) {
            return;
        }
        let Some(data) = self.data.as_deref_mut().filter(|d| d.is_valid()) else {
            return;
        };

        if self.state == AreaState::AsyncLoaded {
            let label = format!("area_{}_{}", self.index.x, self.index.y);
            let mut buffer = ctx.device.create_vertex_buffer(&label);
            buffer.update_data(data.full_vertices());
            self.vertex_buffer = Some(buffer);
            self.state = AreaState::SyncLoaded;
            ctx.output.stats.buffers_created += 1;
            ctx.output.stats.buffer_uploads += 1;
            tracing::debug!(index = %self.index, "area sync loaded");
        }
        ctx.output.stats.areas_visited += 1;

        if !ctx.initial_load && !ctx.camera.contains(&self.bounding_box) {
            if !ctx.view_dirty || !ctx.camera.contains(&self.model_box) {
                ctx.output.stats.areas_culled += 1;
                return;
            }
            for chunk in self.chunks.iter() {
                chunk.push_doodad_references(ctx.output);
            }
            ctx.output.stats.areas_doodads_only += 1;
            return;
        }

        let Some(buffer) = self.vertex_buffer.as_mut() else {
            return;
        };
        if self.dirty {
            data.update_normals();
            buffer.update_data(data.full_vertices());
            self.dirty = false;
            ctx.output.stats.buffer_uploads += 1;
        }

        ctx.mesh.update_vertex_buffer(&**buffer);
        for chunk in self.chunks.iter() {
            chunk.on_frame(ctx);
        }
    }

    /// Apply a sculpting edit. Returns whether the terrain changed.
    pub fn on_terrain_change(&mut self, params: &TerrainChangeParams) -> bool {
        if self.state != AreaState::SyncLoaded {
            return false;
        }
        let Some(data) = self.data.as_deref_mut().filter(|d| d.is_valid()) else {
            return false;
        };
        if !data.on_change_terrain(params) {
            return false;
        }

        self.dirty = true;
        self.bounding_box = data.bounding_box();
        for chunk in self.chunks.iter_mut() {
            if let Some(chunk_data) = data.chunk(chunk.index()) {
                chunk.update_bounding_box(chunk_data);
            }
        }
        true
    }

    pub fn on_texture_change(&mut self, params: &TextureChangeParams) {
        if let Some(data) = self.ready_data() {
            data.on_texture_terrain(params);
        }
    }

    pub fn on_update_model_positions(&mut self, params: &TerrainChangeParams) {
        if let Some(data) = self.ready_data() {
            data.on_update_model_positions(params);
        }
    }

    /// Release the payload, hand the vertex buffer to the render queue, and
    /// dispose every chunk. Safe to call repeatedly and from any thread.
    pub fn dispose(&mut self) {
        self.data = None;

        if let Some(buffer) = self.vertex_buffer.take() {
            self.release_queue.begin_invoke(move || drop(buffer));
        }

        self.chunks.clear();
        self.dirty = false;
        if self.state != AreaState::Disposed {
            tracing::debug!(index = %self.index, "area disposed");
            self.state = AreaState::Disposed;
        }
    }

    fn ready_data(&mut self) -> Option<&mut (dyn AreaData + 'static)> {
        if self.state != AreaState::SyncLoaded {
            return None;
        }
        self.data.as_deref_mut().filter(|d| d.is_valid())
    }

    pub fn index(&self) -> AreaIndex {
        self.index
    }

    pub fn state(&self) -> AreaState {
        self.state
    }

    pub fn is_async_loaded(&self) -> bool {
        matches!(self.state, AreaState::AsyncLoaded | AreaState::SyncLoaded)
    }

    pub fn is_sync_loaded(&self) -> bool {
        self.state == AreaState::SyncLoaded
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_disposed(&self) -> bool {
        self.state == AreaState::Disposed
    }

    /// Whether a payload has been received, whatever its validity.
    pub fn has_payload(&self) -> bool {
        self.data.is_some()
    }

    pub fn is_valid(&self) -> bool {
        self.data.as_ref().is_some_and(|d| d.is_valid())
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    pub fn model_box(&self) -> BoundingBox {
        self.model_box
    }

    pub fn chunk(&self, row: usize, col: usize) -> Option<&MapChunkRender> {
        self.chunks.get(row, col)
    }

    pub fn chunks(&self) -> &ChunkSlots {
        &self.chunks
    }

    pub fn populated_chunks(&self) -> usize {
        self.chunks.populated()
    }

    pub fn data(&self) -> Option<&dyn AreaData> {
        self.data.as_deref()
    }
}

impl Drop for MapAreaRender {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for MapAreaRender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapAreaRender")
            .field("index", &self.index)
            .field("state", &self.state)
            .field("dirty", &self.dirty)
            .field("chunks", &self.chunks)
            .finish_non_exhaustive()
    }
}
