use crate::frame::{ChunkDraw, DoodadRef, FrameContext, FrameOutput};
use terrastream_common::{AreaIndex, BoundingBox, CHUNKS_PER_AREA, CHUNKS_PER_SIDE, chunk_index};
use terrastream_terrain::ChunkData;

/// Renderer for one chunk of an area.
#[derive(Debug, Clone)]
pub struct MapChunkRender {
    area: AreaIndex,
    index: usize,
    bounding_box: BoundingBox,
    first_vertex: u32,
    vertex_count: u32,
    doodad_refs: Vec<u32>,
}

impl MapChunkRender {
    /// Bind to the chunk's payload data. Performs no graphics-device calls.
    pub fn on_async_load(data: &dyn ChunkData, area: AreaIndex) -> Self {
        Self {
            area,
            index: data.index(),
            bounding_box: data.bounding_box(),
            first_vertex: data.vertex_offset(),
            vertex_count: data.vertex_count(),
            doodad_refs: data.doodad_refs().to_vec(),
        }
    }

    pub fn update_bounding_box(&mut self, data: &dyn ChunkData) {
        self.bounding_box = data.bounding_box();
    }

    pub fn push_doodad_references(&self, output: &mut FrameOutput) {
        output.stats.doodad_pushes += 1;
        output
            .doodad_refs
            .extend(self.doodad_refs.iter().map(|&id| DoodadRef {
                area: self.area,
                id,
            }));
    }

    /// Per-frame work: refresh doodad references when the view changed, then
    /// record a draw if the chunk is in view.
    pub fn on_frame(&self, ctx: &mut FrameContext<'_>) {
        ctx.output.stats.chunks_dispatched += 1;
        if ctx.view_dirty {
            self.push_doodad_references(ctx.output);
        }
        if !ctx.camera.contains(&self.bounding_box) {
            return;
        }
        let Some(buffer) = ctx.mesh.bound_buffer() else {
            return;
        };
        ctx.output.draws.push(ChunkDraw {
            area: self.area,
            chunk: self.index,
            buffer,
            first_vertex: self.first_vertex,
            vertex_count: self.vertex_count,
            index_count: ctx.mesh.index_count(),
        });
        ctx.output.stats.chunks_drawn += 1;
    }

    pub fn dispose(&mut self) {
        self.doodad_refs.clear();
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn area(&self) -> AreaIndex {
        self.area
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    pub fn doodad_refs(&self) -> &[u32] {
        &self.doodad_refs
    }
}

/// Fixed array of an area's 256 chunk slots, indexed `row * 16 + col`.
/// Never resized; slots are either all filled or all empty.
pub struct ChunkSlots(Box<[Option<MapChunkRender>; CHUNKS_PER_AREA]>);

impl ChunkSlots {
    pub fn new() -> Self {
        Self(Box::new(std::array::from_fn(|_| None)))
    }

    /// Fill every slot at once from chunks built in slot order.
    pub(crate) fn fill(&mut self, chunks: Vec<MapChunkRender>) {
        debug_assert_eq!(chunks.len(), CHUNKS_PER_AREA);
        for (slot, chunk) in self.0.iter_mut().zip(chunks) {
            *slot = Some(chunk);
        }
    }

    /// Dispose and empty every slot.
    pub(crate) fn clear(&mut self) {
        for slot in self.0.iter_mut() {
            if let Some(mut chunk) = slot.take() {
                chunk.dispose();
            }
        }
    }

    /// Slot at `row`, `col`; `None` outside the 16×16 grid.
    pub fn get(&self, row: usize, col: usize) -> Option<&MapChunkRender> {
        if row >= CHUNKS_PER_SIDE || col >= CHUNKS_PER_SIDE {
            return None;
        }
        self.get_index(chunk_index(row, col))
    }

    pub fn get_index(&self, index: usize) -> Option<&MapChunkRender> {
        self.0.get(index).and_then(Option::as_ref)
    }

    /// Populated slots in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &MapChunkRender> {
        self.0.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MapChunkRender> {
        self.0.iter_mut().flatten()
    }

    pub fn populated(&self) -> usize {
        self.iter().count()
    }
}

impl Default for ChunkSlots {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChunkSlots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkSlots")
            .field("populated", &self.populated())
            .finish()
    }
}
