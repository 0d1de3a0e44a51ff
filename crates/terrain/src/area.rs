use crate::params::{TerrainChangeParams, TextureChangeParams};
use crate::vertex::TerrainVertex;
use terrastream_common::{AreaIndex, BoundingBox};

/// A fully parsed area payload.
///
/// Produced off the render thread by an [`crate::AreaLoader`]; dropping it
/// releases all CPU-side terrain data.
pub trait AreaData: Send {
    fn index(&self) -> AreaIndex;

    /// An invalid payload stands for a tile with no usable data.
    fn is_valid(&self) -> bool;

    /// Terrain-only bounds.
    fn bounding_box(&self) -> BoundingBox;

    /// Bounds of terrain plus every placed model.
    fn model_box(&self) -> BoundingBox;

    /// Vertices of all chunks, chunk after chunk in slot order.
    fn full_vertices(&self) -> &[TerrainVertex];

    fn chunk(&self, index: usize) -> Option<&dyn ChunkData>;

    /// Paint a texture layer. Returns whether any weight changed.
    fn on_texture_terrain(&mut self, params: &TextureChangeParams) -> bool;

    /// Sculpt heights. Returns whether any vertex moved.
    fn on_change_terrain(&mut self, params: &TerrainChangeParams) -> bool;

    fn on_update_model_positions(&mut self, params: &TerrainChangeParams);

    fn update_normals(&mut self);
}

/// One chunk's view into its area payload.
pub trait ChunkData {
    fn index(&self) -> usize;
    fn bounding_box(&self) -> BoundingBox;
    /// First vertex of this chunk in [`AreaData::full_vertices`].
    fn vertex_offset(&self) -> u32;
    fn vertex_count(&self) -> u32;
    /// Ids of the models placed on this chunk.
    fn doodad_refs(&self) -> &[u32];
}
