//! Terrain payloads: the CPU-side data of one area and its 256 chunks.
//!
//! # Invariants
//! - Payloads perform no graphics-device calls; they are built off the render thread.
//! - An edit reports `true` only when it actually changed data.
//! - An invalid payload exposes no chunks and ignores every edit.

pub mod area;
pub mod heightmap;
pub mod loader;
pub mod params;
pub mod vertex;

pub use area::{AreaData, ChunkData};
pub use heightmap::{
    DoodadPlacement, HeightmapArea, HeightmapChunk, MAX_LAYERS, TerrainShape, VERTICES_PER_CHUNK,
    VERTS_PER_SIDE,
};
pub use loader::{AreaLoader, LoadError, ProceduralLoader};
pub use params::{
    Falloff, TerrainChangeMethod, TerrainChangeParams, TextureChangeParams,
};
pub use vertex::TerrainVertex;

pub fn crate_info() -> &'static str {
    "terrastream-terrain v0.1.0"
}
