//! Shared types for the terrastream workspace.
//!
//! # Invariants
//! - Chunk slots are addressed row-major: `row * 16 + col`.
//! - Position notifications from every input path share one ordered channel.

pub mod camera;
pub mod notify;
pub mod types;

pub use camera::{Camera, FlyCamera, Frustum};
pub use notify::{PositionChanged, PositionReceiver, PositionSender, position_channel};
pub use types::{
    AREA_SIZE, AreaIndex, BoundingBox, CHUNK_SIZE, CHUNKS_PER_AREA, CHUNKS_PER_SIDE, MAP_TILES,
    chunk_index, chunk_row_col,
};

pub fn crate_info() -> &'static str {
    "terrastream-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
