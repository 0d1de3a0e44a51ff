//! Area streaming around the camera.
//!
//! # Invariants
//! - Payloads are produced on loader threads; areas only receive them on the
//!   render thread, at most `load_budget` per frame.
//! - A load result is applied only to the area instance that requested it.
//! - Position notifications are applied in send order, once per tick.
//! - Culling is suppressed until every area requested on entering the world
//!   has been delivered or has failed.

mod budget;
mod grid;
mod manager;
mod pool;

pub use budget::{FrameTimer, StreamConfig, StreamStats};
pub use grid::{area_at, area_distance, areas_in_radius, areas_under_brush};
pub use manager::MapManager;
pub use pool::{LoadResult, LoaderPool, StreamError};

pub fn crate_info() -> &'static str {
    "terrastream-stream v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("stream"));
    }
}
