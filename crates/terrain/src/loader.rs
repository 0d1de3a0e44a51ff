use crate::area::AreaData;
use crate::heightmap::{HeightmapArea, TerrainShape};
use std::collections::BTreeSet;
use std::time::Duration;
use terrastream_common::AreaIndex;

/// Errors from producing an area payload.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("area {0} is outside the world grid")]
    OutOfMap(AreaIndex),
    #[error("failed to load area {index}: {reason}")]
    Failed { index: AreaIndex, reason: String },
}

/// Produces area payloads. Called from loader worker threads.
pub trait AreaLoader: Send + Sync {
    fn load(&self, index: AreaIndex) -> Result<Box<dyn AreaData>, LoadError>;
}

/// Loader generating heightmap tiles from a seed.
///
/// Tiles listed as missing load as invalid payloads, the same way an absent
/// tile file would.
#[derive(Debug, Clone, Default)]
pub struct ProceduralLoader {
    seed: u64,
    shape: TerrainShape,
    missing: BTreeSet<AreaIndex>,
    latency: Duration,
}

impl ProceduralLoader {
    pub fn new(seed: u64, shape: TerrainShape) -> Self {
        Self {
            seed,
            shape,
            ..Self::default()
        }
    }

    pub fn with_missing<I: IntoIterator<Item = AreaIndex>>(mut self, missing: I) -> Self {
        self.missing.extend(missing);
        self
    }

    /// Simulated read latency per tile.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl AreaLoader for ProceduralLoader {
    fn load(&self, index: AreaIndex) -> Result<Box<dyn AreaData>, LoadError> {
        if !index.in_map() {
            return Err(LoadError::OutOfMap(index));
        }
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        if self.missing.contains(&index) {
            tracing::debug!(%index, "no data for area");
            return Ok(Box::new(HeightmapArea::invalid(index)));
        }
        Ok(Box::new(HeightmapArea::generate(index, self.seed, &self.shape)))
    }
}
