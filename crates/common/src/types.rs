use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Number of areas along each side of the world grid.
pub const MAP_TILES: i32 = 64;

/// World-space edge length of one area.
pub const AREA_SIZE: f32 = 1600.0 / 3.0;

/// Number of chunks along each side of an area.
pub const CHUNKS_PER_SIDE: usize = 16;

/// Number of chunks in one area.
pub const CHUNKS_PER_AREA: usize = CHUNKS_PER_SIDE * CHUNKS_PER_SIDE;

/// World-space edge length of one chunk.
pub const CHUNK_SIZE: f32 = AREA_SIZE / CHUNKS_PER_SIDE as f32;

/// Grid coordinate of an area (tile) in the world.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct AreaIndex {
    pub x: i32,
    pub y: i32,
}

impl AreaIndex {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether this index addresses a tile inside the world grid.
    pub fn in_map(&self) -> bool {
        (0..MAP_TILES).contains(&self.x) && (0..MAP_TILES).contains(&self.y)
    }

    /// World-space XZ origin (minimum corner) of this area.
    pub fn origin(&self) -> Vec3 {
        Vec3::new(self.x as f32 * AREA_SIZE, 0.0, self.y as f32 * AREA_SIZE)
    }

    /// Area containing the given world position.
    pub fn containing(position: Vec3) -> Self {
        Self {
            x: (position.x / AREA_SIZE).floor() as i32,
            y: (position.z / AREA_SIZE).floor() as i32,
        }
    }
}

impl std::fmt::Display for AreaIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Row-major chunk slot for a (row, col) pair inside an area.
pub fn chunk_index(row: usize, col: usize) -> usize {
    debug_assert!(row < CHUNKS_PER_SIDE && col < CHUNKS_PER_SIDE);
    row * CHUNKS_PER_SIDE + col
}

/// Inverse of [`chunk_index`].
pub fn chunk_row_col(index: usize) -> (usize, usize) {
    (index / CHUNKS_PER_SIDE, index % CHUNKS_PER_SIDE)
}

/// Axis-aligned bounding box.
///
/// The default box is the degenerate box at the origin, which is what an area
/// reports until a valid payload has been loaded.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing all points. Empty input yields the default box.
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };
        iter.fold(Self::new(first, first), |b, p| Self {
            min: b.min.min(p),
            max: b.max.max(p),
        })
    }

    pub fn merge(&self, other: &BoundingBox) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow the box to enclose a sphere.
    pub fn expand_sphere(&self, center: Vec3, radius: f32) -> Self {
        Self {
            min: self.min.min(center - Vec3::splat(radius)),
            max: self.max.max(center + Vec3::splat(radius)),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }
}
