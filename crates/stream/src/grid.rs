use std::collections::BTreeSet;
use terrastream_common::{AREA_SIZE, AreaIndex, MAP_TILES};

/// Area containing a world position.
pub fn area_at(position: glam::Vec3) -> AreaIndex {
    AreaIndex::containing(position)
}

/// In-map areas within a square radius (in areas) of `center`.
pub fn areas_in_radius(center: AreaIndex, radius: i32) -> BTreeSet<AreaIndex> {
    let mut result = BTreeSet::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let index = AreaIndex::new(center.x + dx, center.y + dy);
            if index.in_map() {
                result.insert(index);
            }
        }
    }
    result
}

/// Chebyshev distance between two areas, in areas.
pub fn area_distance(a: AreaIndex, b: AreaIndex) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// In-map areas overlapped by a circular brush on the XZ plane.
pub fn areas_under_brush(center: glam::Vec3, radius: f32) -> BTreeSet<AreaIndex> {
    let radius = radius.max(0.0);
    let last = MAP_TILES - 1;
    let cell = |v: f32| (v / AREA_SIZE).floor() as i32;
    let min_x = cell(center.x - radius).max(0);
    let max_x = cell(center.x + radius).min(last);
    let min_y = cell(center.z - radius).max(0);
    let max_y = cell(center.z + radius).min(last);

    let mut result = BTreeSet::new();
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            result.insert(AreaIndex::new(x, y));
        }
    }
    result
}
