use crate::area::{AreaData, ChunkData};
use crate::params::{Falloff, TerrainChangeMethod, TerrainChangeParams, TextureChangeParams, planar_distance};
use crate::vertex::TerrainVertex;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use terrastream_common::{
    AreaIndex, BoundingBox, CHUNK_SIZE, CHUNKS_PER_AREA, CHUNKS_PER_SIDE, chunk_row_col,
};

/// Vertices along one edge of a chunk's height grid.
pub const VERTS_PER_SIDE: usize = 9;

/// Vertices in one chunk.
pub const VERTICES_PER_CHUNK: usize = VERTS_PER_SIDE * VERTS_PER_SIDE;

/// Maximum texture layers blended on one chunk.
pub const MAX_LAYERS: usize = 4;

const VERTEX_STEP: f32 = CHUNK_SIZE / (VERTS_PER_SIDE - 1) as f32;

/// Parameters of the procedural height field and model scatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainShape {
    pub base_height: f32,
    pub amplitude: f32,
    pub wavelength: f32,
    /// Upper bound of models scattered per chunk.
    pub doodads_per_chunk: u32,
    pub doodad_min_radius: f32,
    pub doodad_max_radius: f32,
}

impl Default for TerrainShape {
    fn default() -> Self {
        Self {
            base_height: 0.0,
            amplitude: 40.0,
            wavelength: 400.0,
            doodads_per_chunk: 2,
            doodad_min_radius: 2.0,
            doodad_max_radius: 12.0,
        }
    }
}

/// A model instance placed on the terrain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoodadPlacement {
    pub id: u32,
    pub position: Vec3,
    pub radius: f32,
}

/// Per-chunk data of a [`HeightmapArea`].
#[derive(Debug, Clone)]
pub struct HeightmapChunk {
    index: usize,
    bounding_box: BoundingBox,
    doodad_refs: Vec<u32>,
    layers: Vec<String>,
    weights: Vec<[u8; MAX_LAYERS]>,
}

impl HeightmapChunk {
    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    /// Blend weights of one vertex, one entry per layer slot.
    pub fn weights(&self, vertex: usize) -> [u8; MAX_LAYERS] {
        self.weights[vertex]
    }
}

impl ChunkData for HeightmapChunk {
    fn index(&self) -> usize {
        self.index
    }

    fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    fn vertex_offset(&self) -> u32 {
        (self.index * VERTICES_PER_CHUNK) as u32
    }

    fn vertex_count(&self) -> u32 {
        VERTICES_PER_CHUNK as u32
    }

    fn doodad_refs(&self) -> &[u32] {
        &self.doodad_refs
    }
}

/// Procedurally generated area: 16×16 chunks of 9×9 height samples.
#[derive(Debug, Clone)]
pub struct HeightmapArea {
    index: AreaIndex,
    valid: bool,
    vertices: Vec<TerrainVertex>,
    chunks: Vec<HeightmapChunk>,
    doodads: Vec<DoodadPlacement>,
    bounding_box: BoundingBox,
    model_box: BoundingBox,
}

impl HeightmapArea {
    /// Payload for a tile without data.
    pub fn invalid(index: AreaIndex) -> Self {
        Self {
            index,
            valid: false,
            vertices: Vec::new(),
            chunks: Vec::new(),
            doodads: Vec::new(),
            bounding_box: BoundingBox::default(),
            model_box: BoundingBox::default(),
        }
    }

    /// Generate the tile at `index`. Heights depend only on world position and
    /// `seed`, so neighbouring tiles line up at their shared edges.
    pub fn generate(index: AreaIndex, seed: u64, shape: &TerrainShape) -> Self {
        let _span = tracing::debug_span!("generate_area", %index).entered();
        let field = HeightField::new(seed, shape);
        let origin = index.origin();

        let mut vertices = Vec::with_capacity(CHUNKS_PER_AREA * VERTICES_PER_CHUNK);
        let mut chunks = Vec::with_capacity(CHUNKS_PER_AREA);
        let mut doodads = Vec::new();
        let mut rng = splitmix64(seed ^ area_hash(index));

        for chunk in 0..CHUNKS_PER_AREA {
            let (row, col) = chunk_row_col(chunk);
            let chunk_origin = origin + Vec3::new(col as f32 * CHUNK_SIZE, 0.0, row as f32 * CHUNK_SIZE);
            let start = vertices.len();
            for i in 0..VERTS_PER_SIDE {
                for j in 0..VERTS_PER_SIDE {
                    let x = chunk_origin.x + j as f32 * VERTEX_STEP;
                    let z = chunk_origin.z + i as f32 * VERTEX_STEP;
                    let uv = [
                        j as f32 / (VERTS_PER_SIDE - 1) as f32,
                        i as f32 / (VERTS_PER_SIDE - 1) as f32,
                    ];
                    vertices.push(TerrainVertex::new(Vec3::new(x, field.height(x, z), z), uv));
                }
            }

            let mut refs = Vec::new();
            rng = splitmix64(rng);
            let count = (rng % (shape.doodads_per_chunk as u64 + 1)) as u32;
            for _ in 0..count {
                rng = splitmix64(rng);
                let fx = unit_float(rng);
                rng = splitmix64(rng);
                let fz = unit_float(rng);
                rng = splitmix64(rng);
                let radius = shape.doodad_min_radius
                    + (shape.doodad_max_radius - shape.doodad_min_radius) * unit_float(rng);
                let x = chunk_origin.x + fx * CHUNK_SIZE;
                let z = chunk_origin.z + fz * CHUNK_SIZE;
                let id = doodads.len() as u32;
                doodads.push(DoodadPlacement {
                    id,
                    position: Vec3::new(x, field.height(x, z), z),
                    radius,
                });
                refs.push(id);
            }

            chunks.push(HeightmapChunk {
                index: chunk,
                bounding_box: BoundingBox::from_points(vertices[start..].iter().map(|v| v.position())),
                doodad_refs: refs,
                layers: Vec::new(),
                weights: vec![[0; MAX_LAYERS]; VERTICES_PER_CHUNK],
            });
        }

        let mut area = Self {
            index,
            valid: true,
            vertices,
            chunks,
            doodads,
            bounding_box: BoundingBox::default(),
            model_box: BoundingBox::default(),
        };
        area.refresh_bounds();
        area.update_normals();
        tracing::debug!(doodads = area.doodads.len(), "area generated");
        area
    }

    pub fn doodads(&self) -> &[DoodadPlacement] {
        &self.doodads
    }

    pub fn heightmap_chunk(&self, index: usize) -> Option<&HeightmapChunk> {
        self.chunks.get(index)
    }

    /// Bilinear terrain height at a world XZ position inside this tile.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        if !self.valid {
            return None;
        }
        let local = Vec3::new(x, 0.0, z) - self.index.origin();
        let span = CHUNK_SIZE * CHUNKS_PER_SIDE as f32;
        if local.x < 0.0 || local.z < 0.0 || local.x > span || local.z > span {
            return None;
        }
        let col = ((local.x / CHUNK_SIZE) as usize).min(CHUNKS_PER_SIDE - 1);
        let row = ((local.z / CHUNK_SIZE) as usize).min(CHUNKS_PER_SIDE - 1);
        let fx = ((local.x - col as f32 * CHUNK_SIZE) / VERTEX_STEP).clamp(0.0, 8.0);
        let fz = ((local.z - row as f32 * CHUNK_SIZE) / VERTEX_STEP).clamp(0.0, 8.0);
        let j = (fx as usize).min(VERTS_PER_SIDE - 2);
        let i = (fz as usize).min(VERTS_PER_SIDE - 2);
        let (tx, tz) = (fx - j as f32, fz - i as f32);

        let base = (row * CHUNKS_PER_SIDE + col) * VERTICES_PER_CHUNK;
        let h = |i: usize, j: usize| self.vertices[base + i * VERTS_PER_SIDE + j].height();
        let top = h(i, j) * (1.0 - tx) + h(i, j + 1) * tx;
        let bottom = h(i + 1, j) * (1.0 - tx) + h(i + 1, j + 1) * tx;
        Some(top * (1.0 - tz) + bottom * tz)
    }

    fn refresh_bounds(&mut self) {
        self.bounding_box = self
            .chunks
            .iter()
            .map(|c| c.bounding_box)
            .reduce(|a, b| a.merge(&b))
            .unwrap_or_default();
        self.model_box = self
            .doodads
            .iter()
            .fold(self.bounding_box, |b, d| b.expand_sphere(d.position, d.radius));
    }

    /// Chunks whose XZ footprint overlaps a circle.
    fn chunks_in_circle(&self, center: Vec3, radius: f32) -> Vec<usize> {
        self.chunks
            .iter()
            .filter(|c| {
                let b = c.bounding_box;
                let dx = (b.min.x - center.x).max(center.x - b.max.x).max(0.0);
                let dz = (b.min.z - center.z).max(center.z - b.max.z).max(0.0);
                dx * dx + dz * dz <= radius * radius
            })
            .map(|c| c.index)
            .collect()
    }
}

impl AreaData for HeightmapArea {
    fn index(&self) -> AreaIndex {
        self.index
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    fn model_box(&self) -> BoundingBox {
        self.model_box
    }

    fn full_vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    fn chunk(&self, index: usize) -> Option<&dyn ChunkData> {
        self.chunks.get(index).map(|c| c as &dyn ChunkData)
    }

    fn on_texture_terrain(&mut self, params: &TextureChangeParams) -> bool {
        if !self.valid {
            return false;
        }
        let mut changed = false;
        for index in self.chunks_in_circle(params.center, params.outer_radius) {
            let base = index * VERTICES_PER_CHUNK;
            let chunk = &mut self.chunks[index];
            let existing = chunk.layers.iter().position(|l| *l == params.texture);
            let layer = match existing {
                Some(layer) => layer,
                None if chunk.layers.len() < MAX_LAYERS => chunk.layers.len(),
                None => continue,
            };
            let mut touched = false;
            for v in 0..VERTICES_PER_CHUNK {
                let d = planar_distance(self.vertices[base + v].position(), params.center);
                let w = params.falloff.weight(d, params.inner_radius, params.outer_radius);
                if w <= 0.0 {
                    continue;
                }
                let old = chunk.weights[v][layer];
                let new = (old as f32 + params.amount * w * 255.0).clamp(0.0, 255.0) as u8;
                if new != old {
                    chunk.weights[v][layer] = new;
                    touched = true;
                }
            }
            if touched {
                if existing.is_none() {
                    chunk.layers.push(params.texture.clone());
                }
                changed = true;
            }
        }
        changed
    }

    fn on_change_terrain(&mut self, params: &TerrainChangeParams) -> bool {
        if !self.valid {
            return false;
        }
        let mut changed = false;
        for index in self.chunks_in_circle(params.center, params.outer_radius) {
            let base = index * VERTICES_PER_CHUNK;
            let mut chunk_changed = false;
            for vertex in &mut self.vertices[base..base + VERTICES_PER_CHUNK] {
                let d = planar_distance(vertex.position(), params.center);
                let w = params.falloff.weight(d, params.inner_radius, params.outer_radius);
                if w <= 0.0 {
                    continue;
                }
                let y = vertex.position[1];
                let new_y = match params.method {
                    TerrainChangeMethod::Raise => y + params.amount * w,
                    TerrainChangeMethod::Lower => y - params.amount * w,
                    TerrainChangeMethod::Flatten => {
                        y + (params.center.y - y) * (params.amount * w).clamp(0.0, 1.0)
                    }
                };
                if (new_y - y).abs() > f32::EPSILON {
                    vertex.position[1] = new_y;
                    chunk_changed = true;
                }
            }
            if chunk_changed {
                let slice = &self.vertices[base..base + VERTICES_PER_CHUNK];
                self.chunks[index].bounding_box = BoundingBox::from_points(slice.iter().map(|v| v.position()));
                changed = true;
            }
        }
        if changed {
            self.refresh_bounds();
        }
        changed
    }

    fn on_update_model_positions(&mut self, params: &TerrainChangeParams) {
        if !self.valid {
            return;
        }
        let seated: Vec<(usize, f32)> = self
            .doodads
            .iter()
            .enumerate()
            .filter(|(_, d)| planar_distance(d.position, params.center) <= params.outer_radius)
            .filter_map(|(i, d)| self.height_at(d.position.x, d.position.z).map(|h| (i, h)))
            .collect();
        for (i, h) in seated {
            self.doodads[i].position.y = h;
        }
    }

    fn update_normals(&mut self) {
        if !self.valid {
            return;
        }
        let last = VERTS_PER_SIDE - 1;
        for chunk in 0..self.chunks.len() {
            let base = chunk * VERTICES_PER_CHUNK;
            let heights: Vec<f32> = self.vertices[base..base + VERTICES_PER_CHUNK]
                .iter()
                .map(|v| v.height())
                .collect();
            let h = |i: usize, j: usize| heights[i * VERTS_PER_SIDE + j];
            for i in 0..VERTS_PER_SIDE {
                for j in 0..VERTS_PER_SIDE {
                    let (jl, jr) = (j.saturating_sub(1), (j + 1).min(last));
                    let (id, iu) = (i.saturating_sub(1), (i + 1).min(last));
                    let slope_x = (h(i, jr) - h(i, jl)) / ((jr - jl) as f32 * VERTEX_STEP);
                    let slope_z = (h(iu, j) - h(id, j)) / ((iu - id) as f32 * VERTEX_STEP);
                    let normal = Vec3::new(-slope_x, 1.0, -slope_z).normalize();
                    self.vertices[base + i * VERTS_PER_SIDE + j].normal = normal.to_array();
                }
            }
        }
    }
}

/// Sum of two seeded waves; continuous across tile borders.
struct HeightField {
    base: f32,
    amplitude: f32,
    wavelength: f32,
    phases: [f32; 3],
}

impl HeightField {
    fn new(seed: u64, shape: &TerrainShape) -> Self {
        let a = splitmix64(seed);
        let b = splitmix64(a);
        let c = splitmix64(b);
        Self {
            base: shape.base_height,
            amplitude: shape.amplitude,
            wavelength: shape.wavelength.max(1.0),
            phases: [a, b, c].map(|r| unit_float(r) * TAU),
        }
    }

    fn height(&self, x: f32, z: f32) -> f32 {
        let f = TAU / self.wavelength;
        let primary = (x * f + self.phases[0]).sin() * (z * f + self.phases[1]).cos();
        let detail = ((x + z) * f * 2.7 + self.phases[2]).sin();
        self.base + self.amplitude * (0.7 * primary + 0.3 * detail)
    }
}

fn area_hash(index: AreaIndex) -> u64 {
    ((index.x as u32 as u64) << 32) | index.y as u32 as u64
}

fn unit_float(r: u64) -> f32 {
    (r >> 40) as f32 / (1u64 << 24) as f32
}

/// SplitMix64 step.
pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrastream_common::AREA_SIZE;

    fn area() -> HeightmapArea {
        HeightmapArea::generate(AreaIndex::new(10, 12), 42, &TerrainShape::default())
    }

    #[test]
    fn generated_area_has_all_chunks() {
        let a = area();
        assert!(a.is_valid());
        assert_eq!(a.full_vertices().len(), CHUNKS_PER_AREA * VERTICES_PER_CHUNK);
        for i in 0..CHUNKS_PER_AREA {
            let c = a.chunk(i).unwrap();
            assert_eq!(c.index(), i);
            assert_eq!(c.vertex_offset() as usize, i * VERTICES_PER_CHUNK);
        }
        assert!(a.chunk(CHUNKS_PER_AREA).is_none());
    }

    #[test]
    fn generation_is_deterministic() {
        let a = area();
        let b = area();
        assert_eq!(a.full_vertices(), b.full_vertices());
        assert_eq!(a.doodads(), b.doodads());
    }

    #[test]
    fn neighbouring_tiles_share_edge_heights() {
        let shape = TerrainShape::default();
        let left = HeightmapArea::generate(AreaIndex::new(3, 3), 7, &shape);
        let right = HeightmapArea::generate(AreaIndex::new(4, 3), 7, &shape);
        let x = 4.0 * AREA_SIZE;
        let z = 3.0 * AREA_SIZE + 10.0;
        let a = left.height_at(x - 0.01, z).unwrap();
        let b = right.height_at(x + 0.01, z).unwrap();
        assert!((a - b).abs() < 0.1, "{a} vs {b}");
    }

    #[test]
    fn model_box_encloses_terrain_box() {
        let a = area();
        let t = a.bounding_box();
        let m = a.model_box();
        assert!(m.min.cmple(t.min).all());
        assert!(m.max.cmpge(t.max).all());
    }

    #[test]
    fn invalid_area_is_inert() {
        let mut a = HeightmapArea::invalid(AreaIndex::new(1, 1));
        assert!(!a.is_valid());
        assert!(a.chunk(0).is_none());
        assert!(a.full_vertices().is_empty());
        let params = TerrainChangeParams::raise(Vec3::ZERO, 100.0, 5.0);
        assert!(!a.on_change_terrain(&params));
        assert_eq!(a.height_at(0.0, 0.0), None);
    }

    #[test]
    fn raise_inside_tile_changes_heights_and_bounds() {
        let mut a = area();
        let center = a.bounding_box().center();
        let before = a.bounding_box();
        let h0 = a.height_at(center.x, center.z).unwrap();

        let params = TerrainChangeParams::raise(center, 50.0, 500.0);
        assert!(a.on_change_terrain(&params));

        let h1 = a.height_at(center.x, center.z).unwrap();
        assert!(h1 > h0 + 100.0);
        assert!(a.bounding_box().max.y > before.max.y);
    }

    #[test]
    fn zero_amount_and_distant_edits_report_no_change() {
        let mut a = area();
        let center = a.bounding_box().center();
        assert!(!a.on_change_terrain(&TerrainChangeParams::raise(center, 50.0, 0.0)));
        let far = Vec3::new(-10_000.0, 0.0, -10_000.0);
        assert!(!a.on_change_terrain(&TerrainChangeParams::raise(far, 50.0, 10.0)));
    }

    #[test]
    fn update_normals_tilts_toward_slope() {
        let mut a = area();
        let center = a.bounding_box().center();
        a.on_change_terrain(&TerrainChangeParams::raise(center, 80.0, 200.0));
        a.update_normals();
        for v in a.full_vertices() {
            let n = Vec3::from_array(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-3);
            assert!(n.y > 0.0);
        }
    }

    #[test]
    fn model_positions_follow_terrain() {
        let mut a = area();
        let Some(d) = a.doodads().first().copied() else {
            return;
        };
        let sculpt = TerrainChangeParams::raise(d.position, 30.0, 60.0);
        assert!(a.on_change_terrain(&sculpt));
        a.on_update_model_positions(&sculpt);
        let moved = a.doodads()[0];
        let ground = a.height_at(moved.position.x, moved.position.z).unwrap();
        assert!((moved.position.y - ground).abs() < 1e-3);
    }

    #[test]
    fn texture_paint_adds_layer_and_weights() {
        let mut a = area();
        let center = a.bounding_box().center();
        let params = TextureChangeParams {
            center,
            inner_radius: 10.0,
            outer_radius: 20.0,
            amount: 0.5,
            texture: "grass.tex".into(),
            falloff: Falloff::Linear,
        };
        assert!(a.on_texture_terrain(&params));
        let painted = a
            .chunks
            .iter()
            .find(|c| !c.layers().is_empty())
            .unwrap();
        assert_eq!(painted.layers()[0], "grass.tex");
        assert!((0..VERTICES_PER_CHUNK).any(|v| painted.weights(v)[0] > 0));
    }
}
