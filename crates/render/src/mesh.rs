use crate::device::{BufferId, VertexBuffer};
use terrastream_terrain::VERTS_PER_SIDE;

/// Chunk mesh shared by all areas: one index topology for the 9×9 vertex grid,
/// re-pointed at the current area's vertex buffer before its chunks draw.
#[derive(Debug, Clone)]
pub struct ChunkMesh {
    indices: Vec<u16>,
    bound: Option<BufferId>,
    swaps: u64,
}

impl ChunkMesh {
    pub fn new() -> Self {
        let side = VERTS_PER_SIDE as u16;
        let mut indices = Vec::with_capacity((VERTS_PER_SIDE - 1).pow(2) * 6);
        for i in 0..side - 1 {
            for j in 0..side - 1 {
                let a = i * side + j;
                let b = a + 1;
                let c = a + side;
                let d = c + 1;
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }
        Self {
            indices,
            bound: None,
            swaps: 0,
        }
    }

    /// Point the shared mesh at `buffer`.
    pub fn update_vertex_buffer(&mut self, buffer: &dyn VertexBuffer) {
        self.bound = Some(buffer.id());
        self.swaps += 1;
    }

    pub fn bound_buffer(&self) -> Option<BufferId> {
        self.bound
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// How many times the vertex buffer has been swapped.
    pub fn swaps(&self) -> u64 {
        self.swaps
    }
}

impl Default for ChunkMesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{GraphicsDevice, HeadlessDevice};

    #[test]
    fn index_topology_covers_grid() {
        let mesh = ChunkMesh::new();
        assert_eq!(mesh.index_count(), 8 * 8 * 6);
        let max = *mesh.indices().iter().max().unwrap() as usize;
        assert_eq!(max, VERTS_PER_SIDE * VERTS_PER_SIDE - 1);
    }

    #[test]
    fn swap_tracks_bound_buffer() {
        let device = HeadlessDevice::new();
        let a = device.create_vertex_buffer("a");
        let b = device.create_vertex_buffer("b");
        let mut mesh = ChunkMesh::new();
        assert_eq!(mesh.bound_buffer(), None);

        mesh.update_vertex_buffer(&*a);
        mesh.update_vertex_buffer(&*b);
        assert_eq!(mesh.bound_buffer(), Some(b.id()));
        assert_eq!(mesh.swaps(), 2);
    }
}
