use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// One terrain vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl TerrainVertex {
    pub fn new(position: Vec3, tex_coord: [f32; 2]) -> Self {
        Self {
            position: position.to_array(),
            normal: [0.0, 1.0, 0.0],
            tex_coord,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn height(&self) -> f32 {
        self.position[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<TerrainVertex>(), 32);
        let v = TerrainVertex::new(Vec3::new(1.0, 2.0, 3.0), [0.5, 0.5]);
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 32);
        assert_eq!(v.height(), 2.0);
    }
}
