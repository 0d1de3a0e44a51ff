use glam::Vec3;
use serde::{Deserialize, Serialize};

/// How a terrain brush modifies heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainChangeMethod {
    Raise,
    Lower,
    /// Pull heights toward the brush center's height.
    Flatten,
}

/// Weight curve between a brush's inner and outer radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Falloff {
    Flat,
    #[default]
    Linear,
    Quadratic,
}

impl Falloff {
    /// Brush weight at XZ distance `d`: 1 inside `inner`, 0 beyond `outer`.
    pub fn weight(self, d: f32, inner: f32, outer: f32) -> f32 {
        if d > outer {
            return 0.0;
        }
        if d <= inner {
            return 1.0;
        }
        let t = ((d - inner) / (outer - inner).max(f32::EPSILON)).clamp(0.0, 1.0);
        match self {
            Self::Flat => 1.0,
            Self::Linear => 1.0 - t,
            Self::Quadratic => (1.0 - t) * (1.0 - t),
        }
    }
}

/// A terrain sculpting edit, also used to re-seat models after sculpting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainChangeParams {
    pub center: Vec3,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub amount: f32,
    pub method: TerrainChangeMethod,
    pub falloff: Falloff,
}

impl TerrainChangeParams {
    pub fn raise(center: Vec3, radius: f32, amount: f32) -> Self {
        Self {
            center,
            inner_radius: radius * 0.5,
            outer_radius: radius,
            amount,
            method: TerrainChangeMethod::Raise,
            falloff: Falloff::Linear,
        }
    }
}

/// A texture painting edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureChangeParams {
    pub center: Vec3,
    pub inner_radius: f32,
    pub outer_radius: f32,
    /// Fraction of full opacity added at weight 1.
    pub amount: f32,
    pub texture: String,
    pub falloff: Falloff,
}

/// XZ-plane distance; brushes ignore height.
pub(crate) fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falloff_weights() {
        assert_eq!(Falloff::Linear.weight(0.5, 1.0, 3.0), 1.0);
        assert_eq!(Falloff::Linear.weight(2.0, 1.0, 3.0), 0.5);
        assert_eq!(Falloff::Quadratic.weight(2.0, 1.0, 3.0), 0.25);
        assert_eq!(Falloff::Flat.weight(2.9, 1.0, 3.0), 1.0);
        assert_eq!(Falloff::Flat.weight(3.1, 1.0, 3.0), 0.0);
    }

    #[test]
    fn planar_distance_ignores_height() {
        let d = planar_distance(Vec3::new(0.0, 50.0, 0.0), Vec3::new(3.0, -10.0, 4.0));
        assert!((d - 5.0).abs() < 1e-6);
    }
}
