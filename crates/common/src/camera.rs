use crate::types::BoundingBox;
use glam::{Mat4, Vec3, Vec4};

/// Camera operations consumed by input handling and culling.
///
/// Angles are in degrees; distances are world units.
pub trait Camera {
    fn move_forward(&mut self, distance: f32);
    fn move_right(&mut self, distance: f32);
    fn move_up(&mut self, distance: f32);
    fn yaw(&mut self, angle: f32);
    fn pitch(&mut self, angle: f32);
    fn position(&self) -> Vec3;
    /// Whether any part of the box lies inside the view frustum.
    fn contains(&self, bounds: &BoundingBox) -> bool;
}

/// Fly camera with position, yaw, pitch, and projection parameters.
pub struct FlyCamera {
    pub position: Vec3,
    /// Radians.
    pub yaw: f32,
    /// Radians, clamped to just short of straight up/down.
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 100.0, 0.0),
            yaw: -90.0_f32.to_radians(),
            pitch: -20.0_f32.to_radians(),
            fov: 60.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.5,
            far: 2000.0,
        }
    }
}

impl FlyCamera {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection())
    }
}

impl Camera for FlyCamera {
    fn move_forward(&mut self, distance: f32) {
        self.position += self.forward() * distance;
    }

    fn move_right(&mut self, distance: f32) {
        self.position += self.right() * distance;
    }

    fn move_up(&mut self, distance: f32) {
        self.position.y += distance;
    }

    fn yaw(&mut self, angle: f32) {
        self.yaw += angle.to_radians();
    }

    fn pitch(&mut self, angle: f32) {
        self.pitch = (self.pitch + angle.to_radians())
            .clamp(-89.0_f32.to_radians(), 89.0_f32.to_radians());
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn contains(&self, bounds: &BoundingBox) -> bool {
        self.frustum().intersects_box(bounds)
    }
}

/// Six clip planes (`xyz` = inward normal, `w` = distance), extracted from a
/// view-projection matrix with a `[0, 1]` depth range.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    pub fn from_view_projection(m: &Mat4) -> Self {
        let (r0, r1, r2, r3) = (m.row(0), m.row(1), m.row(2), m.row(3));
        let planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2].map(|p| {
            let len = p.truncate().length();
            if len > f32::EPSILON { p / len } else { p }
        });
        Self { planes }
    }

    /// Conservative box test: false only when the box is fully outside one plane.
    pub fn intersects_box(&self, bounds: &BoundingBox) -> bool {
        self.planes.iter().all(|plane| {
            let n = plane.truncate();
            let positive = Vec3::select(n.cmpge(Vec3::ZERO), bounds.max, bounds.min);
            n.dot(positive) + plane.w >= 0.0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looking_down_negative_z() -> FlyCamera {
        FlyCamera {
            position: Vec3::ZERO,
            yaw: -90.0_f32.to_radians(),
            pitch: 0.0,
            ..FlyCamera::default()
        }
    }

    #[test]
    fn default_camera() {
        let cam = FlyCamera::default();
        assert!(cam.position.y > 0.0);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn camera_movement() {
        let mut cam = looking_down_negative_z();
        cam.move_forward(10.0);
        assert!((cam.position.z + 10.0).abs() < 1e-4);
        cam.move_up(-2.0);
        assert!((cam.position.y + 2.0).abs() < 1e-4);
        cam.move_right(3.0);
        assert!((cam.position.x - 3.0).abs() < 1e-4);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = looking_down_negative_z();
        cam.pitch(500.0);
        assert!(cam.pitch < 90.0_f32.to_radians());
    }

    #[test]
    fn frustum_contains_box_in_front() {
        let cam = looking_down_negative_z();
        let ahead = BoundingBox::new(Vec3::new(-1.0, -1.0, -11.0), Vec3::new(1.0, 1.0, -9.0));
        assert!(cam.contains(&ahead));
    }

    #[test]
    fn frustum_rejects_box_behind_and_beyond_far() {
        let cam = looking_down_negative_z();
        let behind = BoundingBox::new(Vec3::new(-1.0, -1.0, 9.0), Vec3::new(1.0, 1.0, 11.0));
        assert!(!cam.contains(&behind));

        let far = BoundingBox::new(Vec3::new(-1.0, -1.0, -5000.0), Vec3::new(1.0, 1.0, -4000.0));
        assert!(!cam.contains(&far));
    }

    #[test]
    fn frustum_accepts_box_straddling_plane() {
        let cam = looking_down_negative_z();
        let big = BoundingBox::new(Vec3::splat(-100.0), Vec3::splat(100.0));
        assert!(cam.contains(&big));
    }
}
