//! The fixed viewer camera.
//!
//! The avatar viewer uses one camera that never moves at runtime: its
//! position is part of the facing computation (the model turns toward it),
//! so moving it would invalidate the base orientation. Field of view and
//! near/far planes are plain scene-setup parameters.

use glam::{Mat4, Vec3};

/// A perspective camera.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_4,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn looking_at(mut self, target: Vec3) -> Self {
        self.forward = (target - self.position).normalize_or(Vec3::NEG_Z);
        self
    }

    pub fn with_fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looking_at_normalizes_forward() {
        let camera = Camera::new()
            .at(Vec3::new(3.0, 0.0, 4.0))
            .looking_at(Vec3::ZERO);
        assert!((camera.forward.length() - 1.0).abs() < 1e-6);
        assert!(camera.forward.z < 0.0);
    }

    #[test]
    fn view_matrix_moves_camera_to_origin() {
        let camera = Camera::new().at(Vec3::new(0.0, 0.0, 5.0));
        let p = camera.view_matrix().transform_point3(camera.position);
        assert!(p.length() < 1e-6);
    }
}
