//! Orbit camera looking at the core.

use glam::{Mat4, Vec3};

/// Orbit camera for viewing the scene.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
}

impl Camera {
    /// Closest allowed orbit distance.
    pub const MIN_DISTANCE: f32 = 5.0;
    /// Farthest allowed orbit distance.
    pub const MAX_DISTANCE: f32 = 150.0;

    /// Camera `distance` away, slightly above and to the left of the disk.
    pub fn new(distance: f32) -> Self {
        Self {
            yaw: -0.025,
            pitch: 0.125,
            distance: distance.clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE),
            target: Vec3::ZERO,
            fov_y: 75.0_f32.to_radians(),
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Combined projection and view matrix.
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y, aspect, 0.1, 1000.0);
        proj * self.view_matrix()
    }

    /// World-space right and up vectors of the view, for billboards.
    pub fn billboard_axes(&self) -> (Vec3, Vec3) {
        let view = self.view_matrix();
        (view.row(0).truncate(), view.row(1).truncate())
    }

    /// Rotate by a mouse drag of `(dx, dy)` pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * 0.005;
        self.pitch = (self.pitch + dy * 0.005).clamp(-1.5, 1.5);
    }

    /// Move toward or away from the target by a scroll amount.
    pub fn zoom(&mut self, scroll: f32) {
        self.distance = (self.distance - scroll * 2.0).clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(40.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_position_faces_disk() {
        let camera = Camera::default();
        let p = camera.position();
        assert!((p.length() - 40.0).abs() < 1e-3);
        assert!(p.z > 35.0);
        assert!(p.y > 0.0);
    }

    #[test]
    fn test_billboard_axes_are_orthonormal() {
        let camera = Camera::default();
        let (right, up) = camera.billboard_axes();
        assert!((right.length() - 1.0).abs() < 1e-5);
        assert!((up.length() - 1.0).abs() < 1e-5);
        assert!(right.dot(up).abs() < 1e-5);
    }

    #[test]
    fn test_orbit_and_zoom_are_clamped() {
        let mut camera = Camera::default();
        camera.orbit(0.0, 10_000.0);
        assert_eq!(camera.pitch, 1.5);
        camera.zoom(1_000.0);
        assert_eq!(camera.distance, Camera::MIN_DISTANCE);
        camera.zoom(-1_000.0);
        assert_eq!(camera.distance, Camera::MAX_DISTANCE);
    }
}
