//! Orbit camera controller
//!
//! Turntable-style rotation around the mesh center, the usual way to inspect a
//! brain surface.

use glam::Vec3;

use super::Camera;

/// Orbit camera controller
///
/// Rotates around a target point at a fixed distance.
#[derive(Debug, Clone)]
pub struct OrbitController {
    /// Target point to orbit around
    pub target: Vec3,
    /// Distance from target
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Current azimuth angle (horizontal) in radians
    pub azimuth: f32,
    /// Current elevation angle (vertical) in radians
    pub elevation: f32,
    /// Zoom factor per scroll unit
    pub zoom_factor: f32,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 500.0,
            min_distance: 1.0,
            max_distance: 10000.0,
            azimuth: std::f32::consts::FRAC_PI_2,
            elevation: 0.0,
            zoom_factor: 1.1,
        }
    }
}

impl OrbitController {
    pub fn new(target: Vec3, distance: f32) -> Self {
        Self {
            target,
            distance,
            ..Default::default()
        }
    }

    /// Create with specific angles
    pub fn with_angles(mut self, azimuth_degrees: f32, elevation_degrees: f32) -> Self {
        self.azimuth = azimuth_degrees.to_radians();
        self.elevation = elevation_degrees.to_radians();
        self
    }

    /// Initialize from camera's current position and target
    pub fn sync_with_camera(&mut self, camera: &Camera) {
        self.target = camera.target;
        let offset = camera.position - camera.target;
        self.distance = offset.length().max(self.min_distance);
        self.elevation = (offset.y / self.distance).clamp(-1.0, 1.0).asin();
        self.azimuth = offset.z.atan2(offset.x);
    }

    /// Rotate by angle deltas in degrees
    pub fn orbit(&mut self, azimuth_degrees: f32, elevation_degrees: f32) {
        let limit = std::f32::consts::FRAC_PI_2 - 0.01;
        self.azimuth += azimuth_degrees.to_radians();
        self.elevation = (self.elevation + elevation_degrees.to_radians()).clamp(-limit, limit);
    }

    /// Zoom in for positive steps, out for negative ones
    pub fn zoom(&mut self, steps: f32) {
        self.distance /= self.zoom_factor.powf(steps);
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
    }

    /// Calculate camera position from orbit parameters
    fn calculate_position(&self) -> Vec3 {
        let x = self.distance * self.elevation.cos() * self.azimuth.cos();
        let y = self.distance * self.elevation.sin();
        let z = self.distance * self.elevation.cos() * self.azimuth.sin();
        self.target + Vec3::new(x, y, z)
    }

    /// Write the orbit state into the camera
    pub fn apply(&self, camera: &mut Camera) {
        camera.position = self.calculate_position();
        camera.target = self.target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_then_apply_keeps_position() {
        let mut camera = Camera::new(Vec3::new(3.0, 4.0, 12.0), Vec3::ZERO);
        let mut orbit = OrbitController::default();
        orbit.sync_with_camera(&camera);
        let before = camera.position;
        orbit.apply(&mut camera);
        assert!((camera.position - before).length() < 1e-3);
    }

    #[test]
    fn orbit_keeps_distance() {
        let mut camera = Camera::default();
        let mut orbit = OrbitController::new(Vec3::ONE, 50.0);
        orbit.orbit(90.0, 30.0);
        orbit.apply(&mut camera);
        assert!(((camera.position - Vec3::ONE).length() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut orbit = OrbitController::new(Vec3::ZERO, 2.0);
        orbit.zoom(100.0);
        assert_eq!(orbit.distance, orbit.min_distance);
    }
}
