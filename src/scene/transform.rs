//! Rigid transform applied to mesh vertices before upload

use glam::{Mat4, Quat, Vec3};

/// Scale, rotation and translation of a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn from_position_scale(position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            scale,
            ..Default::default()
        }
    }

    /// Create transform from position, rotation (euler angles in radians), and scale
    pub fn from_components(position: Vec3, rotation_euler: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::from_euler(
                glam::EulerRot::XYZ,
                rotation_euler.x,
                rotation_euler.y,
                rotation_euler.z,
            ),
            scale,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Get the model matrix for this transform
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.matrix().transform_point3(point)
    }

    /// Rotate and rescale a normal, keeping it unit length
    pub fn transform_normal(&self, normal: Vec3) -> Vec3 {
        let normal_matrix = self.matrix().inverse().transpose();
        normal_matrix.transform_vector3(normal).normalize_or_zero()
    }

    /// Rotate around an axis
    pub fn rotate_axis(&mut self, axis: Vec3, angle: f32) {
        let delta = Quat::from_axis_angle(axis, angle);
        self.rotation = delta * self.rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        let t = Transform::default();
        assert!(t.is_identity());
        assert_eq!(t.transform_point(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn non_uniform_scale_keeps_normals_unit() {
        let t = Transform::from_position_scale(Vec3::ZERO, Vec3::new(2.0, 1.0, 1.0));
        let n = t.transform_normal(Vec3::new(1.0, 1.0, 0.0).normalize());
        assert!((n.length() - 1.0).abs() < 1e-5);
        assert!(n.y > n.x);
    }
}
