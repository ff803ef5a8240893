//! Camera system

use glam::{Mat4, Vec3, Vec4};
use std::cell::RefCell;
use std::rc::Rc;

/// Anything that maps world-space points into view space.
///
/// The visual only needs this one operation from the host's camera, so a
/// plain `Mat4` is a valid camera transform as well.
pub trait CameraTransform {
    /// Map a homogeneous point through the transform
    fn map(&self, point: Vec4) -> Vec4;
}

impl CameraTransform for Mat4 {
    fn map(&self, point: Vec4) -> Vec4 {
        *self * point
    }
}

/// Camera transform shared between the host and the visuals it renders
pub type SharedCamera = Rc<RefCell<dyn CameraTransform>>;

/// Camera projection type
#[derive(Debug, Clone, Copy)]
pub enum Projection {
    Perspective {
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective {
            fov_y: std::f32::consts::FRAC_PI_4, // 45 degrees
            aspect: 1.0,
            near: 0.1,
            far: 10000.0,
        }
    }
}

impl Projection {
    pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Projection::Perspective {
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near,
            far,
        }
    }

    pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Self {
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        Projection::Orthographic {
            left: -half_w,
            right: half_w,
            bottom: -half_h,
            top: half_h,
            near,
            far,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        match self {
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh(*fov_y, *aspect, *near, *far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Mat4::orthographic_rh(*left, *right, *bottom, *top, *near, *far),
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if let Projection::Perspective { aspect: a, .. } = self {
            *a = aspect;
        }
    }
}

/// Camera looking at a brain mesh
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub projection: Projection,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 500.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: Projection::default(),
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            up: Vec3::Y,
            projection: Projection::default(),
        }
    }

    /// Place the camera so a mesh with the given bounds fills the view
    pub fn framing(center: Vec3, extent: Vec3) -> Self {
        let distance = extent.max_element().max(1.0) * 2.0;
        Self::new(center + Vec3::Z * distance, center)
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection.matrix()
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Update aspect ratio for perspective projection
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        self.projection.set_aspect(width / height);
    }
}

impl CameraTransform for Camera {
    /// World to view space, without projection
    fn map(&self, point: Vec4) -> Vec4 {
        self.view_matrix() * point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_camera_maps_points() {
        let translate = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let mapped = translate.map(Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(mapped, Vec4::new(1.0, 2.0, 3.0, 1.0));
    }

    #[test]
    fn camera_maps_target_onto_view_axis() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let mapped = camera.map(Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert!((mapped.truncate() - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-5);
    }

    #[test]
    fn shared_camera_accepts_concrete_types() {
        let camera: SharedCamera = Rc::new(RefCell::new(Camera::default()));
        let p = camera.borrow().map(Vec4::W);
        assert!(p.w > 0.0);
    }
}
