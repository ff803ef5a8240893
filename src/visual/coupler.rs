//! Camera-light coupling
//!
//! The light is specified in world space, but the fragment stage compares it
//! against view-space positions. Mapping it through the camera every frame
//! keeps the lit side of the brain facing the viewer while the camera rotates.

use crate::scene::{CameraTransform, SharedCamera};
use glam::Vec3;
use std::cell::RefCell;
use std::rc::Weak;

/// Map a world-space light position through `camera`, dropping w
pub fn couple_light(camera: &dyn CameraTransform, light_position: Vec3) -> Vec3 {
    camera.map(light_position.extend(1.0)).truncate()
}

/// Weak binding to the host's camera
#[derive(Default)]
pub struct CameraLightCoupler {
    camera: Option<Weak<RefCell<dyn CameraTransform>>>,
}

impl CameraLightCoupler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a camera, or clear the binding with `None`
    pub fn bind(&mut self, camera: Option<&SharedCamera>) {
        self.camera = camera.map(std::rc::Rc::downgrade);
        log::debug!(
            "Camera {}",
            if self.camera.is_some() { "bound" } else { "cleared" }
        );
    }

    /// Whether a camera is bound and still alive
    pub fn is_bound(&self) -> bool {
        self.camera
            .as_ref()
            .is_some_and(|camera| camera.strong_count() > 0)
    }

    /// Light position to hand to the fragment stage.
    ///
    /// Falls back to the world position when no live camera is bound.
    pub fn light_position(&self, world_position: Vec3) -> Vec3 {
        let Some(weak) = self.camera.as_ref() else {
            return world_position;
        };
        let Some(camera) = weak.upgrade() else {
            log::warn!("Bound camera was dropped, using the world-space light position");
            return world_position;
        };
        let Ok(camera) = camera.try_borrow() else {
            log::warn!("Camera is mutably borrowed, using the world-space light position");
            return world_position;
        };
        couple_light(&*camera, world_position)
    }
}

impl std::fmt::Debug for CameraLightCoupler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraLightCoupler")
            .field("bound", &self.is_bound())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;
    use std::rc::Rc;

    #[test]
    fn unbound_coupler_keeps_world_position() {
        let coupler = CameraLightCoupler::new();
        assert_eq!(coupler.light_position(Vec3::splat(100.0)), Vec3::splat(100.0));
    }

    #[test]
    fn bound_camera_maps_the_light() {
        let camera: SharedCamera = Rc::new(RefCell::new(Mat4::from_scale(Vec3::splat(2.0))));
        let mut coupler = CameraLightCoupler::new();
        coupler.bind(Some(&camera));
        assert!(coupler.is_bound());
        assert_eq!(coupler.light_position(Vec3::ONE), Vec3::splat(2.0));
    }

    #[test]
    fn dropped_camera_falls_back() {
        let mut coupler = CameraLightCoupler::new();
        {
            let camera: SharedCamera = Rc::new(RefCell::new(Mat4::ZERO));
            coupler.bind(Some(&camera));
        }
        assert!(!coupler.is_bound());
        assert_eq!(coupler.light_position(Vec3::X), Vec3::X);
    }
}
