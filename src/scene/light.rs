//! Lighting state of a shaded mesh

use glam::{Vec3, Vec4};

/// Alpha ceiling while the mesh is drawn translucent
pub const TRANSLUCENT_ALPHA: f32 = 0.1;
/// Alpha used when the mesh is drawn opaque
pub const OPAQUE_ALPHA: f32 = 1.0;

/// A single point light plus the material coefficients of the mesh
#[derive(Debug, Clone, PartialEq)]
pub struct LightingState {
    /// Light position in world space
    pub position: Vec3,
    pub color: Vec4,
    /// Per-channel intensity
    pub intensity: Vec3,
    pub ambient: f32,
    pub specular: f32,
    /// Global alpha written by the fragment stage
    pub alpha: f32,
    pub translucent: bool,
    pub depth_test: bool,
}

impl Default for LightingState {
    fn default() -> Self {
        Self {
            position: Vec3::new(100.0, 100.0, 100.0),
            color: Vec4::ONE,
            intensity: Vec3::ONE,
            ambient: 0.05,
            specular: 0.5,
            alpha: OPAQUE_ALPHA,
            translucent: true,
            depth_test: true,
        }
    }
}

impl LightingState {
    /// Alpha actually stored for a requested value under the current mode
    pub fn clamp_alpha(&self, requested: f32) -> f32 {
        if self.translucent {
            requested.min(TRANSLUCENT_ALPHA)
        } else {
            OPAQUE_ALPHA
        }
    }

    /// Switch translucency, updating depth testing and the alpha ceiling
    pub fn set_translucent(&mut self, translucent: bool) {
        self.translucent = translucent;
        self.depth_test = !translucent;
        self.alpha = if translucent {
            TRANSLUCENT_ALPHA
        } else {
            OPAQUE_ALPHA
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let light = LightingState::default();
        assert_eq!(light.position, Vec3::splat(100.0));
        assert_eq!(light.ambient, 0.05);
        assert_eq!(light.specular, 0.5);
        assert_eq!(light.alpha, 1.0);
        assert!(light.translucent);
        assert!(light.depth_test);
    }

    #[test]
    fn alpha_is_clamped_by_mode() {
        let mut light = LightingState::default();
        assert_eq!(light.clamp_alpha(0.05), 0.05);
        assert_eq!(light.clamp_alpha(0.7), TRANSLUCENT_ALPHA);
        light.set_translucent(false);
        assert_eq!(light.clamp_alpha(0.05), OPAQUE_ALPHA);
        assert!(light.depth_test);
    }
}
