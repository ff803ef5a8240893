//! Brain Visual - a shaded brain mesh for neuroimaging scenes
//!
//! Draws a triangle mesh with per-vertex color, left/right hemisphere filtering
//! and an ambient + diffuse + specular lighting model. The light follows the
//! camera so the visible side of the cortex always stays lit.
//!
//! Two backends implement [`backend::GraphicsBackend`]:
//! - **wgpu**: renders into texture views owned by the host, or headless
//! - **Dummy**: keeps buffers in memory and records draw calls, for tests and tooling
//!
//! # Features
//! - Mesh store with hemisphere-selectable index view
//! - Camera-light coupling through a weak camera reference
//! - Translucent mode without depth testing
//! - Scalar colormaps, named / hex colors and slicing helpers

pub mod backend;
pub mod resources;
pub mod scene;
pub mod visual;

pub use backend::dummy::DummyBackend;
pub use backend::wgpu_backend::WgpuBackend;
pub use resources::{ColorMap, ColorSpec, MeshGeometry, ScalarColormap};
pub use scene::{Camera, CameraTransform, LightingState, SharedCamera, Transform};
pub use visual::{
    BrainVisual, ColorData, Hemisphere, SlicePlanes, Visual, VisualError, VisualResult,
};

use backend::TextureFormat;
use glam::{Vec3, Vec4};

/// Formats of the render pass the visual draws into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetFormats {
    pub color: TextureFormat,
    /// Depth attachment format, `None` when the pass has no depth buffer
    pub depth: Option<TextureFormat>,
}

impl Default for TargetFormats {
    fn default() -> Self {
        Self {
            color: TextureFormat::Bgra8UnormSrgb,
            depth: Some(TextureFormat::Depth32Float),
        }
    }
}

/// Configuration for creating a brain visual
#[derive(Debug, Clone)]
pub struct BrainVisualConfig {
    /// Prefix of every GPU resource label
    pub label: String,
    /// Initially drawn hemisphere
    pub hemisphere: Hemisphere,
    /// Initial global alpha, stored as given
    pub alpha: f32,
    pub translucent: bool,
    /// Light position in world space
    pub light_position: Vec3,
    pub light_color: Vec4,
    pub light_intensity: Vec3,
    pub ambient: f32,
    pub specular: f32,
    /// Applied to vertices handed out by `transformed_vertices`
    pub vertex_transform: Transform,
    pub targets: TargetFormats,
}

impl Default for BrainVisualConfig {
    fn default() -> Self {
        let lighting = LightingState::default();
        Self {
            label: "Brain".to_string(),
            hemisphere: Hemisphere::Both,
            alpha: lighting.alpha,
            translucent: lighting.translucent,
            light_position: lighting.position,
            light_color: lighting.color,
            light_intensity: lighting.intensity,
            ambient: lighting.ambient,
            specular: lighting.specular,
            vertex_transform: Transform::default(),
            targets: TargetFormats::default(),
        }
    }
}
