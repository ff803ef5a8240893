//! Axis-aligned slicing and opacity helpers used by opacity controls

use glam::Vec3;

/// A cut along one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSlice {
    pub bound: f32,
    /// Hide below the bound instead of above it
    pub invert: bool,
}

impl AxisSlice {
    pub fn above(bound: f32) -> Self {
        Self { bound, invert: false }
    }

    pub fn below(bound: f32) -> Self {
        Self { bound, invert: true }
    }

    pub fn hides(&self, value: f32) -> bool {
        if self.invert {
            value < self.bound
        } else {
            value > self.bound
        }
    }
}

/// Up to three cuts; a vertex is hidden when any of them hides it
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SlicePlanes {
    pub x: Option<AxisSlice>,
    pub y: Option<AxisSlice>,
    pub z: Option<AxisSlice>,
}

impl SlicePlanes {
    pub fn hides(&self, vertex: Vec3) -> bool {
        let cut = |slice: Option<AxisSlice>, value: f32| slice.is_some_and(|s| s.hides(value));
        cut(self.x, vertex.x) || cut(self.y, vertex.y) || cut(self.z, vertex.z)
    }

    /// Indices of the hidden vertices
    pub fn hidden_vertices(&self, vertices: &[Vec3]) -> Vec<usize> {
        vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| self.hides(**v))
            .map(|(i, _)| i)
            .collect()
    }

    /// Hidden flag per vertex
    pub fn mask(&self, vertices: &[Vec3]) -> Vec<bool> {
        vertices.iter().map(|v| self.hides(*v)).collect()
    }
}

/// Map a slider position in `[slider_min, slider_max]` to an opacity in
/// `[opacity_min, opacity_max]`, clamping outside the slider range
pub fn map_slider_to_opacity(
    value: f32,
    slider_min: f32,
    slider_max: f32,
    opacity_min: f32,
    opacity_max: f32,
) -> f32 {
    let span = slider_max - slider_min;
    let t = if span.abs() > f32::EPSILON {
        ((value - slider_min) / span).clamp(0.0, 1.0)
    } else {
        1.0
    };
    opacity_min + t * (opacity_max - opacity_min)
}
