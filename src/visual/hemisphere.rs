//! Left / right hemisphere partitioning of a mesh

use crate::visual::VisualError;
use glam::Vec3;
use std::fmt;
use std::str::FromStr;

/// Which faces of the mesh are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Hemisphere {
    #[default]
    Both,
    Left,
    Right,
}

impl Hemisphere {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hemisphere::Both => "both",
            Hemisphere::Left => "left",
            Hemisphere::Right => "right",
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hemisphere {
    type Err = VisualError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "both" => Ok(Hemisphere::Both),
            "left" => Ok(Hemisphere::Left),
            "right" => Ok(Hemisphere::Right),
            other => Err(VisualError::InvalidArgument(format!(
                "hemisphere must be 'both', 'left' or 'right', got {:?}",
                other
            ))),
        }
    }
}

/// Per-vertex left flags: `x <= mean(x)`
pub fn derive_left_flags(vertices: &[Vec3]) -> Vec<bool> {
    if vertices.is_empty() {
        return Vec::new();
    }
    let mean = vertices.iter().map(|v| v.x as f64).sum::<f64>() / vertices.len() as f64;
    vertices.iter().map(|v| v.x as f64 <= mean).collect()
}

/// Per-face left flags, taken from each face's first vertex
pub fn face_flags(vertex_flags: &[bool], faces: &[[u32; 3]]) -> Vec<bool> {
    faces
        .iter()
        .map(|face| vertex_flags.get(face[0] as usize).copied().unwrap_or(false))
        .collect()
}

/// Flattened indices of the faces visible for `hemisphere`
pub fn select_indices(faces: &[[u32; 3]], face_flags: &[bool], hemisphere: Hemisphere) -> Vec<u32> {
    faces
        .iter()
        .zip(face_flags)
        .filter(|&(_, &left)| match hemisphere {
            Hemisphere::Both => true,
            Hemisphere::Left => left,
            Hemisphere::Right => !left,
        })
        .flat_map(|(face, _)| face.iter().copied())
        .collect()
}
