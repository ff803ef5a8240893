//! Common utilities for brain visual integration tests.

#![allow(dead_code)]

use brain_visual::backend::{GraphicsBackend, TextureFormat};
use brain_visual::{DummyBackend, MeshGeometry, WgpuBackend};
use glam::Vec3;

/// Available backends for testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Dummy backend (no actual GPU operations).
    Dummy,
    /// wgpu backend on a headless device.
    Wgpu,
}

/// A backend instance for one test.
pub enum TestContext {
    Dummy(DummyBackend),
    Wgpu(Box<WgpuBackend>),
}

impl TestContext {
    /// Create a context, or `None` when the backend is not available here.
    pub fn new(backend: Backend) -> Option<Self> {
        match backend {
            Backend::Dummy => Some(TestContext::Dummy(DummyBackend::new())),
            Backend::Wgpu => match WgpuBackend::new_headless() {
                Ok(wgpu) => Some(TestContext::Wgpu(Box::new(wgpu))),
                Err(err) => {
                    eprintln!("wgpu backend not available: {err}");
                    None
                }
            },
        }
    }

    pub fn backend(&mut self) -> &mut dyn GraphicsBackend {
        match self {
            TestContext::Dummy(dummy) => dummy,
            TestContext::Wgpu(wgpu) => &mut **wgpu,
        }
    }

    pub fn dummy(&self) -> Option<&DummyBackend> {
        match self {
            TestContext::Dummy(dummy) => Some(dummy),
            TestContext::Wgpu(_) => None,
        }
    }
}

pub const COLOR_FORMAT: TextureFormat = TextureFormat::Bgra8UnormSrgb;
pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Four triangles over six vertices, mean x = 1/12.
///
/// Vertices 0..3 sit at or left of the mean, 3..6 right of it.
/// Faces 0 and 2 start on a left vertex, faces 1 and 3 on a right one.
pub fn split_mesh() -> MeshGeometry {
    let vertices = vec![
        Vec3::new(-2.0, 0.0, 0.0),
        Vec3::new(-1.0, 1.0, 0.0),
        Vec3::new(0.0, -1.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(2.0, 1.0, 0.0),
        Vec3::new(0.5, -1.0, 1.0),
    ];
    let faces = vec![[0, 1, 2], [3, 4, 5], [1, 2, 3], [4, 0, 5]];
    let normals = vec![Vec3::Z; vertices.len()];
    MeshGeometry::new(vertices, faces, normals)
}

/// Flatten faces the way they are laid out in the index buffer.
pub fn flatten(faces: &[[u32; 3]]) -> Vec<u32> {
    faces.iter().flatten().copied().collect()
}
