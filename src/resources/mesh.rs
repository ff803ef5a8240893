//! Mesh data structures and generation

use crate::resources::normals::NormalEstimator;
use glam::Vec3;

/// Triangle mesh handed to a brain visual
///
/// Normals are per vertex and expected to be precomputed; use
/// [`MeshGeometry::with_estimated_normals`] when the loader has none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshGeometry {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
    pub normals: Vec<Vec3>,
    /// Per-vertex left hemisphere flags, derived when absent or mis-sized
    pub hemisphere_flags: Option<Vec<bool>>,
}

impl MeshGeometry {
    pub fn new(vertices: Vec<Vec3>, faces: Vec<[u32; 3]>, normals: Vec<Vec3>) -> Self {
        Self {
            vertices,
            faces,
            normals,
            hemisphere_flags: None,
        }
    }

    /// Supply explicit left hemisphere flags, one per vertex
    pub fn with_hemisphere_flags(mut self, flags: Vec<bool>) -> Self {
        self.hemisphere_flags = Some(flags);
        self
    }

    /// Replace the normals with ones computed by `estimator`
    pub fn with_estimated_normals(mut self, estimator: &dyn NormalEstimator) -> Self {
        self.normals = estimator.estimate(&self.vertices, &self.faces);
        self
    }

    /// Flip every normal, for meshes whose surface renders black
    pub fn inverted_normals(mut self) -> Self {
        for normal in &mut self.normals {
            *normal = -*normal;
        }
        self
    }

    /// Vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Triangle count
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Flattened index list
    pub fn indices(&self) -> Vec<u32> {
        self.faces.iter().flatten().copied().collect()
    }

    /// Create a UV sphere
    pub fn uv_sphere(center: Vec3, radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let segment_angle = 2.0 * std::f32::consts::PI / segments as f32;
        let ring_angle = std::f32::consts::PI / rings as f32;

        let mut vertices = Vec::new();
        let mut normals = Vec::new();
        let mut faces = Vec::new();

        for ring in 0..=rings {
            let phi = ring as f32 * ring_angle;
            let y = phi.cos();
            let ring_radius = phi.sin();

            for segment in 0..=segments {
                let theta = segment as f32 * segment_angle;
                let normal = Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin());
                vertices.push(center + normal * radius);
                normals.push(normal.normalize_or_zero());
            }
        }

        for ring in 0..rings {
            for segment in 0..segments {
                let current = ring * (segments + 1) + segment;
                let next = current + segments + 1;
                faces.push([current, next, current + 1]);
                faces.push([current + 1, next, next + 1]);
            }
        }

        Self::new(vertices, faces, normals)
    }

    /// Two spheres side by side along x, a stand-in for a pair of hemispheres
    pub fn hemisphere_pair(radius: f32, gap: f32, segments: u32, rings: u32) -> Self {
        let offset = Vec3::X * (radius + gap / 2.0);
        let left = Self::uv_sphere(-offset, radius, segments, rings);
        let right = Self::uv_sphere(offset, radius, segments, rings);

        let base = left.vertices.len() as u32;
        let mut flags = vec![true; left.vertices.len()];
        flags.resize(left.vertices.len() + right.vertices.len(), false);

        let mut mesh = left;
        mesh.vertices.extend(right.vertices);
        mesh.normals.extend(right.normals);
        mesh.faces
            .extend(right.faces.iter().map(|f| [f[0] + base, f[1] + base, f[2] + base]));
        mesh.with_hemisphere_flags(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_indices_are_in_range() {
        let mesh = MeshGeometry::uv_sphere(Vec3::ZERO, 1.0, 8, 4);
        assert_eq!(mesh.vertex_count(), 9 * 5);
        assert_eq!(mesh.face_count(), 2 * 8 * 4);
        assert!(mesh.indices().iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn inverted_normals_flip_sign() {
        let mesh = MeshGeometry::new(vec![Vec3::ZERO], vec![], vec![Vec3::Z]).inverted_normals();
        assert_eq!(mesh.normals, vec![-Vec3::Z]);
    }

    #[test]
    fn hemisphere_pair_flags_left_sphere() {
        let mesh = MeshGeometry::hemisphere_pair(10.0, 2.0, 6, 3);
        let flags = mesh.hemisphere_flags.as_ref().unwrap();
        assert_eq!(flags.len(), mesh.vertex_count());
        for (vertex, &left) in mesh.vertices.iter().zip(flags) {
            assert_eq!(left, vertex.x < 0.0);
        }
    }
}
