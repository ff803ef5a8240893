//! Vertex normal estimation for loaders that only provide positions and faces

use glam::Vec3;

/// Strategy for computing per-vertex normals from a triangle mesh
pub trait NormalEstimator {
    fn estimate(&self, vertices: &[Vec3], faces: &[[u32; 3]]) -> Vec<Vec3>;
}

/// Each vertex normal is the mean of the unit normals of its faces
#[derive(Debug, Clone, Copy, Default)]
pub struct AveragedNormals;

/// Face normals are weighted by triangle area before summing
#[derive(Debug, Clone, Copy, Default)]
pub struct AreaWeightedNormals;

fn accumulate(
    vertices: &[Vec3],
    faces: &[[u32; 3]],
    face_normal: impl Fn(Vec3) -> Vec3,
) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; vertices.len()];

    for face in faces {
        let [i0, i1, i2] = face.map(|i| i as usize);
        if i0 >= vertices.len() || i1 >= vertices.len() || i2 >= vertices.len() {
            continue;
        }
        let edge1 = vertices[i1] - vertices[i0];
        let edge2 = vertices[i2] - vertices[i0];
        let normal = face_normal(edge1.cross(edge2));

        normals[i0] += normal;
        normals[i1] += normal;
        normals[i2] += normal;
    }

    for normal in &mut normals {
        let len = normal.length();
        if len > 1e-10 {
            *normal /= len;
        } else {
            // Isolated or degenerate vertex
            *normal = Vec3::Z;
        }
    }

    normals
}

impl NormalEstimator for AveragedNormals {
    fn estimate(&self, vertices: &[Vec3], faces: &[[u32; 3]]) -> Vec<Vec3> {
        accumulate(vertices, faces, Vec3::normalize_or_zero)
    }
}

impl NormalEstimator for AreaWeightedNormals {
    fn estimate(&self, vertices: &[Vec3], faces: &[[u32; 3]]) -> Vec<Vec3> {
        // The raw cross product is already proportional to the area
        accumulate(vertices, faces, |n| n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tent() -> (Vec<Vec3>, Vec<[u32; 3]>) {
        // Two triangles sharing the edge 0-1, one much larger than the other
        let vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, -10.0),
        ];
        let faces = vec![[0, 1, 2], [0, 1, 3]];
        (vertices, faces)
    }

    #[test]
    fn flat_triangle_points_along_z() {
        let vertices = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let normals = AveragedNormals.estimate(&vertices, &[[0, 1, 2]]);
        for n in normals {
            assert!((n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn area_weighting_favours_large_faces() {
        let (vertices, faces) = tent();
        let averaged = AveragedNormals.estimate(&vertices, &faces);
        let weighted = AreaWeightedNormals.estimate(&vertices, &faces);

        // Vertex 0 touches both faces: +Z (small) and +Y (large)
        assert!((averaged[0].y - averaged[0].z).abs() < 1e-6);
        assert!(weighted[0].y > weighted[0].z);
    }

    #[test]
    fn isolated_vertices_get_a_default() {
        let normals = AreaWeightedNormals.estimate(&[Vec3::ZERO], &[]);
        assert_eq!(normals, vec![Vec3::Z]);
    }
}
