//! Mesh store: CPU copies and GPU buffers of a brain mesh
//!
//! Positions, normals and colors live in three vertex buffers (slots 0, 1, 2).
//! The index buffer is sized for every face of the mesh; the active hemisphere
//! view is written at its start and drawn with `index_count` indices, so a
//! hemisphere switch never reallocates anything.

use crate::backend::*;
use crate::resources::MeshGeometry;
use crate::visual::error::{validate_indices, validate_len};
use crate::visual::hemisphere::{self, Hemisphere};
use crate::visual::{VisualError, VisualResult};
use glam::{Vec3, Vec4};

/// Vertex buffer slot of each attribute
pub const POSITION_SLOT: u32 = 0;
pub const NORMAL_SLOT: u32 = 1;
pub const COLOR_SLOT: u32 = 2;

/// Smallest allocation, so an empty mesh still owns valid buffers
const MIN_BUFFER_SIZE: usize = 16;

/// GPU buffers of the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshBuffers {
    pub positions: BufferHandle,
    pub normals: BufferHandle,
    pub colors: BufferHandle,
    pub indices: BufferHandle,
}

impl MeshBuffers {
    fn all(&self) -> [BufferHandle; 4] {
        [self.positions, self.normals, self.colors, self.indices]
    }
}

fn padded(bytes: &[u8]) -> std::borrow::Cow<'_, [u8]> {
    if bytes.len() >= MIN_BUFFER_SIZE {
        bytes.into()
    } else {
        let mut data = bytes.to_vec();
        data.resize(MIN_BUFFER_SIZE, 0);
        data.into()
    }
}

fn create_buffer(
    backend: &mut dyn GraphicsBackend,
    label: &str,
    bytes: &[u8],
    usage: BufferUsage,
) -> BackendResult<BufferHandle> {
    let data = padded(bytes);
    let desc = BufferDescriptor::for_data(label, &data, usage | BufferUsage::COPY_DST);
    backend.create_buffer_init(&desc, &data)
}

/// Mesh data plus the buffers it was uploaded to
#[derive(Debug, Default)]
pub struct MeshStore {
    label: String,
    vertices: Vec<Vec3>,
    faces: Vec<[u32; 3]>,
    normals: Vec<Vec3>,
    colors: Vec<Vec4>,
    vertex_flags: Vec<bool>,
    face_flags: Vec<bool>,
    hemisphere: Hemisphere,
    index_count: u32,
    center: Vec3,
    ratio: Vec3,
    buffers: Option<MeshBuffers>,
}

impl MeshStore {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Check a geometry without touching any state
    pub fn validate(geometry: &MeshGeometry) -> VisualResult<()> {
        let n = geometry.vertices.len();
        if u32::try_from(n).is_err() {
            return Err(VisualError::InvalidArgument(format!(
                "{} vertices do not fit 32-bit indices",
                n
            )));
        }
        validate_len("normals", n, geometry.normals.len())?;
        for (row, face) in geometry.faces.iter().enumerate() {
            if let Some(&index) = face.iter().find(|&&i| i as usize >= n) {
                return Err(VisualError::IndexOutOfRange {
                    array: "faces",
                    position: row,
                    index: index as usize,
                    len: n,
                });
            }
        }
        Ok(())
    }

    /// Replace the whole mesh.
    ///
    /// Colors are reset to opaque white and the current hemisphere is applied
    /// to the new faces. On error the previous mesh is kept intact.
    pub fn set_geometry(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        geometry: MeshGeometry,
    ) -> VisualResult<()> {
        Self::validate(&geometry)?;

        let MeshGeometry {
            vertices,
            faces,
            normals,
            hemisphere_flags,
        } = geometry;

        let vertex_flags = match hemisphere_flags {
            Some(flags) if flags.len() == vertices.len() => flags,
            Some(flags) => {
                log::debug!(
                    "{}: {} hemisphere flags for {} vertices, deriving them from x",
                    self.label,
                    flags.len(),
                    vertices.len()
                );
                hemisphere::derive_left_flags(&vertices)
            }
            None => hemisphere::derive_left_flags(&vertices),
        };
        let face_flags = hemisphere::face_flags(&vertex_flags, &faces);
        let colors = vec![Vec4::ONE; vertices.len()];
        let selected = hemisphere::select_indices(&faces, &face_flags, self.hemisphere);
        let all_indices: Vec<u32> = faces.iter().flatten().copied().collect();

        let buffers = self.create_buffers(backend, &vertices, &normals, &colors, &all_indices)?;
        if !selected.is_empty() && selected.len() != all_indices.len() {
            backend.write_buffer(buffers.indices, 0, bytemuck::cast_slice(&selected));
        }

        if let Some(old) = self.buffers.replace(buffers) {
            for buffer in old.all() {
                backend.destroy_buffer(buffer);
            }
        }

        let (center, ratio) = bounds(&vertices);
        log::debug!(
            "{}: geometry set ({} vertices, {} faces, {} drawn)",
            self.label,
            vertices.len(),
            faces.len(),
            selected.len() / 3
        );

        self.index_count = selected.len() as u32;
        self.vertices = vertices;
        self.faces = faces;
        self.normals = normals;
        self.colors = colors;
        self.vertex_flags = vertex_flags;
        self.face_flags = face_flags;
        self.center = center;
        self.ratio = ratio;
        Ok(())
    }

    fn create_buffers(
        &self,
        backend: &mut dyn GraphicsBackend,
        vertices: &[Vec3],
        normals: &[Vec3],
        colors: &[Vec4],
        indices: &[u32],
    ) -> VisualResult<MeshBuffers> {
        let uploads: [(&str, &[u8], BufferUsage); 4] = [
            ("positions", bytemuck::cast_slice(vertices), BufferUsage::VERTEX),
            ("normals", bytemuck::cast_slice(normals), BufferUsage::VERTEX),
            ("colors", bytemuck::cast_slice(colors), BufferUsage::VERTEX),
            ("indices", bytemuck::cast_slice(indices), BufferUsage::INDEX),
        ];

        let mut created = Vec::with_capacity(uploads.len());
        for (name, bytes, usage) in uploads {
            let label = format!("{} {}", self.label, name);
            match create_buffer(backend, &label, bytes, usage) {
                Ok(buffer) => created.push(buffer),
                Err(err) => {
                    for buffer in created {
                        backend.destroy_buffer(buffer);
                    }
                    return Err(err.into());
                }
            }
        }

        Ok(MeshBuffers {
            positions: created[0],
            normals: created[1],
            colors: created[2],
            indices: created[3],
        })
    }

    /// Replace every vertex color
    pub fn set_colors(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        colors: Vec<Vec4>,
    ) -> VisualResult<()> {
        validate_len("colors", self.vertices.len(), colors.len())?;
        self.colors = colors;
        self.upload_colors(backend);
        Ok(())
    }

    /// Overwrite the alpha channel of all colors, or of the listed vertices
    pub fn set_alpha(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        alpha: f32,
        indices: Option<&[usize]>,
    ) -> VisualResult<()> {
        match indices {
            None => self.colors.iter_mut().for_each(|c| c.w = alpha),
            Some(indices) => {
                validate_indices("indices", indices.iter().copied(), self.colors.len())?;
                for &i in indices {
                    self.colors[i].w = alpha;
                }
            }
        }
        self.upload_colors(backend);
        Ok(())
    }

    fn upload_colors(&self, backend: &mut dyn GraphicsBackend) {
        if let Some(buffers) = self.buffers {
            if !self.colors.is_empty() {
                backend.write_buffer(buffers.colors, 0, bytemuck::cast_slice(&self.colors));
            }
        }
    }

    /// Switch the drawn faces; only the index view is rewritten
    pub fn set_hemisphere(&mut self, backend: &mut dyn GraphicsBackend, hemisphere: Hemisphere) {
        let selected = hemisphere::select_indices(&self.faces, &self.face_flags, hemisphere);
        if let Some(buffers) = self.buffers {
            if !selected.is_empty() {
                backend.write_buffer(buffers.indices, 0, bytemuck::cast_slice(&selected));
            }
        }
        log::debug!(
            "{}: hemisphere {} -> {} ({} of {} faces)",
            self.label,
            self.hemisphere,
            hemisphere,
            selected.len() / 3,
            self.faces.len()
        );
        self.hemisphere = hemisphere;
        self.index_count = selected.len() as u32;
    }

    /// Hand the buffers over for deferred destruction
    pub(crate) fn take_released(&mut self) -> Vec<ReleasedResource> {
        self.index_count = 0;
        self.buffers
            .take()
            .map(|b| b.all().into_iter().map(ReleasedResource::Buffer).collect())
            .unwrap_or_default()
    }

    pub fn buffers(&self) -> Option<MeshBuffers> {
        self.buffers
    }

    /// Number of indices in the active hemisphere view
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Indices currently drawn, in draw order
    pub fn active_indices(&self) -> Vec<u32> {
        hemisphere::select_indices(&self.faces, &self.face_flags, self.hemisphere)
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    /// Per-vertex left hemisphere flags
    pub fn vertex_flags(&self) -> &[bool] {
        &self.vertex_flags
    }

    /// Per-face left hemisphere flags
    pub fn face_flags(&self) -> &[bool] {
        &self.face_flags
    }

    /// Number of vertices
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Middle of the bounding box
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Extent of the bounding box
    pub fn ratio(&self) -> Vec3 {
        self.ratio
    }
}

fn bounds(vertices: &[Vec3]) -> (Vec3, Vec3) {
    let Some(first) = vertices.first() else {
        return (Vec3::ZERO, Vec3::ZERO);
    };
    let (min, max) = vertices
        .iter()
        .fold((*first, *first), |(min, max), v| (min.min(*v), max.max(*v)));
    ((min + max) / 2.0, max - min)
}
