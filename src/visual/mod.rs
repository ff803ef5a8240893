//! The brain mesh visual
//!
//! [`BrainVisual`] ties the mesh store, the camera-light coupler and the shading
//! pipeline together. Hosts drive it with the [`Visual`] hooks once per frame:
//!
//! ```text
//! visual.prepare_transforms(backend, model_view_projection)?;
//! visual.prepare_draw(backend)?;
//! backend.begin_render_pass(..);
//! visual.draw(backend)?;
//! backend.end_render_pass();
//! ```
//!
//! Setters only touch CPU state and the vertex buffers; lighting uniforms are
//! uploaded by the hooks, so a change becomes visible at the next frame.

mod coupler;
mod error;
pub mod hemisphere;
pub mod shader;
pub mod slicing;
mod store;

pub use coupler::{couple_light, CameraLightCoupler};
pub use error::{VisualError, VisualResult};
pub use hemisphere::Hemisphere;
pub use shader::{MeshUniforms, BRAIN_MESH_SHADER};
pub use slicing::{map_slider_to_opacity, AxisSlice, SlicePlanes};
pub use store::{MeshBuffers, MeshStore, COLOR_SLOT, NORMAL_SLOT, POSITION_SLOT};

use crate::backend::*;
use crate::resources::{ColorSpec, MeshGeometry, ScalarColormap};
use crate::scene::{LightingState, SharedCamera, Transform};
use crate::{BrainVisualConfig, TargetFormats};
use error::validate_finite;
use glam::{Mat4, Vec3, Vec4};
use std::collections::HashMap;

/// Capabilities a host renderer needs from a drawable
pub trait Visual {
    /// WGSL module with `vs_main` and `fs_main` entry points
    fn shader_source(&self) -> &str;

    /// Vertex and index buffers, `None` once released
    fn buffers(&self) -> Option<MeshBuffers>;

    /// Push the model-to-clip transform
    fn prepare_transforms(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        transform: Mat4,
    ) -> VisualResult<()>;

    /// Refresh per-frame uniforms and pipeline state
    fn prepare_draw(&mut self, backend: &mut dyn GraphicsBackend) -> VisualResult<()>;

    /// Record the draw into the current render pass
    fn draw(&mut self, backend: &mut dyn GraphicsBackend) -> VisualResult<()>;
}

/// Source of vertex colors for [`BrainVisual::set_color`]
#[derive(Debug, Clone, Copy)]
pub enum ColorData<'a> {
    /// Every vertex gets the base color
    Uniform,
    /// One scalar per vertex, mapped through a colormap
    Scalar(&'a [f32], &'a ScalarColormap),
    /// One RGBA color per vertex, used as is
    Rgba(&'a [Vec4]),
}

/// A shaded, hemisphere-filterable triangle mesh
pub struct BrainVisual {
    label: String,
    store: MeshStore,
    coupler: CameraLightCoupler,
    lighting: LightingState,
    uniforms: MeshUniforms,
    vertex_transform: Transform,
    targets: TargetFormats,

    uniform_buffer: BufferHandle,
    bind_group_layout: BindGroupLayoutHandle,
    bind_group: BindGroupHandle,
    /// Render pipelines keyed by depth testing
    pipelines: HashMap<bool, RenderPipelineHandle>,

    redraw_requested: bool,
    released: bool,
    release_queue: ReleaseQueue,
}

impl BrainVisual {
    /// Create the visual and upload `geometry`
    pub fn new(
        backend: &mut dyn GraphicsBackend,
        geometry: MeshGeometry,
        config: BrainVisualConfig,
    ) -> VisualResult<Self> {
        MeshStore::validate(&geometry)?;
        validate_finite("alpha", &[config.alpha])?;
        validate_finite("ambient coefficient", &[config.ambient])?;
        validate_finite("specular coefficient", &[config.specular])?;
        validate_finite("light position", &config.light_position.to_array())?;
        let targets = config.targets;
        if targets.color.is_depth() || targets.depth.is_some_and(|depth| !depth.is_depth()) {
            return Err(VisualError::InvalidArgument(format!(
                "unusable render target formats {:?}",
                targets
            )));
        }

        let mut lighting = LightingState {
            position: config.light_position,
            color: config.light_color,
            intensity: config.light_intensity,
            ambient: config.ambient,
            specular: config.specular,
            alpha: config.alpha,
            translucent: config.translucent,
            depth_test: true,
        };
        // Opaque meshes are always drawn at alpha 1.0
        if !config.translucent {
            lighting.set_translucent(false);
        }
        let uniforms = MeshUniforms::new(Mat4::IDENTITY, &lighting, lighting.position);

        let uniform_desc = BufferDescriptor::for_data(
            format!("{} uniforms", config.label),
            bytemuck::bytes_of(&uniforms),
            BufferUsage::UNIFORM | BufferUsage::COPY_DST,
        );
        let uniform_buffer = backend.create_buffer_init(&uniform_desc, bytemuck::bytes_of(&uniforms))?;

        let bind_group_layout = match backend.create_bind_group_layout(&[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStageFlags::VERTEX_FRAGMENT,
            ty: BindingType::UniformBuffer,
        }]) {
            Ok(layout) => layout,
            Err(err) => {
                backend.destroy_buffer(uniform_buffer);
                return Err(err.into());
            }
        };

        let bind_group = match backend.create_bind_group(
            bind_group_layout,
            &[(
                0,
                BindGroupEntry::Buffer {
                    buffer: uniform_buffer,
                    offset: 0,
                    size: None,
                },
            )],
        ) {
            Ok(bind_group) => bind_group,
            Err(err) => {
                backend.destroy_bind_group_layout(bind_group_layout);
                backend.destroy_buffer(uniform_buffer);
                return Err(err.into());
            }
        };

        let mut visual = Self {
            store: MeshStore::new(config.label.clone()),
            label: config.label,
            coupler: CameraLightCoupler::new(),
            lighting,
            uniforms,
            vertex_transform: config.vertex_transform,
            targets: config.targets,
            uniform_buffer,
            bind_group_layout,
            bind_group,
            pipelines: HashMap::new(),
            redraw_requested: true,
            released: false,
            release_queue: backend.release_queue().clone(),
        };

        // From here on a failure releases everything through `release`
        if let Err(err) = visual.init_mesh(backend, geometry, config.hemisphere) {
            visual.release(backend);
            return Err(err);
        }

        log::debug!("{}: created", visual.label);
        Ok(visual)
    }

    fn init_mesh(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        geometry: MeshGeometry,
        hemisphere: Hemisphere,
    ) -> VisualResult<()> {
        self.store.set_hemisphere(backend, hemisphere);
        self.store.set_geometry(backend, geometry)?;
        self.ensure_pipeline(backend)?;
        Ok(())
    }

    fn check_live(&self) -> VisualResult<()> {
        if self.released {
            Err(VisualError::Released)
        } else {
            Ok(())
        }
    }

    fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    fn lighting_changed(&mut self) {
        self.uniforms.update_lighting(&self.lighting);
        self.request_redraw();
    }

    fn pipeline_descriptor(&self, depth_test: bool) -> RenderPipelineDescriptor {
        let depth_stencil = self.targets.depth.map(|format| DepthStencilState {
            format,
            depth_write_enabled: depth_test,
            depth_compare: if depth_test {
                CompareFunction::Less
            } else {
                CompareFunction::Always
            },
        });

        RenderPipelineDescriptor {
            label: Some(format!(
                "{} pipeline ({})",
                self.label,
                if depth_test { "depth test" } else { "no depth test" }
            )),
            shader: BRAIN_MESH_SHADER.to_string(),
            vertex_layouts: vec![
                VertexBufferLayout::single(POSITION_SLOT, VertexFormat::Float32x3),
                VertexBufferLayout::single(NORMAL_SLOT, VertexFormat::Float32x3),
                VertexBufferLayout::single(COLOR_SLOT, VertexFormat::Float32x4),
            ],
            bind_group_layouts: vec![self.bind_group_layout],
            front_face: FrontFace::Ccw,
            cull_mode: CullMode::None,
            depth_stencil,
            color_targets: vec![ColorTargetState {
                format: self.targets.color,
                blend: Some(BlendState::alpha_blending()),
                write_mask: ColorWrites::ALL,
            }],
        }
    }

    /// Pipeline matching the current depth test state, created on first use
    fn ensure_pipeline(&mut self, backend: &mut dyn GraphicsBackend) -> VisualResult<RenderPipelineHandle> {
        let depth_test = self.lighting.depth_test;
        if let Some(&pipeline) = self.pipelines.get(&depth_test) {
            return Ok(pipeline);
        }
        let pipeline = backend.create_render_pipeline(&self.pipeline_descriptor(depth_test))?;
        log::debug!("{}: created pipeline, depth test {}", self.label, depth_test);
        self.pipelines.insert(depth_test, pipeline);
        Ok(pipeline)
    }

    fn upload_uniforms(&self, backend: &mut dyn GraphicsBackend) {
        backend.write_buffer(self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));
    }

    // Mesh store

    /// Replace vertices, faces and normals.
    ///
    /// Colors go back to opaque white; the current hemisphere is kept.
    pub fn set_geometry(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        geometry: MeshGeometry,
    ) -> VisualResult<()> {
        self.check_live()?;
        self.store.set_geometry(backend, geometry)?;
        self.request_redraw();
        Ok(())
    }

    /// Fill the color buffer.
    ///
    /// `alpha` replaces the alpha channel for the uniform and scalar modes;
    /// RGBA data is written untouched.
    pub fn set_color(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        data: ColorData<'_>,
        base_color: &ColorSpec,
        alpha: f32,
    ) -> VisualResult<()> {
        self.check_live()?;
        validate_finite("alpha", &[alpha])?;
        let n = self.store.len();

        let colors = match data {
            ColorData::Uniform => {
                let base = base_color.to_rgba()?;
                vec![base.truncate().extend(alpha); n]
            }
            ColorData::Scalar(values, colormap) => {
                error::validate_len("data", n, values.len())?;
                colormap
                    .apply(values)?
                    .into_iter()
                    .map(|c| c.truncate().extend(alpha))
                    .collect()
            }
            ColorData::Rgba(colors) => {
                error::validate_len("colors", n, colors.len())?;
                colors.to_vec()
            }
        };

        self.store.set_colors(backend, colors)?;
        self.request_redraw();
        Ok(())
    }

    /// Set the alpha of every vertex color, or only of `indices`
    pub fn set_alpha(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        alpha: f32,
        indices: Option<&[usize]>,
    ) -> VisualResult<()> {
        self.check_live()?;
        validate_finite("alpha", &[alpha])?;
        self.store.set_alpha(backend, alpha, indices)?;
        self.request_redraw();
        Ok(())
    }

    /// Dim the vertices cut away by `planes`.
    ///
    /// Hidden vertices get `hidden_alpha`, all others `visible_alpha`.
    pub fn apply_slices(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        planes: &SlicePlanes,
        visible_alpha: f32,
        hidden_alpha: f32,
    ) -> VisualResult<()> {
        self.check_live()?;
        validate_finite("alpha", &[visible_alpha, hidden_alpha])?;
        let hidden = planes.hidden_vertices(&self.transformed_vertices());
        self.store.set_alpha(backend, visible_alpha, None)?;
        self.store.set_alpha(backend, hidden_alpha, Some(&hidden))?;
        self.request_redraw();
        Ok(())
    }

    /// Draw both hemispheres or only one
    pub fn set_hemisphere(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        hemisphere: Hemisphere,
    ) -> VisualResult<()> {
        self.check_live()?;
        self.store.set_hemisphere(backend, hemisphere);
        self.request_redraw();
        Ok(())
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.store.hemisphere()
    }

    /// Transform applied by [`BrainVisual::transformed_vertices`]
    pub fn set_vertex_transform(&mut self, transform: Transform) {
        self.vertex_transform = transform;
    }

    pub fn vertex_transform(&self) -> Transform {
        self.vertex_transform
    }

    /// Vertices mapped through the vertex transform
    pub fn transformed_vertices(&self) -> Vec<Vec3> {
        let vertices = self.store.vertices();
        if self.vertex_transform.is_identity() {
            return vertices.to_vec();
        }
        let matrix = self.vertex_transform.matrix();
        vertices.iter().map(|v| matrix.transform_point3(*v)).collect()
    }

    /// Mesh data and buffers
    pub fn store(&self) -> &MeshStore {
        &self.store
    }

    /// Number of vertices
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Bounding box center, for camera framing
    pub fn center(&self) -> Vec3 {
        self.store.center()
    }

    /// Bounding box extent, for camera framing
    pub fn ratio(&self) -> Vec3 {
        self.store.ratio()
    }

    // Camera and light

    /// Follow `camera` rotations with the light, or stop with `None`
    pub fn bind_camera(&mut self, camera: Option<&SharedCamera>) {
        self.coupler.bind(camera);
        self.request_redraw();
    }

    pub fn is_camera_bound(&self) -> bool {
        self.coupler.is_bound()
    }

    /// Light position the next frame will use, in view space when a camera is bound
    pub fn effective_light_position(&self) -> Vec3 {
        self.coupler.light_position(self.lighting.position)
    }

    pub fn set_light_position(&mut self, position: Vec3) -> VisualResult<()> {
        self.check_live()?;
        validate_finite("light position", &position.to_array())?;
        self.lighting.position = position;
        self.uniforms.light_position = position.extend(1.0);
        self.request_redraw();
        Ok(())
    }

    pub fn set_light_color(&mut self, color: Vec4) -> VisualResult<()> {
        self.check_live()?;
        validate_finite("light color", &color.to_array())?;
        self.lighting.color = color;
        self.lighting_changed();
        Ok(())
    }

    pub fn set_light_intensity(&mut self, intensity: Vec3) -> VisualResult<()> {
        self.check_live()?;
        validate_finite("light intensity", &intensity.to_array())?;
        self.lighting.intensity = intensity;
        self.lighting_changed();
        Ok(())
    }

    pub fn set_ambient(&mut self, ambient: f32) -> VisualResult<()> {
        self.check_live()?;
        validate_finite("ambient coefficient", &[ambient])?;
        self.lighting.ambient = ambient;
        self.lighting_changed();
        Ok(())
    }

    pub fn set_specular(&mut self, specular: f32) -> VisualResult<()> {
        self.check_live()?;
        validate_finite("specular coefficient", &[specular])?;
        self.lighting.specular = specular;
        self.lighting_changed();
        Ok(())
    }

    /// Global alpha, capped at 0.1 when translucent and forced to 1.0 otherwise
    pub fn set_global_alpha(&mut self, alpha: f32) -> VisualResult<()> {
        self.check_live()?;
        validate_finite("alpha", &[alpha])?;
        self.lighting.alpha = self.lighting.clamp_alpha(alpha);
        self.lighting_changed();
        Ok(())
    }

    /// Translucent meshes skip depth testing and are capped at alpha 0.1
    pub fn set_translucent(&mut self, translucent: bool) -> VisualResult<()> {
        self.check_live()?;
        self.lighting.set_translucent(translucent);
        log::debug!(
            "{}: translucent {}, depth test {}",
            self.label,
            translucent,
            self.lighting.depth_test
        );
        self.lighting_changed();
        Ok(())
    }

    pub fn lighting(&self) -> &LightingState {
        &self.lighting
    }

    /// CPU copy of the uniform block
    pub fn uniforms(&self) -> &MeshUniforms {
        &self.uniforms
    }

    /// Uniform buffer backing group 0, binding 0
    pub fn uniform_buffer(&self) -> BufferHandle {
        self.uniform_buffer
    }

    /// Pipeline used by the next draw, if already created
    pub fn current_pipeline(&self) -> Option<RenderPipelineHandle> {
        self.pipelines.get(&self.lighting.depth_test).copied()
    }

    /// Whether something changed since the last call
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    // Teardown

    fn owned_resources(&mut self) -> Vec<ReleasedResource> {
        let mut resources = self.store.take_released();
        resources.extend(
            self.pipelines
                .drain()
                .map(|(_, pipeline)| ReleasedResource::RenderPipeline(pipeline)),
        );
        resources.push(ReleasedResource::BindGroup(self.bind_group));
        resources.push(ReleasedResource::BindGroupLayout(self.bind_group_layout));
        resources.push(ReleasedResource::Buffer(self.uniform_buffer));
        resources
    }

    /// Destroy every GPU resource of the visual. Later calls are no-ops.
    pub fn release(&mut self, backend: &mut dyn GraphicsBackend) {
        if self.released {
            return;
        }
        self.released = true;
        let resources = self.owned_resources();
        let count = resources.len();
        for resource in resources {
            match resource {
                ReleasedResource::Buffer(buffer) => backend.destroy_buffer(buffer),
                ReleasedResource::BindGroup(bind_group) => backend.destroy_bind_group(bind_group),
                ReleasedResource::BindGroupLayout(layout) => backend.destroy_bind_group_layout(layout),
                ReleasedResource::RenderPipeline(pipeline) => backend.destroy_render_pipeline(pipeline),
            }
        }
        log::debug!("{}: released {} GPU resources", self.label, count);
    }
}

impl Visual for BrainVisual {
    fn shader_source(&self) -> &str {
        BRAIN_MESH_SHADER
    }

    fn buffers(&self) -> Option<MeshBuffers> {
        self.store.buffers()
    }

    fn prepare_transforms(
        &mut self,
        backend: &mut dyn GraphicsBackend,
        transform: Mat4,
    ) -> VisualResult<()> {
        self.check_live()?;
        self.uniforms.transform = transform;
        self.upload_uniforms(backend);
        Ok(())
    }

    fn prepare_draw(&mut self, backend: &mut dyn GraphicsBackend) -> VisualResult<()> {
        self.check_live()?;
        let light_position = self.coupler.light_position(self.lighting.position);
        self.uniforms.light_position = light_position.extend(1.0);
        self.uniforms.update_lighting(&self.lighting);
        self.upload_uniforms(backend);
        self.ensure_pipeline(backend)?;
        Ok(())
    }

    fn draw(&mut self, backend: &mut dyn GraphicsBackend) -> VisualResult<()> {
        self.check_live()?;
        let Some(buffers) = self.store.buffers() else {
            return Ok(());
        };
        let index_count = self.store.index_count();
        if index_count == 0 {
            log::trace!("{}: nothing to draw", self.label);
            return Ok(());
        }

        let pipeline = self.ensure_pipeline(backend)?;
        backend.set_render_pipeline(pipeline);
        backend.set_bind_group(0, self.bind_group);
        backend.set_vertex_buffer(POSITION_SLOT, buffers.positions, 0);
        backend.set_vertex_buffer(NORMAL_SLOT, buffers.normals, 0);
        backend.set_vertex_buffer(COLOR_SLOT, buffers.colors, 0);
        backend.set_index_buffer(buffers.indices, 0, IndexFormat::Uint32);
        backend.draw_indexed(0..index_count, 0, 0..1);
        Ok(())
    }
}

impl Drop for BrainVisual {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        log::warn!(
            "{}: dropped without release, deferring GPU cleanup to the backend",
            self.label
        );
        let resources = self.owned_resources();
        self.release_queue.push_all(resources);
        self.released = true;
    }
}

impl std::fmt::Debug for BrainVisual {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrainVisual")
            .field("label", &self.label)
            .field("vertices", &self.store.len())
            .field("faces", &self.store.faces().len())
            .field("hemisphere", &self.store.hemisphere())
            .field("lighting", &self.lighting)
            .field("camera", &self.coupler)
            .field("released", &self.released)
            .finish()
    }
}
