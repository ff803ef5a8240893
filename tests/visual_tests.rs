//! Integration tests for the brain visual.
//!
//! Most tests run against the dummy backend, which keeps buffer contents in
//! memory so they can be checked after each call. Tests that only need the
//! backend to accept the visual's resources also run on a headless wgpu
//! device when one is available.
//!
//! ```bash
//! cargo test --test visual_tests
//! ```

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Vec3, Vec4};
use rstest::rstest;

use brain_visual::backend::{
    BackendError, ColorAttachment, CompareFunction, GraphicsBackend, IndexFormat, LoadOp,
    RecordedCommand, RenderPassDescriptor, StoreOp, TextureFormat,
};
use brain_visual::scene::OrbitController;
use brain_visual::visual::{AxisSlice, MeshUniforms, COLOR_SLOT, NORMAL_SLOT, POSITION_SLOT};
use brain_visual::{
    BrainVisual, BrainVisualConfig, Camera, ColorData, ColorMap, ColorSpec,
    DummyBackend, Hemisphere, MeshGeometry, ScalarColormap, SharedCamera, SlicePlanes,
    TargetFormats, Transform, Visual, VisualError,
};
use common::{flatten, split_mesh, Backend, TestContext};

fn create(backend: &mut dyn GraphicsBackend, geometry: MeshGeometry) -> BrainVisual {
    BrainVisual::new(backend, geometry, BrainVisualConfig::default()).unwrap()
}

fn drawn_indices(backend: &DummyBackend, visual: &BrainVisual) -> Vec<u32> {
    let buffers = visual.buffers().unwrap();
    let indices: Vec<u32> = backend.read_buffer(buffers.indices).unwrap();
    indices[..visual.store().index_count() as usize].to_vec()
}

fn colors(backend: &DummyBackend, visual: &BrainVisual) -> Vec<Vec4> {
    backend.read_buffer(visual.buffers().unwrap().colors).unwrap()
}

fn uploaded_uniforms(backend: &DummyBackend, visual: &BrainVisual) -> MeshUniforms {
    backend.read_buffer::<MeshUniforms>(visual.uniform_buffer()).unwrap()[0]
}

fn render_pass() -> RenderPassDescriptor {
    RenderPassDescriptor {
        label: Some("test pass".into()),
        color_attachments: vec![],
        depth_stencil_attachment: None,
    }
}

// ============================================================================
// Geometry
// ============================================================================

#[rstest]
#[case::dummy(Backend::Dummy)]
#[case::wgpu(Backend::Wgpu)]
fn test_geometry_length_matches_vertices(
    #[case] backend: Backend,
    #[values((3, 2), (8, 4), (32, 16))] resolution: (u32, u32),
) {
    let Some(mut ctx) = TestContext::new(backend) else {
        eprintln!("Backend {:?} not available, skipping", backend);
        return;
    };

    let (segments, rings) = resolution;
    let geometry = MeshGeometry::uv_sphere(Vec3::ZERO, 50.0, segments, rings);
    let expected = geometry.vertex_count();

    let mut visual = create(ctx.backend(), geometry);
    assert_eq!(visual.len(), expected);
    assert!(!visual.is_empty());

    visual.release(ctx.backend());
}

#[test]
fn test_out_of_range_face_keeps_previous_geometry() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());
    let buffers_before = visual.buffers();
    let live_before = backend.live_buffer_count();

    let mut broken = split_mesh();
    broken.faces[2] = [1, 9, 3];
    let err = visual.set_geometry(&mut backend, broken).unwrap_err();

    match err {
        VisualError::IndexOutOfRange {
            array,
            position,
            index,
            len,
        } => {
            assert_eq!(array, "faces");
            assert_eq!(position, 2);
            assert_eq!(index, 9);
            assert_eq!(len, 6);
        }
        other => panic!("unexpected error {other:?}"),
    }

    assert_eq!(visual.len(), 6);
    assert_eq!(visual.store().faces(), split_mesh().faces.as_slice());
    assert_eq!(visual.buffers(), buffers_before);
    assert_eq!(backend.live_buffer_count(), live_before);
}

#[test]
fn test_normals_must_match_vertices() {
    let mut backend = DummyBackend::new();
    let mut geometry = split_mesh();
    geometry.normals.pop();

    let err = BrainVisual::new(&mut backend, geometry, BrainVisualConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        VisualError::DimensionMismatch {
            array: "normals",
            expected: 6,
            found: 5
        }
    ));
    assert_eq!(backend.live_resource_count(), 0);
}

#[test]
fn test_failed_allocation_keeps_previous_geometry() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());
    let buffers_before = visual.buffers();
    let live_before = backend.live_resource_count();

    backend.fail_next_buffer_creation();
    let replacement = MeshGeometry::uv_sphere(Vec3::ZERO, 1.0, 6, 3);
    let err = visual.set_geometry(&mut backend, replacement).unwrap_err();

    assert!(matches!(err, VisualError::Backend(BackendError::OutOfMemory)));
    assert_eq!(visual.len(), 6);
    assert_eq!(visual.buffers(), buffers_before);
    assert_eq!(backend.live_resource_count(), live_before);
}

#[test]
fn test_replacing_geometry_resets_colors_and_bounds() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());
    visual
        .set_color(&mut backend, ColorData::Uniform, &"red".parse().unwrap(), 1.0)
        .unwrap();
    let old_buffers = visual.buffers().unwrap();

    let sphere = MeshGeometry::uv_sphere(Vec3::new(10.0, 0.0, 0.0), 2.0, 8, 4);
    let n = sphere.vertex_count();
    visual.set_geometry(&mut backend, sphere).unwrap();

    assert!(colors(&backend, &visual).iter().all(|c| *c == Vec4::ONE));
    assert_eq!(colors(&backend, &visual).len(), n);
    assert!((visual.center() - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-4);
    assert!((visual.ratio() - Vec3::splat(4.0)).length() < 1e-4);
    assert!(backend.buffer_data(old_buffers.positions).is_none());
}

// ============================================================================
// Hemispheres
// ============================================================================

#[test]
fn test_derived_flags_follow_mean_x() {
    let mut backend = DummyBackend::new();
    let visual = create(&mut backend, split_mesh());
    assert_eq!(
        visual.store().vertex_flags(),
        &[true, true, true, false, false, false]
    );
    assert_eq!(visual.store().face_flags(), &[true, false, true, false]);
}

#[rstest]
#[case::both(Hemisphere::Both, vec![[0, 1, 2], [3, 4, 5], [1, 2, 3], [4, 0, 5]])]
#[case::left(Hemisphere::Left, vec![[0, 1, 2], [1, 2, 3]])]
#[case::right(Hemisphere::Right, vec![[3, 4, 5], [4, 0, 5]])]
fn test_hemisphere_selects_faces_by_first_vertex(
    #[case] hemisphere: Hemisphere,
    #[case] expected: Vec<[u32; 3]>,
) {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());
    let buffers = visual.buffers();

    visual.set_hemisphere(&mut backend, hemisphere).unwrap();

    assert_eq!(visual.hemisphere(), hemisphere);
    assert_eq!(drawn_indices(&backend, &visual), flatten(&expected));
    // Switching never reallocates
    assert_eq!(visual.buffers(), buffers);
}

#[test]
fn test_hemisphere_round_trip_restores_all_faces() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());
    let all = flatten(&split_mesh().faces);

    visual.set_hemisphere(&mut backend, Hemisphere::Left).unwrap();
    let left = drawn_indices(&backend, &visual);
    visual.set_hemisphere(&mut backend, Hemisphere::Right).unwrap();
    let right = drawn_indices(&backend, &visual);
    visual.set_hemisphere(&mut backend, Hemisphere::Both).unwrap();

    assert_eq!(left.len() + right.len(), all.len());
    assert_eq!(drawn_indices(&backend, &visual), all);
}

#[test]
fn test_supplied_flags_override_derivation() {
    let mut backend = DummyBackend::new();
    let geometry = split_mesh().with_hemisphere_flags(vec![false, false, false, true, true, true]);
    let mut visual = create(&mut backend, geometry);

    visual.set_hemisphere(&mut backend, Hemisphere::Left).unwrap();
    assert_eq!(drawn_indices(&backend, &visual), flatten(&[[3, 4, 5], [4, 0, 5]]));

    // Wrong length falls back to x <= mean(x)
    let geometry = split_mesh().with_hemisphere_flags(vec![true; 2]);
    visual.set_geometry(&mut backend, geometry).unwrap();
    assert_eq!(drawn_indices(&backend, &visual), flatten(&[[0, 1, 2], [1, 2, 3]]));
}

#[test]
fn test_unknown_hemisphere_name_is_rejected() {
    let err = "top".parse::<Hemisphere>().unwrap_err();
    assert!(matches!(err, VisualError::InvalidArgument(_)));
}

#[test]
fn test_configured_hemisphere_applies_at_creation() {
    let mut backend = DummyBackend::new();
    let config = BrainVisualConfig {
        hemisphere: Hemisphere::Right,
        ..Default::default()
    };
    let visual = BrainVisual::new(&mut backend, split_mesh(), config).unwrap();
    assert_eq!(drawn_indices(&backend, &visual), flatten(&[[3, 4, 5], [4, 0, 5]]));
}

// ============================================================================
// Translucency
// ============================================================================

#[rstest]
#[case::translucent(true, 0.9, 0.1)]
#[case::translucent_low(true, 0.05, 0.05)]
#[case::opaque(false, 0.2, 1.0)]
fn test_alpha_is_clamped_by_translucency(
    #[case] translucent: bool,
    #[case] requested: f32,
    #[case] expected: f32,
) {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());

    visual.set_translucent(translucent).unwrap();
    visual.set_global_alpha(requested).unwrap();
    visual.prepare_draw(&mut backend).unwrap();

    assert_eq!(visual.lighting().alpha, expected);
    assert_eq!(uploaded_uniforms(&backend, &visual).alpha(), expected);
    assert!(visual.lighting().alpha <= 0.1 || !translucent);
}

#[test]
fn test_defaults_are_kept_until_first_change() {
    let mut backend = DummyBackend::new();
    let visual = create(&mut backend, split_mesh());

    assert!(visual.lighting().translucent);
    assert!(visual.lighting().depth_test);
    assert_eq!(visual.lighting().alpha, 1.0);
}

#[rstest]
#[case::opaque(false, 0.2, 1.0)]
#[case::opaque_above_one(false, 3.0, 1.0)]
#[case::translucent_as_given(true, 0.2, 0.2)]
fn test_constructor_alpha_follows_translucency(
    #[case] translucent: bool,
    #[case] alpha: f32,
    #[case] expected: f32,
) {
    let mut backend = DummyBackend::new();
    let config = BrainVisualConfig {
        translucent,
        alpha,
        ..Default::default()
    };
    let mut visual = BrainVisual::new(&mut backend, split_mesh(), config).unwrap();
    visual.prepare_draw(&mut backend).unwrap();

    assert_eq!(visual.lighting().translucent, translucent);
    assert!(visual.lighting().depth_test);
    assert_eq!(visual.lighting().alpha, expected);
    assert_eq!(uploaded_uniforms(&backend, &visual).alpha(), expected);
}

#[test]
fn test_translucency_switches_depth_testing() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());

    visual.set_translucent(true).unwrap();
    visual.prepare_draw(&mut backend).unwrap();
    let pipeline = visual.current_pipeline().unwrap();
    let depth = backend
        .pipeline_descriptor(pipeline)
        .and_then(|desc| desc.depth_stencil.clone())
        .unwrap();
    assert_eq!(depth.depth_compare, CompareFunction::Always);
    assert!(!depth.depth_write_enabled);
    assert_eq!(visual.lighting().alpha, 0.1);

    visual.set_translucent(false).unwrap();
    visual.prepare_draw(&mut backend).unwrap();
    let pipeline = visual.current_pipeline().unwrap();
    let depth = backend
        .pipeline_descriptor(pipeline)
        .and_then(|desc| desc.depth_stencil.clone())
        .unwrap();
    assert_eq!(depth.depth_compare, CompareFunction::Less);
    assert!(depth.depth_write_enabled);
    assert_eq!(visual.lighting().alpha, 1.0);

    // One pipeline per depth state, reused afterwards
    visual.set_translucent(true).unwrap();
    visual.prepare_draw(&mut backend).unwrap();
    assert_eq!(backend.live_pipeline_count(), 2);
}

#[test]
fn test_depth_format_as_color_target_is_rejected() {
    let mut backend = DummyBackend::new();
    let config = BrainVisualConfig {
        targets: TargetFormats {
            color: TextureFormat::Depth32Float,
            depth: None,
        },
        ..Default::default()
    };
    let err = BrainVisual::new(&mut backend, split_mesh(), config).unwrap_err();
    assert!(matches!(err, VisualError::InvalidArgument(_)));
    assert_eq!(backend.live_resource_count(), 0);
}

#[test]
fn test_pipeline_without_depth_target() {
    let mut backend = DummyBackend::new();
    let config = BrainVisualConfig {
        targets: TargetFormats {
            depth: None,
            ..Default::default()
        },
        ..Default::default()
    };
    let visual = BrainVisual::new(&mut backend, split_mesh(), config).unwrap();
    let desc = backend
        .pipeline_descriptor(visual.current_pipeline().unwrap())
        .unwrap();
    assert!(desc.depth_stencil.is_none());
    assert!(desc.color_targets[0].blend.is_some());
}

// ============================================================================
// Colors
// ============================================================================

#[test]
fn test_uniform_color_is_broadcast() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());

    let base: ColorSpec = "#ff8000".parse().unwrap();
    visual
        .set_color(&mut backend, ColorData::Uniform, &base, 0.5)
        .unwrap();

    let expected = Vec4::new(1.0, 128.0 / 255.0, 0.0, 0.5);
    let uploaded = colors(&backend, &visual);
    assert_eq!(uploaded.len(), 6);
    assert!(uploaded.iter().all(|c| (*c - expected).length() < 1e-6));
}

#[test]
fn test_scalar_colormap_boundaries() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());

    let colormap = ColorMap::new("ramp", vec![Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0)]);
    let cmap = ScalarColormap::new(colormap).with_clim(-1.0, 1.0);
    let data = [-1.0, 1.0, 0.0, -1.0, 1.0, 0.0];
    visual
        .set_color(
            &mut backend,
            ColorData::Scalar(&data, &cmap),
            &ColorSpec::default(),
            1.0,
        )
        .unwrap();

    let uploaded = colors(&backend, &visual);
    assert_eq!(uploaded[0], Vec4::new(0.0, 0.0, 1.0, 1.0));
    assert_eq!(uploaded[1], Vec4::new(1.0, 0.0, 0.0, 1.0));
    assert!((uploaded[2] - Vec4::new(0.5, 0.0, 0.5, 1.0)).length() < 1e-6);
}

#[test]
fn test_rgba_passthrough_is_byte_identical() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());

    let input: Vec<Vec4> = (0..6)
        .map(|i| Vec4::new(i as f32 * 0.1, 0.3, 1.0 - i as f32 * 0.1, 0.25))
        .collect();
    visual
        .set_color(&mut backend, ColorData::Rgba(&input), &ColorSpec::default(), 1.0)
        .unwrap();

    let buffer = visual.buffers().unwrap().colors;
    assert_eq!(
        backend.buffer_data(buffer).unwrap(),
        bytemuck::cast_slice::<Vec4, u8>(&input)
    );
}

#[test]
fn test_color_length_mismatch_is_rejected() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());

    let err = visual
        .set_color(
            &mut backend,
            ColorData::Rgba(&[Vec4::ONE; 3]),
            &ColorSpec::default(),
            1.0,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        VisualError::DimensionMismatch {
            array: "colors",
            expected: 6,
            found: 3
        }
    ));
}

#[test]
fn test_set_alpha_on_subset() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());

    visual.set_alpha(&mut backend, 0.3, Some(&[1, 4])).unwrap();
    let alphas: Vec<f32> = colors(&backend, &visual).iter().map(|c| c.w).collect();
    assert_eq!(alphas, vec![1.0, 0.3, 1.0, 1.0, 0.3, 1.0]);

    let err = visual.set_alpha(&mut backend, 0.0, Some(&[0, 6])).unwrap_err();
    assert!(matches!(
        err,
        VisualError::IndexOutOfRange {
            array: "indices",
            position: 1,
            index: 6,
            len: 6
        }
    ));
    // Nothing written on failure
    assert_eq!(colors(&backend, &visual)[0].w, 1.0);
}

#[test]
fn test_slicing_dims_hidden_vertices() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());

    let planes = SlicePlanes {
        x: Some(AxisSlice::above(0.75)),
        ..Default::default()
    };
    visual.apply_slices(&mut backend, &planes, 0.8, 0.0).unwrap();

    let alphas: Vec<f32> = colors(&backend, &visual).iter().map(|c| c.w).collect();
    assert_eq!(alphas, vec![0.8, 0.8, 0.8, 0.0, 0.0, 0.8]);
}

#[test]
fn test_vertex_transform_maps_vertices() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());
    assert_eq!(visual.transformed_vertices(), split_mesh().vertices);

    let offset = Vec3::new(1.0, -2.0, 0.5);
    let scale = Vec3::splat(2.0);
    visual.set_vertex_transform(Transform::from_position_scale(offset, scale));

    let expected: Vec<Vec3> = split_mesh().vertices.iter().map(|v| *v * scale + offset).collect();
    let mapped = visual.transformed_vertices();
    assert_eq!(mapped.len(), expected.len());
    for (got, want) in mapped.iter().zip(&expected) {
        assert!((*got - *want).length() < 1e-5, "{got:?} != {want:?}");
    }
    // GPU positions stay untransformed
    assert_eq!(visual.store().vertices(), split_mesh().vertices.as_slice());
}

#[test]
fn test_slicing_uses_transformed_vertices() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());
    visual.set_vertex_transform(Transform::from_position(Vec3::X));

    // x after the shift: -1, 0, 1, 2, 3, 1.5
    let planes = SlicePlanes {
        x: Some(AxisSlice::above(0.75)),
        ..Default::default()
    };
    visual.apply_slices(&mut backend, &planes, 0.8, 0.0).unwrap();

    let alphas: Vec<f32> = colors(&backend, &visual).iter().map(|c| c.w).collect();
    assert_eq!(alphas, vec![0.8, 0.8, 0.0, 0.0, 0.0, 0.0]);
}

// ============================================================================
// Camera-light coupling
// ============================================================================

#[test]
fn test_camera_rotation_moves_effective_light() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());
    let world_light = visual.lighting().position;
    assert_eq!(visual.effective_light_position(), world_light);

    let camera = Rc::new(RefCell::new(Camera::new(Vec3::new(0.0, 0.0, 500.0), Vec3::ZERO)));
    let shared: SharedCamera = camera.clone();
    visual.bind_camera(Some(&shared));
    assert!(visual.is_camera_bound());

    visual.prepare_draw(&mut backend).unwrap();
    let before = visual.effective_light_position();
    assert_eq!(uploaded_uniforms(&backend, &visual).light_position.truncate(), before);

    let mut orbit = OrbitController::default();
    orbit.sync_with_camera(&camera.borrow());
    orbit.orbit(90.0, 0.0);
    orbit.apply(&mut camera.borrow_mut());

    visual.prepare_draw(&mut backend).unwrap();
    let after = visual.effective_light_position();
    assert!((after - before).length() > 1.0);
    assert_eq!(uploaded_uniforms(&backend, &visual).light_position.truncate(), after);
    assert_eq!(visual.lighting().position, world_light);
}

#[test]
fn test_unbinding_restores_world_light() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());

    let camera: SharedCamera = Rc::new(RefCell::new(Mat4::from_translation(Vec3::new(0.0, 0.0, -300.0))));
    visual.bind_camera(Some(&camera));
    assert_eq!(
        visual.effective_light_position(),
        Vec3::new(100.0, 100.0, -200.0)
    );

    visual.bind_camera(None);
    assert!(!visual.is_camera_bound());
    assert_eq!(visual.effective_light_position(), Vec3::splat(100.0));
}

#[test]
fn test_dropped_camera_falls_back_to_world_light() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());
    {
        let camera: SharedCamera = Rc::new(RefCell::new(Mat4::from_scale(Vec3::splat(2.0))));
        visual.bind_camera(Some(&camera));
    }
    visual.prepare_draw(&mut backend).unwrap();
    assert_eq!(
        uploaded_uniforms(&backend, &visual).light_position.truncate(),
        Vec3::splat(100.0)
    );
}

// ============================================================================
// Frame hooks and teardown
// ============================================================================

#[test]
fn test_draw_records_buffers_and_active_index_count() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());
    visual.set_hemisphere(&mut backend, Hemisphere::Left).unwrap();

    visual.prepare_transforms(&mut backend, Mat4::IDENTITY).unwrap();
    visual.prepare_draw(&mut backend).unwrap();
    backend.begin_render_pass(&render_pass());
    visual.draw(&mut backend).unwrap();
    backend.end_render_pass();

    let buffers = visual.buffers().unwrap();
    let commands = backend.take_commands();
    assert_eq!(
        commands,
        vec![
            RecordedCommand::SetPipeline(visual.current_pipeline().unwrap()),
            RecordedCommand::SetBindGroup {
                index: 0,
                bind_group: commands_bind_group(&commands),
            },
            RecordedCommand::SetVertexBuffer {
                slot: POSITION_SLOT,
                buffer: buffers.positions
            },
            RecordedCommand::SetVertexBuffer {
                slot: NORMAL_SLOT,
                buffer: buffers.normals
            },
            RecordedCommand::SetVertexBuffer {
                slot: COLOR_SLOT,
                buffer: buffers.colors
            },
            RecordedCommand::SetIndexBuffer {
                buffer: buffers.indices,
                format: IndexFormat::Uint32
            },
            RecordedCommand::DrawIndexed {
                indices: 0..6,
                instances: 0..1
            },
        ]
    );
}

fn commands_bind_group(commands: &[RecordedCommand]) -> brain_visual::backend::BindGroupHandle {
    commands
        .iter()
        .find_map(|c| match c {
            RecordedCommand::SetBindGroup { bind_group, .. } => Some(*bind_group),
            _ => None,
        })
        .unwrap()
}

#[test]
fn test_transform_reaches_uniform_buffer() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());

    let transform = Mat4::from_scale(Vec3::splat(0.01));
    visual.prepare_transforms(&mut backend, transform).unwrap();
    assert_eq!(uploaded_uniforms(&backend, &visual).transform, transform);
}

#[test]
fn test_empty_mesh_draws_nothing() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, MeshGeometry::default());
    assert!(visual.is_empty());

    visual.prepare_draw(&mut backend).unwrap();
    backend.begin_render_pass(&render_pass());
    visual.draw(&mut backend).unwrap();
    backend.end_render_pass();
    assert!(backend.take_commands().is_empty());
}

#[test]
fn test_setters_raise_redraw_requests() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());
    assert!(visual.take_redraw_request());
    assert!(!visual.take_redraw_request());

    visual.set_ambient(0.2).unwrap();
    assert!(visual.take_redraw_request());
    assert_eq!(visual.uniforms().ambient(), 0.2);

    visual.set_hemisphere(&mut backend, Hemisphere::Left).unwrap();
    assert!(visual.take_redraw_request());

    assert!(visual.set_specular(f32::NAN).is_err());
    assert!(!visual.take_redraw_request());
}

#[rstest]
#[case::dummy(Backend::Dummy)]
#[case::wgpu(Backend::Wgpu)]
fn test_release_then_draw_fails_cleanly(#[case] backend: Backend) {
    let Some(mut ctx) = TestContext::new(backend) else {
        eprintln!("Backend {:?} not available, skipping", backend);
        return;
    };

    let mut visual = create(ctx.backend(), split_mesh());
    visual.release(ctx.backend());
    assert!(visual.is_released());
    assert!(visual.buffers().is_none());

    assert!(matches!(visual.draw(ctx.backend()), Err(VisualError::Released)));
    assert!(matches!(
        visual.prepare_draw(ctx.backend()),
        Err(VisualError::Released)
    ));
    assert!(matches!(
        visual.set_hemisphere(ctx.backend(), Hemisphere::Left),
        Err(VisualError::Released)
    ));

    // Releasing twice is harmless
    visual.release(ctx.backend());

    if let Some(dummy) = ctx.dummy() {
        assert_eq!(dummy.live_resource_count(), 0);
    }
}

#[test]
fn test_lighting_setters_fail_after_release() {
    let mut backend = DummyBackend::new();
    let mut visual = create(&mut backend, split_mesh());
    visual.release(&mut backend);
    let before = visual.lighting().clone();

    let released = |result: brain_visual::VisualResult<()>| matches!(result, Err(VisualError::Released));
    assert!(released(visual.set_light_position(Vec3::ZERO)));
    assert!(released(visual.set_light_color(Vec4::ONE)));
    assert!(released(visual.set_light_intensity(Vec3::ONE)));
    assert!(released(visual.set_ambient(0.3)));
    assert!(released(visual.set_specular(0.3)));
    assert!(released(visual.set_global_alpha(0.05)));
    assert!(released(visual.set_translucent(false)));

    assert_eq!(visual.lighting(), &before);
}

#[test]
fn test_drop_without_release_defers_cleanup() {
    let mut backend = DummyBackend::new();
    let visual = create(&mut backend, split_mesh());
    let live = backend.live_resource_count();
    assert!(live > 0);

    drop(visual);
    assert_eq!(backend.live_resource_count(), live);
    assert_eq!(backend.collect_released(), live);
    assert_eq!(backend.live_resource_count(), 0);
}

#[test]
fn test_wgpu_renders_into_registered_view() {
    let Some(TestContext::Wgpu(mut backend)) = TestContext::new(Backend::Wgpu) else {
        eprintln!("Backend Wgpu not available, skipping");
        return;
    };

    let texture = backend.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("test color"),
        size: wgpu::Extent3d {
            width: 64,
            height: 64,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Bgra8UnormSrgb,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = backend.register_texture_view(texture.create_view(&Default::default()));

    let config = BrainVisualConfig {
        targets: TargetFormats {
            depth: None,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut visual = BrainVisual::new(&mut *backend, split_mesh(), config).unwrap();
    visual.set_translucent(false).unwrap();

    backend.begin_frame();
    visual.prepare_transforms(&mut *backend, Mat4::IDENTITY).unwrap();
    visual.prepare_draw(&mut *backend).unwrap();
    backend.begin_render_pass(&RenderPassDescriptor {
        label: Some("test pass".into()),
        color_attachments: vec![ColorAttachment {
            view,
            load_op: LoadOp::Clear([0.0, 0.0, 0.0, 1.0]),
            store_op: StoreOp::Store,
        }],
        depth_stencil_attachment: None,
    });
    visual.draw(&mut *backend).unwrap();
    backend.end_render_pass();
    backend.submit();

    visual.release(&mut *backend);
    assert!(backend.unregister_texture_view(view).is_some());
}
