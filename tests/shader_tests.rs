//! Shader tests.
//!
//! The WGSL module is parsed and validated with naga, so a broken shader is
//! caught without a GPU. The CPU reference of the lighting model is checked
//! against hand-computed values.

use glam::{Mat4, Vec3, Vec4};
use rstest::rstest;

use brain_visual::visual::shader::{diffuse_term, shade, specular_term, MeshUniforms};
use brain_visual::visual::BRAIN_MESH_SHADER;
use brain_visual::LightingState;

fn parse() -> naga::Module {
    match naga::front::wgsl::parse_str(BRAIN_MESH_SHADER) {
        Ok(module) => module,
        Err(err) => panic!("{}", err.emit_to_string(BRAIN_MESH_SHADER)),
    }
}

#[test]
fn test_shader_validates() {
    let module = parse();
    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    if let Err(err) = validator.validate(&module) {
        panic!("{}", err.emit_to_string(BRAIN_MESH_SHADER));
    }
}

#[rstest]
#[case::vertex("vs_main", naga::ShaderStage::Vertex)]
#[case::fragment("fs_main", naga::ShaderStage::Fragment)]
fn test_shader_entry_points(#[case] name: &str, #[case] stage: naga::ShaderStage) {
    let module = parse();
    let entry = module
        .entry_points
        .iter()
        .find(|entry| entry.name == name)
        .unwrap_or_else(|| panic!("missing entry point {name}"));
    assert_eq!(entry.stage, stage);
}

#[test]
fn test_shader_uniform_binding() {
    let module = parse();
    let uniforms: Vec<_> = module
        .global_variables
        .iter()
        .filter(|(_, var)| var.space == naga::AddressSpace::Uniform)
        .collect();
    assert_eq!(uniforms.len(), 1);

    let binding = uniforms[0].1.binding.clone().unwrap();
    assert_eq!(binding.group, 0);
    assert_eq!(binding.binding, 0);
}

fn straight_on(ambient: f32, specular: f32) -> MeshUniforms {
    let light = LightingState {
        ambient,
        specular,
        intensity: Vec3::new(0.5, 1.0, 2.0),
        ..Default::default()
    };
    MeshUniforms::new(Mat4::IDENTITY, &light, Vec3::new(0.0, 0.0, 10.0))
}

#[test]
fn test_light_straight_on_gives_full_diffuse() {
    let color = Vec3::new(0.2, 0.4, 0.6);
    let intensity = Vec3::new(0.5, 1.0, 2.0);
    let diffuse = diffuse_term(color, Vec3::Z, Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0), intensity);
    assert!((diffuse - color * intensity).length() < 1e-6);
}

#[test]
fn test_diffuse_only_output() {
    let uniforms = straight_on(0.0, 0.0);
    let color = Vec4::new(0.2, 0.4, 0.6, 1.0);
    let out = shade(&uniforms, Vec3::ZERO, Vec3::Z, color);
    let expected = Vec3::new(0.1, 0.4, 1.2);
    assert!((out.truncate() - expected).length() < 1e-6);
    assert_eq!(out.w, 1.0);
}

#[test]
fn test_ambient_and_specular_add_up() {
    let color = Vec4::new(0.2, 0.4, 0.6, 1.0);
    let base = shade(&straight_on(0.0, 0.0), Vec3::ZERO, Vec3::Z, color);
    let lit = shade(&straight_on(0.05, 0.5), Vec3::ZERO, Vec3::Z, color);

    // Light and camera on the normal: the highlight is at its peak
    let intensity = Vec3::new(0.5, 1.0, 2.0);
    let highlight = specular_term(0.5, Vec3::Z, Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0), intensity);
    assert!((highlight - 0.5 * intensity).length() < 1e-5);

    let ambient = 0.05 * color.truncate() * intensity;
    assert!((lit.truncate() - (base.truncate() + ambient + highlight)).length() < 1e-5);
}

#[test]
fn test_light_color_tints_vertex_color() {
    let light = LightingState {
        color: Vec4::new(1.0, 0.0, 0.0, 1.0),
        ambient: 0.0,
        specular: 0.0,
        ..Default::default()
    };
    let uniforms = MeshUniforms::new(Mat4::IDENTITY, &light, Vec3::new(0.0, 0.0, 10.0));
    let out = shade(&uniforms, Vec3::ZERO, Vec3::Z, Vec4::ONE);
    assert!((out.truncate() - Vec3::X).length() < 1e-6);
}
