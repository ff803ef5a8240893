//! Shading pipeline of the brain mesh
//!
//! Ambient + diffuse + specular lighting from a single point light whose
//! position is given in view space. No attenuation and no gamma correction.
//! The CPU functions at the bottom evaluate the same formula as the fragment
//! stage.

use crate::scene::LightingState;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

/// Specular exponent of the fragment stage
pub const SHININESS: f32 = 40.0;

/// Uniform block shared by both stages (group 0, binding 0)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshUniforms {
    /// Full vertex transform, model to clip space
    pub transform: Mat4,
    /// xyz = light position in view space
    pub light_position: Vec4,
    pub light_color: Vec4,
    /// xyz = per-channel intensity
    pub light_intensity: Vec4,
    /// x = ambient coefficient, y = specular coefficient, z = global alpha
    pub coefficients: Vec4,
}

impl MeshUniforms {
    pub fn new(transform: Mat4, light: &LightingState, light_position: Vec3) -> Self {
        Self {
            transform,
            light_position: light_position.extend(1.0),
            light_color: light.color,
            light_intensity: light.intensity.extend(0.0),
            coefficients: Vec4::new(light.ambient, light.specular, light.alpha, 0.0),
        }
    }

    /// Refresh everything but the transform and the light position
    pub fn update_lighting(&mut self, light: &LightingState) {
        self.light_color = light.color;
        self.light_intensity = light.intensity.extend(0.0);
        self.coefficients = Vec4::new(light.ambient, light.specular, light.alpha, 0.0);
    }

    pub fn ambient(&self) -> f32 {
        self.coefficients.x
    }

    pub fn specular(&self) -> f32 {
        self.coefficients.y
    }

    pub fn alpha(&self) -> f32 {
        self.coefficients.z
    }
}

impl Default for MeshUniforms {
    fn default() -> Self {
        let light = LightingState::default();
        Self::new(Mat4::IDENTITY, &light, light.position)
    }
}

pub const BRAIN_MESH_SHADER: &str = r#"
struct MeshUniforms {
    transform: mat4x4<f32>,
    light_position: vec4<f32>,
    light_color: vec4<f32>,
    light_intensity: vec4<f32>,
    // x: ambient, y: specular, z: alpha
    coefficients: vec4<f32>,
}

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) normal: vec3<f32>,
}

@group(0) @binding(0) var<uniform> mesh: MeshUniforms;

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.position = input.position;
    output.normal = input.normal;
    output.color = input.color * mesh.light_color;
    output.clip_position = mesh.transform * vec4<f32>(input.position, 1.0);
    return output;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let intensity = mesh.light_intensity.xyz;

    // Ambient
    let ambient = mesh.coefficients.x * input.color.rgb * intensity;

    // Diffuse
    let to_light = mesh.light_position.xyz - input.position;
    let cos_incidence = dot(input.normal, to_light) / (length(to_light) * length(input.normal));
    let brightness = clamp(cos_incidence, 0.0, 1.0);
    let diffuse = input.color.rgb * brightness * intensity;

    // Specular
    let to_camera = vec3<f32>(0.0, 0.0, 1.0) - input.position;
    let half_vec = normalize(normalize(to_light) + normalize(to_camera));
    var specular = clamp(pow(abs(dot(input.normal, half_vec)), 40.0), 0.0, 1.0);
    specular = specular * mesh.coefficients.y;
    let specular_light = specular * vec3<f32>(1.0, 1.0, 1.0) * intensity;

    let linear_color = ambient + specular_light + diffuse;
    return vec4<f32>(linear_color, mesh.coefficients.z);
}
"#;

pub fn ambient_term(ambient: f32, color: Vec3, intensity: Vec3) -> Vec3 {
    ambient * color * intensity
}

pub fn diffuse_term(color: Vec3, normal: Vec3, position: Vec3, light_position: Vec3, intensity: Vec3) -> Vec3 {
    let to_light = light_position - position;
    let brightness = (normal.dot(to_light) / (to_light.length() * normal.length())).clamp(0.0, 1.0);
    color * brightness * intensity
}

pub fn specular_term(specular: f32, normal: Vec3, position: Vec3, light_position: Vec3, intensity: Vec3) -> Vec3 {
    let to_light = light_position - position;
    let to_camera = Vec3::Z - position;
    let half_vec = (to_light.normalize() + to_camera.normalize()).normalize();
    let highlight = normal.dot(half_vec).abs().powf(SHININESS).clamp(0.0, 1.0);
    specular * highlight * Vec3::ONE * intensity
}

/// Color of a fragment, given the interpolated vertex attributes
pub fn shade(uniforms: &MeshUniforms, position: Vec3, normal: Vec3, vertex_color: Vec4) -> Vec4 {
    let color = (vertex_color * uniforms.light_color).truncate();
    let intensity = uniforms.light_intensity.truncate();
    let light_position = uniforms.light_position.truncate();

    let rgb = ambient_term(uniforms.ambient(), color, intensity)
        + diffuse_term(color, normal, position, light_position, intensity)
        + specular_term(uniforms.specular(), normal, position, light_position, intensity);
    rgb.extend(uniforms.alpha())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_is_std140_sized() {
        assert_eq!(std::mem::size_of::<MeshUniforms>(), 128);
    }

    #[test]
    fn light_behind_the_surface_gives_no_diffuse() {
        let d = diffuse_term(Vec3::ONE, Vec3::Z, Vec3::ZERO, Vec3::new(0.0, 0.0, -5.0), Vec3::ONE);
        assert_eq!(d, Vec3::ZERO);
    }

    #[test]
    fn alpha_comes_from_the_uniforms() {
        let mut light = LightingState::default();
        light.alpha = 0.1;
        let uniforms = MeshUniforms::new(Mat4::IDENTITY, &light, Vec3::new(0.0, 0.0, 10.0));
        let out = shade(&uniforms, Vec3::ZERO, Vec3::Z, Vec4::ONE);
        assert_eq!(out.w, 0.1);
    }
}
