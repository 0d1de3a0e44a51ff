/// WGSL shader for terrain chunks: position, normal and uv per vertex,
/// lit by a single directional light and tinted by height.
pub const TERRAIN_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coord: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) height: f32,
};

@vertex
fn vs_terrain(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.world_normal = normalize(vertex.normal);
    out.height = vertex.position.y;
    return out;
}

@fragment
fn fs_terrain(in: VertexOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.3, 1.0, 0.5));
    let ambient = 0.3;
    let diffuse = max(dot(in.world_normal, light_dir), 0.0);
    let lighting = ambient + diffuse * 0.7;
    let low = vec3<f32>(0.25, 0.45, 0.2);
    let high = vec3<f32>(0.55, 0.5, 0.45);
    let t = clamp(in.height / 80.0 + 0.5, 0.0, 1.0);
    return vec4<f32>(mix(low, high, t) * lighting, 1.0);
}
"#;
