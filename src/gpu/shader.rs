//! WGSL for the instanced sphere pass.
//!
//! Lighting is a metal/rough BRDF with a clearcoat lobe, one point light
//! with inverse-square falloff and an ambient term, plus a wrap-around
//! scattering term that lets light bleed through the spheres from behind.
//! Output is ACES tone mapped; the sRGB surface does the final encode.

pub const SPHERE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    ambient: vec4<f32>,
    light_position: vec4<f32>,
    light_color: vec4<f32>,
    // metalness, roughness, clearcoat, clearcoat_roughness
    material: vec4<f32>,
    // distortion, ambient, attenuation, power
    scattering: vec4<f32>,
    // scale, unused x3
    scattering_scale: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> u: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) offset: vec3<f32>,
    @location(3) scale: f32,
    @location(4) color: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    var out: VertexOutput;
    let world = vertex.position * instance.scale + instance.offset;
    out.clip_position = u.view_proj * vec4<f32>(world, 1.0);
    out.world_position = world;
    out.normal = vertex.normal;
    out.color = instance.color;
    return out;
}

const PI: f32 = 3.14159265;

fn d_ggx(n_dot_h: f32, roughness: f32) -> f32 {
    let a = roughness * roughness;
    let a2 = a * a;
    let d = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    return a2 / (PI * d * d);
}

fn v_smith(n_dot_v: f32, n_dot_l: f32, roughness: f32) -> f32 {
    let a = roughness * roughness;
    let a2 = a * a;
    let gv = n_dot_l * sqrt(n_dot_v * n_dot_v * (1.0 - a2) + a2);
    let gl = n_dot_v * sqrt(n_dot_l * n_dot_l * (1.0 - a2) + a2);
    return 0.5 / max(gv + gl, 1e-5);
}

fn f_schlick(f0: vec3<f32>, v_dot_h: f32) -> vec3<f32> {
    return f0 + (vec3<f32>(1.0) - f0) * pow(1.0 - v_dot_h, 5.0);
}

fn aces(color: vec3<f32>) -> vec3<f32> {
    let a = 2.51;
    let b = 0.03;
    let c = 2.43;
    let d = 0.59;
    let e = 0.14;
    return clamp((color * (a * color + b)) / (color * (c * color + d) + e), vec3<f32>(0.0), vec3<f32>(1.0));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let metalness = u.material.x;
    let roughness = clamp(u.material.y, 0.0525, 1.0);
    let clearcoat = u.material.z;
    let clearcoat_roughness = clamp(u.material.w, 0.0525, 1.0);

    let n = normalize(in.normal);
    let v = normalize(u.camera_position.xyz - in.world_position);
    let to_light = u.light_position.xyz - in.world_position;
    let dist = length(to_light);
    let l = to_light / max(dist, 1e-4);
    let h = normalize(l + v);

    let n_dot_l = clamp(dot(n, l), 0.0, 1.0);
    let n_dot_v = clamp(dot(n, v), 1e-4, 1.0);
    let n_dot_h = clamp(dot(n, h), 0.0, 1.0);
    let v_dot_h = clamp(dot(v, h), 0.0, 1.0);

    let light = u.light_color.rgb * u.light_position.w / max(dist * dist, 1e-4);

    let diffuse_color = in.color * (1.0 - metalness);
    let f0 = mix(vec3<f32>(0.04), in.color, metalness);

    let f = f_schlick(f0, v_dot_h);
    let specular = f * d_ggx(n_dot_h, roughness) * v_smith(n_dot_v, n_dot_l, roughness);
    var direct = (diffuse_color / PI + specular) * light * n_dot_l;

    let fc = f_schlick(vec3<f32>(0.04), v_dot_h) * clearcoat;
    let coat = fc * d_ggx(n_dot_h, clearcoat_roughness) * v_smith(n_dot_v, n_dot_l, clearcoat_roughness);
    direct = direct * (vec3<f32>(1.0) - fc) + coat * light * n_dot_l;

    // Scattering: light from behind the sphere, bent towards the normal.
    let scatter_half = normalize(l + n * u.scattering.x);
    let scatter_dot = pow(clamp(dot(v, -scatter_half), 0.0, 1.0), u.scattering.w) * u.scattering_scale.x;
    let scatter = (scatter_dot + u.scattering.y) * diffuse_color * u.scattering.z * light;

    let ambient = u.ambient.rgb * diffuse_color;
    let color = aces(direct + scatter + ambient);
    return vec4<f32>(color, 1.0);
}
"#;
