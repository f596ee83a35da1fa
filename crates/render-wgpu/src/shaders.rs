use marchlight_assets::{LoadedScene, ShaderSource};
use std::fmt::Write;

/// Uniform block and full-screen vertex stage shared by every scene.
const QUAD_PRELUDE: &str = r#"
struct Frame {
    view: mat4x4<f32>,
    camera_pos: vec4<f32>,
    front: vec4<f32>,
    right: vec4<f32>,
    up: vec4<f32>,
    resolution: vec2<f32>,
    time: f32,
    fov: f32,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

struct QuadInput {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

struct QuadOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(vertex: QuadInput) -> QuadOutput {
    var out: QuadOutput;
    out.clip_position = vec4<f32>(vertex.position, 1.0);
    out.uv = vertex.uv;
    return out;
}
"#;

/// Built-in scene: a ray-marched sphere over a checker floor, lit by a
/// light that circles with `frame.time`.
pub const DEFAULT_SCENE: &str = r#"
fn scene_sdf(p: vec3<f32>) -> f32 {
    let sphere = length(p) - 1.0;
    let ground = p.y + 1.0;
    return min(sphere, ground);
}

fn scene_normal(p: vec3<f32>) -> vec3<f32> {
    let e = vec2<f32>(0.001, 0.0);
    return normalize(vec3<f32>(
        scene_sdf(p + e.xyy) - scene_sdf(p - e.xyy),
        scene_sdf(p + e.yxy) - scene_sdf(p - e.yxy),
        scene_sdf(p + e.yyx) - scene_sdf(p - e.yyx),
    ));
}

@fragment
fn fs_main(in: QuadOutput) -> @location(0) vec4<f32> {
    let ndc = in.uv * 2.0 - vec2<f32>(1.0, 1.0);
    let aspect = frame.resolution.x / max(frame.resolution.y, 1.0);
    let half_height = tan(radians(frame.fov) * 0.5);
    let dir = normalize(
        frame.front.xyz
        + ndc.x * aspect * half_height * frame.right.xyz
        + ndc.y * half_height * frame.up.xyz
    );
    let origin = frame.camera_pos.xyz;

    var t = 0.0;
    var hit = false;
    for (var i = 0; i < 128; i = i + 1) {
        let d = scene_sdf(origin + dir * t);
        if (d < 0.001) {
            hit = true;
            break;
        }
        t = t + d;
        if (t > 200.0) {
            break;
        }
    }

    let sky = mix(
        vec3<f32>(0.1, 0.1, 0.1),
        vec3<f32>(0.35, 0.45, 0.6),
        clamp(dir.y * 0.5 + 0.5, 0.0, 1.0),
    );
    if (!hit) {
        return vec4<f32>(sky, 1.0);
    }

    let p = origin + dir * t;
    let n = scene_normal(p);
    let light = normalize(vec3<f32>(cos(frame.time * 0.5), 1.0, sin(frame.time * 0.5)));
    let diffuse = max(dot(n, light), 0.0);
    var base = vec3<f32>(0.8, 0.35, 0.2);
    if (p.y < -0.999) {
        let checker = (i32(floor(p.x)) + i32(floor(p.z))) & 1;
        base = select(vec3<f32>(0.25), vec3<f32>(0.75), checker == 1);
    }
    let fog = exp(-t * 0.02);
    let color = base * (0.2 + 0.8 * diffuse);
    return vec4<f32>(mix(sky, color, fog), 1.0);
}
"#;

/// The built-in scene with no textures.
pub fn default_scene() -> LoadedScene {
    LoadedScene::from_shader("default", ShaderSource::inline("default", DEFAULT_SCENE))
}

/// Full WGSL module for a scene: prelude, one `texture{i}` binding per
/// texture plus a shared `scene_sampler` in group 1, then the scene's
/// fragment source.
pub fn compose_shader(fragment: &ShaderSource, texture_count: usize) -> String {
    let mut module = String::from(QUAD_PRELUDE);
    if texture_count > 0 {
        module.push_str("\n@group(1) @binding(0)\nvar scene_sampler: sampler;\n");
        for i in 0..texture_count {
            let _ = write!(
                module,
                "\n@group(1) @binding({})\nvar texture{i}: texture_2d<f32>;\n",
                i + 1
            );
        }
    }
    module.push_str(&fragment.code);
    module
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_without_textures_has_no_group_one() {
        let module = compose_shader(&ShaderSource::inline("t", DEFAULT_SCENE), 0);
        assert!(module.contains("fn vs_main"));
        assert!(module.contains("fn fs_main"));
        assert!(!module.contains("@group(1)"));
    }

    #[test]
    fn compose_binds_textures_by_index() {
        let module = compose_shader(&ShaderSource::inline("t", "fn fs_main() {}"), 3);
        assert!(module.contains("var scene_sampler: sampler;"));
        assert!(module.contains("@group(1) @binding(1)\nvar texture0: texture_2d<f32>;"));
        assert!(module.contains("@group(1) @binding(3)\nvar texture2: texture_2d<f32>;"));
        assert!(!module.contains("texture3"));
    }

    #[test]
    fn fragment_source_comes_last() {
        let module = compose_shader(&ShaderSource::inline("t", "// scene body"), 1);
        assert!(module.ends_with("// scene body"));
    }

    #[test]
    fn default_scene_has_no_textures() {
        let scene = default_scene();
        assert!(scene.textures.is_empty());
        assert_eq!(scene.shader.code, DEFAULT_SCENE);
    }
}
