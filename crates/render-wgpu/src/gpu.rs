use crate::shaders;
use crate::textures::GpuTexture;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use marchlight_assets::LoadedScene;
use marchlight_render::RenderView;
use wgpu::util::DeviceExt;

/// Errors from building the render pipeline for a scene.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("shader '{label}' failed validation: {message}")]
    ShaderCompile { label: String, message: String },
    #[error("scene binds {count} textures, the device allows {limit}")]
    TooManyTextures { count: usize, limit: u32 },
    #[error("texture '{label}' is {width}x{height}, the device allows {limit} per side")]
    TextureTooLarge {
        label: String,
        width: u32,
        height: u32,
        limit: u32,
    },
}

/// Reject scenes the device cannot bind before any GPU object is created.
pub fn check_scene_limits(scene: &LoadedScene, limits: &wgpu::Limits) -> Result<(), RenderError> {
    let limit = limits.max_sampled_textures_per_shader_stage;
    if scene.textures.len() > limit as usize {
        return Err(RenderError::TooManyTextures {
            count: scene.textures.len(),
            limit,
        });
    }

    let limit = limits.max_texture_dimension_2d;
    if let Some(image) = scene
        .textures
        .iter()
        .find(|t| t.width() > limit || t.height() > limit)
    {
        return Err(RenderError::TextureTooLarge {
            label: image.label.clone(),
            width: image.width(),
            height: image.height(),
            limit,
        });
    }
    Ok(())
}

/// Per-frame uniform block. Layout matches `struct Frame` in the shader
/// prelude: vectors are padded to `vec4` to satisfy uniform alignment.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    view: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    front: [f32; 4],
    right: [f32; 4],
    up: [f32; 4],
    resolution: [f32; 2],
    time: f32,
    fov: f32,
}

fn padded(v: Vec3) -> [f32; 4] {
    v.extend(0.0).to_array()
}

impl FrameUniforms {
    pub fn from_view(view: &RenderView) -> Self {
        Self {
            view: view.view.to_cols_array_2d(),
            camera_pos: padded(view.position),
            front: padded(view.front),
            right: padded(view.right),
            up: padded(view.up),
            resolution: view.resolution.as_vec2().to_array(),
            time: view.time,
            fov: view.fov_degrees,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct QuadVertex {
    position: [f32; 3],
    uv: [f32; 2],
}

#[rustfmt::skip]
const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { position: [ 1.0,  1.0, 0.0], uv: [1.0, 1.0] }, // top right
    QuadVertex { position: [ 1.0, -1.0, 0.0], uv: [1.0, 0.0] }, // bottom right
    QuadVertex { position: [-1.0, -1.0, 0.0], uv: [0.0, 0.0] }, // bottom left
    QuadVertex { position: [-1.0,  1.0, 0.0], uv: [0.0, 1.0] }, // top left
];

const QUAD_INDICES: [u32; 6] = [2, 1, 0, 2, 0, 3];

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.1,
    a: 1.0,
};

/// Scene textures and the bind group that exposes them to the shader.
struct SceneBindings {
    bind_group: wgpu::BindGroup,
    _textures: Vec<GpuTexture>,
    _sampler: wgpu::Sampler,
}

/// Draws the scene's fragment shader over a screen-filling quad.
pub struct QuadRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    scene_bindings: Option<SceneBindings>,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    scene_name: String,
}

impl QuadRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        scene: &LoadedScene,
    ) -> Result<Self, RenderError> {
        check_scene_limits(scene, &device.limits())?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniforms"),
            contents: bytemuck::bytes_of(&FrameUniforms::from_view(&RenderView::default())),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let scene_layout = (!scene.textures.is_empty())
            .then(|| Self::scene_layout(device, scene.textures.len()));
        let scene_bindings = scene_layout
            .as_ref()
            .map(|layout| Self::scene_bindings(device, queue, layout, scene));

        let mut bind_group_layouts = vec![&uniform_layout];
        if let Some(layout) = &scene_layout {
            bind_group_layouts.push(layout);
        }
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quad_pipeline_layout"),
            bind_group_layouts: &bind_group_layouts,
            push_constant_ranges: &[],
        });

        let source = shaders::compose_shader(&scene.shader, scene.textures.len());
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&scene.shader.label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("quad_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<QuadVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x2,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(marchlight_assets::FRAGMENT_ENTRY_POINT),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::ShaderCompile {
                label: scene.shader.label.clone(),
                message: err.to_string(),
            });
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vertex_buffer"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_index_buffer"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        tracing::info!(
            "scene '{}' ready ({} texture(s))",
            scene.name,
            scene.textures.len()
        );

        Ok(Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            scene_bindings,
            vertex_buffer,
            index_buffer,
            scene_name: scene.name.clone(),
        })
    }

    pub fn scene_name(&self) -> &str {
        &self.scene_name
    }

    /// Render one frame: clear, then shade the full-screen quad.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        view: &RenderView,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::from_view(view)),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("quad_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("quad_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            if let Some(bindings) = &self.scene_bindings {
                pass.set_bind_group(1, &bindings.bind_group, &[]);
            }
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    /// Layout for group 1: the shared sampler at binding 0, then one
    /// texture per binding from 1.
    fn scene_layout(device: &wgpu::Device, texture_count: usize) -> wgpu::BindGroupLayout {
        let mut entries = vec![wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        }];
        entries.extend((0..texture_count).map(|i| wgpu::BindGroupLayoutEntry {
            binding: i as u32 + 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        }));

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
            entries: &entries,
        })
    }

    fn scene_bindings(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        scene: &LoadedScene,
    ) -> SceneBindings {
        let textures: Vec<GpuTexture> = scene
            .textures
            .iter()
            .map(|image| GpuTexture::upload(device, queue, image))
            .collect();
        let sampler = GpuTexture::create_sampler(device);

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Sampler(&sampler),
        }];
        entries.extend(textures.iter().enumerate().map(|(i, tex)| wgpu::BindGroupEntry {
            binding: i as u32 + 1,
            resource: wgpu::BindingResource::TextureView(&tex.view),
        }));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout,
            entries: &entries,
        });

        SceneBindings {
            bind_group,
            _textures: textures,
            _sampler: sampler,
        }
    }
}
