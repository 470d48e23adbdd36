//! wgpu rendering backend for a winit window.

mod geometry;
mod shader;

use std::collections::HashMap;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::window::Window;

pub use geometry::{uv_sphere, SphereVertex, HEIGHT_SEGMENTS, WIDTH_SEGMENTS};

use crate::camera::PerspectiveCamera;
use crate::error::GpuError;
use crate::scene::{GeometryHandle, MaterialDesc, MaterialHandle, RenderBackend, Scene, SphereInstance, SphereMesh};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const INITIAL_INSTANCE_CAPACITY: usize = 256;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct MeshUniforms {
    view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    ambient: [f32; 4],
    /// xyz position, w intensity.
    light_position: [f32; 4],
    light_color: [f32; 4],
    material: [f32; 4],
    scattering: [f32; 4],
    scattering_scale: [f32; 4],
}

impl MeshUniforms {
    fn new(mesh: &SphereMesh, desc: &MaterialDesc, camera: &PerspectiveCamera) -> Self {
        let ambient = mesh.ambient_light.color * mesh.ambient_light.intensity;
        let light = &mesh.point_light;
        let m = &desc.params;
        let s = &desc.scattering;
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).to_array(),
            ambient: ambient.extend(0.0).to_array(),
            light_position: light.position.extend(light.intensity).to_array(),
            light_color: light.color.extend(0.0).to_array(),
            material: [m.metalness, m.roughness, m.clearcoat, m.clearcoat_roughness],
            scattering: [s.distortion, s.ambient, s.attenuation, s.power],
            scattering_scale: [s.scale, 0.0, 0.0, 0.0],
        }
    }
}

struct GpuGeometry {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: u32,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
}

struct GpuMaterial {
    desc: MaterialDesc,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Draws [`Scene`]s into a window surface.
pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    depth_texture: wgpu::TextureView,
    geometries: HashMap<GeometryHandle, GpuGeometry>,
    materials: HashMap<MaterialHandle, GpuMaterial>,
    next_handle: u32,
    disposed: bool,
}

impl WgpuBackend {
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Ballpit Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sphere Uniform Layout"),
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

        let pipeline = create_pipeline(&device, &uniform_layout, config.format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            uniform_layout,
            depth_texture,
            geometries: HashMap::new(),
            materials: HashMap::new(),
            next_handle: 0,
            disposed: false,
        })
    }

    fn next_handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn configure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = create_depth_texture(&self.device, &self.config);
    }

    /// Upload instance data and uniforms for every mesh ahead of the pass.
    fn upload(&mut self, scene: &Scene, camera: &PerspectiveCamera) {
        for mesh in scene.meshes() {
            if let Some(material) = self.materials.get(&mesh.material) {
                let uniforms = MeshUniforms::new(mesh, &material.desc, camera);
                self.queue
                    .write_buffer(&material.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
            }
            let Some(geometry) = self.geometries.get_mut(&mesh.geometry) else {
                continue;
            };
            if mesh.instances.len() > geometry.instance_capacity {
                let capacity = mesh.instances.len().next_power_of_two();
                geometry.instance_buffer.destroy();
                geometry.instance_buffer = create_instance_buffer(&self.device, capacity);
                geometry.instance_capacity = capacity;
                log::debug!("grew instance buffer to {} spheres", capacity);
            }
            if !mesh.instances.is_empty() {
                self.queue.write_buffer(
                    &geometry.instance_buffer,
                    0,
                    bytemuck::cast_slice(&mesh.instances),
                );
            }
        }
    }

    fn draw(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), wgpu::SurfaceError> {
        self.upload(scene, camera);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Ballpit Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Sphere Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            for mesh in scene.meshes() {
                let (Some(geometry), Some(material)) = (
                    self.geometries.get(&mesh.geometry),
                    self.materials.get(&mesh.material),
                ) else {
                    continue;
                };
                let count = mesh.instances.len() as u32;
                if count == 0 {
                    continue;
                }
                render_pass.set_bind_group(0, &material.bind_group, &[]);
                render_pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, geometry.instance_buffer.slice(..));
                render_pass.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..geometry.num_indices, 0, 0..count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl RenderBackend for WgpuBackend {
    fn create_sphere_geometry(&mut self) -> GeometryHandle {
        let handle = GeometryHandle(self.next_handle());
        let (vertices, indices) = uv_sphere(WIDTH_SEGMENTS, HEIGHT_SEGMENTS);

        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        self.geometries.insert(
            handle,
            GpuGeometry {
                vertex_buffer,
                index_buffer,
                num_indices: indices.len() as u32,
                instance_buffer: create_instance_buffer(&self.device, INITIAL_INSTANCE_CAPACITY),
                instance_capacity: INITIAL_INSTANCE_CAPACITY,
            },
        );
        handle
    }

    fn create_material(&mut self, desc: &MaterialDesc) -> MaterialHandle {
        let handle = MaterialHandle(self.next_handle());
        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sphere Uniform Buffer"),
            size: std::mem::size_of::<MeshUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sphere Uniform Bind Group"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        self.materials.insert(
            handle,
            GpuMaterial {
                desc: *desc,
                uniform_buffer,
                bind_group,
            },
        );
        handle
    }

    fn release_geometry(&mut self, handle: GeometryHandle) {
        if let Some(geometry) = self.geometries.remove(&handle) {
            geometry.vertex_buffer.destroy();
            geometry.index_buffer.destroy();
            geometry.instance_buffer.destroy();
        }
    }

    fn release_material(&mut self, handle: MaterialHandle) {
        if let Some(material) = self.materials.remove(&handle) {
            material.uniform_buffer.destroy();
        }
    }

    fn set_size(&mut self, width: f32, height: f32, pixel_ratio: f32) {
        let width = ((width * pixel_ratio).round() as u32).max(1);
        let height = ((height * pixel_ratio).round() as u32).max(1);
        if self.disposed || (width == self.config.width && height == self.config.height) {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.configure();
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) {
        if self.disposed {
            return;
        }
        match self.draw(scene, camera) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                self.configure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory, skipping frame");
            }
            Err(e) => log::warn!("render error: {:?}", e),
        }
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let geometries: Vec<_> = self.geometries.keys().copied().collect();
        for handle in geometries {
            self.release_geometry(handle);
        }
        let materials: Vec<_> = self.materials.keys().copied().collect();
        for handle in materials {
            self.release_material(handle);
        }
        self.disposed = true;
        log::debug!("wgpu backend disposed");
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Sphere Instance Buffer"),
        size: (capacity * std::mem::size_of::<SphereInstance>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    uniform_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Sphere Shader"),
        source: wgpu::ShaderSource::Wgsl(shader::SPHERE_SHADER.into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Sphere Pipeline Layout"),
        bind_group_layouts: &[uniform_layout],
        push_constant_ranges: &[],
    });

    let vertex_attributes = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
    let instance_attributes = wgpu::vertex_attr_array![2 => Float32x3, 3 => Float32, 4 => Float32x3];

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Sphere Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some("vs_main"),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<SphereVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &vertex_attributes,
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<SphereInstance>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &instance_attributes,
                },
            ],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
