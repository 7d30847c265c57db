//! Drawing the scene.
//!
//! [`Renderer`] is the seam between the viewer logic and the GPU: the render loop and the
//! resize handling only talk to the trait. [`GpuRenderer`] is the wgpu implementation
//! that draws into a window surface.
//!
//! # GPU layout
//!
//! - group 0: material (base colour map, sampler, base colour factor)
//! - group 1: camera uniform
//! - group 2: lights uniform
//!
//! Each mesh is drawn with a single instance holding its world and normal matrices.

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    camera::{Camera, CameraUniform, Projection},
    data_structures::{
        model::Model,
        texture::Texture,
        transform::InstanceRaw,
    },
    pipelines::{
        basic::{camera_layout, material_layout, mk_model_pipeline},
        light::{LightResources, LightUniform},
    },
    scene::Scene,
    viewport::ViewportSize,
};

pub trait Renderer {
    type Error;

    /// Size of the output in physical pixels.
    fn size(&self) -> ViewportSize;

    /// Match the output to a new surface size.
    fn resize(&mut self, size: ViewportSize);

    /// Draw `scene` as seen through `camera`.
    fn render(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        projection: &Projection,
    ) -> Result<(), Self::Error>;
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MaterialUniform {
    base_color: [f32; 4],
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    num_elements: u32,
    material: Option<usize>,
}

/// A [`Model`] uploaded to the GPU, keyed by the model's id.
struct GpuModel {
    id: u64,
    meshes: Vec<GpuMesh>,
    materials: Vec<wgpu::BindGroup>,
}

pub struct GpuRenderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    is_surface_configured: bool,
    depth_texture: Texture,
    pipeline: wgpu::RenderPipeline,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    light: LightResources,
    material_layout: wgpu::BindGroupLayout,
    default_material: wgpu::BindGroup,
    model: Option<GpuModel>,
}

impl GpuRenderer {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // The instance is a handle to our GPU
        // BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                ..Default::default()
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader writes linear colours, so an sRGB surface does the encoding.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no texture formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let camera_uniform = CameraUniform::new();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group_layout = camera_layout(&device);
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let light = LightResources::new(&device, LightUniform::default());
        let material_layout = material_layout(&device);
        let pipeline = mk_model_pipeline(
            &device,
            &config,
            &material_layout,
            &camera_bind_group_layout,
            &light.bind_group_layout,
        );

        let white = Texture::create_solid([255; 4], &device, &queue, "default base colour");
        let default_material =
            mk_material_bind_group(&device, &material_layout, &white, [1.0; 4], "default");

        let depth_texture =
            Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");

        let mut renderer = Self {
            window,
            surface,
            device,
            queue,
            config,
            is_surface_configured: false,
            depth_texture,
            pipeline,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            light,
            material_layout,
            default_material,
            model: None,
        };
        renderer.resize(size.into());
        Ok(renderer)
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    fn upload(&self, model: &Model) -> GpuModel {
        log::debug!(
            "uploading model {} ({} meshes, {} triangles)",
            model.id(),
            model.meshes.len(),
            model.triangle_count()
        );
        let materials = model
            .materials
            .iter()
            .map(|material| {
                let texture = match &material.base_color_texture {
                    Some(image) => Texture::from_rgba(
                        &self.device,
                        &self.queue,
                        image,
                        Some(&material.name),
                        true,
                    ),
                    None => Texture::create_solid([255; 4], &self.device, &self.queue, &material.name),
                };
                mk_material_bind_group(
                    &self.device,
                    &self.material_layout,
                    &texture,
                    material.base_color_factor,
                    &material.name,
                )
            })
            .collect();

        let meshes = model
            .meshes
            .iter()
            .map(|mesh| GpuMesh {
                vertex_buffer: self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{:?} Vertex Buffer", mesh.name)),
                        contents: bytemuck::cast_slice(&mesh.vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
                index_buffer: self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{:?} Index Buffer", mesh.name)),
                        contents: bytemuck::cast_slice(&mesh.indices),
                        usage: wgpu::BufferUsages::INDEX,
                    }),
                instance_buffer: self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{:?} Instance Buffer", mesh.name)),
                        contents: bytemuck::cast_slice(&[InstanceRaw::from_matrix(
                            mesh.transform,
                        )]),
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    }),
                num_elements: mesh.indices.len() as u32,
                material: mesh.material,
            })
            .collect();

        GpuModel {
            id: model.id(),
            meshes,
            materials,
        }
    }

    /// Upload the model on first sight and refresh its instance matrices.
    fn prepare_model(&mut self, model: &Model) {
        if self.model.as_ref().map(|gpu| gpu.id) != Some(model.id()) {
            self.model = Some(self.upload(model));
        }
        let Some(gpu) = self.model.as_ref() else {
            return;
        };
        let root = model.transform.to_matrix();
        for (mesh, gpu_mesh) in model.meshes.iter().zip(&gpu.meshes) {
            self.queue.write_buffer(
                &gpu_mesh.instance_buffer,
                0,
                bytemuck::cast_slice(&[InstanceRaw::from_matrix(root * mesh.transform)]),
            );
        }
    }
}

fn mk_material_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    base_color: [f32; 4],
    name: &str,
) -> wgpu::BindGroup {
    let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{name} Material Buffer")),
        contents: bytemuck::cast_slice(&[MaterialUniform { base_color }]),
        usage: wgpu::BufferUsages::UNIFORM,
    });
    let sampler = match &texture.sampler {
        Some(sampler) => sampler.clone(),
        None => crate::data_structures::texture::create_default_sampler(device),
    };
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: uniform.as_entire_binding(),
            },
        ],
        label: Some(name),
    })
}

impl Renderer for GpuRenderer {
    type Error = wgpu::SurfaceError;

    fn size(&self) -> ViewportSize {
        ViewportSize::new(self.config.width, self.config.height)
    }

    fn resize(&mut self, size: ViewportSize) {
        if size.width > 0 && size.height > 0 {
            self.config.width = size.width;
            self.config.height = size.height;
            self.is_surface_configured = true;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = Texture::create_depth_texture(
                &self.device,
                [self.config.width, self.config.height],
                "depth_texture",
            );
        }
    }

    fn render(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        projection: &Projection,
    ) -> Result<(), wgpu::SurfaceError> {
        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        self.camera_uniform.update_view_proj(camera, projection);
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );
        self.light
            .update(&self.queue, LightUniform::from_lights(scene.lights()));
        if let Some(model) = scene.model() {
            self.prepare_model(model);
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(scene.background),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                ..Default::default()
            });

            if let (Some(gpu), Some(_)) = (self.model.as_ref(), scene.model()) {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(1, &self.camera_bind_group, &[]);
                render_pass.set_bind_group(2, &self.light.bind_group, &[]);
                for mesh in &gpu.meshes {
                    let material = mesh
                        .material
                        .and_then(|idx| gpu.materials.get(idx))
                        .unwrap_or(&self.default_material);
                    render_pass.set_bind_group(0, material, &[]);
                    render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    render_pass.set_vertex_buffer(1, mesh.instance_buffer.slice(..));
                    render_pass
                        .set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..mesh.num_elements, 0, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
