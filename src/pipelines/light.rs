use cgmath::{EuclideanSpace, InnerSpace};
use wgpu::util::DeviceExt;

use crate::scene::Light;

/// The scene's lights as the shader sees them: all ambient lights summed up and the
/// first directional light.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    // rgb is colour * intensity, w is padding (uniforms need 16 byte spacing)
    ambient: [f32; 4],
    // xyz points from the origin towards the light
    direction: [f32; 4],
    directional: [f32; 4],
}

impl LightUniform {
    pub fn from_lights(lights: &[Light]) -> Self {
        let mut uniform = Self::default();
        let mut has_directional = false;
        for light in lights {
            match light {
                Light::Ambient { color, intensity } => {
                    for (channel, value) in uniform.ambient.iter_mut().zip(color) {
                        *channel += value * intensity;
                    }
                }
                Light::Directional {
                    color,
                    intensity,
                    position,
                } if !has_directional => {
                    has_directional = true;
                    let offset = position.to_vec();
                    let direction = if offset.magnitude2() > 0.0 {
                        offset.normalize()
                    } else {
                        cgmath::Vector3::unit_y()
                    };
                    uniform.direction = direction.extend(0.0).into();
                    uniform.directional = [
                        color[0] * intensity,
                        color[1] * intensity,
                        color[2] * intensity,
                        0.0,
                    ];
                }
                Light::Directional { .. } => {
                    log::warn!("only the first directional light is rendered");
                }
            }
        }
        uniform
    }

    pub fn ambient(&self) -> [f32; 3] {
        [self.ambient[0], self.ambient[1], self.ambient[2]]
    }

    pub fn direction(&self) -> [f32; 3] {
        [self.direction[0], self.direction[1], self.direction[2]]
    }

    pub fn directional(&self) -> [f32; 3] {
        [self.directional[0], self.directional[1], self.directional[2]]
    }
}

pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(device: &wgpu::Device, uniform: LightUniform) -> Self {
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Upload `uniform` if it differs from what the GPU has.
    pub fn update(&mut self, queue: &wgpu::Queue, uniform: LightUniform) {
        if uniform != self.uniform {
            self.uniform = uniform;
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
        }
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Uniform Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}
