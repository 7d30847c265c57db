//! CPU-side model data.
//!
//! A [`Model`] is what the asset loader hands over to the scene: flattened meshes with
//! their node transforms relative to the model root, the materials they reference and
//! the root [`Transform`] that the render loop animates. Nothing here touches the GPU;
//! the renderer uploads a model the first time it sees it.

use std::sync::atomic::{AtomicU64, Ordering};

use cgmath::{Matrix4, Vector3};

use crate::data_structures::transform::Transform;

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Surface description of a mesh: a base colour factor and an optional base colour map.
#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<image::RgbaImage>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            base_color_factor: [1.0; 4],
            base_color_texture: None,
        }
    }
}

/// One triangle list with the transform of the node it came from.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    /// Index into [`Model::materials`]; `None` uses the default material.
    pub material: Option<usize>,
    /// Node transform relative to the model root.
    pub transform: Matrix4<f32>,
}

#[derive(Debug)]
pub struct Model {
    id: u64,
    pub name: Option<String>,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub transform: Transform,
}

impl Model {
    pub fn new(name: Option<String>, meshes: Vec<Mesh>, materials: Vec<Material>) -> Self {
        Self {
            id: NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed),
            name,
            meshes,
            materials,
            transform: Transform::new(),
        }
    }

    /// Unique per loaded model; the renderer keys its GPU copy on it.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Unit scale at the origin. The rotation is left alone.
    pub fn place_at_origin(&mut self) {
        self.transform.scale = Vector3::new(1.0, 1.0, 1.0);
        self.transform.position = Vector3::new(0.0, 0.0, 0.0);
    }

    pub fn material(&self, mesh: &Mesh) -> Option<&Material> {
        mesh.material.and_then(|idx| self.materials.get(idx))
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.indices.len() / 3).sum()
    }
}
