//! The one scene the viewer draws: a background colour, the lights and at most one model.

use cgmath::Point3;

use crate::{config::LightingConfig, data_structures::model::Model};

#[derive(Clone, Debug, PartialEq)]
pub enum Light {
    /// Lights everything evenly.
    Ambient { color: [f32; 3], intensity: f32 },
    /// Parallel light shining from `position` towards the origin.
    Directional {
        color: [f32; 3],
        intensity: f32,
        position: Point3<f32>,
    },
}

#[derive(Debug)]
pub struct Scene {
    pub background: wgpu::Color,
    lights: Vec<Light>,
    model: Option<Model>,
}

impl Scene {
    pub fn new(background: wgpu::Color) -> Self {
        Self {
            background,
            lights: Vec::new(),
            model: None,
        }
    }

    /// A scene with the background colour `0xRRGGBB` and the configured lights.
    pub fn with_lighting(background: u32, lighting: &LightingConfig) -> Self {
        let mut scene = Self::new(hex_to_color(background));
        scene.add_light(Light::Ambient {
            color: lighting.ambient_color,
            intensity: lighting.ambient_intensity,
        });
        scene.add_light(Light::Directional {
            color: lighting.directional_color,
            intensity: lighting.directional_intensity,
            position: lighting.directional_position.into(),
        });
        scene
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Put `model` into the scene, handing back the one it replaces.
    pub fn attach(&mut self, model: Model) -> Option<Model> {
        self.model.replace(model)
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> Option<&mut Model> {
        self.model.as_mut()
    }
}

/// `0xRRGGBB` in sRGB to a linear wgpu clear colour.
pub fn hex_to_color(hex: u32) -> wgpu::Color {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f64 / 255.0);
    wgpu::Color {
        r: channel(16),
        g: channel(8),
        b: channel(0),
        a: 1.0,
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}
