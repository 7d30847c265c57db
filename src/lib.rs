//! orbit-viewer
//!
//! A minimal glTF model viewer for native windows and the web. It loads one asset while
//! showing its progress, then draws it under an ambient and a directional light, turning
//! it slowly about the vertical axis while orbit controls move the camera.
//!
//! High-level modules
//! - `camera`: perspective camera, projection and the GPU camera uniform
//! - `config`: viewer configuration with the stock defaults
//! - `context`: the viewer context and its one-time bootstrap
//! - `controls`: damped orbit controls
//! - `data_structures`: CPU-side models, transforms and GPU textures
//! - `flow`: the winit event loop host and [`flow::run`]
//! - `loader`: the asset loading state machine
//! - `pipelines`: the render pipeline and its bind group layouts
//! - `render`: the [`render::Renderer`] seam and the wgpu renderer
//! - `render_loop`: the start signal and the per-frame cycle
//! - `resources`: fetching and parsing glTF assets
//! - `scene`: background, lights and the loaded model
//! - `status`: the progress overlay
//! - `viewer`: everything above wired together
//! - `viewport`: surface size tracking
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod flow;
pub mod loader;
pub mod pipelines;
pub mod render;
pub mod render_loop;
pub mod resources;
pub mod scene;
pub mod status;
pub mod viewer;
pub mod viewport;

pub use config::ViewerConfig;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    flow::run(ViewerConfig::default()).map_err(|err| JsValue::from_str(&format!("{err:#}")))
}
