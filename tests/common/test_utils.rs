#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

use base64::Engine;
use orbit_viewer::{
    camera::{Camera, Projection},
    config::ViewerConfig,
    context,
    loader::LoadEvent,
    render::Renderer,
    render_loop::FrameScheduler,
    resources::{AssetSource, fetch_model},
    scene::Scene,
    status::StatusSurface,
    viewer::Viewer,
    viewport::ViewportSize,
};

/// Error returned by [`RecordingRenderer`] when told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderFailure;

/// Renderer that draws nothing and remembers what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub size: ViewportSize,
    pub resizes: Vec<ViewportSize>,
    pub renders: u32,
    /// Model rotation about the vertical axis at every render, `None` without a model.
    pub rotations: Vec<Option<f32>>,
    pub aspects: Vec<f32>,
    pub fail: bool,
}

impl Renderer for RecordingRenderer {
    type Error = RenderFailure;

    fn size(&self) -> ViewportSize {
        self.size
    }

    fn resize(&mut self, size: ViewportSize) {
        self.size = size;
        self.resizes.push(size);
    }

    fn render(
        &mut self,
        scene: &Scene,
        _camera: &Camera,
        projection: &Projection,
    ) -> Result<(), RenderFailure> {
        self.renders += 1;
        self.rotations
            .push(scene.model().map(|model| model.transform.rotation.y.0));
        self.aspects.push(projection.aspect());
        if self.fail { Err(RenderFailure) } else { Ok(()) }
    }
}

#[derive(Debug)]
pub struct RecordingStatus {
    pub texts: Vec<String>,
    visible: bool,
}

impl RecordingStatus {
    pub fn new() -> Self {
        Self {
            texts: Vec::new(),
            visible: true,
        }
    }

    pub fn last_text(&self) -> Option<&str> {
        self.texts.last().map(String::as_str)
    }
}

impl StatusSurface for RecordingStatus {
    fn show_text(&mut self, text: &str) {
        self.texts.push(text.to_string());
    }

    fn hide_overlay(&mut self) {
        self.visible = false;
    }

    fn overlay_visible(&self) -> bool {
        self.visible
    }
}

#[derive(Debug, Default)]
pub struct CountingScheduler {
    requests: Cell<u32>,
}

impl CountingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> u32 {
        self.requests.get()
    }
}

impl FrameScheduler for CountingScheduler {
    fn request_frame(&self) {
        self.requests.set(self.requests.get() + 1);
    }
}

/// Asset source serving files from memory.
#[derive(Debug, Default)]
pub struct InMemorySource {
    files: HashMap<String, Vec<u8>>,
    fetched: RefCell<Vec<String>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.to_string(), bytes.into());
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.borrow().clone()
    }
}

impl AssetSource for InMemorySource {
    async fn fetch(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        self.fetched.borrow_mut().push(path.to_string());
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("404: {path}"))
    }
}

pub type TestViewer = Viewer<RecordingRenderer, RecordingStatus>;

pub fn test_viewer(width: u32, height: u32) -> TestViewer {
    let config = ViewerConfig::default();
    let ctx = context::initialize(
        ViewportSize::new(width, height),
        RecordingRenderer::default(),
        &config,
    );
    Viewer::new(ctx, RecordingStatus::new(), &config)
}

/// Run the whole fetch for `path` and collect what it reported.
pub fn collect_events<S: AssetSource>(source: &S, path: &str) -> Vec<LoadEvent> {
    let mut events = Vec::new();
    futures::executor::block_on(fetch_model(source, path, |event| events.push(event)));
    events
}

/// Start loading `path` and feed every event of the fetch to the viewer.
pub fn load_into<S: AssetSource>(
    viewer: &mut TestViewer,
    source: &S,
    path: &str,
    scheduler: &CountingScheduler,
) {
    viewer.load(path).expect("load should start");
    for event in collect_events(source, path) {
        viewer
            .handle_load_event(event, scheduler)
            .expect("event should be accepted");
    }
}

pub const TRIANGLE_BIN_LENGTH: usize = 44;

/// Three positions followed by three u16 indices, padded to four bytes.
pub fn triangle_bin() -> Vec<u8> {
    let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    let indices: [u16; 3] = [0, 1, 2];
    let mut bin: Vec<u8> = bytemuck::cast_slice(&positions).to_vec();
    bin.extend_from_slice(bytemuck::cast_slice(&indices));
    bin.extend_from_slice(&[0, 0]);
    assert_eq!(bin.len(), TRIANGLE_BIN_LENGTH);
    bin
}

const TRIANGLE_TEMPLATE: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [{ "name": "TriangleScene", "nodes": [0] }],
  "nodes": [
    { "name": "Root", "translation": [1.0, 2.0, 3.0], "children": [1] },
    { "name": "Tri", "mesh": 0 }
  ],
  "meshes": [{
    "name": "tri",
    "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 }]
  }],
  "materials": [{
    "name": "red",
    "pbrMetallicRoughness": { BASE_COLOR_TEXTURE"baseColorFactor": [0.8, 0.2, 0.2, 1.0] }
  }],
  TEXTURES"buffers": [{ BUFFER_URI"byteLength": 44 }],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
    { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
  ]
}"#;

fn triangle_json(buffer_uri: Option<&str>, image_uri: Option<&str>) -> String {
    let buffer = buffer_uri
        .map(|uri| format!(r#""uri": "{uri}", "#))
        .unwrap_or_default();
    let (texture_ref, textures) = match image_uri {
        Some(uri) => (
            r#""baseColorTexture": { "index": 0 }, "#.to_string(),
            format!(r#""textures": [{{ "source": 0 }}], "images": [{{ "uri": "{uri}" }}], "#),
        ),
        None => (String::new(), String::new()),
    };
    TRIANGLE_TEMPLATE
        .replace("BASE_COLOR_TEXTURE", &texture_ref)
        .replace("TEXTURES", &textures)
        .replace("BUFFER_URI", &buffer)
}

/// A triangle whose buffer lives in `bin_uri` next to the document.
pub fn triangle_gltf(bin_uri: &str) -> Vec<u8> {
    triangle_json(Some(bin_uri), None).into_bytes()
}

/// Same triangle with a base colour map at `image_uri`.
pub fn textured_triangle_gltf(bin_uri: &str, image_uri: &str) -> Vec<u8> {
    triangle_json(Some(bin_uri), Some(image_uri)).into_bytes()
}

/// A triangle with its buffer inlined as a base64 data URI.
pub fn embedded_triangle_gltf() -> Vec<u8> {
    let encoded = base64::engine::general_purpose::STANDARD.encode(triangle_bin());
    let uri = format!("data:application/octet-stream;base64,{encoded}");
    triangle_json(Some(&uri), None).into_bytes()
}

/// A binary glTF with the JSON and BIN chunks.
pub fn triangle_glb() -> Vec<u8> {
    let mut json = triangle_json(None, None).into_bytes();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let bin = triangle_bin();
    let total = 12 + 8 + json.len() + 8 + bin.len();

    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json);
    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin);
    glb
}

/// A 2x2 PNG of a single colour.
pub fn solid_png(rgba: [u8; 4]) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(2, 2, image::Rgba(rgba));
    let mut bytes = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("png encoding");
    bytes.into_inner()
}

/// The source a test viewer loads `public/scene.gltf` from.
pub fn scene_source() -> InMemorySource {
    InMemorySource::new()
        .with_file("public/scene.gltf", triangle_gltf("scene.bin"))
        .with_file("public/scene.bin", triangle_bin())
}
