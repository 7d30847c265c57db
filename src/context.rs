use crate::{
    camera::{Camera, Projection},
    config::ViewerConfig,
    controls::OrbitControls,
    render::Renderer,
    scene::Scene,
    viewport::{Viewport, ViewportSize},
};

/// Everything a frame needs: built once by [`initialize`] and owned by the viewer for
/// the rest of the program.
#[derive(Debug)]
pub struct ViewerContext<R: Renderer> {
    pub scene: Scene,
    pub camera: Camera,
    pub projection: Projection,
    pub renderer: R,
    pub controls: OrbitControls,
    pub viewport: Viewport,
}

/// Build the scene with its lights, the camera, the orbit controls and size the renderer
/// to the surface.
pub fn initialize<R: Renderer>(size: ViewportSize, mut renderer: R, config: &ViewerConfig) -> ViewerContext<R> {
    let scene = Scene::with_lighting(config.background, &config.lighting);
    let camera = Camera::new(config.camera.position, config.camera.target);
    let projection = Projection::from_config(size, &config.camera);
    renderer.resize(size);
    let controls = OrbitControls::new(config.controls.clone());

    log::info!(
        "viewer initialized at {}x{} with {} lights",
        size.width,
        size.height,
        scene.lights().len()
    );

    let mut viewport = Viewport::new(size);
    viewport.on_resize(|size| log::debug!("surface resized to {}x{}", size.width, size.height));

    ViewerContext {
        scene,
        camera,
        projection,
        renderer,
        controls,
        viewport,
    }
}

impl<R: Renderer> ViewerContext<R> {
    /// Follow a surface size change. The camera aspect and the renderer output always
    /// match the surface exactly; sizes without area are skipped.
    pub fn resize(&mut self, size: ViewportSize) -> bool {
        if !self.viewport.resize(size) {
            return false;
        }
        self.projection.resize(size.width, size.height);
        self.renderer.resize(size);
        true
    }
}
