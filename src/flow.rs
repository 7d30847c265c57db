//! Application event loop.
//!
//! This module hosts the viewer in a winit event loop, natively in a window and on the
//! web in the page's canvas. It builds the [`Viewer`] once the window exists, starts the
//! asset fetch and routes everything that happens afterwards to the viewer.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window and the GPU renderer, then bootstraps the viewer
//!    (natively right away, on the web once the async renderer setup sent
//!    [`FlowEvent::Initialized`])
//! 2. the asset load starts; the fetch runs off the event loop and reports back through
//!    [`FlowEvent::Load`]
//! 3. window events go to the orbit controls; resizes go to the viewport
//! 4. once the model is in, every `RedrawRequested` runs one frame, which requests the
//!    next one

use std::{fmt::Debug, sync::Arc};

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    config::ViewerConfig,
    context,
    loader::LoadEvent,
    render::GpuRenderer,
    resources::{HostAssetSource, fetch_model},
    status::HostStatus,
    viewer::Viewer,
    viewport::ViewportSize,
};

type HostViewer = Viewer<GpuRenderer, HostStatus>;

pub(crate) enum FlowEvent {
    /// The web's async renderer setup finished.
    #[cfg(target_arch = "wasm32")]
    Initialized(Box<HostViewer>),
    Load(LoadEvent),
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(target_arch = "wasm32")]
            Self::Initialized(_) => f.write_str("Initialized(Viewer)"),
            Self::Load(event) => f.debug_tuple("Load").field(event).finish(),
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<FlowEvent>,
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    viewer: Option<HostViewer>,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, config: ViewerConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config,
            window: None,
            viewer: None,
        })
    }

    /// Take over a freshly built viewer and start the asset load.
    fn install(&mut self, mut viewer: HostViewer) {
        let path = self.config.asset_path.clone();
        match viewer.load(&path) {
            Ok(()) => self.spawn_fetch(path),
            Err(err) => log::error!("could not start loading {path}: {err}"),
        }
        self.viewer = Some(viewer);
    }

    fn spawn_fetch(&self, path: String) {
        let proxy = self.proxy.clone();
        let emit = move |event: LoadEvent| {
            if proxy.send_event(FlowEvent::Load(event)).is_err() {
                log::warn!("event loop closed during the asset load");
            }
        };

        // The fetch future isn't Send, so it runs on a blocking thread of its own that
        // drives it with the runtime handle.
        #[cfg(not(target_arch = "wasm32"))]
        {
            let handle = self.async_runtime.handle().clone();
            self.async_runtime.spawn_blocking(move || {
                let source = HostAssetSource::new();
                handle.block_on(fetch_model(&source, &path, emit));
            });
        }

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(async move {
                let source = HostAssetSource::new();
                fetch_model(&source, &path, emit).await;
            });
        }
    }
}

fn create_window(event_loop: &ActiveEventLoop, config: &ViewerConfig) -> anyhow::Result<Arc<Window>> {
    #[allow(unused_mut)]
    let mut window_attributes = Window::default_attributes().with_title(config.title.as_str());

    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;
        use winit::platform::web::WindowAttributesExtWebSys;

        let canvas = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(&config.dom.canvas_id))
            .ok_or_else(|| anyhow::anyhow!("canvas #{} not found", config.dom.canvas_id))?
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .map_err(|_| anyhow::anyhow!("#{} is not a canvas", config.dom.canvas_id))?;
        window_attributes = window_attributes.with_canvas(Some(canvas));
    }

    Ok(Arc::new(event_loop.create_window(window_attributes)?))
}

fn build_viewer(
    window: &Arc<Window>,
    renderer: GpuRenderer,
    config: &ViewerConfig,
) -> anyhow::Result<HostViewer> {
    let size = window.inner_size();
    let size = ViewportSize::new(size.width.max(1), size.height.max(1));
    let ctx = context::initialize(size, renderer, config);

    #[cfg(not(target_arch = "wasm32"))]
    let status = crate::status::WindowStatus::new(window.clone(), config.title.clone());
    #[cfg(target_arch = "wasm32")]
    let status = crate::status::DomStatus::from_document(&config.dom)?;

    Ok(Viewer::new(ctx, status, config))
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // resumed fires again on some platforms; the viewer is built only once
        if self.window.is_some() {
            return;
        }
        let window = match create_window(event_loop, &self.config) {
            Ok(window) => window,
            Err(err) => {
                log::error!("Unable to create the window: {err:#}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        #[cfg(not(target_arch = "wasm32"))]
        {
            let viewer = self
                .async_runtime
                .block_on(GpuRenderer::new(window.clone()))
                .and_then(|renderer| build_viewer(&window, renderer, &self.config));
            match viewer {
                Ok(viewer) => self.install(viewer),
                Err(err) => {
                    log::error!("Unable to set up the viewer: {err:#}");
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            let config = self.config.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let viewer = GpuRenderer::new(window.clone())
                    .await
                    .and_then(|renderer| build_viewer(&window, renderer, &config));
                match viewer {
                    Ok(viewer) => {
                        if proxy
                            .send_event(FlowEvent::Initialized(Box::new(viewer)))
                            .is_err()
                        {
                            log::error!("event loop closed before the viewer was ready");
                        }
                    }
                    Err(err) => log::error!("Unable to set up the viewer: {err:#}"),
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            #[cfg(target_arch = "wasm32")]
            FlowEvent::Initialized(mut viewer) => {
                // the canvas may have been sized while the renderer was set up
                if let Some(window) = &self.window {
                    viewer.resize(window.inner_size().into());
                }
                self.install(*viewer);
            }
            FlowEvent::Load(event) => {
                let (Some(viewer), Some(window)) = (&mut self.viewer, &self.window) else {
                    return;
                };
                if let Err(err) = viewer.handle_load_event(event, window.as_ref()) {
                    log::warn!("{err}");
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let (Some(viewer), Some(window)) = (&mut self.viewer, &self.window) else {
            return;
        };

        viewer.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                viewer.resize(size.into());
            }
            WindowEvent::RedrawRequested => match viewer.redraw(window.as_ref()) {
                Ok(_) => {}
                // Reconfigure the surface if it's lost or outdated
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    viewer.resize(window.inner_size().into());
                }
                Err(e) => {
                    log::error!("Unable to render {}", e);
                }
            },
            _ => {}
        }
    }
}

fn init_logging() -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        let env = env_logger::Env::default().default_filter_or("info");
        if let Err(e) = env_logger::Builder::from_env(env).try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info)?;
    }

    Ok(())
}

/// Open the viewer and run it until the window is closed.
pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    init_logging()?;

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop, config)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
