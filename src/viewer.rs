//! The viewer: context, loader, render loop and status surface wired together.
//!
//! The host owns one [`Viewer`] and forwards to it what happens outside: load events
//! coming back from the fetch task, window events, resizes and redraw requests.

use winit::event::WindowEvent;

use crate::{
    config::ViewerConfig,
    context::ViewerContext,
    loader::{AssetLoader, FAILED_TEXT, LoadEvent, LoaderError, Transition, progress_text},
    render::Renderer,
    render_loop::{FrameOutcome, FrameScheduler, RenderLoop, StartTrigger, start_signal},
    status::StatusSurface,
    viewport::ViewportSize,
};

pub struct Viewer<R: Renderer, S: StatusSurface> {
    pub ctx: ViewerContext<R>,
    loader: AssetLoader,
    render_loop: RenderLoop,
    start: Option<StartTrigger>,
    status: S,
}

impl<R: Renderer, S: StatusSurface> Viewer<R, S> {
    pub fn new(ctx: ViewerContext<R>, status: S, config: &ViewerConfig) -> Self {
        let (trigger, listener) = start_signal();
        Self {
            ctx,
            loader: AssetLoader::new(),
            render_loop: RenderLoop::new(listener, config.rotation_step),
            start: Some(trigger),
            status,
        }
    }

    pub fn loader(&self) -> &AssetLoader {
        &self.loader
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    pub fn status(&self) -> &S {
        &self.status
    }

    /// Begin the one asset load. The fetch itself is the host's job; its events come
    /// back through [`Viewer::handle_load_event`].
    pub fn load(&mut self, url: &str) -> Result<(), LoaderError> {
        self.loader.load(url)?;
        self.status.show_text(&progress_text(0));
        Ok(())
    }

    pub fn handle_load_event(
        &mut self,
        event: LoadEvent,
        scheduler: &impl FrameScheduler,
    ) -> Result<(), LoaderError> {
        match self.loader.handle(event)? {
            Some(Transition::Progress(progress)) => {
                self.status.show_text(&progress_text(progress.percent()));
            }
            Some(Transition::Loaded(mut model)) => {
                // the last item end completes the load; its progress is shown all the same
                self.status
                    .show_text(&progress_text(self.loader.progress().percent()));
                model.place_at_origin();
                self.ctx.scene.attach(model);
                self.status.hide_overlay();
                if let Some(trigger) = self.start.take() {
                    trigger.fire();
                }
            }
            Some(Transition::Failed(err)) => {
                log::error!("{:?}", anyhow::Error::from(err));
                self.status.show_text(FAILED_TEXT);
                // the loop never starts without its trigger
                self.start = None;
            }
            None => {}
        }
        self.render_loop.poll_start(scheduler);
        Ok(())
    }

    pub fn resize(&mut self, size: ViewportSize) -> bool {
        self.ctx.resize(size)
    }

    /// Pass input to the orbit controls. Returns `true` if they used it.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        let size = self.ctx.viewport.current_size();
        self.ctx
            .controls
            .handle_window_event(event, &self.ctx.camera, &self.ctx.projection, size)
    }

    pub fn redraw(&mut self, scheduler: &impl FrameScheduler) -> Result<FrameOutcome, R::Error> {
        self.render_loop.frame(&mut self.ctx, scheduler)
    }
}
