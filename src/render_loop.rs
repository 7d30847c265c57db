//! The per-frame update/render cycle.
//!
//! The loop starts idle and waits on a one-shot start signal. The loader side holds the
//! [`StartTrigger`] and fires it on a successful load; dropping it instead (a failed
//! load) leaves the loop idle for good. Once running, every frame requests the next one
//! from the host's [`FrameScheduler`], so frame N+1 only ever follows frame N.

use cgmath::Rad;
use futures::channel::oneshot;

use crate::{context::ViewerContext, render::Renderer};

/// Asks the host for another frame at the next display refresh.
pub trait FrameScheduler {
    fn request_frame(&self);
}

impl FrameScheduler for winit::window::Window {
    fn request_frame(&self) {
        self.request_redraw();
    }
}

#[derive(Debug)]
pub struct StartTrigger(oneshot::Sender<()>);

impl StartTrigger {
    pub fn fire(self) {
        if self.0.send(()).is_err() {
            log::warn!("render loop went away before it was started");
        }
    }
}

#[derive(Debug)]
pub struct StartListener(oneshot::Receiver<()>);

pub fn start_signal() -> (StartTrigger, StartListener) {
    let (tx, rx) = oneshot::channel();
    (StartTrigger(tx), StartListener(rx))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Not started; nothing was drawn and no frame was requested.
    Idle,
    Rendered,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StartError {
    #[error("the render loop was already started")]
    AlreadyStarted,
    #[error("the start signal has not fired")]
    NotSignalled,
}

#[derive(Debug)]
enum Phase {
    Waiting(StartListener),
    Running,
    /// The trigger was dropped without firing.
    Abandoned,
}

#[derive(Debug)]
pub struct RenderLoop {
    phase: Phase,
    rotation_step: Rad<f32>,
    frames: u64,
}

impl RenderLoop {
    pub fn new(listener: StartListener, rotation_step: Rad<f32>) -> Self {
        Self {
            phase: Phase::Waiting(listener),
            rotation_step,
            frames: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running)
    }

    pub fn is_abandoned(&self) -> bool {
        matches!(self.phase, Phase::Abandoned)
    }

    /// Frames run since the start.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Check the start signal and start if it fired. Returns `true` if this call started
    /// the loop.
    pub fn poll_start(&mut self, scheduler: &impl FrameScheduler) -> bool {
        matches!(self.phase, Phase::Waiting(_)) && self.start(scheduler).is_ok()
    }

    /// Start the loop and request the first frame. Only succeeds once, and only after the
    /// start signal fired.
    pub fn start(&mut self, scheduler: &impl FrameScheduler) -> Result<(), StartError> {
        let listener = match &mut self.phase {
            Phase::Running => return Err(StartError::AlreadyStarted),
            Phase::Abandoned => return Err(StartError::NotSignalled),
            Phase::Waiting(listener) => listener,
        };
        match listener.0.try_recv() {
            Ok(Some(())) => {}
            Ok(None) => return Err(StartError::NotSignalled),
            Err(oneshot::Canceled) => {
                log::warn!("start signal dropped, the render loop stays idle");
                self.phase = Phase::Abandoned;
                return Err(StartError::NotSignalled);
            }
        }
        self.phase = Phase::Running;
        log::info!("render loop started");
        scheduler.request_frame();
        Ok(())
    }

    /// Run one frame: turn the model, step the controls, draw and request the next frame.
    ///
    /// The next frame is requested even when drawing failed; the error goes to the host.
    pub fn frame<R: Renderer>(
        &mut self,
        ctx: &mut ViewerContext<R>,
        scheduler: &impl FrameScheduler,
    ) -> Result<FrameOutcome, R::Error> {
        if !self.is_running() {
            return Ok(FrameOutcome::Idle);
        }

        if let Some(model) = ctx.scene.model_mut() {
            model.transform.rotate_y(self.rotation_step);
        }
        ctx.controls.update(&mut ctx.camera);
        let rendered = ctx
            .renderer
            .render(&ctx.scene, &ctx.camera, &ctx.projection);
        self.frames += 1;

        scheduler.request_frame();
        rendered.map(|()| FrameOutcome::Rendered)
    }
}
