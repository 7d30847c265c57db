//! Viewport sizing.
//!
//! The [`Viewport`] mirrors the size of the surface the viewer draws into (the native
//! window or the web canvas). Size changes are pushed in by the host and fanned out to
//! every registered resize handler.

use std::fmt::Debug;

/// Size of the display surface in physical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for ViewportSize {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

impl From<(u32, u32)> for ViewportSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

pub type ResizeHandler = Box<dyn FnMut(ViewportSize)>;

pub struct Viewport {
    size: ViewportSize,
    handlers: Vec<ResizeHandler>,
}

impl Viewport {
    pub fn new(size: ViewportSize) -> Self {
        Self {
            size,
            handlers: Vec::new(),
        }
    }

    pub fn current_size(&self) -> ViewportSize {
        self.size
    }

    /// Register a handler that runs after every accepted resize.
    ///
    /// The camera aspect and the renderer output are not handlers: they live in the same
    /// [`crate::context::ViewerContext`] as the viewport, which updates them right after
    /// the handlers ran. Handlers are for whatever else follows the surface size.
    pub fn on_resize(&mut self, handler: impl FnMut(ViewportSize) + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Record a new surface size and notify the handlers.
    ///
    /// Returns `false` and keeps the previous size when the new size has no area, which
    /// is what a minimized window reports.
    pub fn resize(&mut self, size: ViewportSize) -> bool {
        if size.is_empty() {
            log::debug!("ignoring resize to {}x{}", size.width, size.height);
            return false;
        }
        self.size = size;
        self.handlers.iter_mut().for_each(|handler| handler(size));
        true
    }
}

impl Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("size", &self.size)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
