//! Where load progress is shown.
//!
//! On the web this is the page's loading overlay: a text element and the overlay element
//! that is hidden once the model is in. Natively the window title carries the status
//! text until the model is loaded.

/// Text display plus an overlay that can be hidden once.
pub trait StatusSurface {
    fn show_text(&mut self, text: &str);
    fn hide_overlay(&mut self);
    fn overlay_visible(&self) -> bool;
}

#[cfg(not(target_arch = "wasm32"))]
pub type HostStatus = WindowStatus;
#[cfg(target_arch = "wasm32")]
pub type HostStatus = DomStatus;

/// Status in the window title: `"<title> - <text>"` while the overlay is up, the bare
/// title afterwards.
#[derive(Debug)]
pub struct WindowStatus {
    window: std::sync::Arc<winit::window::Window>,
    title: String,
    overlay_visible: bool,
}

impl WindowStatus {
    pub fn new(window: std::sync::Arc<winit::window::Window>, title: impl Into<String>) -> Self {
        let title = title.into();
        window.set_title(&title);
        Self {
            window,
            title,
            overlay_visible: true,
        }
    }
}

impl StatusSurface for WindowStatus {
    fn show_text(&mut self, text: &str) {
        if self.overlay_visible {
            self.window.set_title(&format!("{} - {}", self.title, text));
        }
    }

    fn hide_overlay(&mut self) {
        self.overlay_visible = false;
        self.window.set_title(&self.title);
    }

    fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }
}

#[cfg(target_arch = "wasm32")]
pub use dom::DomStatus;

#[cfg(target_arch = "wasm32")]
mod dom {
    use super::StatusSurface;
    use crate::config::DomConfig;

    /// The `loading-text` and `loading-overlay` elements of the host page.
    #[derive(Debug)]
    pub struct DomStatus {
        text: web_sys::Element,
        overlay: web_sys::Element,
        overlay_visible: bool,
    }

    impl DomStatus {
        pub fn from_document(config: &DomConfig) -> anyhow::Result<Self> {
            let document = web_sys::window()
                .and_then(|win| win.document())
                .ok_or_else(|| anyhow::anyhow!("no document"))?;
            let element = |id: &str| {
                document
                    .get_element_by_id(id)
                    .ok_or_else(|| anyhow::anyhow!("element #{id} not found"))
            };
            Ok(Self {
                text: element(&config.loading_text_id)?,
                overlay: element(&config.loading_overlay_id)?,
                overlay_visible: true,
            })
        }
    }

    impl StatusSurface for DomStatus {
        fn show_text(&mut self, text: &str) {
            self.text.set_text_content(Some(text));
        }

        fn hide_overlay(&mut self) {
            if let Err(err) = self.overlay.set_attribute("style", "display: none") {
                log::warn!("couldn't hide the loading overlay: {err:?}");
            }
            self.overlay_visible = false;
        }

        fn overlay_visible(&self) -> bool {
            self.overlay_visible
        }
    }
}
