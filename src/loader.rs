//! Asset loading lifecycle.
//!
//! [`AssetLoader`] is a small state machine: `Idle -> Loading -> {Loaded, Failed}`.
//! It does no I/O itself. The async driver in [`crate::resources::fetch_model`] emits
//! [`LoadEvent`]s and the host feeds them to [`AssetLoader::handle`], which answers with
//! the [`Transition`] the viewer has to act on.
//!
//! Progress is counted in items, the way a loading manager does it: the asset is one
//! item and every external buffer or image it references is another. The load succeeds
//! once every started item ended and the parsed model is available.

use std::fmt;

use instant::Instant;

use crate::data_structures::model::Model;

/// Status text shown when the load failed.
pub const FAILED_TEXT: &str = "Failed to load model.";

pub fn progress_text(percent: u8) -> String {
    format!("Loading... {percent}%")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed,
}

impl LoadState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoadState::Loaded | LoadState::Failed)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadProgress {
    pub items_loaded: usize,
    pub items_total: usize,
}

impl LoadProgress {
    pub fn new(items_loaded: usize, items_total: usize) -> Self {
        Self {
            items_loaded,
            items_total,
        }
    }

    /// `round(loaded / total * 100)`, 0 while nothing was counted yet.
    pub fn percent(&self) -> u8 {
        if self.items_total == 0 {
            return 0;
        }
        let ratio = self.items_loaded.min(self.items_total) as f64 / self.items_total as f64;
        (ratio * 100.0).round() as u8
    }

    pub fn is_settled(&self) -> bool {
        self.items_total > 0 && self.items_loaded >= self.items_total
    }
}

impl fmt::Display for LoadProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", progress_text(self.percent()))
    }
}

/// Why an asset could not be loaded. All variants are shown to the user the same way.
#[derive(Debug, thiserror::Error)]
pub enum AssetLoadError {
    #[error("failed to fetch {url}")]
    Fetch {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to parse glTF document")]
    Parse(#[from] gltf::Error),
    #[error("invalid asset: {0}")]
    Invalid(String),
}

impl AssetLoadError {
    pub fn fetch(url: &str, err: anyhow::Error) -> Self {
        AssetLoadError::Fetch {
            url: url.to_string(),
            source: err.into(),
        }
    }
}

/// Misuse of the loader by its host.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LoaderError {
    #[error("load already started, loader is {0:?}")]
    NotIdle(LoadState),
    #[error("load event received before a load was started")]
    NotLoading,
}

/// Reported by the async driver.
#[derive(Debug)]
pub enum LoadEvent {
    /// A fetch started; `items_total` grows by one.
    ItemStart(String),
    /// A fetch finished, successfully or not.
    ItemEnd(String),
    /// The document was parsed into a model.
    Parsed(Model),
    Error(AssetLoadError),
}

impl LoadEvent {
    fn describe(&self) -> String {
        match self {
            LoadEvent::ItemStart(url) => format!("start of {url}"),
            LoadEvent::ItemEnd(url) => format!("end of {url}"),
            LoadEvent::Parsed(_) => "parsed model".to_string(),
            LoadEvent::Error(err) => format!("error {err}"),
        }
    }
}

/// What the host has to do after an event.
#[derive(Debug)]
pub enum Transition {
    Progress(LoadProgress),
    Loaded(Model),
    Failed(AssetLoadError),
}

#[derive(Debug)]
pub struct AssetLoader {
    state: LoadState,
    url: Option<String>,
    progress: LoadProgress,
    parsed: Option<Model>,
    started_at: Option<Instant>,
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader {
    pub fn new() -> Self {
        Self {
            state: LoadState::Idle,
            url: None,
            progress: LoadProgress::default(),
            parsed: None,
            started_at: None,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn progress(&self) -> LoadProgress {
        self.progress
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Begin loading `url`. Only one load per loader; later calls are rejected and change
    /// nothing.
    pub fn load(&mut self, url: &str) -> Result<(), LoaderError> {
        if self.state != LoadState::Idle {
            return Err(LoaderError::NotIdle(self.state));
        }
        log::info!("Loading {url}");
        self.state = LoadState::Loading;
        self.url = Some(url.to_string());
        self.started_at = Some(Instant::now());
        Ok(())
    }

    /// Apply one event. Events arriving after the load finished are dropped.
    pub fn handle(&mut self, event: LoadEvent) -> Result<Option<Transition>, LoaderError> {
        match self.state {
            LoadState::Idle => return Err(LoaderError::NotLoading),
            LoadState::Loaded | LoadState::Failed => {
                log::debug!("ignoring {} after the load finished", event.describe());
                return Ok(None);
            }
            LoadState::Loading => {}
        }

        let transition = match event {
            LoadEvent::ItemStart(url) => {
                log::debug!("fetching {url}");
                self.progress.items_total += 1;
                None
            }
            LoadEvent::ItemEnd(url) => {
                log::debug!("fetched {url}");
                self.progress.items_loaded += 1;
                self.try_complete()
                    .or(Some(Transition::Progress(self.progress)))
            }
            LoadEvent::Parsed(model) => {
                self.parsed = Some(model);
                self.try_complete()
            }
            LoadEvent::Error(err) => {
                self.state = LoadState::Failed;
                self.parsed = None;
                Some(Transition::Failed(err))
            }
        };
        Ok(transition)
    }

    fn try_complete(&mut self) -> Option<Transition> {
        if !self.progress.is_settled() {
            return None;
        }
        let model = self.parsed.take()?;
        self.state = LoadState::Loaded;
        let elapsed = self
            .started_at
            .map(|started_at| started_at.elapsed().as_millis())
            .unwrap_or_default();
        log::info!("Model loaded successfully! ({elapsed} ms)");
        Some(Transition::Loaded(model))
    }
}
