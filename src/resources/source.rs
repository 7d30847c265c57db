use std::future::Future;

/// Where asset bytes come from.
///
/// Paths are relative, as written in the viewer config or inside a glTF document after
/// resolving against the document's directory.
pub trait AssetSource {
    fn fetch(&self, path: &str) -> impl Future<Output = anyhow::Result<Vec<u8>>>;
}

/// The platform's asset source: the working directory natively, the page's location on
/// the web.
#[derive(Clone, Debug, Default)]
pub struct HostAssetSource {
    #[cfg(not(target_arch = "wasm32"))]
    root: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl HostAssetSource {
    pub fn new() -> Self {
        Self::with_root(".")
    }

    pub fn with_root(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[cfg(target_arch = "wasm32")]
impl HostAssetSource {
    pub fn new() -> Self {
        Self {}
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let href = window
        .location()
        .href()
        .map_err(|err| anyhow::anyhow!("could not read the page location: {err:?}"))?;
    let base = reqwest::Url::parse(&href)?;
    Ok(base.join(file_name)?)
}

impl AssetSource for HostAssetSource {
    async fn fetch(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        #[cfg(target_arch = "wasm32")]
        let data = {
            let url = format_url(path)?;
            reqwest::get(url)
                .await?
                .error_for_status()?
                .bytes()
                .await?
                .to_vec()
        };
        #[cfg(not(target_arch = "wasm32"))]
        let data = tokio::fs::read(self.root.join(path)).await?;

        Ok(data)
    }
}
