use base64::Engine;

use crate::loader::{AssetLoadError, LoadEvent};

/**
 * This module contains all logic for fetching the asset and the files it references and
 * turning them into a [`crate::data_structures::model::Model`].
 */
pub mod gltf_model;
pub mod source;

pub use gltf_model::load_model_gltf;
pub use source::{AssetSource, HostAssetSource};

/// Drive one asset load and report it as [`LoadEvent`]s.
///
/// The asset is an item of its own: it starts before the document is fetched and ends
/// after parsing finished, so the counts only settle once the model is ready.
pub async fn fetch_model<S: AssetSource>(source: &S, path: &str, mut emit: impl FnMut(LoadEvent)) {
    emit(LoadEvent::ItemStart(path.to_string()));
    match load_model_gltf(source, path, &mut emit).await {
        Ok(model) => emit(LoadEvent::Parsed(model)),
        Err(err) => emit(LoadEvent::Error(err)),
    }
    emit(LoadEvent::ItemEnd(path.to_string()));
}

/// Fetch a file the document references, bracketed by its start/end events.
pub(crate) async fn fetch_item<S: AssetSource>(
    source: &S,
    url: &str,
    emit: &mut impl FnMut(LoadEvent),
) -> Result<Vec<u8>, AssetLoadError> {
    emit(LoadEvent::ItemStart(url.to_string()));
    let result = source
        .fetch(url)
        .await
        .map_err(|err| AssetLoadError::fetch(url, err));
    emit(LoadEvent::ItemEnd(url.to_string()));
    result
}

/// Resolve a URI found inside the document at `base`.
///
/// Absolute URLs and rooted paths are kept; anything else is relative to the directory
/// of `base`.
pub fn resolve_uri(base: &str, uri: &str) -> String {
    if uri.contains("://") || uri.starts_with('/') {
        return uri.to_string();
    }
    match base.rfind('/') {
        Some(idx) => format!("{}{}", &base[..=idx], uri),
        None => uri.to_string(),
    }
}

/// Decode a base64 `data:` URI. Returns `None` for any other URI.
pub fn decode_data_uri(uri: &str) -> Option<Result<Vec<u8>, AssetLoadError>> {
    let rest = uri.strip_prefix("data:")?;
    let decoded = match rest.split_once(',') {
        Some((meta, payload)) if meta.ends_with(";base64") => base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|err| AssetLoadError::Invalid(format!("bad base64 data URI: {err}"))),
        _ => Err(AssetLoadError::Invalid(
            "only base64 data URIs are supported".to_string(),
        )),
    };
    Some(decoded)
}
