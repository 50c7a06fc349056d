//! Report assets (the brand logo) from disk or over HTTP.
//!
//! Asset problems never fail a report: they are logged and the asset is left
//! out of the page.

use std::path::PathBuf;
use std::time::Duration;

use image::RgbaImage;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetSource {
    Path(PathBuf),
    Url(String),
}

impl AssetSource {
    /// `http://` and `https://` locations are URLs, anything else a path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            AssetSource::Url(location.to_string())
        } else {
            AssetSource::Path(PathBuf::from(location))
        }
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),
}

async fn fetch(source: &AssetSource, timeout: Duration) -> Result<Vec<u8>, AssetError> {
    match source {
        AssetSource::Path(path) => {
            let read = tokio::fs::read(path);
            match tokio::time::timeout(timeout, read).await {
                Ok(result) => result.map_err(|source| AssetError::Read {
                    path: path.display().to_string(),
                    source,
                }),
                Err(_) => Err(AssetError::Timeout(timeout)),
            }
        }
        AssetSource::Url(url) => {
            let client = reqwest::Client::builder().timeout(timeout).build()?;
            let resp = client.get(url).send().await.map_err(|e| {
                if e.is_timeout() {
                    AssetError::Timeout(timeout)
                } else {
                    AssetError::Http(e)
                }
            })?;
            let status = resp.status();
            if !status.is_success() {
                return Err(AssetError::Status(status));
            }
            Ok(resp.bytes().await?.to_vec())
        }
    }
}

/// Fetch and decode an image.
pub async fn load_image(source: &AssetSource, timeout: Duration) -> Result<RgbaImage, AssetError> {
    let bytes = fetch(source, timeout).await?;
    debug!(bytes = bytes.len(), ?source, "fetched asset");
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

/// Like [`load_image`] but failures degrade to `None`.
pub async fn load_logo(source: &AssetSource, timeout: Duration) -> Option<RgbaImage> {
    match load_image(source, timeout).await {
        Ok(img) => Some(img),
        Err(err) => {
            warn!(?source, error = %err, "logo unavailable, rendering without it");
            None
        }
    }
}
