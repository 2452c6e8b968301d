//! Local filesystem backend for `file:///path` locations

use crate::error::{Result, StretcherError};
use crate::fetch::{Backend, ContentLocation, ContentStream};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;
use url::Url;

/// Opens the location's path on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileBackend;

impl FileBackend {
    /// Decoded path of a `file://` location; the host part is ignored
    pub fn path_of(location: &ContentLocation) -> Result<PathBuf> {
        let url = location.url();
        url.to_file_path()
            .or_else(|_| {
                debug!(host = ?url.host_str(), "Ignoring host of {}", location);
                Url::parse(&format!("file://{}", url.path()))
                    .map_err(|_| ())?
                    .to_file_path()
            })
            .map_err(|_| StretcherError::Config(format!("invalid file path in {}", location)))
    }
}

#[async_trait]
impl Backend for FileBackend {
    async fn open(&self, location: &ContentLocation) -> Result<ContentStream> {
        let path = Self::path_of(location)?;
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| StretcherError::fetch(location.as_str(), e))?;
        Ok(Box::pin(file))
    }
}
