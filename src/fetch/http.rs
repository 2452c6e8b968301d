//! HTTP(S) backend

use crate::error::{Result, StretcherError};
use crate::fetch::{Backend, ContentLocation, ContentStream};
use async_trait::async_trait;
use futures::TryStreamExt;
use std::io;
use tokio_util::io::StreamReader;
use tracing::{debug, warn};

/// Plain GET against the location URL
///
/// The response status is not checked: an error body is handed to the
/// manifest decoder like any other body.
#[derive(Debug, Clone, Default)]
pub struct HttpBackend {
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn open(&self, location: &ContentLocation) -> Result<ContentStream> {
        let response = self
            .client
            .get(location.as_str())
            .send()
            .await
            .map_err(|e| StretcherError::fetch(location.as_str(), e))?;

        let status = response.status();
        if status.is_success() {
            debug!(status = %status, "GET {}", location);
        } else {
            warn!(status = %status, "GET {} returned a non-success status", location);
        }

        let stream = response.bytes_stream().map_err(io::Error::other);
        Ok(Box::pin(StreamReader::new(stream)))
    }
}
