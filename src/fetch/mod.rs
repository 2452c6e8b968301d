//! Content fetcher - resolves a manifest location to a byte stream
//!
//! The location's scheme selects exactly one backend. Unknown schemes are
//! rejected when the location is parsed, before any I/O happens.

pub mod file;
pub mod http;
pub mod s3;

pub use file::FileBackend;
pub use http::HttpBackend;
pub use s3::{AmazonS3Connector, ObjectStoreConnector, S3Backend};

use crate::core::AgentConfig;
use crate::error::{Result, StretcherError};
use async_trait::async_trait;
use std::fmt;
use std::pin::Pin;
use std::str::FromStr;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::info;
use url::Url;

/// Readable manifest content
pub type ContentStream = Pin<Box<dyn AsyncRead + Send>>;

/// Location schemes the fetcher understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    S3,
    Http,
    Https,
    File,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::S3 => "s3",
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::File => "file",
        }
    }
}

impl FromStr for Scheme {
    type Err = StretcherError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "s3" => Ok(Scheme::S3),
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            "file" => Ok(Scheme::File),
            other => Err(StretcherError::Config(format!(
                "unsupported scheme '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed manifest location with a recognised scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLocation {
    scheme: Scheme,
    url: Url,
}

impl ContentLocation {
    /// Parse a location string
    ///
    /// Fails with a configuration error naming the location if it is not a
    /// URL or its scheme is not one of `s3`, `http`, `https`, `file`.
    pub fn parse(location: &str) -> Result<Self> {
        let url = Url::parse(location).map_err(|e| {
            StretcherError::Config(format!("invalid manifest URL {}: {}", location, e))
        })?;
        let scheme = url.scheme().parse::<Scheme>().map_err(|_| {
            StretcherError::Config(format!(
                "manifest URL scheme must be s3 or http(s) or file: {}",
                location
            ))
        })?;
        Ok(Self { scheme, url })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl FromStr for ContentLocation {
    type Err = StretcherError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ContentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// A storage backend able to open a location
#[async_trait]
pub trait Backend: Send + Sync {
    /// Open `location` for reading; one attempt, no retries
    async fn open(&self, location: &ContentLocation) -> Result<ContentStream>;
}

/// Dispatches a location to the backend for its scheme
pub struct ContentFetcher {
    s3: Box<dyn Backend>,
    http: Box<dyn Backend>,
    file: Box<dyn Backend>,
}

impl ContentFetcher {
    /// Fetcher with the real backends for `config`
    pub fn new(config: &AgentConfig) -> Self {
        Self::with_backends(
            Box::new(S3Backend::new(config.aws.clone())),
            Box::new(HttpBackend::new()),
            Box::new(FileBackend),
        )
    }

    /// Fetcher with explicit backends
    pub fn with_backends(
        s3: Box<dyn Backend>,
        http: Box<dyn Backend>,
        file: Box<dyn Backend>,
    ) -> Self {
        Self { s3, http, file }
    }

    fn backend_for(&self, scheme: Scheme) -> &dyn Backend {
        match scheme {
            Scheme::S3 => self.s3.as_ref(),
            Scheme::Http | Scheme::Https => self.http.as_ref(),
            Scheme::File => self.file.as_ref(),
        }
    }

    /// Parse `location` and open it
    pub async fn fetch(&self, location: &str) -> Result<ContentStream> {
        info!("loading URL {}", location);
        let location = ContentLocation::parse(location)?;
        self.fetch_location(&location).await
    }

    /// Open an already parsed location
    pub async fn fetch_location(&self, location: &ContentLocation) -> Result<ContentStream> {
        self.backend_for(location.scheme()).open(location).await
    }

    /// Fetch `location` and read it to the end
    pub async fn fetch_bytes(&self, location: &str) -> Result<Vec<u8>> {
        let mut stream = self.fetch(location).await?;
        let mut data = Vec::new();
        stream
            .read_to_end(&mut data)
            .await
            .map_err(|e| StretcherError::fetch(location, e))?;
        Ok(data)
    }
}
