//! Object storage backend for `s3://bucket/key` locations

use crate::core::AwsCredentials;
use crate::error::{Result, StretcherError};
use crate::fetch::{Backend, ContentLocation, ContentStream};
use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::io;
use std::sync::Arc;
use tokio_util::io::StreamReader;
use tracing::debug;

/// Builds an object store client for one bucket
pub trait ObjectStoreConnector: Send + Sync {
    fn connect(&self, bucket: &str, credentials: &AwsCredentials) -> Result<Arc<dyn ObjectStore>>;
}

/// Connects to Amazon S3 or an S3-compatible endpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct AmazonS3Connector;

impl ObjectStoreConnector for AmazonS3Connector {
    fn connect(&self, bucket: &str, credentials: &AwsCredentials) -> Result<Arc<dyn ObjectStore>> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_region(&credentials.region)
            .with_access_key_id(&credentials.access_key_id)
            .with_secret_access_key(&credentials.secret_access_key);

        if let Some(token) = &credentials.session_token {
            builder = builder.with_token(token);
        }
        if let Some(endpoint) = &credentials.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder
            .build()
            .map_err(|e| StretcherError::Config(format!("failed to create S3 client: {}", e)))?;
        Ok(Arc::new(store))
    }
}

/// Reads objects using previously configured credentials
pub struct S3Backend {
    credentials: Option<AwsCredentials>,
    connector: Arc<dyn ObjectStoreConnector>,
}

impl S3Backend {
    pub fn new(credentials: Option<AwsCredentials>) -> Self {
        Self::with_connector(credentials, Arc::new(AmazonS3Connector))
    }

    pub fn with_connector(
        credentials: Option<AwsCredentials>,
        connector: Arc<dyn ObjectStoreConnector>,
    ) -> Self {
        Self {
            credentials,
            connector,
        }
    }

    fn usable_credentials(&self) -> Result<&AwsCredentials> {
        self.credentials
            .as_ref()
            .filter(|creds| creds.is_usable())
            .ok_or_else(|| {
                StretcherError::Config(
                    "Invalid AWS Auth or Region. Please check env AWS_CONFIG_FILE.".to_string(),
                )
            })
    }
}

/// Bucket and object key of an `s3://` location
fn bucket_and_key(location: &ContentLocation) -> Result<(&str, ObjectPath)> {
    let url = location.url();
    let bucket = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| StretcherError::Config(format!("missing bucket in {}", location)))?;

    let key = url.path().trim_start_matches('/');
    if key.is_empty() {
        return Err(StretcherError::Config(format!("missing object key in {}", location)));
    }
    let key = ObjectPath::from_url_path(key)
        .map_err(|e| StretcherError::Config(format!("invalid object key in {}: {}", location, e)))?;

    Ok((bucket, key))
}

#[async_trait]
impl Backend for S3Backend {
    async fn open(&self, location: &ContentLocation) -> Result<ContentStream> {
        let credentials = self.usable_credentials()?;
        let (bucket, key) = bucket_and_key(location)?;

        debug!(bucket, key = %key, region = %credentials.region, "Fetching object");
        let store = self.connector.connect(bucket, credentials)?;
        let result = store
            .get(&key)
            .await
            .map_err(|e| StretcherError::fetch(location.as_str(), e))?;

        let stream = result.into_stream().map_err(io::Error::other);
        Ok(Box::pin(StreamReader::new(stream)))
    }
}
