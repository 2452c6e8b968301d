//! Agent configuration and credentials file

use crate::error::{Result, StretcherError};
use crate::event::EventSource;
use ini::{Ini, Properties};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Profile used when none is selected
pub const DEFAULT_PROFILE: &str = "default";

/// Configuration context for one run, built once at startup
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// How the deploy event is read from standard input
    pub event_source: EventSource,

    /// Serf user event name, logged when present
    pub user_event_name: Option<String>,

    /// Object storage credentials; `None` disables `s3://` locations
    pub aws: Option<AwsCredentials>,
}

impl AgentConfig {
    pub fn new(event_source: EventSource) -> Self {
        Self {
            event_source,
            user_event_name: None,
            aws: None,
        }
    }

    pub fn with_user_event_name(mut self, name: String) -> Self {
        self.user_event_name = Some(name);
        self
    }

    pub fn with_aws(mut self, credentials: AwsCredentials) -> Self {
        self.aws = Some(credentials);
        self
    }
}

/// Access credentials and target region for object storage
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub region: String,

    /// Custom endpoint for S3-compatible stores
    pub endpoint: Option<String>,
}

impl AwsCredentials {
    pub fn new(access_key_id: &str, secret_access_key: &str, region: &str) -> Self {
        Self {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
            session_token: None,
            region: region.to_string(),
            endpoint: None,
        }
    }

    /// Both an access key and a region are present
    pub fn is_usable(&self) -> bool {
        !self.access_key_id.is_empty() && !self.region.is_empty()
    }

    fn from_section(section: &Properties) -> Self {
        let text = |key: &str| section.get(key).unwrap_or_default().to_string();
        let optional = |key: &str| section.get(key).filter(|v| !v.is_empty()).map(str::to_string);

        Self {
            access_key_id: text("aws_access_key_id"),
            secret_access_key: text("aws_secret_access_key"),
            session_token: optional("aws_session_token"),
            region: text("region"),
            endpoint: optional("endpoint_url"),
        }
    }
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// An AWS CLI style config file, one INI section per profile
///
/// ```ini
/// [default]
/// aws_access_key_id = AKIA...
/// aws_secret_access_key = ...
/// region = ap-northeast-1
///
/// [profile staging]
/// aws_access_key_id = AKIA...
/// aws_secret_access_key = ...
/// region = us-east-1
/// endpoint_url = http://localhost:9000
/// ```
///
/// Sections may be named `name` or `profile name`.
#[derive(Debug, Clone, Default)]
pub struct CredentialsFile {
    profiles: HashMap<String, AwsCredentials>,
}

impl CredentialsFile {
    /// Load a credentials file from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            StretcherError::Config(format!(
                "Load AWS_CONFIG_FILE failed: {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_ini(&content)
    }

    /// Parse credentials from INI text
    pub fn from_ini(content: &str) -> Result<Self> {
        let ini = Ini::load_from_str(content)
            .map_err(|e| StretcherError::Config(format!("Load AWS_CONFIG_FILE failed: {}", e)))?;

        let profiles = ini
            .iter()
            .filter_map(|(name, section)| {
                let name = name?.trim();
                let name = name.strip_prefix("profile ").map_or(name, str::trim);
                Some((name.to_string(), AwsCredentials::from_section(section)))
            })
            .collect();

        Ok(Self { profiles })
    }

    /// Credentials of the named profile
    pub fn profile(&self, name: &str) -> Result<AwsCredentials> {
        self.profiles.get(name).cloned().ok_or_else(|| {
            StretcherError::Config(format!(
                "Load AWS_CONFIG_FILE failed: profile '{}' not found",
                name
            ))
        })
    }
}
