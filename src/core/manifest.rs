//! Deployment manifest and its YAML decoder

use crate::core::pipeline::{Commands, Pipeline};
use crate::error::{Result, StretcherError};
use serde::{Deserialize, Serialize};

/// A deployment unit: deploy steps plus success and failure hooks
///
/// ```yaml
/// name: "web"
/// commands:
///   deploy:
///     - "tar xzf /tmp/release.tar.gz -C /srv/app"
///     - name: "restart"
///       run: "systemctl restart app"
///   success:
///     - "mail -s deployed ops@example.com"
///   failure:
///     - "mail -s failed ops@example.com"
/// ```
///
/// Unknown top-level keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Optional label used in log output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub commands: Commands,
}

impl Manifest {
    /// Decode a manifest from fetched bytes
    ///
    /// Either the whole document is valid or an error is returned; a partial
    /// manifest is never produced.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let manifest: Manifest = serde_yaml::from_slice(bytes)
            .map_err(|e| StretcherError::ManifestParse(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Encode back to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| StretcherError::ManifestParse(e.to_string()))
    }

    /// The deploy steps
    pub fn deploy(&self) -> &Pipeline {
        &self.commands.deploy
    }

    /// Name for log output
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("manifest")
    }

    fn validate(&self) -> Result<()> {
        let pipelines = [
            ("deploy", &self.commands.deploy),
            ("success", &self.commands.success),
            ("failure", &self.commands.failure),
        ];

        for (pipeline_name, pipeline) in pipelines {
            if let Some((index, _)) = pipeline.first_blank_step() {
                return Err(StretcherError::ManifestParse(format!(
                    "commands.{}[{}]: step has an empty command",
                    pipeline_name, index
                )));
            }
        }

        Ok(())
    }
}
