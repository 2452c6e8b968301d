//! Step domain model

use serde::{Deserialize, Serialize};

/// A single invocable step of a manifest pipeline
///
/// In YAML a step is either a bare shell command or a mapping with a
/// human-readable label:
///
/// ```yaml
/// - "systemctl reload nginx"
/// - name: "migrate"
///   run: "bin/migrate --yes"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    /// Plain shell command
    Command(String),
    /// Shell command with a label used in log output
    Named { name: String, run: String },
}

impl Step {
    /// The shell command this step runs
    pub fn command(&self) -> &str {
        match self {
            Step::Command(command) => command,
            Step::Named { run, .. } => run,
        }
    }

    /// Label for log output; falls back to the command itself
    pub fn label(&self) -> &str {
        match self {
            Step::Command(command) => command,
            Step::Named { name, .. } => name,
        }
    }
}

impl From<&str> for Step {
    fn from(command: &str) -> Self {
        Step::Command(command.to_string())
    }
}
