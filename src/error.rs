//! Error types for the deploy agent

use thiserror::Error;

/// Errors surfaced by a run of the agent
#[derive(Debug, Error)]
pub enum StretcherError {
    /// Bad or missing credentials, unknown location scheme
    #[error("configuration error: {0}")]
    Config(String),

    /// No trigger payload was found on the input channel
    #[error("no event: {0}")]
    NoEvent(String),

    /// The structured event stream could not be decoded
    #[error("failed to parse events: {0}")]
    EventParse(String),

    /// The manifest bytes could not be decoded into a manifest
    #[error("failed to parse manifest: {0}")]
    ManifestParse(String),

    /// Manifest bytes could not be retrieved
    #[error("failed to fetch {location}: {message}")]
    Fetch { location: String, message: String },

    /// A deploy step failed
    #[error("deploy failed: {0}")]
    Deploy(StepFailure),
}

impl From<StepFailure> for StretcherError {
    fn from(failure: StepFailure) -> Self {
        StretcherError::Deploy(failure)
    }
}

impl StretcherError {
    /// Which part of a run failed, for reporting
    pub fn stage(&self) -> &'static str {
        match self {
            StretcherError::Config(_) => "Invalid configuration",
            StretcherError::NoEvent(_) | StretcherError::EventParse(_) => "Could not parse event",
            StretcherError::Fetch { .. } | StretcherError::ManifestParse(_) => "Load manifest failed",
            StretcherError::Deploy(_) => "Deploy manifest failed",
        }
    }

    pub(crate) fn fetch(location: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        StretcherError::Fetch {
            location: location.into(),
            message: cause.to_string(),
        }
    }
}

/// A single pipeline step that did not terminate successfully
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("step {index} `{command}` failed: {reason}")]
pub struct StepFailure {
    /// Zero-based position of the step within its pipeline
    pub index: usize,

    /// The command text of the step
    pub command: String,

    /// Why the step failed
    pub reason: FailureReason,
}

/// Why a step invocation failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FailureReason {
    #[error("could not spawn: {0}")]
    Spawn(String),

    #[error("exited with code {0}")]
    ExitCode(i32),

    #[error("terminated by signal")]
    Signal,

    #[error("i/o error: {0}")]
    Io(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, StretcherError>;
