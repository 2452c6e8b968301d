//! Deploy run state models

use crate::error::StepFailure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Position of a run in the deploy state machine
///
/// ```text
/// Idle -> Deploying -> NotifyingSuccess -> DoneOk
///                   \-> NotifyingFailure -> DoneError
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// Nothing has run yet
    Idle,
    /// Deploy steps are running
    Deploying,
    /// Deploy succeeded, success hooks are running
    NotifyingSuccess,
    /// Deploy failed, failure hooks are running
    NotifyingFailure,
    /// Run finished after a successful deploy
    DoneOk,
    /// Run finished after a failed deploy
    DoneError,
}

/// Inputs that move a run between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTransition {
    Start,
    DeploySucceeded,
    DeployFailed,
    HooksFinished,
}

impl RunState {
    /// Next state for `transition`, or `None` if it is not allowed here
    pub fn advance(self, transition: RunTransition) -> Option<RunState> {
        use RunTransition::{DeployFailed, DeploySucceeded, HooksFinished, Start};

        match (self, transition) {
            (RunState::Idle, Start) => Some(RunState::Deploying),
            (RunState::Deploying, DeploySucceeded) => Some(RunState::NotifyingSuccess),
            (RunState::Deploying, DeployFailed) => Some(RunState::NotifyingFailure),
            (RunState::NotifyingSuccess, HooksFinished) => Some(RunState::DoneOk),
            (RunState::NotifyingFailure, HooksFinished) => Some(RunState::DoneError),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::DoneOk | RunState::DoneError)
    }
}

/// Outcome of one orchestrated deploy
#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    /// Unique run ID
    pub run_id: Uuid,

    /// State the run ended in
    pub state: RunState,

    pub started_at: DateTime<Utc>,

    pub finished_at: Option<DateTime<Utc>>,

    /// Number of deploy steps that completed successfully
    pub completed_steps: usize,

    /// The deploy step that failed, if any
    #[serde(serialize_with = "serialize_failure")]
    pub deploy_failure: Option<StepFailure>,

    /// A hook step that failed; never changes the run's outcome
    #[serde(serialize_with = "serialize_failure")]
    pub hook_failure: Option<StepFailure>,
}

impl DeployReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            state: RunState::Idle,
            started_at: Utc::now(),
            finished_at: None,
            completed_steps: 0,
            deploy_failure: None,
            hook_failure: None,
        }
    }

    /// Whether the deploy itself succeeded
    pub fn succeeded(&self) -> bool {
        self.state == RunState::DoneOk
    }
}

impl Default for DeployReport {
    fn default() -> Self {
        Self::new()
    }
}

fn serialize_failure<S>(failure: &Option<StepFailure>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match failure {
        Some(failure) => serializer.serialize_some(&failure.to_string()),
        None => serializer.serialize_none(),
    }
}
