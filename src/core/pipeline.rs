//! Pipeline domain model

use crate::core::step::Step;
use serde::{Deserialize, Serialize};

/// An ordered sequence of steps, run to completion or first failure
///
/// An empty pipeline is a valid no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index and step of the first step whose command is blank
    pub(crate) fn first_blank_step(&self) -> Option<(usize, &Step)> {
        self.steps
            .iter()
            .enumerate()
            .find(|(_, step)| step.command().trim().is_empty())
    }
}

impl<S: Into<Step>> FromIterator<S> for Pipeline {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// The three named pipelines of a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commands {
    /// Deploy steps; required
    pub deploy: Pipeline,

    /// Run after every deploy step succeeded
    #[serde(default)]
    pub success: Pipeline,

    /// Run after a deploy step failed
    #[serde(default)]
    pub failure: Pipeline,
}
