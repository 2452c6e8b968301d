//! Core domain models
//!
//! This module defines the manifest, its pipelines and steps, the deploy run
//! state machine, and the agent's configuration context.

pub mod config;
pub mod manifest;
pub mod pipeline;
pub mod state;
pub mod step;

pub use config::{AgentConfig, AwsCredentials, CredentialsFile};
pub use manifest::Manifest;
pub use pipeline::{Commands, Pipeline};
pub use state::{DeployReport, RunState, RunTransition};
pub use step::Step;
