//! stretcher - a deploy agent for Consul and Serf event handlers
//!
//! Reads a deploy event from standard input, fetches the manifest it names
//! (`s3://`, `http(s)://` or `file://`), runs its deploy steps, and then its
//! success or failure commands with the accumulated log on their stdin.

pub mod cli;
pub mod core;
pub mod error;
pub mod event;
pub mod execution;
pub mod fetch;
pub mod logging;

// Re-export commonly used types
pub use crate::core::{AgentConfig, AwsCredentials, DeployReport, Manifest, Pipeline, RunState, Step};
pub use error::{Result, StepFailure, StretcherError};
pub use event::EventSource;
pub use execution::{Agent, CommandRunner, DeployOrchestrator, ShellRunner};
pub use fetch::{ContentFetcher, ContentLocation, Scheme};
pub use logging::LogSink;
