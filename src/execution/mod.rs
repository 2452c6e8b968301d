//! Manifest execution

pub mod agent;
pub mod orchestrator;
pub mod runner;

pub use agent::{load_manifest, Agent};
pub use orchestrator::{DeployOrchestrator, Hook};
pub use runner::{CommandRunner, ShellRunner};
