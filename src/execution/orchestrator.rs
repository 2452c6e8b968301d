//! Deploy orchestrator - runs a manifest's deploy steps and then exactly one
//! of its notification pipelines

use crate::{
    core::{DeployReport, Manifest, Pipeline, RunTransition},
    error::{Result, StepFailure, StretcherError},
    execution::CommandRunner,
    logging::LogSink,
};
use chrono::Utc;
use tracing::{debug, error, info, warn};

/// Which notification pipeline is being run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Success,
    Failure,
}

impl Hook {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hook::Success => "success",
            Hook::Failure => "failure",
        }
    }
}

/// Executes manifests against a command runner
///
/// Hooks receive the log sink's content on their standard input. A failing
/// hook is logged but never changes the outcome of the run.
pub struct DeployOrchestrator<R> {
    runner: R,
    log: LogSink,
}

impl<R: CommandRunner> DeployOrchestrator<R> {
    pub fn new(runner: R, log: LogSink) -> Self {
        Self { runner, log }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run the manifest and return `Err` with the failing step if the deploy failed
    pub async fn deploy(&self, manifest: &Manifest) -> Result<()> {
        let report = self.execute(manifest).await;
        match report.deploy_failure {
            Some(failure) => Err(StretcherError::Deploy(failure)),
            None => Ok(()),
        }
    }

    /// Run the manifest through the full state machine
    pub async fn execute(&self, manifest: &Manifest) -> DeployReport {
        let mut report = DeployReport::new();
        advance(&mut report, RunTransition::Start);
        info!(
            "Executing {} ({}) with {} deploy steps",
            manifest.display_name(),
            report.run_id,
            manifest.deploy().len()
        );

        let hook = match self.run_pipeline(manifest.deploy(), None).await {
            Ok(completed) => {
                report.completed_steps = completed;
                info!("Deploy manifest succeeded.");
                advance(&mut report, RunTransition::DeploySucceeded);
                Hook::Success
            }
            Err(failure) => {
                report.completed_steps = failure.index;
                error!("Deploy manifest failed: {}", failure);
                report.deploy_failure = Some(failure);
                advance(&mut report, RunTransition::DeployFailed);
                Hook::Failure
            }
        };

        let pipeline = match hook {
            Hook::Success => &manifest.commands.success,
            Hook::Failure => &manifest.commands.failure,
        };
        report.hook_failure = self.notify(hook, pipeline).await;

        advance(&mut report, RunTransition::HooksFinished);
        report.finished_at = Some(Utc::now());
        report
    }

    /// Run a hook pipeline; its failure is returned for the report only
    async fn notify(&self, hook: Hook, pipeline: &Pipeline) -> Option<StepFailure> {
        info!("Running {} commands ({} steps)", hook.as_str(), pipeline.len());
        match self.run_pipeline(pipeline, Some(&self.log)).await {
            Ok(_) => None,
            Err(failure) => {
                warn!("{} commands failed: {}", hook.as_str(), failure);
                Some(failure)
            }
        }
    }

    /// Run steps in order, stopping at the first failure
    ///
    /// With `input`, each step reads a snapshot of the log sink taken just
    /// before it starts.
    async fn run_pipeline(
        &self,
        pipeline: &Pipeline,
        input: Option<&LogSink>,
    ) -> std::result::Result<usize, StepFailure> {
        for (index, step) in pipeline.steps().iter().enumerate() {
            info!("invoking command: {}", step.label());

            let snapshot = input.map(LogSink::contents);
            self.runner
                .run(step.command(), snapshot.as_deref())
                .await
                .map_err(|reason| StepFailure {
                    index,
                    command: step.command().to_string(),
                    reason,
                })?;
        }
        Ok(pipeline.len())
    }
}

fn advance(report: &mut DeployReport, transition: RunTransition) {
    match report.state.advance(transition) {
        Some(next) => {
            debug!("Run state {:?} -> {:?}", report.state, next);
            report.state = next;
        }
        None => error!("Invalid run transition {:?} from {:?}", transition, report.state),
    }
}
