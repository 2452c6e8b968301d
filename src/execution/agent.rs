//! Whole-run agent: event -> manifest -> deploy

use crate::{
    core::{AgentConfig, Manifest},
    error::Result,
    execution::{CommandRunner, DeployOrchestrator, ShellRunner},
    fetch::ContentFetcher,
    logging::LogSink,
};
use tokio::io::AsyncBufRead;
use tracing::{debug, info};

/// One invocation of the deploy agent
pub struct Agent<R> {
    config: AgentConfig,
    fetcher: ContentFetcher,
    orchestrator: DeployOrchestrator<R>,
}

impl Agent<ShellRunner> {
    /// Agent with the real backends and a shell runner
    pub fn new(config: AgentConfig, log: LogSink) -> Self {
        let fetcher = ContentFetcher::new(&config);
        let orchestrator = DeployOrchestrator::new(ShellRunner::new(), log);
        Self::with_parts(config, fetcher, orchestrator)
    }
}

impl<R: CommandRunner> Agent<R> {
    pub fn with_parts(
        config: AgentConfig,
        fetcher: ContentFetcher,
        orchestrator: DeployOrchestrator<R>,
    ) -> Self {
        Self {
            config,
            fetcher,
            orchestrator,
        }
    }

    /// Read the deploy event from `input`, then load and deploy its manifest
    pub async fn run<I>(&self, input: I) -> Result<()>
    where
        I: AsyncBufRead + Unpin,
    {
        info!("Starting up stretcher agent");
        if let Some(name) = &self.config.user_event_name {
            info!("Serf user event: {}", name);
        }

        let location = self.config.event_source.extract(input).await?;

        info!("Loading manifest: {}", location);
        let manifest = load_manifest(&self.fetcher, &location).await?;
        debug!("Manifest: {:?}", manifest);

        self.orchestrator.deploy(&manifest).await
    }
}

/// Fetch and decode the manifest at `location`
pub async fn load_manifest(fetcher: &ContentFetcher, location: &str) -> Result<Manifest> {
    let data = fetcher.fetch_bytes(location).await?;
    Manifest::decode(&data)
}
