use anyhow::{Context, Result};
use stretcher::cli::commands::{RunCommand, ValidateCommand};
use stretcher::cli::output::*;
use stretcher::cli::{Cli, Command};
use stretcher::execution::load_manifest;
use stretcher::{Agent, AgentConfig, ContentFetcher, EventSource, LogSink, Manifest, StretcherError};
use tokio::io::BufReader;
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Every log line also lands in the sink handed to the notification hooks
    let log = LogSink::new();
    stretcher::logging::init(&log, cli.verbose).context("Failed to initialize logging")?;

    match &cli.command {
        None => run_agent(&cli, &cli.run, log).await,
        Some(Command::Run(cmd)) => run_agent(&cli, cmd, log).await,
        Some(Command::Validate(cmd)) => validate_manifest(&cli, cmd).await,
    }
}

async fn run_agent(cli: &Cli, cmd: &RunCommand, log: LogSink) -> Result<()> {
    if let Err(e) = deploy_from_stdin(cli, cmd, log).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn deploy_from_stdin(cli: &Cli, cmd: &RunCommand, log: LogSink) -> Result<()> {
    let config = cli.agent_config(cmd).map_err(with_stage)?;
    let agent = Agent::new(config, log);
    agent
        .run(BufReader::new(tokio::io::stdin()))
        .await
        .map_err(with_stage)
}

fn with_stage(e: StretcherError) -> anyhow::Error {
    let stage = e.stage();
    anyhow::Error::new(e).context(stage)
}

async fn validate_manifest(cli: &Cli, cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating manifest {}", INFO, style(&cmd.location).cyan());

    match fetch_manifest(cli, &cmd.location).await {
        Ok(manifest) => {
            println!("{} Manifest is valid!", CHECK);
            println!("{}", format_manifest(&manifest));

            if cmd.json {
                let json = serde_json::to_string_pretty(&manifest)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    }
}

async fn fetch_manifest(cli: &Cli, location: &str) -> stretcher::Result<Manifest> {
    let mut config = AgentConfig::new(EventSource::StructuredStream);
    if let Some(credentials) = cli.credentials()? {
        config = config.with_aws(credentials);
    }
    let fetcher = ContentFetcher::new(&config);
    load_manifest(&fetcher, location).await
}
