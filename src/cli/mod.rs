//! Command-line interface

pub mod commands;
pub mod output;

use crate::core::config::{AgentConfig, AwsCredentials, CredentialsFile, DEFAULT_PROFILE};
use crate::error::Result;
use clap::{Parser, Subcommand};
use commands::{RunCommand, ValidateCommand};
use std::ffi::OsString;

/// Deploy agent for Consul watch and Serf event handlers
#[derive(Debug, Parser, Clone)]
#[command(name = "stretcher")]
#[command(version = "0.1.0")]
#[command(about = "Deploys a manifest named by a Consul or Serf event", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options for the default run command
    #[command(flatten)]
    pub run: RunCommand,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Credentials file for s3:// locations
    #[arg(long, global = true, env = "AWS_CONFIG_FILE")]
    pub credentials_file: Option<String>,

    /// Profile within the credentials file
    #[arg(long, global = true, env = "AWS_DEFAULT_PROFILE")]
    pub profile: Option<String>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Read a deploy event from stdin and deploy its manifest (default)
    Run(RunCommand),

    /// Fetch and decode a manifest without running it
    Validate(ValidateCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }

    /// Selected profile name, `default` when unset or empty
    pub fn profile_name(&self) -> &str {
        self.profile
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PROFILE)
    }

    /// Credentials from the credentials file, if one is configured
    pub fn credentials(&self) -> Result<Option<AwsCredentials>> {
        match self.credentials_file.as_deref().filter(|f| !f.is_empty()) {
            Some(path) => {
                let credentials = CredentialsFile::from_file(path)?.profile(self.profile_name())?;
                Ok(Some(credentials))
            }
            None => Ok(None),
        }
    }

    /// Build the run configuration for `run`
    pub fn agent_config(&self, run: &RunCommand) -> Result<AgentConfig> {
        let mut config = AgentConfig::new(run.event_source());
        if let Some(name) = run.user_event_name() {
            config = config.with_user_event_name(name.to_string());
        }
        if let Some(credentials) = self.credentials()? {
            config = config.with_aws(credentials);
        }
        Ok(config)
    }
}
