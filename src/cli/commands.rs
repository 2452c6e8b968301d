//! CLI command definitions

use crate::event::EventSource;
use clap::Args;

/// Run the agent on standard input (the default command)
#[derive(Debug, Args, Clone, Default)]
pub struct RunCommand {
    /// Serf user event name; a non-empty value selects raw-line input
    #[arg(long, env = "SERF_USER_EVENT", hide_env_values = true)]
    pub serf_user_event: Option<String>,

    /// Force the input encoding instead of inferring it from SERF_USER_EVENT
    #[arg(long, value_enum)]
    pub event_source: Option<EventSourceArg>,
}

impl RunCommand {
    /// Selected event source: the explicit flag, else raw-line when a Serf
    /// user event name is set, else the Consul event stream
    pub fn event_source(&self) -> EventSource {
        match self.event_source {
            Some(arg) => arg.into(),
            None if self.user_event_name().is_some() => EventSource::RawLine,
            None => EventSource::StructuredStream,
        }
    }

    /// The Serf user event name, ignoring an empty value
    pub fn user_event_name(&self) -> Option<&str> {
        self.serf_user_event.as_deref().filter(|name| !name.is_empty())
    }
}

/// Fetch and decode a manifest without running it
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Manifest location (s3://, http(s)://, file://)
    pub location: String,

    /// Output the decoded manifest as JSON
    #[arg(long)]
    pub json: bool,
}

/// Event source argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EventSourceArg {
    /// One raw line (Serf user event handler)
    Raw,
    /// JSON event array (Consul watch handler)
    Structured,
}

impl From<EventSourceArg> for EventSource {
    fn from(arg: EventSourceArg) -> Self {
        match arg {
            EventSourceArg::Raw => EventSource::RawLine,
            EventSourceArg::Structured => EventSource::StructuredStream,
        }
    }
}
