//! Deploy event extraction from the handler's standard input
//!
//! Serf user event handlers receive the payload as a raw line; Consul watch
//! handlers receive a JSON array of event records. Both are reduced to one
//! string naming the manifest to deploy.

pub mod consul;

pub use consul::{latest_event, parse_events, ConsulEvent};

use crate::error::{Result, StretcherError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};
use tracing::info;

/// How the deploy event is encoded on the input channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    /// A single raw line (Serf user event)
    RawLine,
    /// A JSON array of event records (Consul event watch)
    StructuredStream,
}

impl EventSource {
    /// Read exactly one deploy event from `input`
    ///
    /// Blocks until a line is available or the input is closed.
    pub async fn extract<R>(self, mut input: R) -> Result<String>
    where
        R: AsyncBufRead + Unpin,
    {
        info!("Waiting for events from STDIN...");
        match self {
            EventSource::RawLine => read_raw_line(&mut input).await,
            EventSource::StructuredStream => read_structured(&mut input).await,
        }
    }
}

async fn read_raw_line<R>(input: &mut R) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    info!("Reading Serf user event");
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .await
        .map_err(|e| StretcherError::NoEvent(format!("failed to read STDIN: {}", e)))?;

    if read == 0 {
        return Err(StretcherError::NoEvent("no line on STDIN".to_string()));
    }

    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(line)
}

async fn read_structured<R>(input: &mut R) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    info!("Reading Consul event");
    let mut buf = Vec::new();
    input
        .read_to_end(&mut buf)
        .await
        .map_err(|e| StretcherError::EventParse(format!("failed to read STDIN: {}", e)))?;

    let events = parse_events(&buf)?;
    let count = events.len();
    let event = latest_event(events)
        .ok_or_else(|| StretcherError::NoEvent("no events found".to_string()))?;

    info!(id = %event.id, name = %event.name, ltime = event.ltime, count, "Selected Consul event");
    event.payload_string()
}
