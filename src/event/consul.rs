//! Consul event records as delivered to watch handlers on stdin

use crate::error::{Result, StretcherError};
use base64::Engine;
use serde::{Deserialize, Serialize};

/// One record of a Consul event watch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConsulEvent {
    #[serde(rename = "ID", default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Base64 encoded payload, `null` when the event carried none
    #[serde(default)]
    pub payload: Option<String>,

    #[serde(default)]
    pub node_filter: String,

    #[serde(default)]
    pub service_filter: String,

    #[serde(default)]
    pub tag_filter: String,

    #[serde(default)]
    pub version: u32,

    /// Lamport time of the event
    #[serde(rename = "LTime", default)]
    pub ltime: u64,
}

impl ConsulEvent {
    /// Decoded payload text; empty when there is no payload
    pub fn payload_string(&self) -> Result<String> {
        let Some(encoded) = self.payload.as_deref() else {
            return Ok(String::new());
        };

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| {
                StretcherError::EventParse(format!("event {} payload is not base64: {}", self.id, e))
            })?;

        String::from_utf8(bytes).map_err(|e| {
            StretcherError::EventParse(format!("event {} payload is not UTF-8: {}", self.id, e))
        })
    }
}

/// Decode a watch handler's input into event records
///
/// Whitespace-only input and a JSON `null` are an empty list.
pub fn parse_events(input: &[u8]) -> Result<Vec<ConsulEvent>> {
    if input.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let events: Option<Vec<ConsulEvent>> =
        serde_json::from_slice(input).map_err(|e| StretcherError::EventParse(e.to_string()))?;
    Ok(events.unwrap_or_default())
}

/// The newest event: highest `LTime`, later records winning ties
pub fn latest_event(events: Vec<ConsulEvent>) -> Option<ConsulEvent> {
    events
        .into_iter()
        .reduce(|newest, event| if event.ltime >= newest.ltime { event } else { newest })
}
