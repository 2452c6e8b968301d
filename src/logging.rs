//! Log sink and tracing subscriber setup
//!
//! Every formatted log line is written to standard error and appended to a
//! [`LogSink`]. The sink's content is what notification hooks receive on
//! their standard input at the end of a run.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::Subscriber;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Append-only in-memory copy of everything the agent logs
///
/// Cloning shares the underlying buffer. Writes are appended in order under a
/// lock, so a reader always sees every line written before it.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append raw bytes to the end of the buffer
    pub fn append(&self, bytes: &[u8]) {
        self.lock().extend_from_slice(bytes);
    }

    /// Snapshot of the full buffer content
    pub fn contents(&self) -> Vec<u8> {
        self.lock().clone()
    }

    /// Snapshot decoded as text, replacing invalid UTF-8
    pub fn contents_lossy(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// `io::Write` handle appending to a [`LogSink`]
#[derive(Debug)]
pub struct LogSinkWriter {
    sink: LogSink,
}

impl Write for LogSinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = LogSinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogSinkWriter { sink: self.clone() }
    }
}

/// Build a fmt subscriber that appends to `sink`
///
/// With `mirror_to_stderr` each line is also written to standard error.
/// Colours are disabled so the sink holds plain text.
pub fn subscriber(
    sink: &LogSink,
    filter: EnvFilter,
    mirror_to_stderr: bool,
) -> impl Subscriber + Send + Sync {
    let writer = if mirror_to_stderr {
        BoxMakeWriter::new(io::stderr.and(sink.clone()))
    } else {
        BoxMakeWriter::new(sink.clone())
    };

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer)
        .finish()
}

/// Install the process-wide subscriber
///
/// `RUST_LOG` takes precedence unless `verbose` forces debug output.
pub fn init(sink: &LogSink, verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing::subscriber::set_global_default(subscriber(sink, filter, true))
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))
}
