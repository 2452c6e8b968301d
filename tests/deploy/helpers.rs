//! Test utility functions for stretcher

use async_trait::async_trait;
use axum::{http::StatusCode, routing::get, Router};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use stretcher::error::FailureReason;
use stretcher::logging::{self, LogSink};
use stretcher::CommandRunner;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

/// One command seen by [`RecordingRunner`]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub command: String,
    pub stdin: Option<Vec<u8>>,
    /// Log sink content at the moment the command started
    pub log_at_start: Vec<u8>,
}

/// Runner that records commands and fails the ones it is told to
#[derive(Clone)]
pub struct RecordingRunner {
    log: LogSink,
    failing: Vec<String>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl RecordingRunner {
    pub fn new(log: LogSink) -> Self {
        Self {
            log,
            failing: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(mut self, commands: &[&str]) -> Self {
        self.failing = commands.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.command).collect()
    }

    /// How many times `command` ran
    pub fn count(&self, command: &str) -> usize {
        self.calls().iter().filter(|c| c.command == command).count()
    }

    /// The recorded call of `command`, panicking if it never ran
    pub fn call(&self, command: &str) -> RecordedCall {
        self.calls()
            .into_iter()
            .find(|c| c.command == command)
            .unwrap_or_else(|| panic!("{} was never run", command))
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &str, stdin: Option<&[u8]>) -> Result<(), FailureReason> {
        self.calls.lock().unwrap().push(RecordedCall {
            command: command.to_string(),
            stdin: stdin.map(|s| s.to_vec()),
            log_at_start: self.log.contents(),
        });

        if self.failing.iter().any(|f| f == command) {
            Err(FailureReason::ExitCode(1))
        } else {
            Ok(())
        }
    }
}

/// Route this thread's log lines into `sink` until the guard drops
pub fn capture_logs(sink: &LogSink) -> DefaultGuard {
    tracing::subscriber::set_default(logging::subscriber(sink, EnvFilter::new("info"), false))
}

/// Write `content` to a temp file
pub fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

/// `file://` URL of a temp file
pub fn file_url(file: &tempfile::NamedTempFile) -> String {
    format!("file://{}", file.path().display())
}

/// Serve `body` with `status` at `/manifest.yml` on an ephemeral port
///
/// Returns the manifest URL and a hit counter.
pub async fn serve_manifest(status: StatusCode, body: &str) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let body = body.to_string();
    let counter = hits.clone();

    let app = Router::new().route(
        "/manifest.yml",
        get(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let body = body.clone();
            async move { (status, body) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/manifest.yml", addr), hits)
}

pub const MANIFEST: &str = r#"
name: "web"
commands:
  deploy:
    - "deploy-1"
    - "deploy-2"
    - "deploy-3"
  success:
    - "notify-ok"
  failure:
    - "notify-ng"
"#;
