//! Test: full agent runs from event input to notification hooks

use crate::helpers::*;
use base64::Engine;
use stretcher::{
    Agent, AgentConfig, ContentFetcher, DeployOrchestrator, EventSource, LogSink, StretcherError,
};

fn agent(source: EventSource, runner: RecordingRunner, sink: LogSink) -> Agent<RecordingRunner> {
    let config = AgentConfig::new(source).with_user_event_name("deploy".to_string());
    let fetcher = ContentFetcher::new(&config);
    Agent::with_parts(config, fetcher, DeployOrchestrator::new(runner, sink))
}

fn consul_record(payload: &str, ltime: u64) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(payload);
    format!(
        r#"{{"ID":"id-{ltime}","Name":"deploy","Payload":"{encoded}","NodeFilter":"","ServiceFilter":"","TagFilter":"","Version":1,"LTime":{ltime}}}"#
    )
}

#[tokio::test]
async fn test_raw_line_event_deploys_file_manifest() {
    let sink = LogSink::new();
    let _guard = capture_logs(&sink);
    let manifest = write_temp(MANIFEST);

    let runner = RecordingRunner::new(sink.clone());
    let agent = agent(EventSource::RawLine, runner.clone(), sink.clone());
    let input = format!("{}\n", file_url(&manifest));

    agent.run(input.as_bytes()).await.unwrap();

    assert_eq!(
        runner.commands(),
        vec!["deploy-1", "deploy-2", "deploy-3", "notify-ok"]
    );
    let log = sink.contents_lossy();
    assert!(log.contains("Starting up stretcher agent"));
    assert!(log.contains("Serf user event: deploy"));
    assert!(log.contains("Deploy manifest succeeded."));
}

#[tokio::test]
async fn test_structured_event_uses_latest_payload() {
    let sink = LogSink::new();
    let stale = write_temp("commands:\n  deploy: [\"stale\"]\n");
    let current = write_temp(MANIFEST);

    let input = format!(
        "[{},{}]",
        consul_record(&file_url(&current), 9),
        consul_record(&file_url(&stale), 3)
    );

    let runner = RecordingRunner::new(sink.clone()).failing(&["deploy-3"]);
    let agent = agent(EventSource::StructuredStream, runner.clone(), sink);

    let err = agent.run(input.as_bytes()).await.unwrap_err();

    assert!(matches!(err, StretcherError::Deploy(ref f) if f.command == "deploy-3"));
    assert_eq!(runner.count("stale"), 0);
    assert_eq!(runner.count("notify-ng"), 1);
    assert_eq!(runner.count("notify-ok"), 0);
}

#[tokio::test]
async fn test_empty_input_is_no_event() {
    let sink = LogSink::new();

    for source in [EventSource::RawLine, EventSource::StructuredStream] {
        let runner = RecordingRunner::new(sink.clone());
        let agent = agent(source, runner.clone(), sink.clone());

        let err = agent.run(&b""[..]).await.unwrap_err();

        assert!(matches!(err, StretcherError::NoEvent(_)), "{:?}", source);
        assert!(runner.calls().is_empty());
    }
}

#[tokio::test]
async fn test_unknown_scheme_runs_nothing() {
    let sink = LogSink::new();
    let runner = RecordingRunner::new(sink.clone());
    let agent = agent(EventSource::RawLine, runner.clone(), sink);

    let err = agent.run(&b"ftp://host/manifest.yml\n"[..]).await.unwrap_err();

    match err {
        StretcherError::Config(msg) => assert!(msg.contains("ftp://host/manifest.yml")),
        other => panic!("Expected Config, got {:?}", other),
    }
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_garbage_manifest_runs_nothing() {
    let sink = LogSink::new();
    let garbage = write_temp("this: is: not: [a manifest");
    let runner = RecordingRunner::new(sink.clone());
    let agent = agent(EventSource::RawLine, runner.clone(), sink);

    let input = format!("{}\n", file_url(&garbage));
    let err = agent.run(input.as_bytes()).await.unwrap_err();

    assert!(matches!(err, StretcherError::ManifestParse(_)));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_missing_file_is_fetch_error() {
    let sink = LogSink::new();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yml");
    let runner = RecordingRunner::new(sink.clone());
    let agent = agent(EventSource::RawLine, runner.clone(), sink);

    let input = format!("file://{}\n", missing.display());
    let err = agent.run(input.as_bytes()).await.unwrap_err();

    assert!(matches!(err, StretcherError::Fetch { .. }));
    assert!(runner.calls().is_empty());
}
