//! Test: deploy pipeline outcome selects exactly one notification pipeline

use crate::helpers::*;
use stretcher::{DeployOrchestrator, LogSink, Manifest, RunState, StretcherError};

/// A failing first deploy step runs only the failure hook, with the log so far on stdin
#[tokio::test]
async fn test_failed_deploy_pipes_log_to_failure_hook() {
    let sink = LogSink::new();
    let _guard = capture_logs(&sink);

    let runner = RecordingRunner::new(sink.clone()).failing(&["deploy-1"]);
    let orchestrator = DeployOrchestrator::new(runner.clone(), sink.clone());
    let manifest = Manifest::decode(MANIFEST.as_bytes()).unwrap();

    let err = orchestrator.deploy(&manifest).await.unwrap_err();

    match err {
        StretcherError::Deploy(failure) => {
            assert_eq!(failure.index, 0);
            assert_eq!(failure.command, "deploy-1");
        }
        other => panic!("Expected Deploy, got {:?}", other),
    }

    assert_eq!(runner.commands(), vec!["deploy-1", "notify-ng"]);
    assert_eq!(runner.count("notify-ng"), 1);
    assert_eq!(runner.count("notify-ok"), 0);

    let hook = runner.call("notify-ng");
    let stdin = hook.stdin.expect("failure hook gets stdin");
    assert_eq!(stdin, hook.log_at_start);

    let text = String::from_utf8(stdin.clone()).unwrap();
    assert!(text.contains("invoking command: deploy-1"));
    assert!(text.contains("Deploy manifest failed"));
    assert!(sink.contents().starts_with(&stdin));
}

/// A successful deploy runs the success hook once, even if that hook fails
#[tokio::test]
async fn test_successful_deploy_survives_failing_success_hook() {
    let sink = LogSink::new();
    let _guard = capture_logs(&sink);

    let runner = RecordingRunner::new(sink.clone()).failing(&["notify-ok"]);
    let orchestrator = DeployOrchestrator::new(runner.clone(), sink.clone());
    let manifest = Manifest::decode(MANIFEST.as_bytes()).unwrap();

    let report = orchestrator.execute(&manifest).await;

    assert_eq!(report.state, RunState::DoneOk);
    assert!(report.deploy_failure.is_none());
    assert_eq!(report.hook_failure.as_ref().unwrap().command, "notify-ok");
    assert_eq!(runner.count("notify-ok"), 1);
    assert_eq!(runner.count("notify-ng"), 0);
    assert!(sink.contents_lossy().contains("success commands failed"));
}

/// Deploy steps run strictly in order and never see the log on stdin
#[tokio::test]
async fn test_deploy_steps_in_order() {
    let sink = LogSink::new();
    let runner = RecordingRunner::new(sink.clone());
    let orchestrator = DeployOrchestrator::new(runner.clone(), sink);
    let manifest = Manifest::decode(MANIFEST.as_bytes()).unwrap();

    orchestrator.deploy(&manifest).await.unwrap();

    assert_eq!(
        runner.commands(),
        vec!["deploy-1", "deploy-2", "deploy-3", "notify-ok"]
    );
    for call in runner.calls().iter().take(3) {
        assert!(call.stdin.is_none());
    }
}

/// A failure in the middle stops the rest of the deploy pipeline
#[tokio::test]
async fn test_mid_pipeline_failure_stops_remaining_steps() {
    let sink = LogSink::new();
    let runner = RecordingRunner::new(sink.clone()).failing(&["deploy-2"]);
    let orchestrator = DeployOrchestrator::new(runner.clone(), sink);
    let manifest = Manifest::decode(MANIFEST.as_bytes()).unwrap();

    let report = orchestrator.execute(&manifest).await;

    assert_eq!(report.state, RunState::DoneError);
    assert_eq!(report.completed_steps, 1);
    assert_eq!(runner.commands(), vec!["deploy-1", "deploy-2", "notify-ng"]);
}

/// Every step of a multi-step hook receives the log as it stood when that step began
#[tokio::test]
async fn test_each_hook_step_gets_current_log() {
    let sink = LogSink::new();
    let _guard = capture_logs(&sink);

    let yaml = r#"
commands:
  deploy: ["deploy-1"]
  success: ["hook-a", "hook-b"]
"#;
    let runner = RecordingRunner::new(sink.clone());
    let orchestrator = DeployOrchestrator::new(runner.clone(), sink.clone());
    orchestrator
        .deploy(&Manifest::decode(yaml.as_bytes()).unwrap())
        .await
        .unwrap();

    let a = runner.call("hook-a");
    let b = runner.call("hook-b");
    assert_eq!(a.stdin.as_ref().unwrap(), &a.log_at_start);
    assert_eq!(b.stdin.as_ref().unwrap(), &b.log_at_start);
    assert!(b.log_at_start.len() > a.log_at_start.len());
    assert!(b.log_at_start.starts_with(&a.log_at_start));
}
