#![cfg(unix)]

use std::path::Path;
use std::time::Duration;

use grabber_engine::{spawn_stage, CancellationToken};

fn sleeper() -> grabber_engine::SpawnedStage {
    spawn_stage(Path::new("sleep"), &["30".to_string()]).expect("sleep is available")
}

#[tokio::test]
async fn stop_terminates_registered_process() {
    let stage = sleeper();
    let token = CancellationToken::new();
    token.register_process(stage.process.clone());

    token.request_stop();
    token.request_stop();

    let status = tokio::time::timeout(
        Duration::from_secs(5),
        stage.process.wait(Duration::from_millis(10)),
    )
    .await
    .expect("process was not terminated")
    .unwrap();
    assert!(!status.success());
    assert!(token.is_stopped());
}

#[tokio::test]
async fn registering_after_stop_terminates_immediately() {
    let token = CancellationToken::new();
    token.request_stop();

    let stage = sleeper();
    token.register_process(stage.process.clone());

    let status = tokio::time::timeout(
        Duration::from_secs(5),
        stage.process.wait(Duration::from_millis(10)),
    )
    .await
    .expect("process was not terminated")
    .unwrap();
    assert!(!status.success());
}

#[tokio::test]
async fn cleared_process_is_left_alone() {
    let stage = sleeper();
    let token = CancellationToken::new();
    token.register_process(stage.process.clone());
    let cleared = token.clear_process().expect("process was registered");
    assert!(!token.has_process());

    token.request_stop();
    assert_eq!(cleared.try_wait().unwrap(), None);

    cleared.terminate();
    cleared.wait(Duration::from_millis(10)).await.unwrap();
}

#[tokio::test]
async fn cancelled_resolves_after_stop_from_another_thread() {
    let token = CancellationToken::new();
    let remote = token.clone();
    std::thread::spawn(move || remote.request_stop());

    tokio::time::timeout(Duration::from_secs(5), token.cancelled())
        .await
        .expect("cancellation was not observed");
    assert!(token.is_stopped());
}
