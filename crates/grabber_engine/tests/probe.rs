#![cfg(unix)]

mod common;

use common::Workspace;
use grabber_engine::{list_heights, query_title, resolve_output_basename, ProbeError};

#[tokio::test]
async fn heights_come_back_distinct_and_descending() {
    let ws = Workspace::new();
    let config = ws.config(ws.downloader("exit 1"), ws.transcoder("exit 1"));

    let heights = list_heights(&config, "https://youtu.be/fake").await.unwrap();

    assert_eq!(heights, vec![1080, 720]);
}

#[tokio::test]
async fn title_is_trimmed_and_sanitized() {
    let ws = Workspace::new();
    let config = ws.config(ws.downloader("exit 1"), ws.transcoder("exit 1"));

    let title = query_title(&config, "https://youtu.be/fake").await.unwrap();
    assert_eq!(title, "Test: Clip?");
    assert_eq!(
        resolve_output_basename(&config, "https://youtu.be/fake").await,
        "Test Clip"
    );
}

#[tokio::test]
async fn failing_tool_falls_back_to_placeholder_title() {
    let ws = Workspace::new();
    let config = ws.config(ws.bin.join("missing"), ws.bin.join("missing"));

    assert!(matches!(
        list_heights(&config, "https://youtu.be/fake").await,
        Err(ProbeError::Spawn { .. })
    ));
    assert_eq!(
        resolve_output_basename(&config, "https://youtu.be/fake").await,
        "video"
    );
}
