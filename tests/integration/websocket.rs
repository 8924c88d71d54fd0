//! Integration tests for the real-time channel

use std::time::Duration;

use futures_util::{SinkExt as _, StreamExt as _};
use hostwatch_common::WsMessage;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::common::{
    KillOnDrop, get_free_port, spawn_monitor_with_config, unreachable_hosts_config,
    wait_for_listening,
};

#[tokio::test]
async fn test_websocket_initial_snapshot_and_manual_check() {
    let port = get_free_port();
    let child = spawn_monitor_with_config(port, &unreachable_hosts_config(port, r#"type = "none""#));
    let _guard = KillOnDrop(child);
    wait_for_listening(port, 5).await;

    let url = format!("ws://127.0.0.1:{port}/ws");
    let (ws_stream, _) = connect_async(url)
        .await
        .expect("failed to connect websocket");
    let (mut write, mut read) = ws_stream.split();

    // The first message is always the current snapshot
    let initial_msg = read.next().await.unwrap().unwrap();
    let initial: WsMessage = serde_json::from_str(&initial_msg.to_string()).unwrap();
    let WsMessage::Snapshot(initial) = initial else {
        panic!("Expected Snapshot message first");
    };

    write
        .send(Message::Text(r#"{"type":"ManualCheck"}"#.into()))
        .await
        .unwrap();

    // A later sweep has to reach us, with every host in it
    let later = tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(msg) = read.next().await {
            if let Message::Text(text) = msg.unwrap()
                && let WsMessage::Snapshot(snapshot) = serde_json::from_str(&text).unwrap()
                && snapshot.sweep > initial.sweep
            {
                return snapshot;
            }
        }
        panic!("websocket closed before a new snapshot arrived");
    })
    .await
    .expect("no snapshot after manual check");

    assert_eq!(later.hosts.len(), 2);
    assert!(later.hosts.values().all(|r| !r.online));
}

#[tokio::test]
async fn test_websocket_requires_session() {
    let port = get_free_port();
    let child = spawn_monitor_with_config(
        port,
        &unreachable_hosts_config(port, r#"type = "token"
        token = "ws-token""#),
    );
    let _guard = KillOnDrop(child);
    wait_for_listening(port, 5).await;

    let result = connect_async(format!("ws://127.0.0.1:{port}/ws")).await;
    assert!(result.is_err(), "upgrade without a session must be refused");
}
