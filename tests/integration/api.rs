//! Integration tests for the JSON API.

use std::time::Duration;

use hostwatch_common::ProbeResult;
use reqwest::{Client, StatusCode};

use crate::common::{
    KillOnDrop, get_free_port, spawn_monitor_with_config, unreachable_hosts_config,
    wait_for_listening,
};

async fn spawn_open_monitor() -> (KillOnDrop, String) {
    let port = get_free_port();
    let child = spawn_monitor_with_config(port, &unreachable_hosts_config(port, r#"type = "none""#));
    let guard = KillOnDrop(child);
    wait_for_listening(port, 5).await;
    (guard, format!("http://127.0.0.1:{port}"))
}

#[tokio::test]
async fn test_snapshot_fills_after_first_sweep() {
    let (_guard, base) = spawn_open_monitor().await;
    let client = Client::new();

    let mut snapshot = serde_json::Value::Null;
    for _ in 0..30 {
        snapshot = client
            .get(format!("{base}/api/snapshot"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if snapshot["sweep"].as_u64().unwrap_or(0) >= 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    assert!(snapshot["sweep"].as_u64().unwrap() >= 1, "{snapshot}");
    let hosts = snapshot["hosts"].as_object().unwrap();
    assert_eq!(hosts.len(), 2);
    for name in ["router", "nas"] {
        let result: ProbeResult = serde_json::from_value(hosts[name].clone()).unwrap();
        assert!(!result.online, "{name} should be offline");
        assert!(result.latency_ms.is_none());
        assert!(result.error.is_some());
    }
}

#[tokio::test]
async fn test_probe_unknown_host_is_not_found() {
    let (_guard, base) = spawn_open_monitor().await;
    let resp = Client::new()
        .post(format!("{base}/api/probe/printer"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_probe_unreachable_host_returns_offline() {
    let (_guard, base) = spawn_open_monitor().await;
    let resp = Client::new()
        .post(format!("{base}/api/probe/router"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let result: ProbeResult = resp.json().await.unwrap();
    assert_eq!(result.host, "router");
    assert!(!result.online);
}

#[tokio::test]
async fn test_sweep_request_is_accepted() {
    let (_guard, base) = spawn_open_monitor().await;
    let resp = Client::new()
        .post(format!("{base}/api/sweep"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(
        body["request"] == "queued" || body["request"] == "coalesced",
        "{body}"
    );
}
