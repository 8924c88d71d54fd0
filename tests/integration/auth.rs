//! Integration tests for token login and session cookies.

use reqwest::{Client, StatusCode};

use crate::common::{
    KillOnDrop, get_free_port, spawn_monitor_with_config, unreachable_hosts_config,
    wait_for_listening,
};

const TOKEN: &str = "integration-token";

async fn spawn_token_monitor() -> (KillOnDrop, String) {
    let port = get_free_port();
    let child = spawn_monitor_with_config(
        port,
        &unreachable_hosts_config(port, &format!(r#"type = "token"
        token = "{TOKEN}""#)),
    );
    let guard = KillOnDrop(child);
    wait_for_listening(port, 5).await;
    (guard, format!("http://127.0.0.1:{port}"))
}

#[tokio::test]
async fn test_api_requires_login() {
    let (_guard, base) = spawn_token_monitor().await;
    let client = Client::new();

    let resp = client.get(format!("{base}/api/snapshot")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client.post(format!("{base}/api/sweep")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let check: serde_json::Value = client
        .get(format!("{base}/auth/check"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(check["authenticated"], false);
}

#[tokio::test]
async fn test_login_logout_cycle() {
    let (_guard, base) = spawn_token_monitor().await;
    let client = Client::builder().cookie_store(true).build().unwrap();

    let resp = client
        .post(format!("{base}/login"))
        .form(&[("token", "wrong")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(format!("{base}/login"))
        .form(&[("token", TOKEN)])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);

    let resp = client.get(format!("{base}/api/snapshot")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.post(format!("{base}/logout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.get(format!("{base}/api/snapshot")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
