//! Uses the single integration test approach.
//!
//! This improves parallelism when running the tests, and reduces the number of binaries that have to be built (and linked)

mod api;
mod auth;
mod common;
mod websocket;

#[cfg(unix)]
use std::os::unix::process::ExitStatusExt as _;
use std::process::{Command, Stdio};

use common::{KillOnDrop, get_free_port, spawn_monitor_with_config, wait_for_listening, write_config};

#[tokio::test]
async fn test_monitor_config_loads() {
    let port = get_free_port();
    let child = spawn_monitor_with_config(
        port,
        &format!(
            r#"
        [server]
        port = {port}
        bind = "127.0.0.1"
        "#
        ),
    );
    let mut drop_guard = KillOnDrop(child);
    wait_for_listening(port, 5).await;
    let _ = drop_guard.0.kill();
    let status = drop_guard.0.wait().expect("failed to wait on child");
    #[cfg(unix)]
    assert!(
        status.success() || status.signal() == Some(9),
        "Process did not start or exit as expected"
    );
    #[cfg(not(unix))]
    assert!(
        status.success() || status.code() == Some(0),
        "Process did not start or exit as expected"
    );
}

#[test]
fn test_check_config_rejects_duplicate_hosts() {
    let path = write_config(
        "duplicate_hosts",
        r#"
        [[hosts]]
        name = "nas"
        address = "192.0.2.10"

        [[hosts]]
        name = "nas"
        address = "192.0.2.11"
        "#,
    );
    let output = Command::new(common::get_monitor_bin())
        .args(["check-config", "--config", path.to_str().unwrap()])
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .expect("failed to run check-config");
    assert!(!output.status.success(), "duplicate host names must be rejected");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nas"), "error should name the duplicate: {stderr}");
}

#[test]
fn test_check_config_lists_hosts() {
    let path = write_config(
        "list_hosts",
        r#"
        [[hosts]]
        name = "router"
        address = "192.0.2.1"

        [[hosts]]
        name = "nas"
        address = "192.0.2.2"
        "#,
    );
    let output = Command::new(common::get_monitor_bin())
        .args(["check-config", "--config", path.to_str().unwrap()])
        .output()
        .expect("failed to run check-config");
    assert!(output.status.success(), "valid config must pass");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 hosts configured"), "{stdout}");
    assert!(stdout.contains("router -> 192.0.2.1"), "{stdout}");
}
