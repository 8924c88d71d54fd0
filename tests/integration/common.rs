//! Common utilities for integration tests.
//!
//! Spawning the monitor binary, managing ports and waiting for it to be ready.

use std::{
    path::PathBuf,
    process::{Child, Command, Stdio},
    time::{Duration, Instant},
};

pub fn get_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("failed to bind to address")
        .local_addr()
        .unwrap()
        .port()
}

/// Guard that kills and waits on a child process when dropped.
pub struct KillOnDrop(pub Child);

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

pub fn get_monitor_bin() -> &'static str {
    env!("CARGO_BIN_EXE_hostwatch")
}

/// Writes a config to a unique temp file.
pub fn write_config(name: &str, config_toml: &str) -> PathBuf {
    let tmp = std::env::temp_dir().join(format!(
        "hostwatch_integration_{name}_{}.toml",
        std::process::id()
    ));
    std::fs::write(&tmp, config_toml).expect("failed to write config");
    tmp
}

/// Spawn the monitor from a given config string.
pub fn spawn_monitor_with_config(port: u16, config_toml: &str) -> Child {
    let path = write_config(&port.to_string(), config_toml);
    Command::new(get_monitor_bin())
        .args(["serve", "--config", path.to_str().unwrap()])
        .env("HOSTWATCH_INTEGRATION_TEST", "1")
        .stdout(Stdio::null())
        .spawn()
        .expect("failed to start hostwatch")
}

/// Config for a monitor on `port` with two hosts that never answer.
///
/// `auth` is the body of the `[server.auth]` table.
pub fn unreachable_hosts_config(port: u16, auth: &str) -> String {
    format!(
        r#"
        [server]
        port = {port}
        bind = "127.0.0.1"

        [server.auth]
        {auth}

        [monitor]
        interval_secs = 3600
        probe_timeout_ms = 300

        [[hosts]]
        name = "router"
        address = "192.0.2.1"

        [[hosts]]
        name = "nas"
        address = "192.0.2.2"
        "#
    )
}

/// Block until a TCP listener is accepting on `127.0.0.1:port` or timeout.
pub async fn wait_for_listening(port: u16, timeout_secs: u64) {
    let start = Instant::now();
    while std::net::TcpStream::connect(("127.0.0.1", port)).is_err() {
        if start.elapsed() > Duration::from_secs(timeout_secs) {
            panic!("server did not start within timeout");
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}
