use alloc::string;
use core::net::{IpAddr, SocketAddr};
use std::path::Path;

use eyre::WrapErr as _;
use tokio::{net, signal};

use crate::{
    app::{AppState, state::initialize_state},
    config::load,
    http::router,
};

/// Creates a future that resolves when a shutdown signal is received.
pub(crate) async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!("Failed to create SIGTERM handler, falling back to Ctrl-C: {e}");
                drop(signal::ctrl_c().await);
                return;
            }
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = signal::ctrl_c() => {}
        }
    }
    #[cfg(not(unix))]
    {
        drop(signal::ctrl_c().await);
    }
}

/// Serve the HTTP API until a shutdown signal arrives.
pub(crate) async fn start_server(
    app_state: AppState,
    listen_ip: IpAddr,
    listen_port: u16,
) -> eyre::Result<()> {
    let app = router::create_app(app_state);

    let addr = SocketAddr::from((listen_ip, listen_port));

    let listener = net::TcpListener::bind(addr)
        .await
        .wrap_err(format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Received shutdown, shutting down");
        })
        .await?;

    Ok(())
}

/// # Returns
///
/// `Ok(())` when the server runs until termination, or an error if loading or binding fails.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or is invalid, or the server cannot bind.
pub(crate) async fn start(
    config_path: &Path,
    port_override: Option<u16>,
    bind_override: Option<&str>,
) -> eyre::Result<()> {
    tracing::info!("Starting HTTP server...");

    let config = load(config_path).await?;
    let app_state = initialize_state(&config).await?;
    let monitor = app_state.monitor.clone();

    // Apply optional overrides from CLI/tests
    let listen_port = port_override.unwrap_or(config.server.port);
    let bind_str = bind_override.map_or_else(
        || config.server.bind.clone(),
        string::ToString::to_string,
    );

    let listen_ip: IpAddr = bind_str
        .parse()
        .wrap_err(format!("Invalid bind address: {bind_str}"))?;

    let served = start_server(app_state, listen_ip, listen_port).await;
    monitor.stop().await;
    served
}
