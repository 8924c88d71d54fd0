use alloc::sync::Arc;
use core::time::Duration;

use eyre::WrapErr as _;
use tracing::info;

use crate::{
    app::{HostRegistry, IcmpProber, Monitor, Prober},
    config::HostwatchConfig,
    http::auth::{self, LoginLimiter},
};

/// Application state shared across request handlers.
#[derive(Clone)]
pub(crate) struct AppState {
    /// The monitoring service; request handlers only talk to the core through it.
    pub monitor: Arc<Monitor>,

    /// Authentication runtime (mode and cookie key)
    pub auth: Arc<auth::Runtime>,

    /// Failed login bookkeeping per client address.
    pub login_limiter: Arc<LoginLimiter>,

    /// How often WebSocket subscribers are pinged for liveness.
    pub ws_heartbeat: Duration,
}

impl AppState {
    /// Builds the state around an existing monitor.
    ///
    /// # Errors
    ///
    /// Returns an error if the authentication configuration is invalid.
    pub(crate) fn new(monitor: Arc<Monitor>, config: &HostwatchConfig) -> eyre::Result<Self> {
        Ok(Self {
            monitor,
            auth: Arc::new(auth::Runtime::from_config(&config.server.auth)?),
            login_limiter: Arc::new(LoginLimiter::default()),
            ws_heartbeat: config.monitor.ws_heartbeat(),
        })
    }
}

/// Initialize application state and start the monitor.
#[tracing::instrument(skip_all)]
pub(super) async fn initialize_state(config: &HostwatchConfig) -> eyre::Result<AppState> {
    let registry = HostRegistry::from_entries(config.hosts.iter().cloned())
        .wrap_err("Invalid host configuration")?;
    info!("Watching {} hosts", registry.len());

    let prober: Arc<dyn Prober> = Arc::new(IcmpProber::new());
    let monitor = Monitor::new(Arc::new(registry), prober, config.monitor.clone());

    let app_state = AppState::new(monitor, config)?;

    // Start the scheduler now that the full AppState is available.
    app_state.monitor.start().await;

    Ok(app_state)
}
