//! Fake library entry for the `hostwatch_monitor` crate.
//!
//! Exposes `inner_main` so a workspace-level shim binary can call into the monitor logic.

extern crate alloc;
extern crate core;

pub mod app;
pub mod cli;
pub mod config;
pub mod http;

use std::{env, fs, path::Path, sync::Once};

use eyre::{Result, WrapErr as _};
use tracing::{Instrument as _, info};
use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use app::HostRegistry;
use cli::{Cli, Command, LogFormat};

static INIT_TRACING: Once = Once::new();

fn init_tracing(log_format: LogFormat) {
    INIT_TRACING.call_once(move || {
        let default_level = if env::var("HOSTWATCH_INTEGRATION_TEST").is_ok() {
            "error"
        } else {
            "info"
        };

        let builder = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
            )
            .with_timer(ChronoLocal::rfc_3339());

        match log_format {
            LogFormat::Compact => builder.compact().init(),
            LogFormat::Json => builder.json().init(),
            LogFormat::Pretty => builder.pretty().init(),
        }
    });
}

/// The monitor's main function; can be called from a shim binary.
///
/// # Errors
///
/// Returns an error if the configuration is missing or invalid, or the server fails to start.
pub async fn inner_main(invocation: Cli) -> Result<()> {
    match invocation.command {
        Command::Serve(args) => {
            let config = &args.config;
            let config_path =
                fs::canonicalize(config).wrap_err(format!("Config file not found at: {config}"))?;

            init_tracing(args.log_format);

            let startup_span = tracing::info_span!("hostwatch.startup", ?config_path, pid = ?std::process::id(), version = env!("CARGO_PKG_VERSION"));

            async {
                info!("Starting hostwatch");
                // Pass through optional port/bind overrides from CLI
                app::start(&config_path, args.port, args.bind.as_deref()).await
            }
            .instrument(startup_span)
            .await
        }
        Command::CheckConfig { config } => check_config(Path::new(&config)).await,
    }
}

async fn check_config(path: &Path) -> Result<()> {
    let config = config::load(path).await?;
    let registry = HostRegistry::from_entries(config.hosts)
        .wrap_err(format!("Invalid host list in {}", path.display()))?;

    println!("{} hosts configured", registry.len());
    for host in registry.list() {
        println!("  {} -> {}", host.name, host.address);
    }
    Ok(())
}
