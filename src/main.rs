//! Layer-7 load balancing reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                 LOAD BALANCER                 │
//!     Client Request     │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!     ───────────────────┼─▶│  http   │──▶│ dispatch │──▶│  session  │  │
//!                        │  │ server  │   │          │   │ affinity  │  │
//!                        │  └─────────┘   └────┬─────┘   └─────┬─────┘  │
//!                        │                     │   miss / dead │        │
//!                        │                     ▼               ▼        │
//!                        │               ┌──────────────────────────┐   │
//!                        │               │ load_balancer pool +     │   │
//!                        │               │ strategy (rr/lc/wrr)     │   │
//!                        │               └────────────┬─────────────┘   │
//!     Client Response    │  ┌─────────┐   ┌──────────▼───┐              │
//!     ◀──────────────────┼──│response │◀──│   forward    │◀─────────────┼──── Backend
//!                        │  └─────────┘   └──────────────┘              │
//!                        │                                              │
//!                        │  health (active probes + passive demotion)   │
//!                        │  admin · config reload · lifecycle · metrics │
//!                        └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use lb_proxy::admin::{self, AdminState};
use lb_proxy::config::{load_config, watcher};
use lb_proxy::lifecycle::{signals, Shutdown};
use lb_proxy::observability::{logging, metrics};
use lb_proxy::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "lb-proxy", version, about = "Layer-7 load balancing reverse proxy")]
struct Args {
    /// Path to the configuration file (.json or .toml).
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Reload the backend list when the configuration file changes.
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logging is configured from the file, so load errors go to stderr.
    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load {}: {}", args.config.display(), e);
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "lb-proxy starting");
    tracing::info!(
        config = %args.config.display(),
        port = config.port,
        strategy = %config.strategy_kind(),
        sticky = config.sticky,
        backends = config.backends.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let admin_config = config.admin.clone();
    let sticky = config.sticky;
    let server = HttpServer::new(config);
    let pool = server.pool();

    if admin_config.enabled {
        let admin_listener = TcpListener::bind(&admin_config.bind_address).await?;
        let state = AdminState::new(pool.clone(), sticky, &admin_config);
        let admin_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = admin::serve(state, admin_listener, admin_shutdown).await {
                tracing::error!(error = %e, "Admin API stopped");
            }
        });
    }

    // Keep the watcher alive for the lifetime of the process.
    let _config_watcher = if args.watch {
        let (config_watcher, updates) = watcher::ConfigWatcher::new(&args.config);
        let handle = config_watcher.run()?;
        tokio::spawn(watcher::apply_updates(pool, updates, shutdown.subscribe()));
        Some(handle)
    } else {
        None
    };

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        signal_shutdown.trigger();
    });

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
