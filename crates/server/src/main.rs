use anyhow::{Context, Result};
use axum::serve;
use bridge_core::{
    chain::{ChainClient, EthersChainClient},
    config::{load_dotenv, AppConfig},
    reconcile::Reconciler,
    store::{self, ValueStore},
};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the logging system based on the configuration.
///
/// `RUST_LOG` takes precedence over `logging.level`.
fn init_logging(config: &AppConfig) {
    let level = config.logging.level.as_str();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,bridge_core={level},server={level},tower_http={level}"))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format.as_str() == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer().json();
        registry.with(fmt_layer).init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_target(false);
        registry.with(fmt_layer).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_path = load_dotenv();

    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().map_err(|e| anyhow::anyhow!("Configuration validation failed: {e}"))?;

    init_logging(&config);
    info!("Starting bridge API");
    match dotenv_path {
        Some(path) => info!(path = %path.display(), "Loaded environment file"),
        None => warn!("No .env file found, using process environment"),
    }

    let chain = EthersChainClient::connect(&config.chain)
        .await
        .context("Failed to create blockchain client")?;
    let chain_id = chain.chain_id().await.context("Failed to get chain ID")?;
    info!(
        chain_id,
        contract = ?chain.contract_address(),
        sender = ?chain.sender(),
        "Connected to blockchain"
    );

    let store: Arc<dyn ValueStore> =
        store::connect(&config.database).await.context("Failed to connect to database")?;
    info!("Connected to database");

    let reconciler = Arc::new(Reconciler::new(Arc::new(chain), store.clone()));
    let app = server::create_app(reconciler, &config.server);

    let addr = config.socket_addr().map_err(|e| anyhow::anyhow!(e))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(address = %addr, "Bridge API listening");

    if let Err(e) = serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        error!(error = %e, "Server error occurred");
    }

    store.close().await;
    info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");

                () = std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, draining in-flight requests");
}
