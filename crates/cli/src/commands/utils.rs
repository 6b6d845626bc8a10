use bridge_core::{
    chain::{ChainError, EthersChainClient},
    config::AppConfig,
    reconcile::{ReconcileError, Reconciler},
    store::{self, StoreError, ValueStore},
    types::ErrorResponse,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Blockchain error: {0}")]
    Chain(#[from] ChainError),

    #[error("Database error: {0}")]
    Store(#[from] StoreError),

    #[error("{}: {}", .0.summary(), .0.detail())]
    Reconcile(#[from] ReconcileError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error: {0}")]
    General(String),
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        Self::General(error.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;

pub fn print_success(message: &str) {
    println!("[SUCCESS] {message}");
}

pub fn print_error(message: &str) {
    eprintln!("[ERROR] {message}");
}

pub fn print_info(message: &str) {
    println!("[INFO] {message}");
}

/// Pretty-prints an API response model, matching what the HTTP endpoint returns.
pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints the error envelope the HTTP API would have returned and passes the error on.
pub fn report_failure(err: ReconcileError) -> CliError {
    if let Ok(body) = serde_json::to_string_pretty(&ErrorResponse::from(&err)) {
        eprintln!("{body}");
    }
    CliError::Reconcile(err)
}

/// Loads and validates configuration from `file`, with environment overrides applied.
pub fn load_config(file: &str) -> CliResult<AppConfig> {
    let config = AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))?;
    config.validate().map_err(CliError::Config)?;
    Ok(config)
}

pub async fn connect_chain(config: &AppConfig) -> CliResult<EthersChainClient> {
    print_info(&format!("Connecting to node at {}...", config.chain.rpc_url));
    Ok(EthersChainClient::connect(&config.chain).await?)
}

pub async fn connect_store(config: &AppConfig) -> CliResult<Arc<dyn ValueStore>> {
    print_info("Connecting to database...");
    Ok(store::connect(&config.database).await?)
}

/// Connects both adapters and wires them into a [`Reconciler`].
pub async fn build_reconciler(config: &AppConfig) -> CliResult<Reconciler> {
    let chain = connect_chain(config).await?;
    let store = connect_store(config).await?;
    Ok(Reconciler::new(Arc::new(chain), store))
}
