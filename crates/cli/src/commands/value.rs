use bridge_core::{
    chain::ChainClient,
    reconcile::{submit_value, Reconciler},
    types::{CheckResponse, GetValueResponse, SetValueResponse, SyncResponse},
};
use clap::Subcommand;

use super::utils::{
    build_reconciler, connect_chain, load_config, print_json, print_success, report_failure,
    CliResult,
};

#[derive(Subcommand)]
pub enum ValueCommands {
    /// Read the current value from the contract
    Get,

    /// Submit a set(uint256) transaction without waiting for it to be mined
    Set {
        /// Base-10 integer to write
        value: String,
    },

    /// Compare the contract value with the stored record
    Check,

    /// Copy the contract value into the stored record if they differ
    Sync,
}

pub async fn handle_value_command(command: ValueCommands, config_file: &str) -> CliResult<()> {
    let config = load_config(config_file)?;

    match command {
        ValueCommands::Get => {
            let chain = connect_chain(&config).await?;
            let value = chain.read_value().await?;
            print_json(&GetValueResponse::new(value.to_string()))
        }
        ValueCommands::Set { value } => {
            let chain = connect_chain(&config).await?;
            let receipt = submit_value(&chain, &value).await.map_err(report_failure)?;
            print_success(&format!("Transaction {} broadcast", receipt.tx_hash));
            print_json(&SetValueResponse::from(receipt))
        }
        ValueCommands::Check => {
            let reconciler = build_reconciler(&config).await?;
            let result = check(&reconciler).await;
            reconciler.store().close().await;
            result
        }
        ValueCommands::Sync => {
            let reconciler = build_reconciler(&config).await?;
            let result = sync(&reconciler).await;
            reconciler.store().close().await;
            result
        }
    }
}

async fn check(reconciler: &Reconciler) -> CliResult<()> {
    let report = reconciler.check().await.map_err(report_failure)?;
    print_json(&CheckResponse::from(report))
}

async fn sync(reconciler: &Reconciler) -> CliResult<()> {
    let outcome = reconciler.sync().await.map_err(report_failure)?;
    print_json(&SyncResponse::from(outcome))
}
