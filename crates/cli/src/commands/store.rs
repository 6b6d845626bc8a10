use clap::Subcommand;

use super::utils::{connect_store, load_config, print_json, print_success, CliResult};

#[derive(Subcommand)]
pub enum StoreCommands {
    /// Create the contract_values table and seed it if empty
    Init,

    /// Print the current stored record
    Show,
}

pub async fn handle_store_command(command: StoreCommands, config_file: &str) -> CliResult<()> {
    let config = load_config(config_file)?;
    let store = connect_store(&config).await?;

    let result: CliResult<()> = match store.read_record().await {
        Ok(record) => match command {
            StoreCommands::Init => {
                print_success(&format!(
                    "Store ready, current value {} (id {})",
                    record.value, record.id
                ));
                Ok(())
            }
            StoreCommands::Show => print_json(&record),
        },
        Err(e) => Err(e.into()),
    };

    store.close().await;
    result
}
