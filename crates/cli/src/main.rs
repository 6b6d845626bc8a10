use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
use commands::{
    config::resolve_config_file, handle_config_command, handle_store_command,
    handle_value_command, utils::print_error, ConfigCommands, StoreCommands, ValueCommands,
};

#[derive(Parser)]
#[command(name = "bridge-cli")]
#[command(about = "Bridge CLI - operator tooling for the Besu value bridge")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file used by every command (config commands accept --file to override)
    #[arg(long, global = true, env = "BRIDGE_CONFIG", default_value = "config/config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration Management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// One-shot contract value operations
    #[command(subcommand)]
    Value(ValueCommands),

    /// Stored record inspection
    #[command(subcommand)]
    Store(StoreCommands),
}

#[tokio::main]
async fn main() {
    bridge_core::config::load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Config(config_command) => handle_config_command(config_command, &cli.config),
        Commands::Value(value_command) => handle_value_command(value_command, &cli.config).await,
        Commands::Store(store_command) => handle_store_command(store_command, &cli.config).await,
    };

    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}
