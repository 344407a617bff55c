use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use xtatuz_scripts::{
    cli::Cli, constants::DEFAULT_LOG_FILTER, errors::ScriptError, registry::AddressRegistry,
    types::NetworkId,
};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let Cli {
        network,
        deployments_path,
        client,
        command,
    } = Cli::parse();

    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let registry = Arc::new(AddressRegistry::new(deployments_path));

    command
        .run(&client, registry, NetworkId::new(network))
        .await
}
