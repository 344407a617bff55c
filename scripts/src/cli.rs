//! Definitions of CLI arguments and commands for deploy scripts

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{
        deploy_all, deploy_factories, deploy_referral, deploy_reroll, deploy_router,
        deploy_token, deploy_xtatuz_factory, get_address, show_deployments,
    },
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_DEPLOYMENTS_PATH, DEFAULT_DEPLOY_CONFIRMATIONS,
        DEFAULT_DEPLOY_TIMEOUT_SECS, DEFAULT_RPC_URL,
    },
    errors::ScriptError,
    orchestrator::DeploymentOrchestrator,
    registry::AddressRegistry,
    resolver::ArtifactResolver,
    types::NetworkId,
    utils::setup_client,
};

/// Deploy the Xtatuz contracts and record their addresses
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The network deployments are recorded under, e.g. `goerli`
    #[arg(short, long, env = "NETWORK")]
    pub network: String,

    /// Path to the deployments registry file
    #[arg(short, long, default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: PathBuf,

    /// Connection and artifact settings, only needed when deploying
    #[command(flatten)]
    pub client: ClientArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Settings for sending deployments to the network
#[derive(Args, Clone)]
pub struct ClientArgs {
    /// Private key of the deployer
    #[arg(short, long, env = "PKEY")]
    pub priv_key: Option<String>,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Directory containing the Hardhat compilation artifacts
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// Number of confirmations to wait for on each deployment
    #[arg(long, default_value_t = DEFAULT_DEPLOY_CONFIRMATIONS)]
    pub confirmations: u64,

    /// Seconds to wait for a deployment to be confirmed
    #[arg(long, default_value_t = DEFAULT_DEPLOY_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl ClientArgs {
    /// Connect to the network and build an orchestrator deploying to `network`
    pub async fn orchestrator(
        &self,
        registry: Arc<AddressRegistry>,
        network: NetworkId,
    ) -> Result<DeploymentOrchestrator<ArtifactResolver>, ScriptError> {
        let priv_key = self.priv_key.as_deref().ok_or_else(|| {
            ScriptError::ClientInitialization(
                "a deployer private key is required, pass --priv-key or set PKEY".to_string(),
            )
        })?;
        if !self.artifacts_dir.is_dir() {
            return Err(ScriptError::ArtifactParsing(format!(
                "artifacts directory {} does not exist, compile the contracts first",
                self.artifacts_dir.display()
            )));
        }

        let client = setup_client(priv_key, &self.rpc_url).await?;
        let resolver = ArtifactResolver::new(
            self.artifacts_dir.clone(),
            client,
            self.confirmations,
            Duration::from_secs(self.timeout_secs),
        );

        Ok(DeploymentOrchestrator::new(resolver, registry, network))
    }
}

/// The commands of the deploy scripts
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the full suite in dependency order
    DeployAll(DeployAllArgs),
    /// Deploy a single token
    DeployToken(DeployTokenArgs),
    /// Deploy the presaled, property and project factories
    DeployFactories,
    /// Deploy the aggregating factory on top of the recorded factories
    DeployXtatuzFactory,
    /// Deploy the router on top of the recorded aggregating factory
    DeployRouter(DeployRouterArgs),
    /// Deploy the referral module
    DeployReferral(DeployReferralArgs),
    /// Deploy the reroll module on top of the recorded router
    DeployReroll(DeployRerollArgs),
    /// Print every address recorded for the network
    Show,
    /// Print the address recorded for one contract
    Get(GetArgs),
}

impl Command {
    /// Run the command against the registry for `network`
    pub async fn run(
        self,
        client: &ClientArgs,
        registry: Arc<AddressRegistry>,
        network: NetworkId,
    ) -> Result<(), ScriptError> {
        match self {
            Command::Show => show_deployments(&registry, &network),
            Command::Get(args) => get_address(args, &registry, &network),
            Command::DeployAll(args) => {
                deploy_all(args, client.orchestrator(registry, network).await?).await
            }
            Command::DeployToken(args) => {
                deploy_token(args, &client.orchestrator(registry, network).await?).await
            }
            Command::DeployFactories => {
                deploy_factories(&client.orchestrator(registry, network).await?).await
            }
            Command::DeployXtatuzFactory => {
                deploy_xtatuz_factory(&client.orchestrator(registry, network).await?).await
            }
            Command::DeployRouter(args) => {
                deploy_router(args, &client.orchestrator(registry, network).await?).await
            }
            Command::DeployReferral(args) => {
                deploy_referral(args, &client.orchestrator(registry, network).await?).await
            }
            Command::DeployReroll(args) => {
                deploy_reroll(args, &client.orchestrator(registry, network).await?).await
            }
        }
    }
}

/// Deploy the full suite
#[derive(Args)]
pub struct DeployAllArgs {
    /// Path to the TOML deployment plan
    #[arg(long)]
    pub plan: PathBuf,

    /// Reuse contracts already recorded for the network instead of redeploying them
    #[arg(long)]
    pub resume: bool,
}

/// Deploy a token. With a total supply the XTA token is deployed,
/// otherwise a mock token.
#[derive(Args)]
pub struct DeployTokenArgs {
    /// The token name
    #[arg(long)]
    pub name: String,

    /// The token ticker, also its key in the registry
    #[arg(short, long)]
    pub symbol: String,

    /// Total supply in whole tokens, minted to the deployer
    #[arg(short, long)]
    pub total_supply: Option<String>,
}

/// Deploy the router
#[derive(Args)]
pub struct DeployRouterArgs {
    /// SPV address in hex
    #[arg(long)]
    pub spv: String,
}

/// Deploy the referral module
#[derive(Args)]
pub struct DeployReferralArgs {
    /// Registry key of the reward token
    #[arg(short, long)]
    pub token: String,

    /// Initial percentage distribution, comma separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub initial_percentage: Vec<u64>,
}

/// Deploy the reroll module
#[derive(Args)]
pub struct DeployRerollArgs {
    /// SPV address in hex
    #[arg(long)]
    pub spv: String,

    /// Registry key of the token rerolls are paid in
    #[arg(short, long)]
    pub token: String,
}

/// Look up a recorded address
#[derive(Args)]
pub struct GetArgs {
    /// Registry key of the contract
    #[arg(short, long)]
    pub symbol: String,
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Command};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_deploy_referral() {
        let cli = Cli::try_parse_from([
            "xtatuz-scripts",
            "--network",
            "goerli",
            "deploy-referral",
            "--token",
            "XTA",
            "--initial-percentage",
            "300,200,100",
        ])
        .unwrap();

        assert_eq!(cli.network, "goerli");
        match cli.command {
            Command::DeployReferral(args) => {
                assert_eq!(args.token, "XTA");
                assert_eq!(args.initial_percentage, vec![300, 200, 100]);
            }
            _ => panic!("expected deploy-referral"),
        }
    }
}
