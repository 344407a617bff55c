//! Implementations of the various deploy scripts

use alloy_primitives::{utils::parse_ether, U256};
use itertools::Itertools;
use tracing::info;

use crate::{
    cli::{
        DeployAllArgs, DeployReferralArgs, DeployRerollArgs, DeployRouterArgs, DeployTokenArgs,
        GetArgs,
    },
    errors::ScriptError,
    orchestrator::DeploymentOrchestrator,
    plan::DeploymentPlan,
    registry::AddressRegistry,
    resolver::ContractFactoryResolver,
    types::{ContractSymbol, DeployedContract, NetworkId, XtatuzContract},
    utils::parse_address,
};

/// Print a deployed contract as `<symbol>: <address>`
fn print_deployed(deployed: &DeployedContract) {
    println!("{}: {}", deployed.symbol, deployed.address);
}

/// Deploy the full suite described by the plan file
pub async fn deploy_all<R: ContractFactoryResolver>(
    args: DeployAllArgs,
    orchestrator: DeploymentOrchestrator<R>,
) -> Result<(), ScriptError> {
    let plan = DeploymentPlan::load(&args.plan)?;
    let orchestrator = orchestrator.with_resume(args.resume || plan.resume);

    let summary = orchestrator.deploy_all(&plan).await?;
    summary.deployed.iter().for_each(print_deployed);

    Ok(())
}

/// Deploy a single token, the XTA token when a total supply is given
pub async fn deploy_token<R: ContractFactoryResolver>(
    args: DeployTokenArgs,
    orchestrator: &DeploymentOrchestrator<R>,
) -> Result<(), ScriptError> {
    let symbol = ContractSymbol::new(args.symbol);
    let deployed = match args.total_supply {
        Some(supply) => {
            let total_supply = parse_ether(&supply).map_err(|e| {
                ScriptError::CalldataConstruction(format!("invalid total supply `{supply}`: {e}"))
            })?;
            orchestrator
                .deploy_xta_token(&args.name, &symbol, total_supply)
                .await?
        }
        None => orchestrator.deploy_token(&args.name, &symbol).await?,
    };

    print_deployed(&deployed);
    Ok(())
}

/// Deploy the three independent factories
pub async fn deploy_factories<R: ContractFactoryResolver>(
    orchestrator: &DeploymentOrchestrator<R>,
) -> Result<(), ScriptError> {
    print_deployed(&orchestrator.deploy_presaled_factory().await?);
    print_deployed(&orchestrator.deploy_property_factory().await?);
    print_deployed(&orchestrator.deploy_project_factory().await?);

    Ok(())
}

/// Deploy the aggregating factory on top of the recorded factories
pub async fn deploy_xtatuz_factory<R: ContractFactoryResolver>(
    orchestrator: &DeploymentOrchestrator<R>,
) -> Result<(), ScriptError> {
    let step = XtatuzContract::XtatuzFactory;
    let dependency = |contract: XtatuzContract| {
        let symbol = ContractSymbol::new(contract.artifact_name());
        orchestrator.recorded_dependency(step, &symbol)
    };

    let property = dependency(XtatuzContract::PropertyFactory)?;
    let presaled = dependency(XtatuzContract::PresaledFactory)?;
    let project = dependency(XtatuzContract::ProjectFactory)?;

    let deployed = orchestrator
        .deploy_xtatuz_factory(property, presaled, project)
        .await?;
    print_deployed(&deployed);
    Ok(())
}

/// Deploy the router on top of the recorded aggregating factory
pub async fn deploy_router<R: ContractFactoryResolver>(
    args: DeployRouterArgs,
    orchestrator: &DeploymentOrchestrator<R>,
) -> Result<(), ScriptError> {
    let spv = parse_address(&args.spv)?;
    let factory = orchestrator.recorded_dependency(
        XtatuzContract::XtatuzRouter,
        &ContractSymbol::new(XtatuzContract::XtatuzFactory.artifact_name()),
    )?;

    print_deployed(&orchestrator.deploy_router(spv, factory).await?);
    Ok(())
}

/// Deploy the referral module paying out the recorded token
pub async fn deploy_referral<R: ContractFactoryResolver>(
    args: DeployReferralArgs,
    orchestrator: &DeploymentOrchestrator<R>,
) -> Result<(), ScriptError> {
    let token = orchestrator.recorded_dependency(
        XtatuzContract::XtatuzReferral,
        &ContractSymbol::new(args.token),
    )?;
    let initial_percentage = args
        .initial_percentage
        .into_iter()
        .map(U256::from)
        .collect_vec();

    print_deployed(
        &orchestrator
            .deploy_referral(token, &initial_percentage)
            .await?,
    );
    Ok(())
}

/// Deploy the reroll module on top of the recorded router
pub async fn deploy_reroll<R: ContractFactoryResolver>(
    args: DeployRerollArgs,
    orchestrator: &DeploymentOrchestrator<R>,
) -> Result<(), ScriptError> {
    let step = XtatuzContract::XtatuzReroll;
    let spv = parse_address(&args.spv)?;
    let router = orchestrator.recorded_dependency(
        step,
        &ContractSymbol::new(XtatuzContract::XtatuzRouter.artifact_name()),
    )?;
    let token = orchestrator.recorded_dependency(step, &ContractSymbol::new(args.token))?;

    print_deployed(&orchestrator.deploy_reroll(spv, router, token).await?);
    Ok(())
}

/// Print every address recorded for `network`
pub fn show_deployments(registry: &AddressRegistry, network: &NetworkId) -> Result<(), ScriptError> {
    let record = registry.record(network)?;
    if record.is_empty() {
        info!(%network, path = %registry.path().display(), "no deployments recorded");
        return Ok(());
    }

    for (symbol, address) in record {
        println!("{}: {}", symbol, address);
    }
    Ok(())
}

/// Print the address recorded for one contract
pub fn get_address(
    args: GetArgs,
    registry: &AddressRegistry,
    network: &NetworkId,
) -> Result<(), ScriptError> {
    let symbol = ContractSymbol::new(args.symbol);
    match registry.get(network, &symbol)? {
        Some(address) => {
            println!("{}", address);
            Ok(())
        }
        None => Err(ScriptError::MissingDeployment(format!(
            "no address recorded for `{}` on `{}`",
            symbol, network
        ))),
    }
}
