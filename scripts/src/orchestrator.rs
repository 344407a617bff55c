//! Sequencing of the Xtatuz suite deployment.
//!
//! Contracts are deployed one at a time in dependency order:
//! 1. tokens
//! 2. the presaled, property and project factories
//! 3. the aggregating `XtatuzFactory`
//! 4. the router
//! 5. the referral module
//! 6. the reroll module
//!
//! Each address is written to the registry as soon as its deployment is
//! confirmed, so an aborted run leaves exactly the completed steps recorded.

use std::sync::Arc;

use alloy::dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};
use itertools::Itertools;
use tracing::{info, warn};

use crate::{
    constants::UINT_BITS,
    errors::{DeploymentError, RegistryError},
    plan::{DeploymentPlan, TokenKind},
    registry::AddressRegistry,
    resolver::ContractFactoryResolver,
    types::{AddressRecord, ContractSymbol, DeployedContract, NetworkId, XtatuzContract},
};

/// The contracts deployed by a full run, in deployment order
#[derive(Debug, Clone, Default)]
pub struct DeploymentSummary {
    /// Every contract deployed or reused, in order
    pub deployed: Vec<DeployedContract>,
}

impl DeploymentSummary {
    /// The address this run produced for `symbol`
    pub fn address_of(&self, symbol: &ContractSymbol) -> Option<Address> {
        self.deployed
            .iter()
            .find(|deployed| &deployed.symbol == symbol)
            .map(|deployed| deployed.address)
    }

    /// Append a deployed contract, returning its address
    fn push(&mut self, deployed: DeployedContract) -> Address {
        let address = deployed.address;
        self.deployed.push(deployed);
        address
    }
}

/// Deploys the suite on a single network, recording every address in the registry
pub struct DeploymentOrchestrator<R> {
    /// Produces the factory of each contract
    resolver: R,
    /// Where deployed addresses are recorded
    registry: Arc<AddressRegistry>,
    /// The network deployments target
    network: NetworkId,
    /// Whether to reuse contracts already recorded for the network
    resume: bool,
}

impl<R: ContractFactoryResolver> DeploymentOrchestrator<R> {
    /// Create an orchestrator deploying to `network`
    pub fn new(resolver: R, registry: Arc<AddressRegistry>, network: NetworkId) -> Self {
        Self {
            resolver,
            registry,
            network,
            resume: false,
        }
    }

    /// Reuse contracts already recorded in the registry instead of redeploying them
    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    /// The network deployments target
    pub fn network(&self) -> &NetworkId {
        &self.network
    }

    // ----------
    // | Tokens |
    // ----------

    /// Deploy a mock token, recorded under its ticker
    pub async fn deploy_token(
        &self,
        name: &str,
        symbol: &ContractSymbol,
    ) -> Result<DeployedContract, DeploymentError> {
        let args = vec![
            DynSolValue::String(name.to_string()),
            DynSolValue::String(symbol.to_string()),
        ];
        self.deploy_contract(XtatuzContract::Token, symbol.clone(), args)
            .await
    }

    /// Deploy the XTA token with `total_supply` wei minted, recorded under its ticker
    pub async fn deploy_xta_token(
        &self,
        name: &str,
        symbol: &ContractSymbol,
        total_supply: U256,
    ) -> Result<DeployedContract, DeploymentError> {
        let args = vec![
            DynSolValue::String(name.to_string()),
            DynSolValue::String(symbol.to_string()),
            DynSolValue::Uint(total_supply, UINT_BITS),
        ];
        self.deploy_contract(XtatuzContract::XtaToken, symbol.clone(), args)
            .await
    }

    // -------------
    // | Factories |
    // -------------

    /// Deploy the presaled token factory
    pub async fn deploy_presaled_factory(&self) -> Result<DeployedContract, DeploymentError> {
        self.deploy_singleton(XtatuzContract::PresaledFactory, vec![])
            .await
    }

    /// Deploy the property token factory
    pub async fn deploy_property_factory(&self) -> Result<DeployedContract, DeploymentError> {
        self.deploy_singleton(XtatuzContract::PropertyFactory, vec![])
            .await
    }

    /// Deploy the project factory
    pub async fn deploy_project_factory(&self) -> Result<DeployedContract, DeploymentError> {
        self.deploy_singleton(XtatuzContract::ProjectFactory, vec![])
            .await
    }

    /// Deploy the factory aggregating the three independent factories
    pub async fn deploy_xtatuz_factory(
        &self,
        property_factory: Address,
        presaled_factory: Address,
        project_factory: Address,
    ) -> Result<DeployedContract, DeploymentError> {
        let args = vec![
            DynSolValue::Address(property_factory),
            DynSolValue::Address(presaled_factory),
            DynSolValue::Address(project_factory),
        ];
        self.deploy_singleton(XtatuzContract::XtatuzFactory, args)
            .await
    }

    // -----------
    // | Modules |
    // -----------

    /// Deploy the router on top of the aggregating factory
    pub async fn deploy_router(
        &self,
        spv: Address,
        factory: Address,
    ) -> Result<DeployedContract, DeploymentError> {
        let args = vec![DynSolValue::Address(spv), DynSolValue::Address(factory)];
        self.deploy_singleton(XtatuzContract::XtatuzRouter, args)
            .await
    }

    /// Deploy the referral module. The percentages are forwarded as given,
    /// the contract enforces its own rules on them.
    pub async fn deploy_referral(
        &self,
        token: Address,
        initial_percentage: &[U256],
    ) -> Result<DeployedContract, DeploymentError> {
        let percentages = initial_percentage
            .iter()
            .map(|p| DynSolValue::Uint(*p, UINT_BITS))
            .collect();
        let args = vec![
            DynSolValue::Address(token),
            DynSolValue::Array(percentages),
        ];
        self.deploy_singleton(XtatuzContract::XtatuzReferral, args)
            .await
    }

    /// Deploy the reroll module
    pub async fn deploy_reroll(
        &self,
        spv: Address,
        router: Address,
        token: Address,
    ) -> Result<DeployedContract, DeploymentError> {
        let args = vec![
            DynSolValue::Address(spv),
            DynSolValue::Address(router),
            DynSolValue::Address(token),
        ];
        self.deploy_singleton(XtatuzContract::XtatuzReroll, args)
            .await
    }

    // ------------
    // | Sequence |
    // ------------

    /// Deploy the full suite described by `plan`, stopping at the first failure
    pub async fn deploy_all(
        &self,
        plan: &DeploymentPlan,
    ) -> Result<DeploymentSummary, DeploymentError> {
        info!(network = %self.network, resume = self.resume, "deploying Xtatuz suite");
        let mut summary = DeploymentSummary::default();

        // Check the plan against the registry before anything is deployed
        let supplies = self.token_supplies(plan)?;
        self.check_token_dependency(plan, XtatuzContract::XtatuzReferral, &plan.referral.token)?;
        self.check_token_dependency(plan, XtatuzContract::XtatuzReroll, &plan.reroll.token)?;

        // 1. Tokens
        for (token, supply) in plan.tokens.iter().zip(supplies) {
            let deployed = match supply {
                None => self.deploy_token(&token.name, &token.symbol).await?,
                Some(total_supply) => {
                    self.deploy_xta_token(&token.name, &token.symbol, total_supply)
                        .await?
                }
            };
            summary.push(deployed);
        }

        // 2. Independent factories
        let presaled = summary.push(self.deploy_presaled_factory().await?);
        let property = summary.push(self.deploy_property_factory().await?);
        let project = summary.push(self.deploy_project_factory().await?);

        // 3. Aggregating factory
        let factory = summary.push(
            self.deploy_xtatuz_factory(property, presaled, project)
                .await?,
        );

        // 4. Router
        let router = summary.push(self.deploy_router(plan.spv, factory).await?);

        // 5. Referral
        let referral_token =
            self.dependency(&summary, XtatuzContract::XtatuzReferral, &plan.referral.token)?;
        let percentages = plan
            .referral
            .initial_percentage
            .iter()
            .map(|p| U256::from(*p))
            .collect_vec();
        summary.push(self.deploy_referral(referral_token, &percentages).await?);

        // 6. Reroll
        let reroll_token =
            self.dependency(&summary, XtatuzContract::XtatuzReroll, &plan.reroll.token)?;
        summary.push(self.deploy_reroll(plan.spv, router, reroll_token).await?);

        info!(
            network = %self.network,
            contracts = %summary.deployed.iter().map(|d| &d.symbol).join(", "),
            "Xtatuz suite deployed"
        );
        Ok(summary)
    }

    /// Read the address recorded for `dependency`, which `step` needs as a
    /// constructor argument
    pub fn recorded_dependency(
        &self,
        step: XtatuzContract,
        dependency: &ContractSymbol,
    ) -> Result<Address, DeploymentError> {
        self.registry
            .get(&self.network, dependency)
            .map_err(|source| DeploymentError::Registry { step, source })?
            .ok_or_else(|| DeploymentError::MissingDependency {
                step,
                dependency: dependency.clone(),
            })
    }

    /// The total supply of each planned token in wei, `None` for mock tokens
    fn token_supplies(&self, plan: &DeploymentPlan) -> Result<Vec<Option<U256>>, DeploymentError> {
        plan.tokens
            .iter()
            .map(|token| match token.kind {
                TokenKind::Token => Ok(None),
                TokenKind::Xta => token.total_supply_wei().map(Some).map_err(|e| {
                    DeploymentError::InvalidArgument {
                        step: XtatuzContract::XtaToken,
                        reason: e.to_string(),
                    }
                }),
            })
            .collect()
    }

    /// Check that `dependency` is either deployed by the plan or already recorded
    fn check_token_dependency(
        &self,
        plan: &DeploymentPlan,
        step: XtatuzContract,
        dependency: &ContractSymbol,
    ) -> Result<(), DeploymentError> {
        if plan.tokens.iter().any(|token| &token.symbol == dependency) {
            return Ok(());
        }
        self.recorded_dependency(step, dependency).map(|_| ())
    }

    /// Find `dependency` among this run's deployments, falling back to the registry
    fn dependency(
        &self,
        summary: &DeploymentSummary,
        step: XtatuzContract,
        dependency: &ContractSymbol,
    ) -> Result<Address, DeploymentError> {
        match summary.address_of(dependency) {
            Some(address) => Ok(address),
            None => self.recorded_dependency(step, dependency),
        }
    }

    /// Deploy a contract recorded under its artifact name
    async fn deploy_singleton(
        &self,
        contract: XtatuzContract,
        args: Vec<DynSolValue>,
    ) -> Result<DeployedContract, DeploymentError> {
        let symbol = contract
            .default_symbol()
            .ok_or_else(|| DeploymentError::InvalidArgument {
                step: contract,
                reason: "contract must be deployed under an explicit symbol".to_string(),
            })?;
        self.deploy_contract(contract, symbol, args).await
    }

    /// Resolve, deploy and record a single contract
    async fn deploy_contract(
        &self,
        contract: XtatuzContract,
        symbol: ContractSymbol,
        args: Vec<DynSolValue>,
    ) -> Result<DeployedContract, DeploymentError> {
        let registry_error = |source: RegistryError| DeploymentError::Registry {
            step: contract,
            source,
        };

        if self.resume {
            let recorded = self
                .registry
                .get(&self.network, &symbol)
                .map_err(registry_error)?;
            if let Some(address) = recorded {
                info!(network = %self.network, %contract, %symbol, %address, "already deployed, skipping");
                return Ok(DeployedContract {
                    contract,
                    symbol,
                    address,
                });
            }
        }

        if contract.is_test_only() {
            warn!(
                "Deploying `{}` as `{}` - THIS SHOULD ONLY BE DONE FOR TESTING",
                contract, symbol
            );
        }
        info!(network = %self.network, %contract, %symbol, num_args = args.len(), "deploying contract");

        let submission_failed = |reason: String| DeploymentError::SubmissionFailed {
            step: contract,
            reason,
        };
        let factory = self
            .resolver
            .resolve(contract)
            .map_err(submission_failed)?;
        let address = factory.deploy(args).await.map_err(submission_failed)?;

        let entry: AddressRecord = [(symbol.clone(), address)].into_iter().collect();
        if let Err(source) = self.registry.upsert(&self.network, entry) {
            warn!(
                network = %self.network, %contract, %symbol, %address, error = %source,
                "contract deployed but not recorded, record its address before resuming"
            );
            return Err(DeploymentError::RecordFailed {
                step: contract,
                address,
                source,
            });
        }
        info!(network = %self.network, %contract, %symbol, %address, "contract deployed");

        Ok(DeployedContract {
            contract,
            symbol,
            address,
        })
    }
}
