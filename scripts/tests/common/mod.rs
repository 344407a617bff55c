//! Test harness for the deployment orchestrator

use std::sync::{Arc, Mutex};

use alloy::dyn_abi::DynSolValue;
use alloy_primitives::Address;
use async_trait::async_trait;
use tempfile::TempDir;
use xtatuz_scripts::{
    orchestrator::DeploymentOrchestrator,
    plan::DeploymentPlan,
    registry::AddressRegistry,
    resolver::{ContractFactoryResolver, FactoryHandle},
    types::{NetworkId, XtatuzContract},
};

/// The plan shipped for local deployments
pub const DEVNET_PLAN: &str = include_str!("../../plans/devnet.toml");

/// The network the tests deploy to
pub const TEST_NETWORK: &str = "hardhat";

/// A deployment observed by the mock toolchain
#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
    /// The deployed contract
    pub contract: XtatuzContract,
    /// The constructor arguments it received
    pub args: Vec<DynSolValue>,
    /// The address handed out
    pub address: Address,
}

/// Shared state of the mock toolchain
#[derive(Default)]
struct MockState {
    /// Every successful deployment, in order
    deployments: Vec<Deployment>,
    /// The number of addresses handed out so far
    nonce: u8,
    /// A contract whose deployment is rejected
    fail_on: Option<XtatuzContract>,
}

/// A toolchain that hands out sequential addresses instead of deploying
#[derive(Clone, Default)]
pub struct MockResolver {
    /// State shared with every factory this resolver hands out
    state: Arc<Mutex<MockState>>,
}

impl MockResolver {
    /// A resolver rejecting every deployment of `contract`
    pub fn failing_on(contract: XtatuzContract) -> Self {
        let resolver = Self::default();
        resolver.state.lock().unwrap().fail_on = Some(contract);
        resolver
    }

    /// A resolver whose first address is `Address::repeat_byte(nonce + 1)`
    pub fn starting_at(nonce: u8) -> Self {
        let resolver = Self::default();
        resolver.state.lock().unwrap().nonce = nonce;
        resolver
    }

    /// Every successful deployment so far
    pub fn deployments(&self) -> Vec<Deployment> {
        self.state.lock().unwrap().deployments.clone()
    }

    /// The contracts deployed so far, in order
    pub fn deployed_contracts(&self) -> Vec<XtatuzContract> {
        self.deployments().into_iter().map(|d| d.contract).collect()
    }

    /// The deployment of `contract`, panicking if it never happened
    pub fn deployment_of(&self, contract: XtatuzContract) -> Deployment {
        self.deployments()
            .into_iter()
            .find(|d| d.contract == contract)
            .unwrap_or_else(|| panic!("`{contract}` was never deployed"))
    }
}

impl ContractFactoryResolver for MockResolver {
    fn resolve(&self, contract: XtatuzContract) -> Result<Box<dyn FactoryHandle>, String> {
        Ok(Box::new(MockFactory {
            contract,
            state: self.state.clone(),
        }))
    }
}

/// The factory of one contract in the mock toolchain
struct MockFactory {
    /// The contract this factory deploys
    contract: XtatuzContract,
    /// State shared with the resolver
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl FactoryHandle for MockFactory {
    async fn deploy(&self, args: Vec<DynSolValue>) -> Result<Address, String> {
        // Suspend like a real confirmation wait would
        tokio::task::yield_now().await;

        let mut state = self.state.lock().unwrap();
        if state.fail_on == Some(self.contract) {
            return Err("execution reverted".to_string());
        }

        state.nonce += 1;
        let address = Address::repeat_byte(state.nonce);
        state.deployments.push(Deployment {
            contract: self.contract,
            args,
            address,
        });
        Ok(address)
    }
}

/// A registry in a scratch directory, kept alive by the returned guard
pub fn scratch_registry() -> (TempDir, Arc<AddressRegistry>) {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(AddressRegistry::new(dir.path().join("deployments.json")));
    (dir, registry)
}

/// An orchestrator deploying to the test network through `resolver`
pub fn orchestrator(
    resolver: &MockResolver,
    registry: &Arc<AddressRegistry>,
) -> DeploymentOrchestrator<MockResolver> {
    DeploymentOrchestrator::new(
        resolver.clone(),
        registry.clone(),
        NetworkId::from(TEST_NETWORK),
    )
}

/// The devnet plan
pub fn devnet_plan() -> DeploymentPlan {
    DeploymentPlan::from_toml(DEVNET_PLAN).unwrap()
}
