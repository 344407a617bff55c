//! Resolution of contract names to deployable factories.
//!
//! The orchestrator only sees the [`ContractFactoryResolver`] and
//! [`FactoryHandle`] traits. [`ArtifactResolver`] implements them on top of
//! Hardhat compilation artifacts and an alloy provider.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::JsonAbi,
    network::{Ethereum, ReceiptResponse, TransactionBuilder},
    primitives::{Address, Bytes},
    providers::{DynProvider, Provider},
    rpc::types::TransactionRequest,
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::{
    constants::{ARTIFACT_EXTENSION, CONTRACTS_ARTIFACTS_SUBDIR, SOLIDITY_EXTENSION},
    types::XtatuzContract,
};

/// Produces a factory for each contract of the suite
pub trait ContractFactoryResolver: Send + Sync {
    /// Resolve the factory of `contract`
    fn resolve(&self, contract: XtatuzContract) -> Result<Box<dyn FactoryHandle>, String>;
}

/// A factory able to deploy one contract
#[async_trait]
pub trait FactoryHandle: Send + Sync {
    /// Deploy the contract with the given constructor arguments, resolving
    /// once the deployment is confirmed on chain
    async fn deploy(&self, args: Vec<DynSolValue>) -> Result<Address, String>;
}

/// The subset of a Hardhat artifact needed to deploy a contract
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardhatArtifact {
    /// The name of the compiled contract
    pub contract_name: String,
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation bytecode
    pub bytecode: Bytes,
}

impl HardhatArtifact {
    /// Parse an artifact from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }

    /// The creation code for a deployment with `args`: the bytecode followed
    /// by the ABI-encoded constructor arguments
    pub fn deploy_code(&self, args: &[DynSolValue]) -> Result<Bytes, String> {
        if self.bytecode.is_empty() {
            return Err(format!(
                "`{}` has no bytecode, it is abstract or an interface",
                self.contract_name
            ));
        }

        let encoded_args = match &self.abi.constructor {
            Some(constructor) => constructor
                .abi_encode_input(args)
                .map_err(|e| format!("encoding `{}` constructor: {}", self.contract_name, e))?,
            None if args.is_empty() => Vec::new(),
            None => {
                return Err(format!(
                    "`{}` takes no constructor arguments, got {}",
                    self.contract_name,
                    args.len()
                ))
            }
        };

        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(&encoded_args);
        Ok(code.into())
    }
}

/// Locate the artifact of `contract_name` under a Hardhat `artifacts` directory,
/// i.e. `<artifacts>/contracts/**/<Name>.sol/<Name>.json`
pub fn find_artifact(artifacts_dir: &Path, contract_name: &str) -> Result<PathBuf, String> {
    let root = artifacts_dir.join(CONTRACTS_ARTIFACTS_SUBDIR);
    let file_name = format!("{contract_name}.{ARTIFACT_EXTENSION}");

    let mut pending = vec![root.clone()];
    while let Some(dir) = pending.pop() {
        let entries =
            fs::read_dir(&dir).map_err(|e| format!("reading {}: {}", dir.display(), e))?;
        for entry in entries {
            let path = entry.map_err(|e| e.to_string())?.path();
            if !path.is_dir() {
                continue;
            }

            let candidate = path.join(&file_name);
            let is_source_dir = path
                .extension()
                .is_some_and(|ext| ext == SOLIDITY_EXTENSION);
            if is_source_dir && candidate.is_file() {
                return Ok(candidate);
            }
            pending.push(path);
        }
    }

    Err(format!(
        "no artifact for `{}` under {}",
        contract_name,
        root.display()
    ))
}

/// Resolves contracts to factories deploying Hardhat artifacts through an RPC provider
#[derive(Clone)]
pub struct ArtifactResolver {
    /// The root of the Hardhat artifacts tree
    artifacts_dir: PathBuf,
    /// The signing provider deployments are sent through
    provider: DynProvider<Ethereum>,
    /// The number of confirmations to wait for
    confirmations: u64,
    /// How long to wait for confirmation before giving up
    timeout: Duration,
}

impl ArtifactResolver {
    /// Create a resolver reading artifacts from `artifacts_dir`
    pub fn new(
        artifacts_dir: impl Into<PathBuf>,
        provider: DynProvider<Ethereum>,
        confirmations: u64,
        timeout: Duration,
    ) -> Self {
        Self {
            artifacts_dir: artifacts_dir.into(),
            provider,
            confirmations,
            timeout,
        }
    }
}

impl ContractFactoryResolver for ArtifactResolver {
    fn resolve(&self, contract: XtatuzContract) -> Result<Box<dyn FactoryHandle>, String> {
        let path = find_artifact(&self.artifacts_dir, contract.artifact_name())?;
        let json =
            fs::read_to_string(&path).map_err(|e| format!("reading {}: {}", path.display(), e))?;
        let artifact = HardhatArtifact::from_json(&json)
            .map_err(|e| format!("parsing {}: {}", path.display(), e))?;
        debug!(artifact = %path.display(), "resolved contract artifact");

        Ok(Box::new(ArtifactFactory {
            artifact,
            provider: self.provider.clone(),
            confirmations: self.confirmations,
            timeout: self.timeout,
        }))
    }
}

/// Deploys a single Hardhat artifact
struct ArtifactFactory {
    /// The artifact to deploy
    artifact: HardhatArtifact,
    /// The signing provider
    provider: DynProvider<Ethereum>,
    /// The number of confirmations to wait for
    confirmations: u64,
    /// The confirmation timeout
    timeout: Duration,
}

#[async_trait]
impl FactoryHandle for ArtifactFactory {
    async fn deploy(&self, args: Vec<DynSolValue>) -> Result<Address, String> {
        let code = self.artifact.deploy_code(&args)?;
        let tx = TransactionRequest::default().with_deploy_code(code);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| e.to_string())?;
        debug!(tx_hash = %pending.tx_hash(), "deployment transaction sent");

        let receipt = pending
            .with_required_confirmations(self.confirmations)
            .with_timeout(Some(self.timeout))
            .get_receipt()
            .await
            .map_err(|e| e.to_string())?;

        if !receipt.status() {
            return Err(format!(
                "deployment transaction {} reverted",
                receipt.transaction_hash()
            ));
        }

        receipt
            .contract_address()
            .ok_or_else(|| "receipt has no contract address".to_string())
    }
}
