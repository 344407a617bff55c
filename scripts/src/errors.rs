//! Definitions of errors that can occur during the execution of the deployment scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use alloy_primitives::Address;

use crate::types::{ContractSymbol, XtatuzContract};

/// Errors that can occur when reading or writing the deployments registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry file could not be read or written
    IoFailure(String),
    /// The registry file exists but its contents could not be parsed
    CorruptState(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::IoFailure(s) => write!(f, "registry I/O failure: {}", s),
            RegistryError::CorruptState(s) => write!(f, "registry state is corrupt: {}", s),
        }
    }
}

impl Error for RegistryError {}

/// Errors that abort a deployment sequence, each tagged with the step at which
/// the sequence stopped
#[derive(Debug)]
pub enum DeploymentError {
    /// The deployment toolchain rejected or failed to confirm a deployment
    SubmissionFailed {
        /// The contract whose deployment failed
        step: XtatuzContract,
        /// The reason reported by the toolchain
        reason: String,
    },
    /// An upstream address needed for a constructor argument was not available
    MissingDependency {
        /// The contract that could not be deployed
        step: XtatuzContract,
        /// The registry key of the missing upstream contract
        dependency: ContractSymbol,
    },
    /// A constructor argument could not be built, nothing was submitted
    InvalidArgument {
        /// The contract that could not be deployed
        step: XtatuzContract,
        /// Why the argument is invalid
        reason: String,
    },
    /// The contract was deployed but its address could not be recorded
    RecordFailed {
        /// The contract that was deployed
        step: XtatuzContract,
        /// The address the contract was deployed at
        address: Address,
        /// The underlying registry error
        source: RegistryError,
    },
    /// The registry could not be read around a deployment
    Registry {
        /// The contract being deployed when the registry failed
        step: XtatuzContract,
        /// The underlying registry error
        source: RegistryError,
    },
}

impl DeploymentError {
    /// The step at which the deployment sequence was aborted
    pub fn step(&self) -> XtatuzContract {
        match self {
            DeploymentError::SubmissionFailed { step, .. }
            | DeploymentError::MissingDependency { step, .. }
            | DeploymentError::InvalidArgument { step, .. }
            | DeploymentError::RecordFailed { step, .. }
            | DeploymentError::Registry { step, .. } => *step,
        }
    }
}

impl Display for DeploymentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentError::SubmissionFailed { step, reason } => {
                write!(f, "error deploying `{}`: {}", step, reason)
            }
            DeploymentError::MissingDependency { step, dependency } => write!(
                f,
                "cannot deploy `{}`: no address recorded for `{}`",
                step, dependency
            ),
            DeploymentError::InvalidArgument { step, reason } => {
                write!(f, "invalid argument for `{}`: {}", step, reason)
            }
            DeploymentError::RecordFailed {
                step,
                address,
                source,
            } => write!(
                f,
                "`{}` was deployed at {} but could not be recorded: {}",
                step, address, source
            ),
            DeploymentError::Registry { step, source } => {
                write!(f, "registry error while deploying `{}`: {}", step, source)
            }
        }
    }
}

impl Error for DeploymentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DeploymentError::RecordFailed { source, .. }
            | DeploymentError::Registry { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors surfaced by the command line entrypoint
#[derive(Debug)]
pub enum ScriptError {
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error reading or validating the deployment plan
    ConfigParsing(String),
    /// Error constructing a constructor argument
    CalldataConstruction(String),
    /// Error locating or parsing a compilation artifact
    ArtifactParsing(String),
    /// A looked up contract has no recorded address
    MissingDeployment(String),
    /// Error reading or writing the deployments registry
    Registry(RegistryError),
    /// Error deploying a contract
    Deployment(DeploymentError),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ConfigParsing(s) => write!(f, "error parsing deployment plan: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::MissingDeployment(s) => write!(f, "{}", s),
            ScriptError::Registry(e) => write!(f, "{}", e),
            ScriptError::Deployment(e) => write!(f, "{}", e),
        }
    }
}

impl Error for ScriptError {}

impl From<RegistryError> for ScriptError {
    fn from(e: RegistryError) -> Self {
        ScriptError::Registry(e)
    }
}

impl From<DeploymentError> for ScriptError {
    fn from(e: DeploymentError) -> Self {
        ScriptError::Deployment(e)
    }
}
