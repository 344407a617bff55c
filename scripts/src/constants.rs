//! Constants used in the deploy scripts

/// The default path of the deployments registry file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The default directory containing Hardhat compilation artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The subdirectory of the artifacts directory holding contract artifacts
pub const CONTRACTS_ARTIFACTS_SUBDIR: &str = "contracts";

/// The extension of a Hardhat artifact file
pub const ARTIFACT_EXTENSION: &str = "json";

/// The extension of a Solidity source directory in the artifacts tree
pub const SOLIDITY_EXTENSION: &str = "sol";

/// The default RPC URL, a local Hardhat or Anvil node
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// The default number of confirmations to wait for a deployment transaction
pub const DEFAULT_DEPLOY_CONFIRMATIONS: u64 = 1;

/// The default number of seconds to wait for a deployment to be confirmed
pub const DEFAULT_DEPLOY_TIMEOUT_SECS: u64 = 120;

/// The default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

/// The generic mock token artifact
pub const TOKEN_CONTRACT_NAME: &str = "Token";

/// The XTA governance token artifact
pub const XTA_TOKEN_CONTRACT_NAME: &str = "XTAToken";

/// The presaled factory artifact, also its key in the deployments file
pub const PRESALED_FACTORY_CONTRACT_KEY: &str = "PresaledFactory";

/// The property factory artifact, also its key in the deployments file
pub const PROPERTY_FACTORY_CONTRACT_KEY: &str = "PropertyFactory";

/// The project factory artifact, also its key in the deployments file
pub const PROJECT_FACTORY_CONTRACT_KEY: &str = "ProjectFactory";

/// The aggregating factory artifact, also its key in the deployments file
pub const XTATUZ_FACTORY_CONTRACT_KEY: &str = "XtatuzFactory";

/// The router artifact, also its key in the deployments file
pub const XTATUZ_ROUTER_CONTRACT_KEY: &str = "XtatuzRouter";

/// The referral module artifact, also its key in the deployments file
pub const XTATUZ_REFERRAL_CONTRACT_KEY: &str = "XtatuzReferral";

/// The reroll module artifact, also its key in the deployments file
pub const XTATUZ_REROLL_CONTRACT_KEY: &str = "XtatuzReroll";

/// The bit width of the `uint256` constructor arguments
pub const UINT_BITS: usize = 256;
