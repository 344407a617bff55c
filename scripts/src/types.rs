//! Type definitions used throughout the scripts

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::constants::{
    PRESALED_FACTORY_CONTRACT_KEY, PROJECT_FACTORY_CONTRACT_KEY, PROPERTY_FACTORY_CONTRACT_KEY,
    TOKEN_CONTRACT_NAME, XTATUZ_FACTORY_CONTRACT_KEY, XTATUZ_REFERRAL_CONTRACT_KEY,
    XTATUZ_REROLL_CONTRACT_KEY, XTATUZ_ROUTER_CONTRACT_KEY, XTA_TOKEN_CONTRACT_NAME,
};

/// The name of the network a set of deployments targets, e.g. `goerli`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(String);

impl NetworkId {
    /// Create a network identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The network name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NetworkId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The key under which a deployed contract is recorded within a network,
/// a token ticker or a contract name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractSymbol(String);

impl ContractSymbol {
    /// Create a contract symbol
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    /// The symbol as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ContractSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContractSymbol {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

/// The deployed addresses within a single network
pub type AddressRecord = BTreeMap<ContractSymbol, Address>;

/// The contracts of the Xtatuz suite, in deployment order
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum XtatuzContract {
    /// A mock ERC20 token
    Token,
    /// The XTA token
    XtaToken,
    /// The presaled token factory
    PresaledFactory,
    /// The property token factory
    PropertyFactory,
    /// The project factory
    ProjectFactory,
    /// The factory aggregating the presaled, property and project factories
    XtatuzFactory,
    /// The router
    XtatuzRouter,
    /// The referral module
    XtatuzReferral,
    /// The reroll module
    XtatuzReroll,
}

impl XtatuzContract {
    /// The name of the compilation artifact for this contract
    pub fn artifact_name(&self) -> &'static str {
        match self {
            XtatuzContract::Token => TOKEN_CONTRACT_NAME,
            XtatuzContract::XtaToken => XTA_TOKEN_CONTRACT_NAME,
            XtatuzContract::PresaledFactory => PRESALED_FACTORY_CONTRACT_KEY,
            XtatuzContract::PropertyFactory => PROPERTY_FACTORY_CONTRACT_KEY,
            XtatuzContract::ProjectFactory => PROJECT_FACTORY_CONTRACT_KEY,
            XtatuzContract::XtatuzFactory => XTATUZ_FACTORY_CONTRACT_KEY,
            XtatuzContract::XtatuzRouter => XTATUZ_ROUTER_CONTRACT_KEY,
            XtatuzContract::XtatuzReferral => XTATUZ_REFERRAL_CONTRACT_KEY,
            XtatuzContract::XtatuzReroll => XTATUZ_REROLL_CONTRACT_KEY,
        }
    }

    /// The registry key of a singleton contract.
    ///
    /// Tokens are keyed by their ticker instead, so they have no default.
    pub fn default_symbol(&self) -> Option<ContractSymbol> {
        match self {
            XtatuzContract::Token | XtatuzContract::XtaToken => None,
            _ => Some(ContractSymbol::new(self.artifact_name())),
        }
    }

    /// Whether the contract is a mock that should never reach a production network
    pub fn is_test_only(&self) -> bool {
        matches!(self, XtatuzContract::Token)
    }
}

impl Display for XtatuzContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.artifact_name())
    }
}

/// A contract that has been deployed and recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContract {
    /// Which contract was deployed
    pub contract: XtatuzContract,
    /// The key it is recorded under
    pub symbol: ContractSymbol,
    /// The address it was deployed at
    pub address: Address,
}

#[cfg(test)]
mod tests {
    use super::{ContractSymbol, XtatuzContract};

    #[test]
    fn test_tokens_have_no_default_symbol() {
        assert_eq!(XtatuzContract::Token.default_symbol(), None);
        assert_eq!(XtatuzContract::XtaToken.default_symbol(), None);
    }

    #[test]
    fn test_singletons_keyed_by_artifact_name() {
        assert_eq!(
            XtatuzContract::XtatuzRouter.default_symbol(),
            Some(ContractSymbol::from("XtatuzRouter"))
        );
        assert_eq!(XtatuzContract::XtaToken.to_string(), "XTAToken");
    }

    #[test]
    fn test_symbols_serialize_as_plain_strings() {
        let symbol = ContractSymbol::from("XTA");
        assert_eq!(serde_json::to_string(&symbol).unwrap(), "\"XTA\"");
    }
}
