//! Utilities for the deploy scripts.

use std::str::FromStr;

use alloy::{
    network::Ethereum,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_primitives::Address;
use tracing::info;

use crate::errors::ScriptError;

/// Sets up the signing provider deployments are sent through, checking that
/// the RPC endpoint is reachable
pub async fn setup_client(
    priv_key: &str,
    rpc_url: &str,
) -> Result<DynProvider<Ethereum>, ScriptError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    let deployer = signer.address();
    let provider = DynProvider::new(ProviderBuilder::new().wallet(signer).connect_http(url));

    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    info!(%deployer, chain_id, rpc_url, "connected to network");

    Ok(provider)
}

/// Parse a hex address given on the command line
pub fn parse_address(address: &str) -> Result<Address, ScriptError> {
    Address::from_str(address)
        .map_err(|e| ScriptError::CalldataConstruction(format!("invalid address `{address}`: {e}")))
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;

    use super::parse_address;

    #[test]
    fn test_parse_address() {
        assert_eq!(
            parse_address("0x0000000000000000000000000000000000000001").unwrap(),
            Address::with_last_byte(1)
        );
        assert!(parse_address("0x1234").is_err());
    }
}
