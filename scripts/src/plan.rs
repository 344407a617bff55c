//! The deployment plan read by `deploy-all`

use std::{collections::HashSet, fs, path::Path};

use alloy_primitives::{utils::parse_ether, Address, U256};
use serde::Deserialize;

use crate::{errors::ScriptError, types::ContractSymbol};

/// The kind of token contract to deploy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// A mock token with no initial supply
    Token,
    /// The XTA token, minted with a fixed total supply
    Xta,
}

/// A token to deploy in the first step
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TokenPlan {
    /// The kind of token
    pub kind: TokenKind,
    /// The token name
    pub name: String,
    /// The token ticker, also its key in the registry
    pub symbol: ContractSymbol,
    /// The total supply in whole tokens, only for XTA tokens
    #[serde(default)]
    pub total_supply: Option<String>,
}

impl TokenPlan {
    /// The total supply in wei, parsed from whole tokens
    pub fn total_supply_wei(&self) -> Result<U256, ScriptError> {
        let supply = self.total_supply.as_deref().ok_or_else(|| {
            ScriptError::ConfigParsing(format!("token `{}` has no total supply", self.symbol))
        })?;
        parse_ether(supply).map_err(|e| {
            ScriptError::ConfigParsing(format!(
                "invalid total supply `{}` for `{}`: {}",
                supply, self.symbol, e
            ))
        })
    }
}

/// Parameters of the referral module
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ReferralPlan {
    /// The registry key of the token paid out as referral rewards
    pub token: ContractSymbol,
    /// The initial percentage distribution, passed to the constructor as is
    pub initial_percentage: Vec<u64>,
}

/// Parameters of the reroll module
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RerollPlan {
    /// The registry key of the token rerolls are paid in
    pub token: ContractSymbol,
}

/// Everything needed to deploy the full suite on one network
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DeploymentPlan {
    /// The SPV address passed to the router and reroll constructors
    pub spv: Address,
    /// Reuse contracts already recorded in the registry instead of redeploying them
    #[serde(default)]
    pub resume: bool,
    /// The tokens to deploy, in order
    pub tokens: Vec<TokenPlan>,
    /// The referral module parameters
    pub referral: ReferralPlan,
    /// The reroll module parameters
    pub reroll: RerollPlan,
}

impl DeploymentPlan {
    /// Parse and validate a plan from TOML
    pub fn from_toml(contents: &str) -> Result<Self, ScriptError> {
        let plan: Self =
            toml::from_str(contents).map_err(|e| ScriptError::ConfigParsing(e.to_string()))?;
        plan.validate()?;
        Ok(plan)
    }

    /// Read, parse and validate a plan file
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ScriptError::ConfigParsing(format!("reading {}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    /// Check the plan for mistakes that would otherwise surface mid-deployment
    fn validate(&self) -> Result<(), ScriptError> {
        if self.tokens.is_empty() {
            return Err(ScriptError::ConfigParsing(
                "plan must deploy at least one token".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for token in &self.tokens {
            if !seen.insert(&token.symbol) {
                return Err(ScriptError::ConfigParsing(format!(
                    "token symbol `{}` appears twice",
                    token.symbol
                )));
            }
            match (token.kind, &token.total_supply) {
                (TokenKind::Xta, _) => {
                    token.total_supply_wei()?;
                }
                (TokenKind::Token, Some(_)) => {
                    return Err(ScriptError::ConfigParsing(format!(
                        "token `{}` is a mock token and takes no total supply",
                        token.symbol
                    )))
                }
                (TokenKind::Token, None) => {}
            }
        }

        if self.referral.initial_percentage.is_empty() {
            return Err(ScriptError::ConfigParsing(
                "referral initial percentage must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::utils::parse_ether;

    use crate::errors::ScriptError;

    use super::{DeploymentPlan, TokenKind};

    const DEVNET_PLAN: &str = include_str!("../plans/devnet.toml");

    #[test]
    fn test_parse_devnet_plan() {
        let plan = DeploymentPlan::from_toml(DEVNET_PLAN).unwrap();

        assert!(!plan.resume);
        assert_eq!(plan.tokens.len(), 2);
        assert_eq!(plan.tokens[0].kind, TokenKind::Xta);
        assert_eq!(
            plan.tokens[0].total_supply_wei().unwrap(),
            parse_ether("1500000000").unwrap()
        );
        assert_eq!(plan.referral.token.as_str(), "XTA");
        assert_eq!(plan.referral.initial_percentage, vec![300, 200, 100]);
        assert_eq!(plan.reroll.token.as_str(), "USDT");
    }

    #[test]
    fn test_duplicate_symbols_rejected() {
        let plan = r#"
            spv = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"

            [[tokens]]
            kind = "token"
            name = "Tether"
            symbol = "USDT"

            [[tokens]]
            kind = "token"
            name = "Tether Again"
            symbol = "USDT"

            [referral]
            token = "USDT"
            initial-percentage = [100]

            [reroll]
            token = "USDT"
        "#;

        assert!(matches!(
            DeploymentPlan::from_toml(plan),
            Err(ScriptError::ConfigParsing(_))
        ));
    }

    #[test]
    fn test_xta_requires_total_supply() {
        let plan = r#"
            spv = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"

            [[tokens]]
            kind = "xta"
            name = "XTA Token"
            symbol = "XTA"

            [referral]
            token = "XTA"
            initial-percentage = [100]

            [reroll]
            token = "XTA"
        "#;

        assert!(DeploymentPlan::from_toml(plan).is_err());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let plan = DEVNET_PLAN.replace("resume = false", "resume = false\nnetwork = \"goerli\"");
        assert!(DeploymentPlan::from_toml(&plan).is_err());
    }
}
