//! Wallet-extension types and error definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by the wallet extension
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("Wallet extension is not connected")]
    NotConnected,

    #[error("Request rejected by user: {0}")]
    Rejected(String),

    #[error("Wallet extension error: {0}")]
    Extension(String),
}

/// Network the extension is asked to sign for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDescriptor {
    pub blockchain: String,
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub chain_id: String,
}

/// One account inside a granted identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityAccount {
    pub name: String,
    #[serde(default)]
    pub authority: String,
    pub blockchain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
}

impl IdentityAccount {
    /// Whether this account belongs to `network`.
    ///
    /// Accounts without a chain ID match on the blockchain name alone.
    pub fn matches(&self, network: &NetworkDescriptor) -> bool {
        self.blockchain == network.blockchain
            && self
                .chain_id
                .as_deref()
                .is_none_or(|id| id == network.chain_id)
    }
}

/// Credential bundle granted by the extension
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub accounts: Vec<IdentityAccount>,
}

impl Identity {
    /// First account belonging to `network`
    pub fn account_for(&self, network: &NetworkDescriptor) -> Option<&IdentityAccount> {
        self.accounts.iter().find(|account| account.matches(network))
    }
}

/// Interactive identity-grant request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityRequest {
    pub accounts: Vec<NetworkDescriptor>,
}

impl IdentityRequest {
    pub fn for_network(network: &NetworkDescriptor) -> Self {
        Self {
            accounts: vec![network.clone()],
        }
    }
}
