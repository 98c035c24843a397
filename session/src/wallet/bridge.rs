//! WalletBridge trait definition

use std::sync::Arc;

use async_trait::async_trait;

use crate::chain::ChainClient;

use super::types::{Identity, IdentityRequest, NetworkDescriptor, WalletError};

/// Trait for browser-injected signing agents (Scatter and compatibles)
#[async_trait]
pub trait WalletBridge: Send + Sync {
    /// Install the EOSIO plugin into the bridge
    async fn install_plugin(&self);

    /// Handshake with the extension. `false` when it is missing or refuses.
    async fn connect(&self, app_name: &str, network: &NetworkDescriptor) -> bool;

    /// Chain client that signs through the extension's identity
    async fn open_client(
        &self,
        network: &NetworkDescriptor,
    ) -> Result<Arc<dyn ChainClient>, WalletError>;

    /// Prompt the user for an identity grant
    async fn get_identity(&self, request: &IdentityRequest) -> Result<Identity, WalletError>;

    /// Identity granted earlier, if any
    async fn identity(&self) -> Option<Identity>;

    /// Revoke the granted identity
    async fn forget_identity(&self) -> Result<(), WalletError>;
}
