//! ChainClient and ChainConnector trait definitions

use std::sync::Arc;

use async_trait::async_trait;

use super::types::{ChainError, ClientConfig, TableRows, TableRowsQuery, TransactionEnvelope, TxReceipt};

/// Trait for chain RPC clients (direct-key or wallet-extension backed)
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Sign (when configured) and broadcast a transaction
    async fn transaction(&self, envelope: &TransactionEnvelope) -> Result<TxReceipt, ChainError>;

    /// Run a range query against a contract table
    async fn get_table_rows(&self, query: &TableRowsQuery) -> Result<TableRows, ChainError>;

    /// Public keys this client can sign with
    async fn available_keys(&self) -> Result<Vec<String>, ChainError>;

    /// Accounts controlled by `public_key` (reverse key lookup)
    async fn get_key_accounts(&self, public_key: &str) -> Result<Vec<String>, ChainError>;
}

/// Builds chain clients from a direct-key configuration
#[async_trait]
pub trait ChainConnector: Send + Sync {
    async fn connect(&self, config: &ClientConfig) -> Result<Arc<dyn ChainClient>, ChainError>;
}
