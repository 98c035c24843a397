//! Test Utilities Module
//!
//! In-memory doubles for the chain client, connector and wallet extension.
//! This module is only compiled when running tests.

#![cfg(test)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use crate::chain::{
    ChainClient, ChainConnector, ChainError, ClientConfig, Row, TableRows, TableRowsQuery,
    TransactionEnvelope, TxReceipt,
};
use crate::config::Config;
use crate::wallet::{Identity, IdentityRequest, NetworkDescriptor, WalletBridge, WalletError};

/// Configuration with a recognizable contract account
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.chain.chain_id = "test-chain".to_string();
    config.chain.contract_account = "peeranhatest".to_string();
    config
}

// ============================================================================
// Chain client
// ============================================================================

#[derive(Default)]
struct ChainScript {
    available_keys: Vec<String>,
    key_accounts: Vec<String>,
    key_accounts_error: Option<ChainError>,
    rows: Vec<Row>,
    query_error: Option<ChainError>,
    transaction_error: Option<ChainError>,
    transactions: Vec<TransactionEnvelope>,
    queries: Vec<TableRowsQuery>,
    key_lookups: Vec<String>,
}

/// Scripted chain client recording every call
#[derive(Default)]
pub struct MockChainClient {
    script: Mutex<ChainScript>,
}

impl MockChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available_keys(&self, keys: Vec<String>) {
        self.script.lock().unwrap().available_keys = keys;
    }

    pub fn set_key_accounts(&self, accounts: Vec<String>) {
        let mut script = self.script.lock().unwrap();
        script.key_accounts = accounts;
        script.key_accounts_error = None;
    }

    pub fn fail_key_accounts(&self, error: ChainError) {
        self.script.lock().unwrap().key_accounts_error = Some(error);
    }

    pub fn set_rows(&self, rows: Vec<Row>) {
        self.script.lock().unwrap().rows = rows;
    }

    pub fn fail_queries(&self, error: ChainError) {
        self.script.lock().unwrap().query_error = Some(error);
    }

    pub fn fail_transactions(&self, error: ChainError) {
        self.script.lock().unwrap().transaction_error = Some(error);
    }

    pub fn transaction_calls(&self) -> Vec<TransactionEnvelope> {
        self.script.lock().unwrap().transactions.clone()
    }

    pub fn query_calls(&self) -> Vec<TableRowsQuery> {
        self.script.lock().unwrap().queries.clone()
    }

    pub fn key_lookups(&self) -> Vec<String> {
        self.script.lock().unwrap().key_lookups.clone()
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn transaction(&self, envelope: &TransactionEnvelope) -> Result<TxReceipt, ChainError> {
        let mut script = self.script.lock().unwrap();
        script.transactions.push(envelope.clone());
        if let Some(error) = &script.transaction_error {
            return Err(error.clone());
        }
        let id = format!("mock-tx-{}", script.transactions.len());
        Ok(serde_json::from_value(json!({ "transaction_id": id })).unwrap())
    }

    async fn get_table_rows(&self, query: &TableRowsQuery) -> Result<TableRows, ChainError> {
        let mut script = self.script.lock().unwrap();
        script.queries.push(query.clone());
        if let Some(error) = &script.query_error {
            return Err(error.clone());
        }
        Ok(TableRows {
            rows: script.rows.clone(),
            more: false,
        })
    }

    async fn available_keys(&self) -> Result<Vec<String>, ChainError> {
        Ok(self.script.lock().unwrap().available_keys.clone())
    }

    async fn get_key_accounts(&self, public_key: &str) -> Result<Vec<String>, ChainError> {
        let mut script = self.script.lock().unwrap();
        script.key_lookups.push(public_key.to_string());
        match &script.key_accounts_error {
            Some(error) => Err(error.clone()),
            None => Ok(script.key_accounts.clone()),
        }
    }
}

/// Connector handing out one shared mock client
pub struct MockConnector {
    client: Arc<MockChainClient>,
    configs: Mutex<Vec<ClientConfig>>,
    connect_error: Mutex<Option<ChainError>>,
}

impl MockConnector {
    pub fn new(client: Arc<MockChainClient>) -> Self {
        Self {
            client,
            configs: Mutex::new(Vec::new()),
            connect_error: Mutex::new(None),
        }
    }

    /// Every later `connect` fails with `error`
    pub fn fail_connect(&self, error: ChainError) {
        *self.connect_error.lock().unwrap() = Some(error);
    }

    pub fn configs(&self) -> Vec<ClientConfig> {
        self.configs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainConnector for MockConnector {
    async fn connect(&self, config: &ClientConfig) -> Result<Arc<dyn ChainClient>, ChainError> {
        self.configs.lock().unwrap().push(config.clone());
        if let Some(error) = self.connect_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.client.clone())
    }
}

// ============================================================================
// Wallet extension
// ============================================================================

/// Scripted wallet extension
pub struct MockWalletBridge {
    installed: Mutex<bool>,
    identity: Mutex<Option<Identity>>,
    next_grant: Mutex<Option<Result<Identity, WalletError>>>,
    forget_error: Mutex<Option<WalletError>>,
    open_client_error: Mutex<Option<WalletError>>,
    plugin_installs: AtomicUsize,
    connect_calls: AtomicUsize,
    open_client_calls: AtomicUsize,
    identity_requests: AtomicUsize,
    forget_calls: AtomicUsize,
}

impl MockWalletBridge {
    fn with_installed(installed: bool) -> Self {
        Self {
            installed: Mutex::new(installed),
            identity: Mutex::new(None),
            next_grant: Mutex::new(None),
            forget_error: Mutex::new(None),
            open_client_error: Mutex::new(None),
            plugin_installs: AtomicUsize::new(0),
            connect_calls: AtomicUsize::new(0),
            open_client_calls: AtomicUsize::new(0),
            identity_requests: AtomicUsize::new(0),
            forget_calls: AtomicUsize::new(0),
        }
    }

    /// Extension installed and accepting the handshake
    pub fn present() -> Self {
        Self::with_installed(true)
    }

    /// No extension in the environment
    pub fn absent() -> Self {
        Self::with_installed(false)
    }

    pub fn set_installed(&self, installed: bool) {
        *self.installed.lock().unwrap() = installed;
    }

    pub fn set_identity(&self, identity: Option<Identity>) {
        *self.identity.lock().unwrap() = identity;
    }

    /// Outcome of the next identity prompt
    pub fn grant_identity(&self, outcome: Result<Identity, WalletError>) {
        *self.next_grant.lock().unwrap() = Some(outcome);
    }

    pub fn fail_forget(&self, error: WalletError) {
        *self.forget_error.lock().unwrap() = Some(error);
    }

    /// Every later `open_client` fails with `error`
    pub fn fail_open_client(&self, error: WalletError) {
        *self.open_client_error.lock().unwrap() = Some(error);
    }

    pub fn plugin_installs(&self) -> usize {
        self.plugin_installs.load(Ordering::SeqCst)
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn open_client_calls(&self) -> usize {
        self.open_client_calls.load(Ordering::SeqCst)
    }

    pub fn identity_requests(&self) -> usize {
        self.identity_requests.load(Ordering::SeqCst)
    }

    pub fn forget_calls(&self) -> usize {
        self.forget_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletBridge for MockWalletBridge {
    async fn install_plugin(&self) {
        self.plugin_installs.fetch_add(1, Ordering::SeqCst);
    }

    async fn connect(&self, _app_name: &str, _network: &NetworkDescriptor) -> bool {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        *self.installed.lock().unwrap()
    }

    async fn open_client(
        &self,
        _network: &NetworkDescriptor,
    ) -> Result<Arc<dyn ChainClient>, WalletError> {
        self.open_client_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.open_client_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(Arc::new(MockChainClient::new()))
    }

    async fn get_identity(&self, _request: &IdentityRequest) -> Result<Identity, WalletError> {
        self.identity_requests.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .next_grant
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Err(WalletError::NotConnected));
        if let Ok(identity) = &outcome {
            *self.identity.lock().unwrap() = Some(identity.clone());
        }
        outcome
    }

    async fn identity(&self) -> Option<Identity> {
        self.identity.lock().unwrap().clone()
    }

    async fn forget_identity(&self) -> Result<(), WalletError> {
        self.forget_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.forget_error.lock().unwrap().take() {
            return Err(error);
        }
        *self.identity.lock().unwrap() = None;
        Ok(())
    }
}
