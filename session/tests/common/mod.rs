//! Common Test Utilities for Integration Tests
//!
//! Shared doubles and builders used across integration test modules.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use peeranha_session::chain::{
    ClientConfig, TableRows, TableRowsQuery, TransactionEnvelope,
};
use peeranha_session::wallet::{IdentityAccount, IdentityRequest, NetworkDescriptor, WalletError};
use peeranha_session::{
    ChainClient, ChainConnector, ChainError, Config, Identity, LoginStore, Row, TxReceipt,
    WalletBridge, WalletSession,
};
use serde_json::json;

static TRACING: Once = Once::new();

/// Route session logs to the test writer; `RUST_LOG` picks the level
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "peeranha_session=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Configuration as a deployment would set it through the environment
pub fn create_test_config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("EOS_DEFAULT_HTTP_ENDPOINT", "https://eos.example:443"),
        ("EOS_CHAIN_ID", "aca376f206b8fc25a6ed44dbdc66547c"),
        ("EOS_CONTRACT_ACCOUNT", "peeranhamain"),
        ("EOS_SCATTER_PROTOCOL", "https"),
        ("EOS_SCATTER_HOST", "eos.example"),
        ("EOS_SCATTER_PORT", "443"),
    ]);
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
}

/// In-memory contract: tables keyed by (table, scope), rows ordered by `id`
#[derive(Default)]
pub struct FakeChain {
    tables: Mutex<HashMap<(String, String), Vec<Row>>>,
    key_accounts: Mutex<HashMap<String, Vec<String>>>,
    broadcasts: Mutex<Vec<TransactionEnvelope>>,
    reject_with: Mutex<Option<ChainError>>,
}

impl FakeChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert_row(&self, table: &str, scope: &str, row: Row) {
        let mut tables = self.tables.lock().unwrap();
        let rows = tables
            .entry((table.to_string(), scope.to_string()))
            .or_default();
        rows.push(row);
        rows.sort_by_key(|r| r["id"].as_u64().unwrap_or_default());
    }

    pub fn register_key(&self, public_key: &str, accounts: &[&str]) {
        self.key_accounts.lock().unwrap().insert(
            public_key.to_string(),
            accounts.iter().map(|a| a.to_string()).collect(),
        );
    }

    pub fn reject_transactions(&self, error: ChainError) {
        *self.reject_with.lock().unwrap() = Some(error);
    }

    pub fn broadcasts(&self) -> Vec<TransactionEnvelope> {
        self.broadcasts.lock().unwrap().clone()
    }
}

/// Public key a fake client derives from a private key
pub fn public_key_for(private_key: &str) -> String {
    format!("EOS{}", private_key.to_uppercase())
}

/// Client bound to a fake chain and an optional signing key
pub struct FakeClient {
    chain: Arc<FakeChain>,
    signing_key: Option<String>,
}

#[async_trait]
impl ChainClient for FakeClient {
    async fn transaction(&self, envelope: &TransactionEnvelope) -> Result<TxReceipt, ChainError> {
        if let Some(error) = self.chain.reject_with.lock().unwrap().clone() {
            return Err(error);
        }
        let mut broadcasts = self.chain.broadcasts.lock().unwrap();
        broadcasts.push(envelope.clone());
        serde_json::from_value(json!({
            "transaction_id": format!("{:064x}", broadcasts.len()),
            "processed": { "receipt": { "status": "executed" } },
        }))
        .map_err(|e| ChainError::Malformed(e.to_string()))
    }

    async fn get_table_rows(&self, query: &TableRowsQuery) -> Result<TableRows, ChainError> {
        let tables = self.chain.tables.lock().unwrap();
        let Some(rows) = tables.get(&(query.table.clone(), query.scope.clone())) else {
            return Ok(TableRows::default());
        };

        let lower: u64 = query
            .lower_bound
            .parse()
            .map_err(|_| ChainError::Rejected {
                code: Some(3010001),
                message: format!("invalid lower bound {}", query.lower_bound),
            })?;
        let upper: Option<u64> = query.upper_bound.as_deref().and_then(|b| b.parse().ok());

        let matching: Vec<Row> = rows
            .iter()
            .filter(|r| {
                let id = r["id"].as_u64().unwrap_or_default();
                id >= lower && upper.is_none_or(|u| id <= u)
            })
            .cloned()
            .collect();
        let more = matching.len() > query.limit as usize;

        Ok(TableRows {
            rows: matching.into_iter().take(query.limit as usize).collect(),
            more,
        })
    }

    async fn available_keys(&self) -> Result<Vec<String>, ChainError> {
        Ok(self.signing_key.iter().map(|k| public_key_for(k)).collect())
    }

    async fn get_key_accounts(&self, public_key: &str) -> Result<Vec<String>, ChainError> {
        Ok(self
            .chain
            .key_accounts
            .lock()
            .unwrap()
            .get(public_key)
            .cloned()
            .unwrap_or_default())
    }
}

/// Connector building `FakeClient`s against one chain
pub struct FakeConnector {
    chain: Arc<FakeChain>,
}

impl FakeConnector {
    pub fn new(chain: Arc<FakeChain>) -> Arc<Self> {
        Arc::new(Self { chain })
    }
}

#[async_trait]
impl ChainConnector for FakeConnector {
    async fn connect(&self, config: &ClientConfig) -> Result<Arc<dyn ChainClient>, ChainError> {
        if config.http_endpoint.is_empty() {
            return Err(ChainError::Transport("no endpoint configured".to_string()));
        }
        Ok(Arc::new(FakeClient {
            chain: self.chain.clone(),
            signing_key: config.key_provider.first().cloned(),
        }))
    }
}

/// Wallet extension holding one account for the configured network
pub struct FakeWallet {
    chain: Arc<FakeChain>,
    installed: bool,
    account: String,
    identity: Mutex<Option<Identity>>,
    cancel_prompts: Mutex<bool>,
}

impl FakeWallet {
    pub fn installed(chain: Arc<FakeChain>, account: &str) -> Arc<Self> {
        Arc::new(Self {
            chain,
            installed: true,
            account: account.to_string(),
            identity: Mutex::new(None),
            cancel_prompts: Mutex::new(false),
        })
    }

    pub fn missing(chain: Arc<FakeChain>) -> Arc<Self> {
        Arc::new(Self {
            chain,
            installed: false,
            account: String::new(),
            identity: Mutex::new(None),
            cancel_prompts: Mutex::new(false),
        })
    }

    /// Make the user dismiss every identity prompt
    pub fn cancel_prompts(&self) {
        *self.cancel_prompts.lock().unwrap() = true;
    }
}

#[async_trait]
impl WalletBridge for FakeWallet {
    async fn install_plugin(&self) {}

    async fn connect(&self, _app_name: &str, _network: &NetworkDescriptor) -> bool {
        self.installed
    }

    async fn open_client(
        &self,
        _network: &NetworkDescriptor,
    ) -> Result<Arc<dyn ChainClient>, WalletError> {
        if !self.installed {
            return Err(WalletError::NotConnected);
        }
        Ok(Arc::new(FakeClient {
            chain: self.chain.clone(),
            signing_key: Some(format!("wallet-{}", self.account)),
        }))
    }

    async fn get_identity(&self, request: &IdentityRequest) -> Result<Identity, WalletError> {
        if *self.cancel_prompts.lock().unwrap() {
            return Err(WalletError::Rejected("prompt dismissed".to_string()));
        }
        let network = request.accounts.first().ok_or(WalletError::NotConnected)?;
        let identity = Identity {
            name: Some("peeranha-user".to_string()),
            accounts: vec![IdentityAccount {
                name: self.account.clone(),
                authority: "active".to_string(),
                blockchain: network.blockchain.clone(),
                chain_id: Some(network.chain_id.clone()),
            }],
        };
        *self.identity.lock().unwrap() = Some(identity.clone());
        Ok(identity)
    }

    async fn identity(&self) -> Option<Identity> {
        self.identity.lock().unwrap().clone()
    }

    async fn forget_identity(&self) -> Result<(), WalletError> {
        *self.identity.lock().unwrap() = None;
        Ok(())
    }
}

/// Session wired to fakes with the given login store
pub fn create_test_session(
    chain: Arc<FakeChain>,
    wallet: Arc<dyn WalletBridge>,
    login_store: Arc<dyn LoginStore>,
) -> WalletSession {
    init_tracing();
    WalletSession::new(
        create_test_config(),
        FakeConnector::new(chain),
        wallet,
        login_store,
    )
}
