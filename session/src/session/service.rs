use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::chain::{
    Action, Authorization, ChainClient, ChainConnector, ChainError, Row, TableRowsQuery,
    TransactionEnvelope, TxReceipt,
};
use crate::config::Config;
use crate::login::{LoginStore, LoginStoreError};
use crate::session::state::{ExtensionDetection, ExtensionLink, LoginMode, SessionState};
use crate::wallet::{IdentityRequest, WalletBridge, WalletError};

/// Wallet session errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("EOS is not initialized")]
    NotInitialized,

    #[error("Wallet extension is not installed")]
    ExtensionNotInstalled,

    #[error("Transaction broadcast failed: {0}")]
    BroadcastFailure(#[source] ChainError),

    #[error("Table query failed: {0}")]
    QueryFailure(#[source] ChainError),

    #[error("Chain client unavailable: {0}")]
    ClientUnavailable(#[source] ChainError),

    #[error("Wallet extension failed: {0}")]
    Extension(#[from] WalletError),

    #[error("Login record unavailable: {0}")]
    LoginRecord(#[from] LoginStoreError),
}

/// Parameters of a paginated table query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowsRequest {
    pub table: String,
    pub scope: String,
    pub lower_bound: String,
    pub limit: u32,
    pub upper_bound: Option<String>,
    pub index_position: Option<String>,
    pub key_type: Option<String>,
}

impl RowsRequest {
    pub fn new(
        table: impl Into<String>,
        scope: impl Into<String>,
        lower_bound: impl Into<String>,
        limit: u32,
    ) -> Self {
        Self {
            table: table.into(),
            scope: scope.into(),
            lower_bound: lower_bound.into(),
            limit,
            upper_bound: None,
            index_position: None,
            key_type: None,
        }
    }

    pub fn upper_bound(mut self, bound: impl Into<String>) -> Self {
        self.upper_bound = Some(bound.into());
        self
    }

    /// Query through a secondary index
    pub fn index(mut self, position: impl Into<String>, key_type: impl Into<String>) -> Self {
        self.index_position = Some(position.into());
        self.key_type = Some(key_type.into());
        self
    }
}

/// EOSIO wallet session: login-path selection, account resolution, and
/// transaction/query dispatch against the application contract.
pub struct WalletSession {
    config: Config,
    connector: Arc<dyn ChainConnector>,
    bridge: Arc<dyn WalletBridge>,
    login_store: Arc<dyn LoginStore>,
    state: RwLock<SessionState>,
    /// Outcome of the latest extension handshake, in any login mode
    detection: RwLock<ExtensionDetection>,
}

impl WalletSession {
    pub fn new(
        config: Config,
        connector: Arc<dyn ChainConnector>,
        bridge: Arc<dyn WalletBridge>,
        login_store: Arc<dyn LoginStore>,
    ) -> Self {
        Self {
            config,
            connector,
            bridge,
            login_store,
            state: RwLock::new(SessionState::Uninitialized),
            detection: RwLock::new(ExtensionDetection::Unknown),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn is_initialized(&self) -> bool {
        self.state.read().await.is_ready()
    }

    pub async fn login_mode(&self) -> Option<LoginMode> {
        self.state.read().await.login_mode()
    }

    pub async fn extension_detection(&self) -> ExtensionDetection {
        *self.detection.read().await
    }

    /// Initialize the chain client along the persisted login path.
    ///
    /// Re-running `init` repeats the whole handshake/connect sequence. Callers
    /// must not run two `init`s at once.
    pub async fn init(&self, private_key: Option<&str>) -> Result<(), SessionError> {
        *self.state.write().await = SessionState::Initializing;
        *self.detection.write().await = ExtensionDetection::Unknown;

        match self.build_state(private_key).await {
            Ok(state) => {
                info!("Wallet session ready: {:?}", state);
                *self.state.write().await = state;
                Ok(())
            }
            Err(e) => {
                warn!("Wallet session init failed: {}", e);
                *self.state.write().await = SessionState::Uninitialized;
                Err(e)
            }
        }
    }

    async fn build_state(&self, private_key: Option<&str>) -> Result<SessionState, SessionError> {
        let login = self.login_store.load().await?.unwrap_or_default();

        if login.use_wallet_extension {
            let link = self.handshake_extension().await;
            let client = self.client_for(&link).await?;
            return Ok(SessionState::WalletExtension { client, link });
        }

        let client = self
            .connector
            .connect(&self.config.client_config(private_key))
            .await
            .map_err(SessionError::ClientUnavailable)?;

        let account = match private_key {
            Some(_) => resolve_key_account(client.as_ref()).await?,
            None => {
                debug!("No private key supplied; direct-key session is anonymous");
                None
            }
        };

        Ok(SessionState::DirectKey { client, account })
    }

    /// Client for a wallet-extension session: signed through the extension
    /// when connected, unsigned otherwise.
    async fn client_for(&self, link: &ExtensionLink) -> Result<Arc<dyn ChainClient>, SessionError> {
        match link {
            ExtensionLink::Connected(bridge) => bridge
                .open_client(&self.config.network_descriptor())
                .await
                .map_err(SessionError::from),
            ExtensionLink::Absent => {
                warn!("Wallet extension unavailable; continuing in read-only mode");
                self.connector
                    .connect(&self.config.client_config(None))
                    .await
                    .map_err(SessionError::ClientUnavailable)
            }
        }
    }

    async fn handshake_extension(&self) -> ExtensionLink {
        self.bridge.install_plugin().await;

        let network = self.config.network_descriptor();
        let link = if self.bridge.connect(&self.config.wallet.app_name, &network).await {
            debug!("Wallet extension connected for {}", network.host);
            ExtensionLink::Connected(self.bridge.clone())
        } else {
            debug!("Wallet extension not detected");
            ExtensionLink::Absent
        };
        *self.detection.write().await = link.detection();
        link
    }

    /// Install the plugin and handshake with the wallet extension.
    ///
    /// The outcome is always recorded in `extension_detection`. In
    /// wallet-extension mode it also replaces the session's extension link,
    /// and the chain client is swapped when a matching one can be opened.
    /// If it cannot, the previous client stays in place.
    pub async fn connect_wallet_extension(&self) -> bool {
        let link = self.handshake_extension().await;
        let connected = matches!(link, ExtensionLink::Connected(_));

        if self.login_mode().await != Some(LoginMode::WalletExtension) {
            return connected;
        }

        let reopened = match self.client_for(&link).await {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("Keeping previous chain client: {}", e);
                None
            }
        };

        let mut state = self.state.write().await;
        if let SessionState::WalletExtension { client, link: current } = &mut *state {
            if let Some(new_client) = reopened {
                *client = new_client;
            }
            *current = link;
        }

        connected
    }

    /// Account the session acts as; `None` when no account is chosen yet
    pub async fn get_active_account(&self) -> Result<Option<String>, SessionError> {
        let state = self.state.read().await.clone();
        match state {
            SessionState::Uninitialized | SessionState::Initializing => {
                Err(SessionError::NotInitialized)
            }
            SessionState::DirectKey { account, .. } => Ok(account),
            SessionState::WalletExtension {
                link: ExtensionLink::Absent,
                ..
            } => Err(SessionError::ExtensionNotInstalled),
            SessionState::WalletExtension {
                link: ExtensionLink::Connected(bridge),
                ..
            } => {
                let network = self.config.network_descriptor();
                Ok(bridge
                    .identity()
                    .await
                    .and_then(|identity| identity.account_for(&network).map(|a| a.name.clone())))
            }
        }
    }

    /// Prompt the wallet extension for an identity and return its account
    /// on this network. Any failure, including cancellation, yields `None`.
    pub async fn request_account_selection(&self) -> Option<String> {
        let bridge = self.connected_bridge().await?;
        let network = self.config.network_descriptor();

        match bridge.get_identity(&IdentityRequest::for_network(&network)).await {
            Ok(identity) => identity.account_for(&network).map(|a| a.name.clone()),
            Err(e) => {
                debug!("Account selection did not complete: {}", e);
                None
            }
        }
    }

    /// Revoke the granted identity. `None` when there was nothing to forget.
    pub async fn forget_session(&self) -> Option<bool> {
        let bridge = self.connected_bridge().await?;
        bridge.identity().await?;

        match bridge.forget_identity().await {
            Ok(()) => {
                info!("Wallet identity forgotten");
                Some(true)
            }
            Err(e) => {
                warn!("Failed to forget wallet identity: {}", e);
                Some(false)
            }
        }
    }

    /// Broadcast one contract action authorized by `actor`.
    ///
    /// Failures are returned unmodified and never retried.
    pub async fn submit_transaction(
        &self,
        actor: &str,
        action_name: &str,
        payload: Value,
    ) -> Result<TxReceipt, SessionError> {
        let client = self.ready_client().await?;
        let envelope = self.envelope(actor, action_name, payload);

        counter!("peeranha_transactions_total").increment(1);
        debug!("Submitting {} as {}", action_name, actor);

        client.transaction(&envelope).await.map_err(|e| {
            counter!("peeranha_transaction_failures_total").increment(1);
            SessionError::BroadcastFailure(e)
        })
    }

    /// Single-row lookup by primary key. A miss is `Ok(None)`.
    pub async fn fetch_row(
        &self,
        table: &str,
        scope: &str,
        primary_key: &str,
    ) -> Result<Option<Row>, SessionError> {
        let query = TableRowsQuery {
            json: true,
            code: self.config.chain.contract_account.clone(),
            scope: scope.to_string(),
            table: table.to_string(),
            lower_bound: primary_key.to_string(),
            upper_bound: None,
            limit: 1,
            index_position: None,
            key_type: None,
        };

        let rows = self.query(&query).await?;
        Ok(rows.into_iter().next())
    }

    /// One page of rows. An empty page is an empty `Vec`, never an error.
    pub async fn fetch_rows(&self, request: RowsRequest) -> Result<Vec<Row>, SessionError> {
        let query = TableRowsQuery {
            json: true,
            code: self.config.chain.contract_account.clone(),
            scope: request.scope,
            table: request.table,
            lower_bound: request.lower_bound,
            upper_bound: request.upper_bound,
            limit: request.limit,
            index_position: request.index_position,
            key_type: request.key_type,
        };

        self.query(&query).await
    }

    async fn query(&self, query: &TableRowsQuery) -> Result<Vec<Row>, SessionError> {
        let client = self.ready_client().await?;
        let start = Instant::now();
        counter!("peeranha_table_queries_total").increment(1);

        let result = client.get_table_rows(query).await;
        histogram!("peeranha_table_query_duration_seconds").record(start.elapsed());

        result
            .map(|rows| rows.rows)
            .map_err(SessionError::QueryFailure)
    }

    fn envelope(&self, actor: &str, action_name: &str, payload: Value) -> TransactionEnvelope {
        TransactionEnvelope::single(Action {
            account: self.config.chain.contract_account.clone(),
            name: action_name.to_string(),
            authorization: vec![Authorization {
                actor: actor.to_string(),
                permission: self.config.chain.default_permission.clone(),
            }],
            data: payload,
        })
    }

    async fn ready_client(&self) -> Result<Arc<dyn ChainClient>, SessionError> {
        self.state
            .read()
            .await
            .client()
            .cloned()
            .ok_or(SessionError::NotInitialized)
    }

    async fn connected_bridge(&self) -> Option<Arc<dyn WalletBridge>> {
        match &*self.state.read().await {
            SessionState::WalletExtension {
                link: ExtensionLink::Connected(bridge),
                ..
            } => Some(bridge.clone()),
            _ => None,
        }
    }
}

/// First account owning the client's signing key
async fn resolve_key_account(client: &dyn ChainClient) -> Result<Option<String>, SessionError> {
    let keys = client
        .available_keys()
        .await
        .map_err(SessionError::ClientUnavailable)?;

    let Some(public_key) = keys.first() else {
        warn!("Signing client reported no public keys");
        return Ok(None);
    };

    let accounts = client
        .get_key_accounts(public_key)
        .await
        .map_err(SessionError::QueryFailure)?;

    Ok(accounts.into_iter().next())
}
