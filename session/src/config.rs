//! Session configuration
//!
//! Configuration is loaded from environment variables over compiled-in defaults.

use std::env;
use std::path::PathBuf;

use crate::chain::ClientConfig;
use crate::wallet::NetworkDescriptor;

/// Blockchain identifier the wallet extension uses for EOSIO networks
pub const BLOCKCHAIN_NAME: &str = "eos";

/// Permission level every action is authorized under
pub const DEFAULT_EOS_PERMISSION: &str = "active";

/// Storage key of the persisted login record
pub const AUTOLOGIN_DATA: &str = "AUTOLOGIN_DATA";

/// Main session configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Chain RPC and contract configuration
    pub chain: ChainConfig,

    /// Wallet-extension network configuration
    pub wallet: WalletConfig,

    /// Where the file-backed login record lives (optional)
    pub login_record_path: Option<PathBuf>,
}

/// Chain-related configuration
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Node RPC endpoint used by direct-key clients
    pub http_endpoint: String,
    /// Chain ID shared by both login paths
    pub chain_id: String,
    /// Account the application contract is deployed to
    pub contract_account: String,
    /// Permission name used in every action authorization
    pub default_permission: String,
}

/// Wallet-extension configuration
#[derive(Debug, Clone)]
pub struct WalletConfig {
    /// Application name presented during the extension handshake
    pub app_name: String,
    pub protocol: String,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            wallet: WalletConfig::default(),
            login_record_path: None,
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            http_endpoint: "http://127.0.0.1:8888".to_string(),
            chain_id: String::new(),
            contract_account: "peeranhamain".to_string(),
            default_permission: DEFAULT_EOS_PERMISSION.to_string(),
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            app_name: "Peeranha".to_string(),
            protocol: "http".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8888,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // Chain config
        if let Some(url) = lookup("EOS_DEFAULT_HTTP_ENDPOINT")
            && !url.is_empty()
        {
            config.chain.http_endpoint = url;
        }
        if let Some(id) = lookup("EOS_CHAIN_ID") {
            config.chain.chain_id = id;
        }
        if let Some(account) = lookup("EOS_CONTRACT_ACCOUNT")
            && !account.is_empty()
        {
            config.chain.contract_account = account;
        }
        if let Some(permission) = lookup("EOS_DEFAULT_PERMISSION")
            && !permission.is_empty()
        {
            config.chain.default_permission = permission;
        }

        // Wallet config
        if let Some(protocol) = lookup("EOS_SCATTER_PROTOCOL")
            && !protocol.is_empty()
        {
            config.wallet.protocol = protocol;
        }
        if let Some(host) = lookup("EOS_SCATTER_HOST")
            && !host.is_empty()
        {
            config.wallet.host = host;
        }
        if let Some(port) = lookup("EOS_SCATTER_PORT")
            && let Ok(p) = port.parse()
        {
            config.wallet.port = p;
        }
        if let Some(name) = lookup("WALLET_APP_NAME")
            && !name.is_empty()
        {
            config.wallet.app_name = name;
        }

        if let Some(path) = lookup("LOGIN_RECORD_PATH")
            && !path.is_empty()
        {
            config.login_record_path = Some(PathBuf::from(path));
        }

        config
    }

    /// Direct-key client configuration signing with `private_key`.
    ///
    /// `None` produces an unsigned client with an empty key provider.
    pub fn client_config(&self, private_key: Option<&str>) -> ClientConfig {
        ClientConfig {
            http_endpoint: self.chain.http_endpoint.clone(),
            chain_id: self.chain.chain_id.clone(),
            broadcast: true,
            key_provider: private_key.map(str::to_string).into_iter().collect(),
            sign: true,
        }
    }

    /// Network descriptor handed to the wallet extension
    pub fn network_descriptor(&self) -> NetworkDescriptor {
        NetworkDescriptor {
            blockchain: BLOCKCHAIN_NAME.to_string(),
            protocol: self.wallet.protocol.clone(),
            host: self.wallet.host.clone(),
            port: self.wallet.port,
            chain_id: self.chain.chain_id.clone(),
        }
    }
}
