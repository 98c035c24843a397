use std::fmt;
use std::sync::Arc;

use crate::chain::ChainClient;
use crate::wallet::WalletBridge;

/// Login path chosen at `init`, fixed for the session's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    DirectKey,
    WalletExtension,
}

/// Outcome of the wallet extension handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtensionDetection {
    /// No handshake attempted yet
    #[default]
    Unknown,
    /// Handshake succeeded
    Present,
    /// Extension missing, or the handshake was refused
    Absent,
}

/// Connection to the wallet extension in wallet-extension mode
#[derive(Clone)]
pub enum ExtensionLink {
    Connected(Arc<dyn WalletBridge>),
    /// Degraded read-only mode: the client carries no signer
    Absent,
}

impl ExtensionLink {
    pub fn detection(&self) -> ExtensionDetection {
        match self {
            ExtensionLink::Connected(_) => ExtensionDetection::Present,
            ExtensionLink::Absent => ExtensionDetection::Absent,
        }
    }
}

/// Session lifecycle
#[derive(Clone, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Initializing,
    DirectKey {
        client: Arc<dyn ChainClient>,
        /// First account owning the signing key
        account: Option<String>,
    },
    WalletExtension {
        client: Arc<dyn ChainClient>,
        link: ExtensionLink,
    },
}

impl SessionState {
    /// Chain client, present only once the session is ready
    pub fn client(&self) -> Option<&Arc<dyn ChainClient>> {
        match self {
            SessionState::DirectKey { client, .. }
            | SessionState::WalletExtension { client, .. } => Some(client),
            SessionState::Uninitialized | SessionState::Initializing => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.client().is_some()
    }

    pub fn login_mode(&self) -> Option<LoginMode> {
        match self {
            SessionState::DirectKey { .. } => Some(LoginMode::DirectKey),
            SessionState::WalletExtension { .. } => Some(LoginMode::WalletExtension),
            SessionState::Uninitialized | SessionState::Initializing => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "Uninitialized",
            SessionState::Initializing => "Initializing",
            SessionState::DirectKey { .. } => "DirectKey",
            SessionState::WalletExtension { .. } => "WalletExtension",
        }
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::DirectKey { account, .. } => f
                .debug_struct("DirectKey")
                .field("account", account)
                .finish_non_exhaustive(),
            SessionState::WalletExtension { link, .. } => f
                .debug_struct("WalletExtension")
                .field("extension", &link.detection())
                .finish_non_exhaustive(),
            other => f.write_str(other.name()),
        }
    }
}
