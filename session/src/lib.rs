//! Peeranha wallet session library
//!
//! Chain-client and wallet-extension integration for the Peeranha Q&A client:
//! login-path selection, account resolution, and transaction/query dispatch
//! against the application contract.

pub mod chain;
pub mod config;
pub mod login;
pub mod session;
pub mod wallet;

mod test_utils;

// Re-export commonly used types
pub use chain::{ChainClient, ChainConnector, ChainError, Row, TxReceipt};
pub use config::Config;
pub use login::{FileLoginStore, LoginRecord, LoginStore, MemoryLoginStore};
pub use session::{ExtensionDetection, LoginMode, RowsRequest, SessionError, WalletSession};
pub use wallet::{Identity, WalletBridge};
