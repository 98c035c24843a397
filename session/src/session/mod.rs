//! Wallet session state machine
//!
//! `WalletSession` owns the chain client for one user session and routes
//! account, transaction and table-query calls through it.

pub mod service;
pub mod state;

pub use service::{RowsRequest, SessionError, WalletSession};
pub use state::{ExtensionDetection, ExtensionLink, LoginMode, SessionState};
