//! Wallet-extension boundary
//!
//! Types describing the network the extension signs for, the identities it
//! grants, and the `WalletBridge` trait the session drives.

mod bridge;
mod types;

pub use bridge::WalletBridge;
pub use types::{Identity, IdentityAccount, IdentityRequest, NetworkDescriptor, WalletError};
