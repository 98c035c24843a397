//! Chain-client boundary
//!
//! This module provides:
//! - `ChainClient` trait for submitting transactions and querying contract tables
//! - `ChainConnector` trait for building clients from a direct-key configuration
//! - Wire types for transaction envelopes and table-row queries

mod client;
mod types;

pub use client::{ChainClient, ChainConnector};
pub use types::{
    Action, Authorization, ChainError, ClientConfig, Row, TableRows, TableRowsQuery,
    TransactionEnvelope, TxReceipt,
};
