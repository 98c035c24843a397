//! Chain wire types and error definitions

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A contract table row, kept as the JSON the node returned
pub type Row = Value;

/// Errors reported by a chain client
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChainError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Rejected by node ({code:?}): {message}")]
    Rejected { code: Option<i64>, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Direct-key client configuration
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub http_endpoint: String,
    pub chain_id: String,
    pub broadcast: bool,
    /// Private keys the client signs with; empty for an unsigned client
    pub key_provider: Vec<String>,
    pub sign: bool,
}

impl ClientConfig {
    /// Whether this configuration carries a signing key
    pub fn is_signing(&self) -> bool {
        !self.key_provider.is_empty()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("http_endpoint", &self.http_endpoint)
            .field("chain_id", &self.chain_id)
            .field("broadcast", &self.broadcast)
            .field("key_provider", &format_args!("[{} redacted]", self.key_provider.len()))
            .field("sign", &self.sign)
            .finish()
    }
}

/// One permission entry of an action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Authorization {
    pub actor: String,
    pub permission: String,
}

/// A single contract action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Action {
    /// Contract account the action is dispatched to
    pub account: String,
    pub name: String,
    pub authorization: Vec<Authorization>,
    pub data: Value,
}

/// Transaction handed to the chain client's broadcast call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionEnvelope {
    pub actions: Vec<Action>,
}

impl TransactionEnvelope {
    /// Envelope holding exactly one action
    pub fn single(action: Action) -> Self {
        Self {
            actions: vec![action],
        }
    }
}

/// Broadcast result, passed through verbatim
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TxReceipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// Full node response
    #[serde(flatten)]
    pub raw: serde_json::Map<String, Value>,
}

/// Range query against a contract table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableRowsQuery {
    pub json: bool,
    pub code: String,
    pub scope: String,
    pub table: String,
    pub lower_bound: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<String>,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
}

/// Rows returned by a table query
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TableRows {
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_config_debug_redacts_keys() {
        let config = ClientConfig {
            http_endpoint: "http://node".to_string(),
            chain_id: "chain".to_string(),
            broadcast: true,
            key_provider: vec!["5JsecretKey".to_string()],
            sign: true,
        };

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("5JsecretKey"));
        assert!(rendered.contains("1 redacted"));
    }

    #[test]
    fn test_client_config_serializes_camel_case() {
        let config = ClientConfig {
            http_endpoint: "http://node".to_string(),
            chain_id: "chain".to_string(),
            broadcast: true,
            key_provider: vec!["key".to_string()],
            sign: true,
        };

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value,
            json!({
                "httpEndpoint": "http://node",
                "chainId": "chain",
                "broadcast": true,
                "keyProvider": ["key"],
                "sign": true,
            })
        );
    }

    #[test]
    fn test_table_query_omits_absent_bounds() {
        let query = TableRowsQuery {
            json: true,
            code: "peeranhamain".to_string(),
            scope: "allquestions".to_string(),
            table: "question".to_string(),
            lower_bound: "0".to_string(),
            upper_bound: None,
            limit: 1,
            index_position: None,
            key_type: None,
        };

        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["lower_bound"], "0");
        assert!(value.get("upper_bound").is_none());
        assert!(value.get("index_position").is_none());
        assert!(value.get("key_type").is_none());
    }

    #[test]
    fn test_receipt_keeps_raw_response() {
        let receipt: TxReceipt = serde_json::from_value(json!({
            "transaction_id": "abc123",
            "processed": { "block_num": 42 },
        }))
        .unwrap();

        assert_eq!(receipt.transaction_id.as_deref(), Some("abc123"));
        assert_eq!(receipt.raw["processed"]["block_num"], 42);
    }

    #[test]
    fn test_table_rows_missing_fields_default() {
        let rows: TableRows = serde_json::from_value(json!({})).unwrap();
        assert!(rows.rows.is_empty());
        assert!(!rows.more);
    }
}
