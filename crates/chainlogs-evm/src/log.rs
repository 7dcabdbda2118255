//! Raw and decoded log types.

use alloy_core::dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, B256};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::quantity;

/// A raw EVM log as returned by `eth_getLogs`.
///
/// Position fields are `None` for logs of pending blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    pub address: Address,
    /// topics[0] is the event signature hash; topics[1..] are indexed params.
    pub topics: Vec<B256>,
    pub data: Bytes,
    #[serde(default)]
    pub block_hash: Option<B256>,
    #[serde(default, with = "quantity::opt")]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub transaction_hash: Option<B256>,
    #[serde(default, with = "quantity::opt")]
    pub transaction_index: Option<u64>,
    #[serde(default, with = "quantity::opt")]
    pub log_index: Option<u64>,
    /// `true` if this log was removed by a reorg.
    #[serde(default)]
    pub removed: bool,
}

impl RawLog {
    /// topics[0], if present.
    pub fn signature_topic(&self) -> Option<&B256> {
        self.topics.first()
    }
}

/// Decoded event arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum EventArgs {
    /// Parameter name → value, in declared order.
    Named(IndexMap<String, DynSolValue>),
    /// Values in declared order.
    Positional(Vec<DynSolValue>),
}

impl EventArgs {
    /// Look up a value by parameter name (named args only).
    pub fn get(&self, name: &str) -> Option<&DynSolValue> {
        match self {
            Self::Named(map) => map.get(name),
            Self::Positional(_) => None,
        }
    }

    /// Look up a value by position; works for both shapes.
    pub fn at(&self, index: usize) -> Option<&DynSolValue> {
        match self {
            Self::Named(map) => map.get_index(index).map(|(_, v)| v),
            Self::Positional(values) => values.get(index),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Named(map) => map.len(),
            Self::Positional(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Self::Named(_))
    }
}

/// How completely a log was decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeQuality {
    /// Topics and data both decoded; `args` is set.
    Full,
    /// Topics decoded but the data payload did not match the schema.
    /// `args` is `None`; the indexed values (in indexed order) are kept here.
    Partial { indexed: EventArgs },
    /// No schema was supplied; only the raw log is available.
    Undecoded,
}

/// A log with its decoded event: the primary output of a log query.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLog {
    pub log: RawLog,
    pub event_name: Option<String>,
    pub args: Option<EventArgs>,
    pub quality: DecodeQuality,
}

impl DecodedLog {
    /// Wrap a log returned by a query without an event schema.
    pub fn undecoded(log: RawLog) -> Self {
        Self {
            log,
            event_name: None,
            args: None,
            quality: DecodeQuality::Undecoded,
        }
    }

    /// Get a decoded argument by name.
    pub fn arg(&self, name: &str) -> Option<&DynSolValue> {
        self.args.as_ref()?.get(name)
    }

    /// Returns `true` if the data payload failed to decode.
    pub fn is_partial(&self) -> bool {
        matches!(self.quality, DecodeQuality::Partial { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use serde_json::json;

    fn rpc_log() -> serde_json::Value {
        json!({
            "address": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
            "topics": [
                "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef",
                "0x000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045",
                "0x000000000000000000000000ab5801a7d398351b8be11c439e05c5b3259aec9b"
            ],
            "data": "0x0000000000000000000000000000000000000000000000000de0b6b3a7640000",
            "blockNumber": "0x121eac0",
            "blockHash": "0x8e38b4dbf6b11fcc3b9dee84fb7986e29ca0a02cecd8977c161ff7333329681e",
            "transactionHash": "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060",
            "transactionIndex": "0x3",
            "logIndex": "0x5",
            "removed": false
        })
    }

    #[test]
    fn deserializes_node_log() {
        let log: RawLog = serde_json::from_value(rpc_log()).unwrap();
        assert_eq!(log.topics.len(), 3);
        assert_eq!(log.block_number, Some(19_000_000));
        assert_eq!(log.transaction_index, Some(3));
        assert_eq!(log.log_index, Some(5));
        assert_eq!(log.data.len(), 32);
        assert!(!log.removed);
    }

    #[test]
    fn pending_log_has_null_positions() {
        let mut v = rpc_log();
        v["blockNumber"] = json!(null);
        v["blockHash"] = json!(null);
        v["logIndex"] = json!(null);
        v.as_object_mut().unwrap().remove("removed");
        let log: RawLog = serde_json::from_value(v).unwrap();
        assert_eq!(log.block_number, None);
        assert_eq!(log.block_hash, None);
        assert_eq!(log.log_index, None);
        assert!(!log.removed);
    }

    #[test]
    fn serializes_back_to_hex_quantities() {
        let log: RawLog = serde_json::from_value(rpc_log()).unwrap();
        let out = serde_json::to_value(&log).unwrap();
        assert_eq!(out["blockNumber"], "0x121eac0");
        assert_eq!(out["logIndex"], "0x5");
    }

    #[test]
    fn args_accessors() {
        let mut map = IndexMap::new();
        map.insert("value".to_string(), DynSolValue::Uint(U256::from(1u64), 256));
        let named = EventArgs::Named(map);
        assert!(named.get("value").is_some());
        assert_eq!(named.at(0), named.get("value"));

        let positional = EventArgs::Positional(vec![DynSolValue::Bool(true)]);
        assert!(positional.get("value").is_none());
        assert_eq!(positional.at(0), Some(&DynSolValue::Bool(true)));
        assert_eq!(positional.len(), 1);
    }
}
