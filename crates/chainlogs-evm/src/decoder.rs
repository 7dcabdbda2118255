//! Log decoder: matches one raw log against an event schema.
//!
//! Decoding never fails; every path resolves to a [`DecodeOutcome`]:
//!
//! | Condition                                   | Outcome                         |
//! |---------------------------------------------|---------------------------------|
//! | no topics, or topics[0] ≠ signature hash    | `NotThisEvent` (drop)           |
//! | topic count − 1 ≠ indexed parameter count   | `IndexedCountMismatch` (drop)   |
//! | a topic is not a valid encoding of its type | `IndexedCountMismatch` (drop)   |
//! | data payload does not fit the schema        | `Matched`, quality `Partial`    |
//! | everything decodes                          | `Matched`, quality `Full`       |

use alloy_core::dyn_abi::DynSolValue;
use indexmap::IndexMap;
use rayon::prelude::*;

use crate::codec;
use crate::log::{DecodeQuality, DecodedLog, EventArgs, RawLog};
use crate::schema::{ArgsShape, EventParam, EventSchema};

/// Result of decoding one log against one schema.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    Matched(DecodedLog),
    /// The log was emitted by a different event.
    NotThisEvent,
    /// Same signature, but the indexed layout differs from the schema.
    IndexedCountMismatch,
}

impl DecodeOutcome {
    pub fn matched(self) -> Option<DecodedLog> {
        match self {
            Self::Matched(log) => Some(log),
            Self::NotThisEvent | Self::IndexedCountMismatch => None,
        }
    }
}

/// Decode `log` as an emission of `schema`.
pub fn decode_log(schema: &EventSchema, log: RawLog) -> DecodeOutcome {
    match log.topics.split_first() {
        Some((sig, _)) if *sig == schema.selector() => {}
        _ => return DecodeOutcome::NotThisEvent,
    }

    let indexed: Vec<&EventParam> = schema.indexed_params().collect();
    if log.topics.len() - 1 != indexed.len() {
        return DecodeOutcome::IndexedCountMismatch;
    }

    let mut indexed_values = Vec::with_capacity(indexed.len());
    for (param, topic) in indexed.iter().zip(&log.topics[1..]) {
        match codec::decode_topic(&param.ty, topic) {
            Ok(value) => indexed_values.push(value),
            Err(e) => {
                tracing::trace!(event = schema.name(), error = %e, "undecodable indexed topic");
                return DecodeOutcome::IndexedCountMismatch;
            }
        }
    }

    let (args, quality) = match codec::decode_data(schema.data_types(), &log.data) {
        Ok(data_values) => {
            let values = interleave(schema.params(), indexed_values, data_values);
            (Some(assemble(schema.shape(), schema.params().iter(), values)), DecodeQuality::Full)
        }
        Err(e) => {
            tracing::debug!(
                event = schema.name(),
                block = ?log.block_number,
                log_index = ?log.log_index,
                error = %e,
                "data payload does not match schema; keeping log without args"
            );
            let indexed = assemble(schema.shape(), indexed.into_iter(), indexed_values);
            (None, DecodeQuality::Partial { indexed })
        }
    };

    DecodeOutcome::Matched(DecodedLog {
        log,
        event_name: Some(schema.name().to_string()),
        args,
        quality,
    })
}

/// Decode a batch in parallel. The output is in input order.
pub fn decode_batch(schema: &EventSchema, logs: Vec<RawLog>) -> Vec<DecodeOutcome> {
    logs.into_par_iter().map(|log| decode_log(schema, log)).collect()
}

/// Merge topic and data values back into declared parameter order.
fn interleave(
    params: &[EventParam],
    indexed: Vec<DynSolValue>,
    data: Vec<DynSolValue>,
) -> Vec<DynSolValue> {
    let mut indexed = indexed.into_iter();
    let mut data = data.into_iter();
    params
        .iter()
        .filter_map(|p| if p.indexed { indexed.next() } else { data.next() })
        .collect()
}

fn assemble<'a>(
    shape: ArgsShape,
    params: impl Iterator<Item = &'a EventParam>,
    values: Vec<DynSolValue>,
) -> EventArgs {
    match shape {
        ArgsShape::Named => {
            let map: IndexMap<String, DynSolValue> = params
                .zip(values)
                .filter_map(|(p, v)| p.name.clone().map(|n| (n, v)))
                .collect();
            EventArgs::Named(map)
        }
        ArgsShape::Positional => EventArgs::Positional(values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bytes, B256, U256};

    const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
    const FROM: &str = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";
    const TO: &str = "0xab5801a7d398351b8be11c439e05c5b3259aec9b";

    fn transfer() -> EventSchema {
        EventSchema::parse("event Transfer(address indexed from, address indexed to, uint256 value)")
            .unwrap()
    }

    fn word(hex: &str) -> B256 {
        hex.parse().unwrap()
    }

    fn addr_topic(a: &str) -> B256 {
        word(&format!("0x000000000000000000000000{}", &a[2..]))
    }

    fn erc20_transfer_raw() -> RawLog {
        // value: 1000000000000000000 (1e18)
        let data = hex::decode("0000000000000000000000000000000000000000000000000de0b6b3a7640000")
            .unwrap();
        RawLog {
            address: USDC.parse().unwrap(),
            topics: vec![
                word("0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"),
                addr_topic(FROM),
                addr_topic(TO),
            ],
            data: Bytes::from(data),
            block_hash: None,
            block_number: Some(19_000_000),
            transaction_hash: None,
            transaction_index: Some(0),
            log_index: Some(0),
            removed: false,
        }
    }

    #[test]
    fn decodes_named_transfer() {
        let decoded = decode_log(&transfer(), erc20_transfer_raw()).matched().unwrap();
        assert_eq!(decoded.event_name.as_deref(), Some("Transfer"));
        assert_eq!(decoded.quality, DecodeQuality::Full);

        let args = decoded.args.unwrap();
        assert!(args.is_named());
        assert_eq!(args.get("from"), Some(&DynSolValue::Address(FROM.parse::<Address>().unwrap())));
        assert_eq!(args.get("to"), Some(&DynSolValue::Address(TO.parse::<Address>().unwrap())));
        assert_eq!(
            args.get("value"),
            Some(&DynSolValue::Uint(U256::from(1_000_000_000_000_000_000u64), 256))
        );
    }

    #[test]
    fn positional_args_follow_declared_order() {
        // value is declared between the two indexed params
        let schema = EventSchema::parse("event Transfer(address indexed, uint256, address indexed)")
            .unwrap();
        let mut raw = erc20_transfer_raw();
        raw.topics[0] = schema.selector();

        let args = decode_log(&schema, raw).matched().unwrap().args.unwrap();
        assert!(!args.is_named());
        assert_eq!(args.at(0), Some(&DynSolValue::Address(FROM.parse().unwrap())));
        assert_eq!(
            args.at(1),
            Some(&DynSolValue::Uint(U256::from(1_000_000_000_000_000_000u64), 256))
        );
        assert_eq!(args.at(2), Some(&DynSolValue::Address(TO.parse().unwrap())));
    }

    #[test]
    fn other_signature_is_not_this_event() {
        let approval =
            EventSchema::parse("event Approval(address indexed owner, address indexed spender, uint256 value)")
                .unwrap();
        assert_eq!(decode_log(&approval, erc20_transfer_raw()), DecodeOutcome::NotThisEvent);

        let mut anonymous = erc20_transfer_raw();
        anonymous.topics.clear();
        assert_eq!(decode_log(&transfer(), anonymous), DecodeOutcome::NotThisEvent);
    }

    #[test]
    fn indexed_count_mismatch_is_dropped() {
        // Same signature, but `to` is not indexed in this schema.
        let schema =
            EventSchema::parse("event Transfer(address indexed from, address to, uint256 value)").unwrap();
        assert_eq!(decode_log(&schema, erc20_transfer_raw()), DecodeOutcome::IndexedCountMismatch);
    }

    #[test]
    fn invalid_bool_topic_is_dropped() {
        let schema = EventSchema::parse("event Flag(bool indexed on)").unwrap();
        let raw = RawLog {
            topics: vec![schema.selector(), B256::repeat_byte(0xff)],
            data: Bytes::new(),
            ..erc20_transfer_raw()
        };
        assert_eq!(decode_log(&schema, raw), DecodeOutcome::IndexedCountMismatch);
    }

    #[test]
    fn dirty_address_topic_is_dropped() {
        let mut raw = erc20_transfer_raw();
        raw.topics[1] = B256::repeat_byte(0x22);
        assert_eq!(decode_log(&transfer(), raw), DecodeOutcome::IndexedCountMismatch);
    }

    #[test]
    fn malformed_data_keeps_log_without_args() {
        let mut raw = erc20_transfer_raw();
        raw.data = Bytes::from(vec![0u8; 7]);

        let decoded = decode_log(&transfer(), raw).matched().unwrap();
        assert_eq!(decoded.event_name.as_deref(), Some("Transfer"));
        assert!(decoded.args.is_none());
        assert!(decoded.is_partial());
        match decoded.quality {
            DecodeQuality::Partial { indexed } => {
                assert_eq!(indexed.len(), 2);
                assert_eq!(indexed.get("from"), Some(&DynSolValue::Address(FROM.parse().unwrap())));
            }
            other => panic!("expected partial decode, got {other:?}"),
        }
    }

    #[test]
    fn batch_preserves_order() {
        let schema = transfer();
        let logs: Vec<RawLog> = (0..64u64)
            .map(|i| RawLog {
                log_index: Some(i),
                topics: if i % 3 == 0 {
                    vec![B256::ZERO]
                } else {
                    erc20_transfer_raw().topics
                },
                ..erc20_transfer_raw()
            })
            .collect();

        let outcomes = decode_batch(&schema, logs);
        assert_eq!(outcomes.len(), 64);
        for (i, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                DecodeOutcome::NotThisEvent => assert_eq!(i % 3, 0),
                DecodeOutcome::Matched(log) => assert_eq!(log.log.log_index, Some(i as u64)),
                DecodeOutcome::IndexedCountMismatch => panic!("unexpected mismatch at {i}"),
            }
        }
    }
}
