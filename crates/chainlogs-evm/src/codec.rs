//! ABI glue between alloy's dynamic values and 32-byte log topics.
//!
//! # Indexed-parameter encoding rules
//! - **Value types** (uint, int, bool, address, bytes1–bytes32): ABI-encoded
//!   into a single 32-byte word and stored directly; decoding recovers the value.
//! - **Reference types** (string, bytes, arrays, tuples): stored as the
//!   keccak256 of their in-place encoding. The original value is
//!   **unrecoverable**, decoding yields the 32-byte hash as `FixedBytes(_, 32)`.

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::B256;

use crate::error::CodecError;
use crate::fingerprint::keccak256;

/// Returns `true` if values of `ty` are hashed when indexed.
pub fn is_hashed_in_topic(ty: &DynSolType) -> bool {
    matches!(
        ty,
        DynSolType::String
            | DynSolType::Bytes
            | DynSolType::Array(_)
            | DynSolType::FixedArray(..)
            | DynSolType::Tuple(_)
    )
}

/// Encode one indexed value of type `ty` into its 32-byte topic.
pub fn encode_topic(ty: &DynSolType, value: &DynSolValue) -> Result<B256, CodecError> {
    if !ty.matches(value) {
        return Err(CodecError::TypeMismatch {
            expected: ty.sol_type_name().into_owned(),
            got: format!("{value:?}"),
        });
    }

    match value {
        DynSolValue::String(s) => Ok(keccak256(s.as_bytes())),
        DynSolValue::Bytes(b) => Ok(keccak256(b)),
        DynSolValue::Array(_) | DynSolValue::FixedArray(_) | DynSolValue::Tuple(_) => {
            let mut preimage = Vec::new();
            encode_in_place(value, &mut preimage);
            Ok(keccak256(&preimage))
        }
        _ => word(value),
    }
}

/// Decode one indexed value of type `ty` from its topic.
///
/// The word must be the canonical encoding of the decoded value: dirty
/// padding (a bool other than 0/1, an address with high bytes set, a
/// narrow int that is not sign- or zero-extended) is rejected.
pub fn decode_topic(ty: &DynSolType, topic: &B256) -> Result<DynSolValue, CodecError> {
    if is_hashed_in_topic(ty) {
        return Ok(DynSolValue::FixedBytes(*topic, 32));
    }
    if !is_canonical_word(ty, topic) {
        return Err(CodecError::Topic {
            reason: format!("{topic:#x} is not a canonical {} word", ty.sol_type_name()),
        });
    }
    ty.abi_decode(topic.as_slice())
        .map_err(|e| CodecError::Topic {
            reason: e.to_string(),
        })
}

/// Padding rules of a single static ABI word.
fn is_canonical_word(ty: &DynSolType, word: &B256) -> bool {
    let zero = |bytes: &[u8]| bytes.iter().all(|b| *b == 0);
    match ty {
        DynSolType::Bool => zero(&word[..31]) && word[31] <= 1,
        DynSolType::Address => zero(&word[..12]),
        DynSolType::Function => zero(&word[24..]),
        DynSolType::FixedBytes(n) => zero(&word[(*n).min(32)..]),
        DynSolType::Uint(bits) => zero(&word[..32 - bits / 8]),
        DynSolType::Int(bits) => {
            let pad = 32 - bits / 8;
            if pad == 0 {
                return true;
            }
            let fill = if word[pad] & 0x80 == 0 { 0x00 } else { 0xff };
            word[..pad].iter().all(|b| *b == fill)
        }
        _ => true,
    }
}

/// Decode the non-indexed payload: `data` is the ABI encoding of the
/// parameter sequence `types`.
pub fn decode_data(types: &[DynSolType], data: &[u8]) -> Result<Vec<DynSolValue>, CodecError> {
    if types.is_empty() {
        return Ok(Vec::new());
    }

    let decoded = DynSolType::Tuple(types.to_vec())
        .abi_decode_sequence(data)
        .map_err(|e| CodecError::Data {
            reason: e.to_string(),
        })?;

    match decoded {
        DynSolValue::Tuple(values) if values.len() == types.len() => Ok(values),
        other => Err(CodecError::Data {
            reason: format!("expected {} values, decoded {other:?}", types.len()),
        }),
    }
}

/// The single 32-byte ABI word of a static value type.
fn word(value: &DynSolValue) -> Result<B256, CodecError> {
    let encoded = value.abi_encode();
    if encoded.len() != 32 {
        return Err(CodecError::TypeMismatch {
            expected: "static value type".into(),
            got: format!("{} encoded bytes", encoded.len()),
        });
    }
    Ok(B256::from_slice(&encoded))
}

/// Append the in-place topic encoding of `value`: value types as one word,
/// string/bytes as their contents right-padded to a word boundary, arrays and
/// tuples as the concatenation of their elements with no length prefix.
fn encode_in_place(value: &DynSolValue, out: &mut Vec<u8>) {
    match value {
        DynSolValue::String(s) => pad_to_word(s.as_bytes(), out),
        DynSolValue::Bytes(b) => pad_to_word(b, out),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            for item in items {
                encode_in_place(item, out);
            }
        }
        other => out.extend_from_slice(&other.abi_encode()),
    }
}

fn pad_to_word(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(bytes);
    let rem = bytes.len() % 32;
    if rem != 0 {
        out.resize(out.len() + 32 - rem, 0);
    }
}
