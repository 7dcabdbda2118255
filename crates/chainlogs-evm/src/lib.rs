//! # chainlogs-evm
//!
//! Typed `eth_getLogs` queries for any EVM-compatible chain.
//!
//! ## Implementation notes
//! - Uses `alloy-core` dynamic ABI types for topic encoding and data decoding
//! - Topics[0] → event signature hash (keccak256 of the canonical signature)
//! - Topics[1..] → indexed parameters (one 32-byte word each; reference types hashed)
//! - `data` → non-indexed parameters (ABI-encoded sequence)
//! - A log whose data does not fit the schema is kept without args; a log
//!   whose indexed layout does not fit is dropped
//!
//! ```ignore
//! let client = LogClient::new(RetryTransport::new(http, RetryConfig::default()));
//! let query = LogQuery::new()
//!     .event(EventSchema::parse("event Transfer(address indexed from, address indexed to, uint256 value)")?)
//!     .args(ArgumentConstraint::named([("from", alice)]))
//!     .from_block(19_000_000u64)
//!     .to_block(19_000_100u64);
//! for log in client.get_logs(&query).await? {
//!     println!("{:?}", log.arg("value"));
//! }
//! ```

pub mod codec;
pub mod decoder;
pub mod error;
pub mod filter;
pub mod fingerprint;
pub mod log;
pub mod query;
pub mod schema;
pub mod types;

pub use decoder::{decode_batch, decode_log, DecodeOutcome};
pub use error::{CodecError, FilterError, LogsError, SchemaError};
pub use filter::{
    build_filter, AddressFilter, ArgValue, ArgumentConstraint, BlockRange, FilterParams, Topic,
    Topics, MAX_TOPICS,
};
pub use log::{DecodeQuality, DecodedLog, EventArgs, RawLog};
pub use query::{get_logs, LogClient, LogQuery, GET_LOGS_METHOD, PARALLEL_DECODE_THRESHOLD};
pub use schema::{ArgsShape, EventParam, EventSchema, MAX_INDEXED_PARAMS};
pub use types::BlockTag;
