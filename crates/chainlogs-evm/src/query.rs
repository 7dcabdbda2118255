//! Log query orchestration: build the filter, send one `eth_getLogs`
//! request, decode the response.

use alloy_primitives::{Address, B256};
use chainlogs_core::{RpcRequest, RpcTransport};
use serde_json::Value;

use crate::decoder::{decode_batch, decode_log, DecodeOutcome};
use crate::error::LogsError;
use crate::filter::{build_filter, AddressFilter, ArgumentConstraint, BlockRange, FilterParams};
use crate::log::{DecodedLog, RawLog};
use crate::schema::EventSchema;
use crate::types::BlockTag;

pub const GET_LOGS_METHOD: &str = "eth_getLogs";

/// Batches at least this large are decoded in parallel on the blocking pool;
/// smaller ones decode inline.
pub const PARALLEL_DECODE_THRESHOLD: usize = 256;

/// Parameters of a single log query.
#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    event: Option<EventSchema>,
    args: Option<ArgumentConstraint>,
    address: Option<AddressFilter>,
    range: BlockRange,
    strict: bool,
}

impl LogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one event and decode matching logs with its schema.
    pub fn event(mut self, schema: EventSchema) -> Self {
        self.event = Some(schema);
        self
    }

    /// Constrain indexed parameters. Requires [`event`](Self::event).
    pub fn args(mut self, args: ArgumentConstraint) -> Self {
        self.args = Some(args);
        self
    }

    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(AddressFilter::One(address));
        self
    }

    pub fn addresses(mut self, addresses: Vec<Address>) -> Self {
        self.address = Some(AddressFilter::Many(addresses));
        self
    }

    pub fn from_block(mut self, block: impl Into<BlockTag>) -> Self {
        self.range.from_block = Some(block.into());
        self
    }

    pub fn to_block(mut self, block: impl Into<BlockTag>) -> Self {
        self.range.to_block = Some(block.into());
        self
    }

    pub fn block_hash(mut self, hash: B256) -> Self {
        self.range.block_hash = Some(hash);
        self
    }

    pub fn range(mut self, range: BlockRange) -> Self {
        self.range = range;
        self
    }

    /// Drop logs whose data payload fails to decode instead of returning
    /// them without args.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn schema(&self) -> Option<&EventSchema> {
        self.event.as_ref()
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// The filter object this query sends. Fails without touching the network.
    pub fn filter(&self) -> Result<FilterParams, LogsError> {
        let mut filter = build_filter(self.event.as_ref(), self.args.as_ref(), &self.range)?;
        filter.address = self.address.clone();
        Ok(filter)
    }
}

/// Runs [`LogQuery`]s over an [`RpcTransport`].
///
/// Retries and timeouts belong to the transport; wrap it in a
/// [`RetryTransport`](chainlogs_core::RetryTransport) to get them.
#[derive(Debug, Clone)]
pub struct LogClient<T> {
    transport: T,
}

impl<T: RpcTransport> LogClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch and decode the logs matching `query`, in node order.
    pub async fn get_logs(&self, query: &LogQuery) -> Result<Vec<DecodedLog>, LogsError> {
        get_logs(&self.transport, query).await
    }
}

/// Fetch and decode the logs matching `query` with exactly one `eth_getLogs`
/// request (plus whatever retries the transport performs).
pub async fn get_logs<T>(transport: &T, query: &LogQuery) -> Result<Vec<DecodedLog>, LogsError>
where
    T: RpcTransport + ?Sized,
{
    let filter = query.filter()?;
    let params = serde_json::to_value(&filter).map_err(LogsError::Encode)?;

    let result: Value = transport
        .request(RpcRequest::new(GET_LOGS_METHOD, vec![params]))
        .await?;
    let entries: Vec<Value> =
        serde_json::from_value(result).map_err(LogsError::InvalidResponse)?;
    let received = entries.len();
    let raw = parse_entries(entries);

    let logs: Vec<DecodedLog> = match query.schema() {
        None => raw.into_iter().map(DecodedLog::undecoded).collect(),
        Some(schema) => decode_all(schema, raw)
            .await?
            .into_iter()
            .filter_map(|outcome| keep(schema, outcome, query.is_strict()))
            .collect(),
    };

    tracing::debug!(
        transport = transport.name(),
        event = query.schema().map(EventSchema::name),
        received,
        returned = logs.len(),
        "eth_getLogs complete"
    );
    Ok(logs)
}

/// Parse each returned entry on its own; an entry that is not a valid log
/// object is dropped without failing the rest of the batch.
fn parse_entries(entries: Vec<Value>) -> Vec<RawLog> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(position, entry)| match serde_json::from_value::<RawLog>(entry) {
            Ok(log) => Some(log),
            Err(e) => {
                tracing::debug!(position, error = %e, "dropping malformed log entry");
                None
            }
        })
        .collect()
}

async fn decode_all(schema: &EventSchema, raw: Vec<RawLog>) -> Result<Vec<DecodeOutcome>, LogsError> {
    if raw.len() < PARALLEL_DECODE_THRESHOLD {
        return Ok(raw.into_iter().map(|log| decode_log(schema, log)).collect());
    }
    let schema = schema.clone();
    tokio::task::spawn_blocking(move || decode_batch(&schema, raw))
        .await
        .map_err(LogsError::DecodeTask)
}

fn keep(schema: &EventSchema, outcome: DecodeOutcome, strict: bool) -> Option<DecodedLog> {
    match outcome {
        DecodeOutcome::Matched(log) if strict && log.is_partial() => {
            tracing::trace!(event = schema.name(), log_index = ?log.log.log_index, "strict: dropping partial log");
            None
        }
        DecodeOutcome::Matched(log) => Some(log),
        DecodeOutcome::NotThisEvent => {
            tracing::trace!(event = schema.name(), "dropping log of another event");
            None
        }
        DecodeOutcome::IndexedCountMismatch => {
            tracing::trace!(event = schema.name(), "dropping log with mismatched indexed layout");
            None
        }
    }
}
