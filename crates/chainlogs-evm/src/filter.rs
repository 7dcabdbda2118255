//! Filter builder: turns an event schema, argument constraints and a block
//! range into the `eth_getLogs` filter object.
//!
//! Wire shape:
//! ```text
//! { address?, topics?: [ (hash | [hash, ...] | null), ... ], fromBlock?, toBlock?, blockHash? }
//! ```

use alloy_core::dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec;
use crate::error::FilterError;
use crate::log::RawLog;
use crate::schema::{EventParam, EventSchema};
use crate::types::BlockTag;

/// Protocol limit: one signature slot plus up to three indexed parameters.
pub const MAX_TOPICS: usize = 4;

// ─── Argument constraints ─────────────────────────────────────────────────────

/// Constraint on one indexed parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Match exactly this value.
    One(DynSolValue),
    /// Match any value in the set.
    AnyOf(Vec<DynSolValue>),
}

impl From<DynSolValue> for ArgValue {
    fn from(value: DynSolValue) -> Self {
        Self::One(value)
    }
}

impl From<Vec<DynSolValue>> for ArgValue {
    fn from(values: Vec<DynSolValue>) -> Self {
        Self::AnyOf(values)
    }
}

impl From<Address> for ArgValue {
    fn from(address: Address) -> Self {
        Self::One(DynSolValue::Address(address))
    }
}

impl From<Vec<Address>> for ArgValue {
    fn from(addresses: Vec<Address>) -> Self {
        Self::AnyOf(addresses.into_iter().map(DynSolValue::Address).collect())
    }
}

/// Constraints on indexed parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentConstraint {
    /// One slot per indexed parameter in declared order; `None` is a wildcard.
    Positional(Vec<Option<ArgValue>>),
    /// Parameter name → constraint; omitted names are wildcards.
    Named(IndexMap<String, ArgValue>),
}

impl ArgumentConstraint {
    pub fn named<K, V, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ArgValue>,
    {
        Self::Named(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn positional<I>(slots: I) -> Self
    where
        I: IntoIterator<Item = Option<ArgValue>>,
    {
        Self::Positional(slots.into_iter().collect())
    }
}

// ─── Topics ───────────────────────────────────────────────────────────────────

/// One topic slot of a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
    /// `null`, matches anything.
    Wildcard,
    Single(B256),
    /// Matches any of the hashes (OR).
    AnyOf(Vec<B256>),
}

impl Topic {
    pub fn matches(&self, topic: &B256) -> bool {
        match self {
            Self::Wildcard => true,
            Self::Single(h) => h == topic,
            Self::AnyOf(hs) => hs.contains(topic),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }
}

impl Serialize for Topic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Wildcard => serializer.serialize_none(),
            Self::Single(h) => h.serialize(serializer),
            Self::AnyOf(hs) => hs.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Topic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Single(B256),
            AnyOf(Vec<B256>),
        }
        Ok(match Option::<Raw>::deserialize(deserializer)? {
            None => Self::Wildcard,
            Some(Raw::Single(h)) => Self::Single(h),
            Some(Raw::AnyOf(hs)) => Self::AnyOf(hs),
        })
    }
}

/// Ordered topic slots, at most [`MAX_TOPICS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Topics(Vec<Topic>);

impl Topics {
    pub fn new(slots: Vec<Topic>) -> Result<Self, FilterError> {
        if slots.len() > MAX_TOPICS {
            return Err(FilterError::TooManyTopics {
                count: slots.len(),
                max: MAX_TOPICS,
            });
        }
        Ok(Self(slots))
    }

    pub fn as_slice(&self) -> &[Topic] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Positional match: slot `i` constrains `topics[i]`. A log needs at
    /// least as many topics as there are slots, wildcards included.
    pub fn matches(&self, topics: &[B256]) -> bool {
        topics.len() >= self.0.len()
            && self.0.iter().zip(topics).all(|(slot, t)| slot.matches(t))
    }
}

impl<'de> Deserialize<'de> for Topics {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let slots = Vec::<Topic>::deserialize(deserializer)?;
        Self::new(slots).map_err(serde::de::Error::custom)
    }
}

// ─── Filter object ────────────────────────────────────────────────────────────

/// One emitting address or any of several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressFilter {
    One(Address),
    Many(Vec<Address>),
}

impl AddressFilter {
    pub fn matches(&self, address: &Address) -> bool {
        match self {
            Self::One(a) => a == address,
            Self::Many(list) => list.contains(address),
        }
    }
}

impl From<Address> for AddressFilter {
    fn from(address: Address) -> Self {
        Self::One(address)
    }
}

impl From<Vec<Address>> for AddressFilter {
    fn from(addresses: Vec<Address>) -> Self {
        Self::Many(addresses)
    }
}

/// Block bounds of a query: a `fromBlock`/`toBlock` span or a single `blockHash`.
///
/// Absent bounds are left to the node, which treats both as `latest`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockRange {
    pub from_block: Option<BlockTag>,
    pub to_block: Option<BlockTag>,
    pub block_hash: Option<B256>,
}

impl BlockRange {
    pub fn span(from: impl Into<BlockTag>, to: impl Into<BlockTag>) -> Self {
        Self {
            from_block: Some(from.into()),
            to_block: Some(to.into()),
            block_hash: None,
        }
    }

    pub fn at_hash(hash: B256) -> Self {
        Self {
            block_hash: Some(hash),
            ..Self::default()
        }
    }

    /// `blockHash` excludes `fromBlock`/`toBlock`; numeric bounds must be ordered.
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.block_hash.is_some() && (self.from_block.is_some() || self.to_block.is_some()) {
            return Err(FilterError::BlockHashWithRange);
        }
        if let (Some(BlockTag::Number(from)), Some(BlockTag::Number(to))) =
            (self.from_block, self.to_block)
        {
            if from > to {
                return Err(FilterError::InvertedRange { from, to });
            }
        }
        Ok(())
    }
}

/// The `eth_getLogs` filter object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressFilter>,
    #[serde(default, skip_serializing_if = "Topics::is_empty")]
    pub topics: Topics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_block: Option<BlockTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_block: Option<BlockTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<B256>,
}

impl FilterParams {
    /// Evaluate this filter against a log locally, the way a node would.
    ///
    /// `earliest` is block 0; the other symbolic tags (`latest`, `safe`, ...)
    /// are treated as unbounded since no chain head is known here. Logs
    /// without a block number only match filters without block bounds.
    pub fn matches(&self, log: &RawLog) -> bool {
        if let Some(address) = &self.address {
            if !address.matches(&log.address) {
                return false;
            }
        }
        if !self.topics.matches(&log.topics) {
            return false;
        }
        if let Some(hash) = &self.block_hash {
            return log.block_hash.as_ref() == Some(hash);
        }

        let lower = self.from_block.and_then(|t| t.as_number());
        let upper = self.to_block.and_then(|t| t.as_number());
        if lower.is_none() && upper.is_none() {
            return true;
        }
        match log.block_number {
            Some(n) => lower.map_or(true, |lo| n >= lo) && upper.map_or(true, |hi| n <= hi),
            None => false,
        }
    }
}

// ─── Builder ──────────────────────────────────────────────────────────────────

/// Build the filter object for a query.
///
/// With a schema, `topics[0]` is its signature hash and `topics[i + 1]`
/// constrains the `i`-th indexed parameter. Trailing wildcard slots are
/// trimmed, so a positional `None` and an omitted named constraint produce
/// identical filters. Without a schema no topics are set and constraints are
/// rejected. The address filter is left for the caller to set.
pub fn build_filter(
    schema: Option<&EventSchema>,
    constraint: Option<&ArgumentConstraint>,
    range: &BlockRange,
) -> Result<FilterParams, FilterError> {
    range.validate()?;

    let topics = match (schema, constraint) {
        (Some(schema), constraint) => event_topics(schema, constraint)?,
        (None, Some(_)) => return Err(FilterError::ArgsWithoutEvent),
        (None, None) => Topics::default(),
    };

    Ok(FilterParams {
        address: None,
        topics,
        from_block: range.from_block,
        to_block: range.to_block,
        block_hash: range.block_hash,
    })
}

fn event_topics(
    schema: &EventSchema,
    constraint: Option<&ArgumentConstraint>,
) -> Result<Topics, FilterError> {
    let indexed: Vec<&EventParam> = schema.indexed_params().collect();

    let slots: Vec<Option<&ArgValue>> = match constraint {
        None => Vec::new(),
        Some(ArgumentConstraint::Positional(values)) => {
            if values.len() > indexed.len() {
                return Err(FilterError::TooManyArguments {
                    given: values.len(),
                    indexed: indexed.len(),
                });
            }
            values.iter().map(Option::as_ref).collect()
        }
        Some(ArgumentConstraint::Named(map)) => {
            for name in map.keys() {
                match schema.param(name) {
                    None => return Err(FilterError::UnknownParameter { name: name.clone() }),
                    Some(p) if !p.indexed => {
                        return Err(FilterError::NotIndexed { name: name.clone() })
                    }
                    Some(_) => {}
                }
            }
            indexed
                .iter()
                .map(|p| p.name.as_deref().and_then(|n| map.get(n)))
                .collect()
        }
    };

    let mut topics = Vec::with_capacity(1 + indexed.len());
    topics.push(Topic::Single(schema.selector()));
    for (i, (param, slot)) in indexed.iter().zip(slots).enumerate() {
        topics.push(encode_slot(param, i, slot)?);
    }
    while topics.last().is_some_and(Topic::is_wildcard) {
        topics.pop();
    }
    Topics::new(topics)
}

fn encode_slot(param: &EventParam, i: usize, slot: Option<&ArgValue>) -> Result<Topic, FilterError> {
    let label = || param.name.clone().unwrap_or_else(|| format!("#{i}"));
    let encode = |value: &DynSolValue| {
        codec::encode_topic(&param.ty, value).map_err(|source| FilterError::InvalidValue {
            param: label(),
            source,
        })
    };

    match slot {
        None => Ok(Topic::Wildcard),
        Some(ArgValue::One(value)) => encode(value).map(Topic::Single),
        Some(ArgValue::AnyOf(values)) if values.is_empty() => {
            Err(FilterError::EmptyValueSet { param: label() })
        }
        Some(ArgValue::AnyOf(values)) => values
            .iter()
            .map(encode)
            .collect::<Result<Vec<_>, _>>()
            .map(Topic::AnyOf),
    }
}
