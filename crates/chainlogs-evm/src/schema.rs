//! Event schemas: the declared shape of a loggable event.

use alloy_core::dyn_abi::DynSolType;
use alloy_dyn_abi::Specifier;
use alloy_json_abi::Event;
use alloy_primitives::B256;

use crate::error::SchemaError;
use crate::fingerprint;

/// Protocol limit on indexed parameters of a non-anonymous event.
pub const MAX_INDEXED_PARAMS: usize = 3;

/// One declared event parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventParam {
    /// `None` for unnamed parameters (an empty name counts as unnamed).
    pub name: Option<String>,
    pub ty: DynSolType,
    /// Emitted into topics rather than the data payload.
    pub indexed: bool,
}

impl EventParam {
    /// Build a parameter from a Solidity type string such as `"uint256"` or `"(address,bytes)[]"`.
    pub fn new(name: Option<&str>, ty: &str, indexed: bool) -> Result<Self, SchemaError> {
        let parsed: DynSolType =
            ty.parse()
                .map_err(|e: alloy_core::dyn_abi::Error| SchemaError::InvalidType {
                    ty: ty.to_string(),
                    reason: e.to_string(),
                })?;
        Ok(Self {
            name: name.filter(|n| !n.is_empty()).map(str::to_string),
            ty: parsed,
            indexed,
        })
    }

    /// A named, indexed parameter.
    pub fn indexed(name: &str, ty: &str) -> Result<Self, SchemaError> {
        Self::new(Some(name), ty, true)
    }

    /// A named, non-indexed parameter.
    pub fn data(name: &str, ty: &str) -> Result<Self, SchemaError> {
        Self::new(Some(name), ty, false)
    }

    /// An unnamed parameter.
    pub fn unnamed(ty: &str, indexed: bool) -> Result<Self, SchemaError> {
        Self::new(None, ty, indexed)
    }
}

/// Shape of decoded arguments, fixed once per schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgsShape {
    /// Every parameter is named: args decode to a name → value map.
    Named,
    /// At least one parameter is unnamed: args decode to a sequence in declared order.
    Positional,
}

/// An immutable event schema with its precomputed signature hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSchema {
    name: String,
    params: Vec<EventParam>,
    signature: String,
    selector: B256,
    shape: ArgsShape,
    data_types: Vec<DynSolType>,
}

impl EventSchema {
    /// Build a schema from a name and its parameters in declared order.
    pub fn new(name: impl Into<String>, params: Vec<EventParam>) -> Result<Self, SchemaError> {
        let name = name.into();

        let indexed = params.iter().filter(|p| p.indexed).count();
        if indexed > MAX_INDEXED_PARAMS {
            return Err(SchemaError::TooManyIndexed {
                event: name,
                count: indexed,
                max: MAX_INDEXED_PARAMS,
            });
        }

        for (i, p) in params.iter().enumerate() {
            if let Some(n) = &p.name {
                if params[..i].iter().any(|q| q.name.as_ref() == Some(n)) {
                    return Err(SchemaError::DuplicateParam {
                        event: name,
                        name: n.clone(),
                    });
                }
            }
        }

        let types: Vec<String> = params
            .iter()
            .map(|p| p.ty.sol_type_name().into_owned())
            .collect();
        let signature = format!("{}({})", name, types.join(","));
        let selector = fingerprint::signature_hash(&signature);

        let shape = if params.iter().all(|p| p.name.is_some()) {
            ArgsShape::Named
        } else {
            ArgsShape::Positional
        };

        let data_types = params
            .iter()
            .filter(|p| !p.indexed)
            .map(|p| p.ty.clone())
            .collect();

        Ok(Self {
            name,
            params,
            signature,
            selector,
            shape,
            data_types,
        })
    }

    /// Parse a human-readable declaration, e.g.
    /// `"event Transfer(address indexed from, address indexed to, uint256 value)"`.
    /// The leading `event` keyword is optional.
    pub fn parse(declaration: &str) -> Result<Self, SchemaError> {
        let trimmed = declaration.trim();
        let source = if trimmed.starts_with("event ") {
            trimmed.to_string()
        } else {
            format!("event {trimmed}")
        };
        let event = Event::parse(&source).map_err(|e| SchemaError::Parse {
            reason: e.to_string(),
        })?;
        Self::from_abi(&event)
    }

    /// Convert a JSON-ABI event item.
    pub fn from_abi(event: &Event) -> Result<Self, SchemaError> {
        if event.anonymous {
            return Err(SchemaError::Anonymous {
                event: event.name.clone(),
            });
        }
        let params = event
            .inputs
            .iter()
            .map(|input| {
                let ty = input.resolve().map_err(|e| SchemaError::InvalidType {
                    ty: input.ty.clone(),
                    reason: e.to_string(),
                })?;
                Ok(EventParam {
                    name: Some(input.name.clone()).filter(|n| !n.is_empty()),
                    ty,
                    indexed: input.indexed,
                })
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;
        Self::new(event.name.clone(), params)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All parameters in declared order.
    pub fn params(&self) -> &[EventParam] {
        &self.params
    }

    /// Canonical signature, e.g. `"Transfer(address,address,uint256)"`.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Signature hash: the expected value of `topics[0]`.
    pub fn selector(&self) -> B256 {
        self.selector
    }

    pub fn shape(&self) -> ArgsShape {
        self.shape
    }

    /// Indexed parameters in declared order (topics[1..]).
    pub fn indexed_params(&self) -> impl Iterator<Item = &EventParam> {
        self.params.iter().filter(|p| p.indexed)
    }

    pub fn indexed_count(&self) -> usize {
        self.indexed_params().count()
    }

    /// Types of the non-indexed parameters in declared order (the data payload).
    pub fn data_types(&self) -> &[DynSolType] {
        &self.data_types
    }

    /// Look up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&EventParam> {
        self.params.iter().find(|p| p.name.as_deref() == Some(name))
    }
}
