//! Stored values
//!
//! [`Value`] is what collections hold against their keys. Values may nest
//! (lists and records) and may carry capability references anywhere inside
//! them. A value codec turns a `Value` into [`CapData`]: an opaque body plus
//! the list of capability references reachable from it.

use crate::error::{Error, Result};
use crate::key::{CapRef, Key};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Application value stored in a collection
#[derive(Debug, Clone)]
pub enum Value {
    /// The null singleton
    Null,
    /// The undefined singleton
    Undefined,
    /// Boolean
    Bool(bool),
    /// IEEE-754 double
    Number(f64),
    /// UTF-8 string
    String(String),
    /// Arbitrary-precision integer
    BigInt(BigInt),
    /// Symbol, by stable name
    Symbol(String),
    /// Capability reference
    CapRef(CapRef),
    /// Ordered list of values
    List(Vec<Value>),
    /// String-keyed record
    Record(BTreeMap<String, Value>),
}

impl Value {
    /// Human-readable kind name
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::BigInt(_) => "bigint",
            Value::Symbol(_) => "symbol",
            Value::CapRef(_) => "capability reference",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    /// Capability references reachable from this value
    ///
    /// Each reference appears once, in order of first appearance.
    pub fn cap_refs(&self) -> Vec<CapRef> {
        let mut out = Vec::new();
        self.collect_cap_refs(&mut out);
        out
    }

    fn collect_cap_refs(&self, out: &mut Vec<CapRef>) {
        match self {
            Value::CapRef(cap) => {
                if !out.contains(cap) {
                    out.push(cap.clone());
                }
            }
            Value::List(items) => items.iter().for_each(|v| v.collect_cap_refs(out)),
            Value::Record(fields) => fields.values().for_each(|v| v.collect_cap_refs(out)),
            _ => {}
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::CapRef(a), Value::CapRef(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Null => Value::Null,
            Key::Undefined => Value::Undefined,
            Key::Bool(b) => Value::Bool(b),
            Key::Number(n) => Value::Number(n),
            Key::String(s) => Value::String(s),
            Key::BigInt(n) => Value::BigInt(n),
            Key::Symbol(name) => Value::Symbol(name),
            Key::CapRef(cap) => Value::CapRef(cap),
        }
    }
}

impl TryFrom<Value> for Key {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Key::Null),
            Value::Undefined => Ok(Key::Undefined),
            Value::Bool(b) => Ok(Key::Bool(b)),
            Value::Number(n) => Ok(Key::Number(n)),
            Value::String(s) => Ok(Key::String(s)),
            Value::BigInt(n) => Ok(Key::BigInt(n)),
            Value::Symbol(name) => Ok(Key::Symbol(name)),
            Value::CapRef(cap) => Ok(Key::CapRef(cap)),
            other => Err(Error::UnsupportedKeyKind {
                kind: other.kind_name(),
            }),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::BigInt(n)
    }
}

impl From<CapRef> for Value {
    fn from(cap: CapRef) -> Self {
        Value::CapRef(cap)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// Serialized form of a [`Value`]
///
/// `refs` lists every capability reference reachable from the value, in a
/// stable order. The collection layer diffs `refs` between the old and new
/// value of an entry to drive reachability notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapData {
    /// Codec-specific body
    pub body: String,
    /// Capability references reachable from the value
    pub refs: Vec<CapRef>,
}

impl CapData {
    /// Build capdata from its parts
    pub fn new(body: impl Into<String>, refs: Vec<CapRef>) -> Self {
        CapData {
            body: body.into(),
            refs,
        }
    }
}
