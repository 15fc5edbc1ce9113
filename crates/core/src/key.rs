//! Collection keys
//!
//! A [`Key`] is a dynamically-typed scalar: one of the nullish singletons, a
//! boolean, an IEEE-754 double, a string, an arbitrary-precision integer, a
//! symbol (identified by its stable name) or an opaque capability reference.
//!
//! ## Equality
//!
//! Numbers compare by bit pattern, so `-0.0` and `0.0` are distinct keys and
//! a NaN key is equal to itself. This matches the byte encoding, where every
//! distinct bit pattern maps to a distinct row.
//!
//! ## Ordering
//!
//! Keys of the same kind are ordered by [`Key::compare_within_kind`]. Numbers
//! use the IEEE total order (`f64::total_cmp`). Capability references have no
//! intrinsic order; their position in a collection comes from the ordinal
//! assigned when they were first used as a key.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Opaque, identity-only handle to an external object
///
/// The wrapped string is the substrate identifier of the referenced object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapRef(String);

impl CapRef {
    /// Wrap a substrate identifier
    pub fn new(id: impl Into<String>) -> Self {
        CapRef(id.into())
    }

    /// Substrate identifier of the referenced object
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cap:{}", self.0)
    }
}

impl From<&str> for CapRef {
    fn from(id: &str) -> Self {
        CapRef::new(id)
    }
}

/// Discriminates the kinds of [`Key`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    /// `true` / `false`
    Boolean,
    /// IEEE-754 double
    Number,
    /// Arbitrary-precision integer
    BigInt,
    /// Capability reference
    CapRef,
    /// UTF-8 string
    String,
    /// The null singleton
    Null,
    /// Named symbol
    Symbol,
    /// The undefined singleton
    Undefined,
}

impl KeyKind {
    /// All key kinds
    pub const ALL: [KeyKind; 8] = [
        KeyKind::Boolean,
        KeyKind::Number,
        KeyKind::BigInt,
        KeyKind::CapRef,
        KeyKind::String,
        KeyKind::Null,
        KeyKind::Symbol,
        KeyKind::Undefined,
    ];

    /// Human-readable kind name
    pub fn name(&self) -> &'static str {
        match self {
            KeyKind::Boolean => "boolean",
            KeyKind::Number => "number",
            KeyKind::BigInt => "bigint",
            KeyKind::CapRef => "capability reference",
            KeyKind::String => "string",
            KeyKind::Null => "null",
            KeyKind::Symbol => "symbol",
            KeyKind::Undefined => "undefined",
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A collection key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "KeyRepr", try_from = "KeyRepr")]
pub enum Key {
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
}

impl Key {
    /// Kind of this key
    pub fn kind(&self) -> KeyKind {
        match self {
            Key::Null => KeyKind::Null,
            Key::Undefined => KeyKind::Undefined,
            Key::Bool(_) => KeyKind::Boolean,
            Key::Number(_) => KeyKind::Number,
            Key::String(_) => KeyKind::String,
            Key::BigInt(_) => KeyKind::BigInt,
            Key::Symbol(_) => KeyKind::Symbol,
            Key::CapRef(_) => KeyKind::CapRef,
        }
    }

    /// Capability reference, if this key is one
    pub fn as_cap_ref(&self) -> Option<&CapRef> {
        match self {
            Key::CapRef(cap) => Some(cap),
            _ => None,
        }
    }

    /// Build a symbol key
    pub fn symbol(name: impl Into<String>) -> Self {
        Key::Symbol(name.into())
    }

    /// Build a capability reference key
    pub fn cap_ref(id: impl Into<String>) -> Self {
        Key::CapRef(CapRef::new(id))
    }

    /// Compare two keys of the same kind
    ///
    /// Returns `None` for keys of different kinds and for distinct capability
    /// references, which are unordered.
    pub fn compare_within_kind(&self, other: &Key) -> Option<Ordering> {
        match (self, other) {
            (Key::Null, Key::Null) | (Key::Undefined, Key::Undefined) => Some(Ordering::Equal),
            (Key::Bool(a), Key::Bool(b)) => Some(a.cmp(b)),
            (Key::Number(a), Key::Number(b)) => Some(a.total_cmp(b)),
            (Key::String(a), Key::String(b)) => Some(a.cmp(b)),
            (Key::BigInt(a), Key::BigInt(b)) => Some(a.cmp(b)),
            (Key::Symbol(a), Key::Symbol(b)) => Some(a.cmp(b)),
            (Key::CapRef(a), Key::CapRef(b)) if a == b => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Null, Key::Null) | (Key::Undefined, Key::Undefined) => true,
            (Key::Bool(a), Key::Bool(b)) => a == b,
            (Key::Number(a), Key::Number(b)) => a.to_bits() == b.to_bits(),
            (Key::String(a), Key::String(b)) => a == b,
            (Key::BigInt(a), Key::BigInt(b)) => a == b,
            (Key::Symbol(a), Key::Symbol(b)) => a == b,
            (Key::CapRef(a), Key::CapRef(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Key::Null | Key::Undefined => {}
            Key::Bool(b) => b.hash(state),
            Key::Number(n) => n.to_bits().hash(state),
            Key::String(s) | Key::Symbol(s) => s.hash(state),
            Key::BigInt(n) => n.hash(state),
            Key::CapRef(cap) => cap.hash(state),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Null => f.write_str("null"),
            Key::Undefined => f.write_str("undefined"),
            Key::Bool(b) => write!(f, "{}", b),
            Key::Number(n) => write!(f, "{}", n),
            Key::String(s) => write!(f, "{:?}", s),
            Key::BigInt(n) => write!(f, "{}n", n),
            Key::Symbol(name) => write!(f, "Symbol({})", name),
            Key::CapRef(cap) => write!(f, "{}", cap),
        }
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

impl From<f64> for Key {
    fn from(n: f64) -> Self {
        Key::Number(n)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::String(s)
    }
}

impl From<BigInt> for Key {
    fn from(n: BigInt) -> Self {
        Key::BigInt(n)
    }
}

impl From<CapRef> for Key {
    fn from(cap: CapRef) -> Self {
        Key::CapRef(cap)
    }
}

// Persisted form. Numbers travel as raw bits so NaN and -0 survive JSON.
#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
enum KeyRepr {
    Null,
    Undefined,
    Bool(bool),
    Number(u64),
    String(String),
    BigInt(String),
    Symbol(String),
    CapRef(String),
}

impl From<Key> for KeyRepr {
    fn from(key: Key) -> Self {
        match key {
            Key::Null => KeyRepr::Null,
            Key::Undefined => KeyRepr::Undefined,
            Key::Bool(b) => KeyRepr::Bool(b),
            Key::Number(n) => KeyRepr::Number(n.to_bits()),
            Key::String(s) => KeyRepr::String(s),
            Key::BigInt(n) => KeyRepr::BigInt(n.to_string()),
            Key::Symbol(name) => KeyRepr::Symbol(name),
            Key::CapRef(cap) => KeyRepr::CapRef(cap.0),
        }
    }
}

impl TryFrom<KeyRepr> for Key {
    type Error = String;

    fn try_from(repr: KeyRepr) -> std::result::Result<Self, Self::Error> {
        Ok(match repr {
            KeyRepr::Null => Key::Null,
            KeyRepr::Undefined => Key::Undefined,
            KeyRepr::Bool(b) => Key::Bool(b),
            KeyRepr::Number(bits) => Key::Number(f64::from_bits(bits)),
            KeyRepr::String(s) => Key::String(s),
            KeyRepr::BigInt(digits) => Key::BigInt(
                digits
                    .parse()
                    .map_err(|_| format!("invalid bigint digits {:?}", digits))?,
            ),
            KeyRepr::Symbol(name) => Key::Symbol(name),
            KeyRepr::CapRef(id) => Key::CapRef(CapRef(id)),
        })
    }
}
