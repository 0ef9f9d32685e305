//! Key Module
//!
//! Composes structured cache keys from a namespace and call arguments, and
//! derives the canonical string fingerprint used for in-process deduplication.


use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::hash::{Hash, Hasher};

// == Key Part ==
/// One element of a composite cache key.
///
/// Mirrors the scalar, byte-sequence, and nested-sequence element types a
/// key-value store natively supports as key components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum KeyPart {
    /// Boolean element
    Bool(bool),
    /// Signed integer element
    Int(i64),
    /// Floating-point element
    Float(f64),
    /// Text element
    Text(String),
    /// Byte-sequence element
    Bytes(Vec<u8>),
    /// Nested ordered sequence of elements
    Seq(Vec<KeyPart>),
}

// Equality and hashing treat floats by bit pattern so keys stay coherent as
// HashMap keys: an identical-bit NaN equals itself, and 0.0 != -0.0.
impl PartialEq for KeyPart {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Seq(a), Self::Seq(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for KeyPart {}

impl Hash for KeyPart {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Discriminant first so e.g. Int(1) and Float(1.0) hash apart
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Bool(v) => v.hash(state),
            Self::Int(v) => v.hash(state),
            Self::Float(v) => v.to_bits().hash(state),
            Self::Text(v) => v.hash(state),
            Self::Bytes(v) => v.hash(state),
            Self::Seq(v) => v.hash(state),
        }
    }
}

// == Conversions ==
impl From<bool> for KeyPart {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for KeyPart {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for KeyPart {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for KeyPart {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for KeyPart {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for KeyPart {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<Vec<KeyPart>> for KeyPart {
    fn from(v: Vec<KeyPart>) -> Self {
        Self::Seq(v)
    }
}

// == Composite Key ==
/// A full store key: namespace elements followed by argument elements,
/// order preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompositeKey(Vec<KeyPart>);

impl CompositeKey {
    /// Creates a composite key from its elements.
    pub fn new(parts: Vec<KeyPart>) -> Self {
        Self(parts)
    }

    /// Returns the key elements in order.
    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the key has no elements.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// == Compose ==
/// Builds the composite store key and the deduplication fingerprint for one
/// invocation.
///
/// The composite key is the namespace followed by the arguments, verbatim.
/// The fingerprint is derived from the arguments alone: the namespace is
/// fixed per engine instance, so it carries no distinguishing information.
///
/// # Arguments
/// * `namespace` - Fixed key prefix identifying the logical cache bucket
/// * `args` - Per-invocation call arguments
pub fn compose(namespace: &[KeyPart], args: &[KeyPart]) -> (CompositeKey, String) {
    let mut parts = Vec::with_capacity(namespace.len() + args.len());
    parts.extend_from_slice(namespace);
    parts.extend_from_slice(args);
    (CompositeKey::new(parts), fingerprint(args))
}

// == Fingerprint ==
/// Derives the canonical deduplication string for an argument list.
///
/// Each element is canonicalized into a type-tagged JSON value and the whole
/// list is serialized as one JSON array. The JSON structure guarantees that
/// no element serialization can bleed into its neighbor, and the type tags
/// keep e.g. `Bytes([1, 2])` and `Seq([Int(1), Int(2)])` distinct even
/// though both canonicalize their contents to integer arrays.
///
/// Two argument lists produce the same fingerprint iff their elements are
/// equal in type and value, in order.
pub fn fingerprint(args: &[KeyPart]) -> String {
    Value::Array(args.iter().map(canonical_value).collect()).to_string()
}

/// Canonical JSON form of a single key element.
///
/// Byte sequences become an explicit array of integers, so two byte buffers
/// with equal contents always serialize identically. Floats are canonicalized
/// through their IEEE-754 bit pattern, which keeps NaN representable (JSON
/// has no NaN literal) and deterministic.
fn canonical_value(part: &KeyPart) -> Value {
    match part {
        KeyPart::Bool(v) => json!({ "bool": v }),
        KeyPart::Int(v) => json!({ "int": v }),
        KeyPart::Float(v) => json!({ "float": v.to_bits() }),
        KeyPart::Text(v) => json!({ "text": v }),
        KeyPart::Bytes(v) => json!({ "bytes": v }),
        KeyPart::Seq(v) => {
            json!({ "seq": v.iter().map(canonical_value).collect::<Vec<_>>() })
        }
    }
}
