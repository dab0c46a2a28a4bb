//! Per-slot modifiers.
//!
//! A modifier is auxiliary typed data attached to a slot (durability, a
//! custom name, an enchantment...). Any slot carrying one is excluded from
//! automatic stacking: it can only move as a whole unit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag of a modifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierType(String);

impl ModifierType {
    /// Create a type tag.
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    /// Borrow the raw tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModifierType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Opaque payload carried by a modifier.
///
/// The engine never interprets it; it only copies, compares and serializes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierData {
    /// No payload.
    #[default]
    None,
    /// Integer payload (durability, charge, level...).
    Integer(i64),
    /// Text payload (custom names, notes...).
    Text(String),
    /// Host-encoded payload.
    Bytes(Vec<u8>),
}

/// Typed data attached to a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    /// Type tag used for lookups.
    pub kind: ModifierType,
    /// Payload.
    pub data: ModifierData,
}

impl Modifier {
    /// Create a modifier.
    pub fn new(kind: impl Into<ModifierType>, data: ModifierData) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }

    /// Create a modifier without payload.
    pub fn tag(kind: impl Into<ModifierType>) -> Self {
        Self::new(kind, ModifierData::None)
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            ModifierData::None => write!(f, "{}", self.kind),
            ModifierData::Integer(value) => write!(f, "{}={}", self.kind, value),
            ModifierData::Text(value) => write!(f, "{}=\"{}\"", self.kind, value),
            ModifierData::Bytes(bytes) => write!(f, "{}=<{} bytes>", self.kind, bytes.len()),
        }
    }
}
