//! Strongly-typed identifiers: fully-qualified names, namespace IDs,
//! and chain addresses/scripts.
//!
//! These wrap plain `String`/`Vec<u8>` so that callers cannot, for
//! example, pass a namespace ID where a fully-qualified name is
//! expected. Validation (base-40 alphabet, length bounds) happens at
//! construction.

use serde::{Deserialize, Serialize};

use super::b40::is_b40;

/// Maximum byte length of a fully-qualified name (`name.namespace_id`).
pub const NAME_MAX_LEN: usize = 37;
/// Minimum byte length of a fully-qualified name.
pub const NAME_MIN_LEN: usize = 1;
/// Maximum byte length of a namespace ID (without the leading `.`).
pub const NAMESPACE_ID_MAX_LEN: usize = 19;

/// A fully-qualified name, e.g. `"alice.test"`.
///
/// Construction enforces: base-40 alphabet, exactly one `.` separator,
/// non-empty name and namespace parts, and the combined length bound.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Name(String);

impl Name {
    /// Parses and validates a fully-qualified name.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() < NAME_MIN_LEN || s.len() > NAME_MAX_LEN {
            return None;
        }
        if s.matches('.').count() != 1 {
            return None;
        }
        let mut parts = s.splitn(2, '.');
        let name_part = parts.next().unwrap_or("");
        let ns_part = parts.next().unwrap_or("");
        if name_part.is_empty() || ns_part.is_empty() {
            return None;
        }
        if name_part.contains('+') || ns_part.contains('+') {
            return None;
        }
        if !is_b40(name_part) || !is_b40(ns_part) {
            return None;
        }
        Some(Name(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the namespace portion (after the last `.`).
    pub fn namespace_id(&self) -> &str {
        // construction guarantees exactly one '.'
        self.0.split('.').next_back().unwrap_or("")
    }

    /// Returns the name portion (before the `.`), i.e. the part that is
    /// actually priced via the namespace's bucket table.
    pub fn local_part(&self) -> &str {
        self.0.split('.').next().unwrap_or("")
    }
}

impl std::fmt::Debug for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Name({:?})", self.0)
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A namespace ID, e.g. `"test"` (without the leading `.`).
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct NamespaceId(String);

impl NamespaceId {
    pub fn parse(s: &str) -> Option<Self> {
        if s.is_empty() || s.len() > NAMESPACE_ID_MAX_LEN {
            return None;
        }
        if s.contains('.') || !is_b40(s) {
            return None;
        }
        Some(NamespaceId(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for NamespaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NamespaceId({:?})", self.0)
    }
}

impl std::fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chain script (`scriptPubKey`), carried as raw bytes.
///
/// Canonical byte encoding matters: preorder commitments hash the raw
/// script bytes, not a hex or ASM rendering of them (spec.md §9).
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ScriptPubkey(pub Vec<u8>);

impl ScriptPubkey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for ScriptPubkey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ScriptPubkey({})", hex::encode(&self.0))
    }
}

/// A chain address in its canonical string form (e.g. base58check).
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The well-known burn address that `NAME_PREORDER`/`NAMESPACE_PREORDER`
/// fees must be sent to.
pub const BURN_ADDRESS: &str = "1111111111111111111114oLvT2";
