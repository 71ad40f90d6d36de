//! Engine-level error taxonomy (spec.md §7).
//!
//! Manual `enum` + `Display` + `std::error::Error`, matching the
//! teacher's own `consensus::error` style rather than a derive macro.

use crate::codec::CodecError;
use crate::db::StorageError;

/// Why a parsed operation was rejected by its `check` step. Logged at
/// debug level; never mutates state (spec.md §7).
#[derive(Debug, Eq, PartialEq)]
pub enum CheckError {
    NamespaceNotReady,
    NamespaceNotRevealed,
    NotOwner,
    QuotaExceeded,
    PreorderHashInUse,
    NoMatchingPreorder,
    PreorderExpired,
    StaleConsensusHash,
    Underpayment { required: u64, paid: u64 },
    NameAlreadyExists,
    NameNotFound,
    NamespaceAlreadyExists,
    NamespaceNotFound,
    RecipientOverQuota,
    RecipientAlreadyOwns,
    NotRevealer,
    CollisionWithinBlock,
    SanityCheckFailed(&'static str),
}

impl std::fmt::Display for CheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckError::NamespaceNotReady => write!(f, "namespace is not ready"),
            CheckError::NamespaceNotRevealed => write!(f, "namespace is not in the revealed state"),
            CheckError::NotOwner => write!(f, "sender does not own this name"),
            CheckError::QuotaExceeded => write!(f, "sender exceeds the active-name quota"),
            CheckError::PreorderHashInUse => write!(f, "preorder hash already has a live commitment"),
            CheckError::NoMatchingPreorder => write!(f, "no matching unexpired preorder"),
            CheckError::PreorderExpired => write!(f, "preorder has expired"),
            CheckError::StaleConsensusHash => write!(f, "consensus hash is outside the allowed age window"),
            CheckError::Underpayment { required, paid } => {
                write!(f, "underpayment: required {required}, paid {paid}")
            }
            CheckError::NameAlreadyExists => write!(f, "name already has a live record"),
            CheckError::NameNotFound => write!(f, "name has no record"),
            CheckError::NamespaceAlreadyExists => write!(f, "namespace id already taken"),
            CheckError::NamespaceNotFound => write!(f, "namespace has no record"),
            CheckError::RecipientOverQuota => write!(f, "recipient exceeds the active-name quota"),
            CheckError::RecipientAlreadyOwns => write!(f, "recipient already owns this name"),
            CheckError::NotRevealer => write!(f, "sender is not the namespace's revealer"),
            CheckError::CollisionWithinBlock => write!(f, "collides with an operation earlier in this block"),
            CheckError::SanityCheckFailed(why) => write!(f, "sanity check failed: {why}"),
        }
    }
}

impl std::error::Error for CheckError {}

/// Top-level engine error, composing the codec, check, and storage
/// error families.
#[derive(Debug)]
pub enum EngineError {
    Codec(CodecError),
    Check(CheckError),
    Storage(StorageError),
    ConsensusMismatch {
        block: u64,
        expected: String,
        computed: String,
    },
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Codec(e) => write!(f, "codec error: {e}"),
            EngineError::Check(e) => write!(f, "check error: {e}"),
            EngineError::Storage(e) => write!(f, "storage error: {e}"),
            EngineError::ConsensusMismatch {
                block,
                expected,
                computed,
            } => write!(
                f,
                "consensus mismatch at block {block}: expected {expected}, computed {computed}"
            ),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<CodecError> for EngineError {
    fn from(e: CodecError) -> Self {
        EngineError::Codec(e)
    }
}

impl From<CheckError> for EngineError {
    fn from(e: CheckError) -> Self {
        EngineError::Check(e)
    }
}

impl From<StorageError> for EngineError {
    fn from(e: StorageError) -> Self {
        EngineError::Storage(e)
    }
}
