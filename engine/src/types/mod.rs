//! Core value types shared across the codec, database, and operation
//! modules.

pub mod b40;
pub mod hash;
pub mod ids;
pub mod tx;

pub use b40::is_b40;
pub use hash::{hash256_trunc128, hash_name, name_hash128, Hash128, Hash160};
pub use ids::{Address, Name, NamespaceId, ScriptPubkey, BURN_ADDRESS};
pub use tx::{NameOp, OpPayload, TransferDisposition, TxContext, VirtualExpire};
