//! Wire codec: total, deterministic parse/encode of opcode payloads.
//!
//! Every payload starts with a 2-byte magic tag and a 1-byte opcode,
//! followed by an opcode-specific body; the whole thing is capped at
//! 40 bytes (spec.md §4.1).

mod encode;
mod parse;

pub use encode::encode_payload;
pub use parse::{parse_payload, CodecError};

/// Magic bytes prefixing every payload, selecting the network.
pub const MAGIC_MAINSET: [u8; 2] = *b"id";
pub const MAGIC_TESTSET: [u8; 2] = *b"eg";

/// Maximum total payload length, including the 3-byte prefix.
pub const MAX_PAYLOAD_LEN: usize = 40;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Network {
    Mainset,
    Testset,
}

impl Network {
    pub fn magic(self) -> [u8; 2] {
        match self {
            Network::Mainset => MAGIC_MAINSET,
            Network::Testset => MAGIC_TESTSET,
        }
    }

    pub fn from_magic(bytes: [u8; 2]) -> Option<Self> {
        match bytes {
            MAGIC_MAINSET => Some(Network::Mainset),
            MAGIC_TESTSET => Some(Network::Testset),
            _ => None,
        }
    }
}
