//! Base-40 name alphabet.
//!
//! Names and namespace IDs are restricted to a 40-character alphabet so
//! that every valid name has a single canonical byte encoding:
//! `0-9a-z-_.+`. This module only validates membership; there is no
//! numeric base-40 conversion involved (the "base-40" name refers to the
//! alphabet size, not a number base transform — the wire encoding is the
//! name's own ASCII bytes).

/// Returns `true` if every byte in `s` is a member of the base-40 alphabet.
pub fn is_b40(s: &str) -> bool {
    s.bytes().all(is_b40_byte)
}

fn is_b40_byte(b: u8) -> bool {
    b.is_ascii_digit()
        || b.is_ascii_lowercase()
        || matches!(b, b'-' | b'_' | b'.' | b'+')
}
