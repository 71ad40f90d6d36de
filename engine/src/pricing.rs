//! Name and namespace pricing (spec.md §4.2).

use crate::types::ids::NAMESPACE_ID_MAX_LEN;

/// Base unit all prices are denominated in multiples of.
pub const NAME_COST_UNIT: u64 = 100;

/// Vowels that disqualify a name from the no-vowel discount.
const VOWELS: &[u8] = b"aeiouy";

/// Per-namespace pricing parameters, taken from a `NAMESPACE_REVEAL`.
#[derive(Clone, Copy, Debug)]
pub struct NamespacePriceParams {
    pub coeff: u8,
    pub base: u8,
    pub buckets: [u8; 16],
    pub nonalpha_discount: u8,
    pub no_vowel_discount: u8,
}

/// Computes the price (in base units) of registering `name` under a
/// namespace with the given parameters.
///
/// `bucket = buckets[min(len(name)-1, 15)]`; the steepest discount
/// among "has no vowel" and "has a digit/-/_" applies, floored at 1 so
/// division never inflates the price.
pub fn name_price(name: &str, params: &NamespacePriceParams) -> u64 {
    let len = name.len().max(1);
    let bucket_idx = (len - 1).min(15);
    let exponent = params.buckets[bucket_idx] as u32;

    let has_vowel = name.bytes().any(|b| VOWELS.contains(&b));
    let has_nonalpha = name
        .bytes()
        .any(|b| b.is_ascii_digit() || b == b'-' || b == b'_');

    let mut discount: u64 = 1;
    if !has_vowel {
        discount = discount.max(params.no_vowel_discount as u64);
    }
    if has_nonalpha {
        discount = discount.max(params.nonalpha_discount as u64);
    }
    let discount = discount.max(1);

    let base_price = (params.coeff as u64)
        .saturating_mul((params.base as u64).saturating_pow(exponent))
        / discount;

    (base_price * NAME_COST_UNIT).max(NAME_COST_UNIT)
}

/// Namespace price tiers (mainnet), keyed by `namespace_id` length.
const MAINNET_TIERS: &[(usize, u64)] = &[(1, 40_000), (3, 4_000), (7, 400)];
const MAINNET_DEFAULT: u64 = 40;

/// Flat namespace price on the test network.
pub const TESTSET_NAMESPACE_PRICE: u64 = 10_000;

/// Computes the price (in base units) of preordering a namespace ID of
/// the given length.
pub fn namespace_price(namespace_id_len: usize, testset: bool) -> u64 {
    debug_assert!(namespace_id_len >= 1 && namespace_id_len <= NAMESPACE_ID_MAX_LEN);
    if testset {
        return TESTSET_NAMESPACE_PRICE;
    }
    for (max_len, price) in MAINNET_TIERS {
        if namespace_id_len <= *max_len {
            return *price;
        }
    }
    MAINNET_DEFAULT
}
