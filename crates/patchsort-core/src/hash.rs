use serde_json::Value;

/// Type alias representing the 64-bit hash code used for diff memoization.
///
/// ```
/// # use patchsort_core::hash_bytes;
/// let code = hash_bytes(b"patchsort");
/// assert_eq!(code.len(), 8);
/// ```
pub type HashCode = [u8; 8];

/// Compute the FNV-1a hash of the provided bytes.
///
/// ```
/// # use patchsort_core::hash_bytes;
/// let code = hash_bytes(b"diff");
/// let same = hash_bytes(b"diff");
/// assert_eq!(code, same);
/// ```
#[must_use]
pub fn hash_bytes(input: &[u8]) -> HashCode {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut hash = OFFSET_BASIS;
    for byte in input {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash.to_le_bytes()
}

/// Combine a collection of hash codes into a single order-insensitive aggregate.
///
/// ```
/// # use patchsort_core::{combine, hash_bytes};
/// let hashes = vec![hash_bytes(b"a"), hash_bytes(b"b")];
/// assert_eq!(combine(hashes.clone()), combine(vec![hashes[1], hashes[0]]));
/// ```
#[must_use]
pub fn combine(mut codes: Vec<HashCode>) -> HashCode {
    codes.sort_unstable();
    let mut bytes = Vec::with_capacity(codes.len() * 8);
    for code in codes {
        bytes.extend_from_slice(&code);
    }
    hash_bytes(&bytes)
}

/// Combine two hash codes order-sensitively.
///
/// Unlike [`combine`], swapping `a` and `b` produces a different result.
/// Used to key `Diff` memoization, where `(current, target)` and
/// `(target, current)` must never collide.
///
/// ```
/// # use patchsort_core::{combine_ordered, hash_bytes};
/// let a = hash_bytes(b"a");
/// let b = hash_bytes(b"b");
/// assert_ne!(combine_ordered(a, b), combine_ordered(b, a));
/// ```
#[must_use]
pub fn combine_ordered(a: HashCode, b: HashCode) -> HashCode {
    let mut bytes = Vec::with_capacity(16);
    bytes.extend_from_slice(&a);
    bytes.extend_from_slice(&b);
    hash_bytes(&bytes)
}

/// Hash a JSON value structurally.
///
/// `serde_json::Map` is backed by a `BTreeMap` in this workspace's default
/// feature set, so object keys serialize in a canonical, sorted order and
/// structurally equal values always hash identically regardless of how
/// they were constructed.
///
/// ```
/// # use patchsort_core::hash_value;
/// # use serde_json::json;
/// assert_eq!(hash_value(&json!({"a": 1, "b": 2})), hash_value(&json!({"b": 2, "a": 1})));
/// ```
#[must_use]
pub fn hash_value(value: &Value) -> HashCode {
    // `to_vec` cannot fail for a `Value` already in memory.
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    hash_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_key_order_does_not_affect_hash() {
        let a = json!({"x": 1, "y": [1, 2, 3]});
        let b = json!({"y": [1, 2, 3], "x": 1});
        assert_eq!(hash_value(&a), hash_value(&b));
    }

    #[test]
    fn combine_ordered_is_asymmetric() {
        let a = hash_bytes(b"current");
        let b = hash_bytes(b"target");
        assert_ne!(combine_ordered(a, b), combine_ordered(b, a));
    }
}
