//! Bit-diffusion primitives shared by seed derivation.
//!
//! Both functions are fixed by their constants: reproduced seeds must agree
//! with any other FNV-1a-64 / splitmix64 implementation.

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// 64-bit Fowler–Noll–Vo 1a hash of `bytes`.
pub fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// splitmix64 finalizer: avalanches low-entropy inputs across all 64 bits.
pub fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fnv1a64_matches_reference_vectors() {
        assert_eq!(fnv1a64(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a64(b"a"), 0xaf63dc4c8601ec8c);
        assert_eq!(fnv1a64(b"foobar"), 0x85944171f73967e8);
    }

    #[test]
    fn mix64_of_zero_is_zero() {
        assert_eq!(mix64(0), 0);
    }

    #[test]
    fn mix64_spreads_adjacent_inputs() {
        let a = mix64(1);
        let b = mix64(2);
        assert!((a ^ b).count_ones() > 16);
    }

    proptest! {
        #[test]
        fn mix64_is_a_pure_function(z in any::<u64>()) {
            prop_assert_eq!(mix64(z), mix64(z));
        }

        #[test]
        fn fnv1a64_separates_single_byte_suffixes(prefix in "[a-z]{0,12}", a in any::<u8>(), b in any::<u8>()) {
            prop_assume!(a != b);
            let mut left = prefix.clone().into_bytes();
            left.push(a);
            let mut right = prefix.into_bytes();
            right.push(b);
            prop_assert_ne!(fnv1a64(&left), fnv1a64(&right));
        }
    }
}
