//! Deterministic random stream utilities.
//!
//! Each [`Stream`] is an independent pseudo-random sequence seeded from an
//! instance seed (see [`crate::derive`]). Bounded draws go through
//! [`Rng::gen_range`], which maps the full 64-bit output onto the requested
//! range by widening multiplication with rejection, so no value of the range
//! is favoured the way naive `next % n` reduction would.
//!
//! A stream is exclusively owned: it is `Send` but every draw takes
//! `&mut self`, so sharing one between threads requires the caller to hand
//! it over rather than alias it.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::derive::seed_for_scope;
use crate::error::{require, Result};

/// Largest supported number of decimal places for rounded doubles.
pub const MAX_DECIMAL_PLACES: u32 = 15;

#[derive(Clone, Debug)]
pub struct Stream {
    seed: u64,
    rng: ChaCha8Rng,
}

impl Stream {
    /// Construct a stream from an already derived instance seed.
    pub fn from_seed(instance_seed: u64) -> Self {
        Self {
            seed: instance_seed,
            rng: ChaCha8Rng::seed_from_u64(instance_seed),
        }
    }

    /// Construct the stream for `(root_seed, scope)`.
    pub fn for_scope(root_seed: u64, scope: &str) -> Result<Self> {
        Ok(Self::from_seed(seed_for_scope(root_seed, scope)?))
    }

    /// The instance seed this stream was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fair coin flip.
    pub fn next_bool(&mut self) -> bool {
        self.rng.gen::<bool>()
    }

    /// Raw uniform `f64` in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Uniform `i32` in `[low, high]`.
    ///
    /// Drawn as a single `i64` sample over `[low, high + 1)` so the upper
    /// bound never overflows, even for `high == i32::MAX`.
    pub fn int_between(&mut self, low: i32, high: i32) -> Result<i32> {
        require!(low <= high, "low ({low}) must be <= high ({high})");
        let value = self.rng.gen_range(i64::from(low)..i64::from(high) + 1);
        Ok(value as i32)
    }

    /// Uniform `i64` in `[low, high]`.
    ///
    /// `high == i64::MAX` cannot be expressed as an exclusive bound. In that
    /// case the value is drawn from `[low, i64::MAX)` and a second fair coin
    /// decides whether to replace it with `i64::MAX`. The extra value gets the
    /// weight of the coin rather than exactly `1 / (range + 1)`. Replayed
    /// sequences depend on this two-draw shape.
    pub fn long_between(&mut self, low: i64, high: i64) -> Result<i64> {
        require!(low <= high, "low ({low}) must be <= high ({high})");
        if low == high {
            return Ok(low);
        }
        if high < i64::MAX {
            return Ok(self.rng.gen_range(low..high + 1));
        }
        let value = self.rng.gen_range(low..i64::MAX);
        if self.next_bool() {
            Ok(value)
        } else {
            Ok(i64::MAX)
        }
    }

    /// Uniform `f64` in `[low, high)`.
    pub fn double_between(&mut self, low: f64, high: f64) -> Result<f64> {
        require!(low < high, "low ({low}) must be < high ({high})");
        require!(
            (high - low).is_finite(),
            "range [{low}, {high}) is too wide to sample"
        );
        Ok(self.rng.gen_range(low..high))
    }

    /// Uniform `f64` in `[low, high)` rounded to `decimal_places` (0..=15).
    ///
    /// `f64` carries roughly 15 significant decimal digits, so very large
    /// magnitudes lose the requested precision.
    pub fn double_between_rounded(
        &mut self,
        decimal_places: u32,
        low: f64,
        high: f64,
    ) -> Result<f64> {
        require!(
            decimal_places <= MAX_DECIMAL_PLACES,
            "decimal places must be between 0 and {MAX_DECIMAL_PLACES} but was {decimal_places}"
        );
        let raw = self.double_between(low, high)?;
        let factor = 10f64.powi(decimal_places as i32);
        // Half-up rounding.
        Ok((raw * factor + 0.5).floor() / factor)
    }

    /// Uniform index in `[0, bound)`.
    pub fn index(&mut self, bound: usize) -> Result<usize> {
        require!(bound > 0, "bound must be > 0");
        // Sample through u64 so 32- and 64-bit targets consume identical draws.
        Ok(self.rng.gen_range(0..bound as u64) as usize)
    }
}

impl RngCore for Stream {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use proptest::prelude::*;

    fn draws(stream: &mut Stream, n: usize) -> Vec<i32> {
        (0..n)
            .map(|_| stream.int_between(0, 1_000_000).unwrap())
            .collect()
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Stream::from_seed(7);
        let mut b = Stream::from_seed(7);
        assert_eq!(draws(&mut a, 32), draws(&mut b, 32));
    }

    #[test]
    fn scoped_stream_matches_its_derived_seed() {
        let mut scoped = Stream::for_scope(42, "Checkout#vat").unwrap();
        let mut direct = Stream::from_seed(seed_for_scope(42, "Checkout#vat").unwrap());
        assert_eq!(scoped.seed(), direct.seed());
        assert_eq!(draws(&mut scoped, 8), draws(&mut direct, 8));
    }

    #[test]
    fn scope_changes_stream() {
        let mut invoice = Stream::for_scope(1, "Invoice#pdf").unwrap();
        let mut shipping = Stream::for_scope(1, "Shipping#label").unwrap();
        assert_ne!(draws(&mut invoice, 8), draws(&mut shipping, 8));
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        let mut stream = Stream::from_seed(1);
        assert!(matches!(
            stream.int_between(5, 4),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            stream.long_between(0, -1),
            Err(Error::InvalidArgument(_))
        ));
        assert!(stream.double_between(1.0, 1.0).is_err());
        assert!(stream.double_between(f64::NAN, 1.0).is_err());
        assert!(stream.double_between(-f64::MAX, f64::MAX).is_err());
        assert!(stream.double_between_rounded(16, 0.0, 1.0).is_err());
        assert!(stream.index(0).is_err());
    }

    #[test]
    fn degenerate_long_range_does_not_draw() {
        let mut a = Stream::from_seed(3);
        let mut b = Stream::from_seed(3);
        assert_eq!(a.long_between(9, 9).unwrap(), 9);
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn full_width_int_range_is_supported() {
        let mut stream = Stream::from_seed(11);
        for _ in 0..1_000 {
            stream.int_between(i32::MIN, i32::MAX).unwrap();
        }
        assert_eq!(stream.int_between(i32::MAX, i32::MAX).unwrap(), i32::MAX);
    }

    #[test]
    fn long_between_reaches_max_without_overflow() {
        let mut stream = Stream::from_seed(5);
        let mut hits = 0;
        for _ in 0..200 {
            let value = stream.long_between(i64::MAX - 3, i64::MAX).unwrap();
            assert!(value >= i64::MAX - 3);
            if value == i64::MAX {
                hits += 1;
            }
        }
        assert!(hits > 0);

        for _ in 0..200 {
            stream.long_between(i64::MIN, i64::MAX).unwrap();
        }
    }

    #[test]
    fn rounded_doubles_respect_precision() {
        let mut stream = Stream::from_seed(9);
        for _ in 0..500 {
            let value = stream.double_between_rounded(2, 0.0, 100.0).unwrap();
            let scaled = value * 100.0;
            assert!((scaled - scaled.round()).abs() < 1e-6, "{value}");
            assert!((0.0..=100.0).contains(&value));
        }
        let whole = stream.double_between_rounded(0, 10.0, 20.0).unwrap();
        assert_eq!(whole, whole.trunc());
    }

    /// Coarse chi-square over ten equal buckets. 27.88 is the p=0.001
    /// cut-off for nine degrees of freedom.
    fn assert_uniform(scope: &str, mut bucket_of: impl FnMut(&mut Stream) -> usize) {
        let mut stream = Stream::for_scope(2024, scope).unwrap();
        let trials = 50_000u32;
        let mut buckets = [0u32; 10];
        for _ in 0..trials {
            buckets[bucket_of(&mut stream)] += 1;
        }
        let expected = f64::from(trials) / 10.0;
        let chi_square: f64 = buckets
            .iter()
            .map(|&observed| {
                let delta = f64::from(observed) - expected;
                delta * delta / expected
            })
            .sum();
        assert!(chi_square < 27.88, "chi-square {chi_square} for {buckets:?}");
    }

    #[test]
    fn int_draws_are_not_clustered() {
        assert_uniform("uniformity#int", |s| {
            (s.int_between(0, 999).unwrap() / 100) as usize
        });
    }

    #[test]
    fn long_draws_are_not_clustered() {
        assert_uniform("uniformity#long", |s| {
            (s.long_between(0, 9_999_999_999).unwrap() / 1_000_000_000) as usize
        });
    }

    #[test]
    fn double_draws_are_not_clustered() {
        assert_uniform("uniformity#double", |s| {
            let value = s.double_between(-5.0, 5.0).unwrap();
            ((value + 5.0).floor() as usize).min(9)
        });
    }

    #[test]
    fn stream_plugs_into_rand_adapters() {
        use rand::seq::SliceRandom;

        let mut items: Vec<u32> = (0..16).collect();
        let mut stream = Stream::from_seed(77);
        items.shuffle(&mut stream);
        items.sort_unstable();
        assert_eq!(items, (0..16).collect::<Vec<_>>());
    }

    proptest! {
        #[test]
        fn int_between_stays_inside_bounds(seed in any::<u64>(), low in -10_000i32..10_000, span in 0i32..10_000) {
            let high = low + span;
            let mut stream = Stream::from_seed(seed);
            for _ in 0..16 {
                let value = stream.int_between(low, high).unwrap();
                prop_assert!(value >= low && value <= high);
            }
        }

        #[test]
        fn long_between_stays_inside_bounds(seed in any::<u64>(), low in any::<i64>(), high in any::<i64>()) {
            let (low, high) = if low <= high { (low, high) } else { (high, low) };
            let mut stream = Stream::from_seed(seed);
            for _ in 0..16 {
                let value = stream.long_between(low, high).unwrap();
                prop_assert!(value >= low && value <= high);
            }
        }

        #[test]
        fn double_between_is_half_open(seed in any::<u64>(), low in -1.0e6f64..1.0e6, span in 1.0e-3f64..1.0e6) {
            let high = low + span;
            let mut stream = Stream::from_seed(seed);
            for _ in 0..16 {
                let value = stream.double_between(low, high).unwrap();
                prop_assert!(value >= low && value < high);
            }
        }

        #[test]
        fn index_stays_below_bound(seed in any::<u64>(), bound in 1usize..10_000) {
            let mut stream = Stream::from_seed(seed);
            for _ in 0..16 {
                prop_assert!(stream.index(bound).unwrap() < bound);
            }
        }
    }
}
