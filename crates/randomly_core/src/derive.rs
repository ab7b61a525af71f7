//! Seed derivation: `(root seed, label) -> instance seed`.
//!
//! Derivation XORs the root with the FNV-1a hash of the label and runs the
//! result through [`mix64`], so labels whose hashes differ in only a few bits
//! still land on unrelated instance seeds. All functions are pure and safe to
//! call from any thread.

use crate::error::{require, Result};
use crate::mix::{fnv1a64, mix64};

/// Derive the instance seed for a caller-chosen scope label.
pub fn seed_for_scope(root_seed: u64, scope: &str) -> Result<u64> {
    require!(
        !scope.trim().is_empty(),
        "scope must be non-empty and non-blank"
    );
    Ok(mix64(root_seed ^ fnv1a64(scope.as_bytes())))
}

/// Derive the instance seed for an anonymous substream.
///
/// `purpose` is expected to embed a value that is unique within the process
/// (for example `randomly#17`), so unlabelled instances never collide.
pub fn seed_for_substream(base_seed: u64, purpose: &str) -> Result<u64> {
    require!(
        !purpose.trim().is_empty(),
        "purpose must be non-empty and non-blank"
    );
    Ok(mix64(base_seed ^ fnv1a64(purpose.as_bytes())))
}

/// Turn a raw entropy reading (a clock value) into a root seed.
///
/// Not reproducible across runs.
pub fn seed_from_entropy(entropy: u64) -> u64 {
    mix64(entropy)
}
