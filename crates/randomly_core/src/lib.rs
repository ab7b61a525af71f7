//! Deterministic, scope-addressed random streams for test-data synthesis.
//!
//! A [`SeedContext`] holds the process-wide settings layer. Every
//! [`Randomly`] built from it owns an independent [`Stream`] whose seed is a
//! pure function of the effective root seed and the instance's scope, so a
//! failing test can be replayed by re-running with the logged settings.
//!
//! ```
//! use randomly_core::{SeedContext, Settings};
//!
//! let ctx = SeedContext::new(Settings { seed: Some(42), ..Settings::default() });
//! let mut a = ctx.scoped("OrderTest#total")?;
//! let mut b = ctx.scoped("OrderTest#total")?;
//! assert_eq!(a.int_between(1, 100)?, b.int_between(1, 100)?);
//! assert!(a.replay_info().starts_with("seed=42 "));
//! # Ok::<(), randomly_core::Error>(())
//! ```

pub mod catalog;
pub mod config;
pub mod datetime;
pub mod derive;
pub mod error;
pub mod finance;
pub mod id;
pub mod locale;
pub mod maybe;
pub mod mix;
pub mod randomly;
pub mod replay;
pub mod rng;
pub mod select;
#[cfg(any(test, feature = "proptest-support"))]
pub mod strategies;
pub mod text;

pub use config::{ResolvedSettings, Settings};
pub use error::{Error, Result};
pub use locale::Locale;
pub use maybe::{Maybe, MaybeContext, MaybeText};
pub use randomly::{Randomly, RandomlyBuilder, SeedContext};
pub use replay::ReplayLog;
pub use rng::Stream;
pub use select::Variants;
