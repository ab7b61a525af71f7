//! Probabilistic optional values.
//!
//! A [`MaybeContext`] spends exactly one stream draw per produced [`Maybe`]:
//! the value is present iff `next_f64() >= absent_probability`. The value
//! itself is only computed when an accessor is called on a present `Maybe`.

use std::fmt;

use crate::error::{require, Result};
use crate::rng::Stream;

type Supplier<'a, T> = Box<dyn FnOnce() -> Option<T> + 'a>;

/// A present-or-absent value with a deferred supplier.
pub struct Maybe<'a, T> {
    present: bool,
    supplier: Supplier<'a, T>,
}

impl<'a, T: 'a> Maybe<'a, T> {
    /// Build from a presence decision and a supplier that may itself yield
    /// nothing.
    pub fn new(present: bool, supplier: impl FnOnce() -> Option<T> + 'a) -> Self {
        Self {
            present,
            supplier: Box::new(supplier),
        }
    }

    /// Always present.
    pub fn of(value: T) -> Self {
        Self::new(true, move || Some(value))
    }

    /// Present iff `value` is `Some`.
    pub fn of_option(value: Option<T>) -> Self {
        Self::new(value.is_some(), move || value)
    }

    /// Outcome of the presence draw. A present `Maybe` can still resolve to
    /// `None` if its supplier yields nothing.
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// The supplied value, or `None` when absent.
    pub fn into_option(self) -> Option<T> {
        if self.present {
            (self.supplier)()
        } else {
            None
        }
    }

    /// The supplied value, or `fallback` when absent or when the supplier
    /// yields nothing.
    pub fn or_else(self, fallback: T) -> T {
        self.into_option().unwrap_or(fallback)
    }

    /// Like [`Maybe::or_else`] but computes the fallback lazily.
    pub fn or_else_with(self, fallback: impl FnOnce() -> T) -> T {
        self.into_option().unwrap_or_else(fallback)
    }
}

impl<T> fmt::Debug for Maybe<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Maybe")
            .field("present", &self.present)
            .finish_non_exhaustive()
    }
}

/// [`Maybe`] specialised for text, with an empty-string accessor.
#[derive(Debug)]
pub struct MaybeText<'a>(Maybe<'a, String>);

impl<'a> MaybeText<'a> {
    pub fn new(present: bool, supplier: impl FnOnce() -> Option<String> + 'a) -> Self {
        Self(Maybe::new(present, supplier))
    }

    pub fn is_present(&self) -> bool {
        self.0.is_present()
    }

    pub fn into_option(self) -> Option<String> {
        self.0.into_option()
    }

    pub fn or_else(self, fallback: impl Into<String>) -> String {
        self.0.or_else(fallback.into())
    }

    /// The supplied text, or `""` when absent.
    pub fn or_empty(self) -> String {
        self.0.into_option().unwrap_or_default()
    }
}

/// Issues [`Maybe`] values against one stream with a fixed absent rate.
///
/// Suppliers are stored, not called, so they must not borrow the stream the
/// context is drawing from. For values drawn from the same instance use
/// [`Randomly::maybe_value`](crate::Randomly::maybe_value).
#[derive(Debug)]
pub struct MaybeContext<'s> {
    stream: &'s mut Stream,
    absent_probability: f64,
}

impl<'s> MaybeContext<'s> {
    pub fn new(stream: &'s mut Stream, absent_probability: f64) -> Result<Self> {
        require!(
            (0.0..=1.0).contains(&absent_probability),
            "absent probability must be in range [0.0, 1.0] but was {absent_probability}"
        );
        Ok(Self {
            stream,
            absent_probability,
        })
    }

    /// For rates already validated during settings resolution.
    pub(crate) fn with_checked_rate(stream: &'s mut Stream, absent_probability: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&absent_probability));
        Self {
            stream,
            absent_probability,
        }
    }

    pub fn absent_probability(&self) -> f64 {
        self.absent_probability
    }

    /// Decide presence now, defer `supplier`.
    pub fn value<'a, T: 'a>(&mut self, supplier: impl FnOnce() -> T + 'a) -> Maybe<'a, T> {
        let present = self.draw_presence();
        Maybe::new(present, move || Some(supplier()))
    }

    /// Like [`MaybeContext::value`] for suppliers that may yield nothing.
    pub fn value_opt<'a, T: 'a>(
        &mut self,
        supplier: impl FnOnce() -> Option<T> + 'a,
    ) -> Maybe<'a, T> {
        let present = self.draw_presence();
        Maybe::new(present, supplier)
    }

    /// Decide presence now for an already computed value.
    pub fn of<'a, T: 'a>(&mut self, value: T) -> Maybe<'a, T> {
        self.value(move || value)
    }

    pub fn text<'a>(&mut self, supplier: impl FnOnce() -> String + 'a) -> MaybeText<'a> {
        let present = self.draw_presence();
        MaybeText::new(present, move || Some(supplier()))
    }

    pub fn text_of<'a>(&mut self, value: impl Into<String>) -> MaybeText<'a> {
        let value = value.into();
        self.text(move || value)
    }

    pub(crate) fn draw_presence(&mut self) -> bool {
        self.stream.next_f64() >= self.absent_probability
    }
}
