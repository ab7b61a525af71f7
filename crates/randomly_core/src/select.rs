//! Selection algorithms layered on [`Stream`] draws.
//!
//! Multi-element selection uses a partial Fisher–Yates shuffle: only the first
//! `count` positions of a permutation are resolved, which yields every
//! unordered subset of that size with equal probability in `count` swaps.

use std::any::type_name;
use std::collections::BTreeSet;

use crate::error::{require, Result};
use crate::rng::Stream;

/// A fixed, statically enumerated set of constants that can be sampled.
///
/// ```
/// use randomly_core::select::Variants;
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// enum Suit { Hearts, Spades }
///
/// impl Variants for Suit {
///     const ALL: &'static [Self] = &[Suit::Hearts, Suit::Spades];
/// }
/// ```
pub trait Variants: Sized + 'static {
    const ALL: &'static [Self];
}

impl Stream {
    /// Pick one element of `items`.
    pub fn element_of<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T> {
        require!(!items.is_empty(), "items must not be empty");
        let idx = self.index(items.len())?;
        Ok(&items[idx])
    }

    /// Pick one element of `items` that is not in `excluding`.
    pub fn element_of_excluding<'a, T: PartialEq>(
        &mut self,
        items: &'a [T],
        excluding: &[T],
    ) -> Result<&'a T> {
        let filtered: Vec<&'a T> = items
            .iter()
            .filter(|item| !excluding.contains(item))
            .collect();
        require!(!filtered.is_empty(), "no elements remain after exclusion");
        let idx = self.index(filtered.len())?;
        Ok(filtered[idx])
    }

    /// Pick `count` distinct positions of `items`.
    pub fn elements_of<'a, T>(&mut self, items: &'a [T], count: usize) -> Result<Vec<&'a T>> {
        self.draw_distinct(items.iter().collect(), count)
    }

    /// Pick `count` distinct elements of `items`, skipping anything in
    /// `excluding`.
    pub fn elements_of_excluding<'a, T: PartialEq>(
        &mut self,
        items: &'a [T],
        count: usize,
        excluding: &[T],
    ) -> Result<Vec<&'a T>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let pool = items
            .iter()
            .filter(|item| !excluding.contains(item))
            .collect();
        self.draw_distinct(pool, count)
    }

    /// Pick one member of an ordered set.
    pub fn element_of_set<T: Ord + Clone>(&mut self, set: &BTreeSet<T>) -> Result<T> {
        let members: Vec<&T> = set.iter().collect();
        self.element_of(&members).map(|member| (*member).clone())
    }

    /// Pick `count` distinct members of an ordered set.
    pub fn elements_of_set<T: Ord + Clone>(
        &mut self,
        set: &BTreeSet<T>,
        count: usize,
    ) -> Result<BTreeSet<T>> {
        let picked = self.draw_distinct(set.iter().collect(), count)?;
        Ok(picked.into_iter().cloned().collect())
    }

    /// `count` distinct indices in `[0, bound)`, in draw order.
    ///
    /// With `count == bound` the result is a uniformly random permutation.
    pub fn unique_indices(&mut self, count: usize, bound: usize) -> Result<Vec<usize>> {
        require!(bound > 0, "bound must be > 0");
        require!(
            count <= bound,
            "count ({count}) exceeds upper bound ({bound})"
        );
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut pool: Vec<usize> = (0..bound).collect();
        let mut result = Vec::with_capacity(count);
        for i in 0..count {
            let idx = self.index(bound - i)? + i;
            pool.swap(i, idx);
            result.push(pool[i]);
        }
        Ok(result)
    }

    /// Pick one constant of `E`.
    pub fn enum_of<E: Variants + Clone>(&mut self) -> Result<E> {
        require!(!E::ALL.is_empty(), "{} has no variants", type_name::<E>());
        self.element_of(E::ALL).cloned()
    }

    /// Pick one constant of `E` that is not in `excluding`.
    pub fn enum_of_excluding<E: Variants + Clone + PartialEq>(
        &mut self,
        excluding: &[E],
    ) -> Result<E> {
        let mut picked = self.enums_of_excluding(1, excluding)?;
        Ok(picked.remove(0))
    }

    /// Pick `count` distinct constants of `E`.
    pub fn enums_of<E: Variants + Clone>(&mut self, count: usize) -> Result<Vec<E>> {
        require!(!E::ALL.is_empty(), "{} has no variants", type_name::<E>());
        let picked = self.elements_of(E::ALL, count)?;
        Ok(picked.into_iter().cloned().collect())
    }

    /// Pick `count` distinct constants of `E`, skipping `excluding`.
    pub fn enums_of_excluding<E: Variants + Clone + PartialEq>(
        &mut self,
        count: usize,
        excluding: &[E],
    ) -> Result<Vec<E>> {
        require!(!E::ALL.is_empty(), "{} has no variants", type_name::<E>());
        let picked = self.elements_of_excluding(E::ALL, count, excluding)?;
        Ok(picked.into_iter().cloned().collect())
    }

    fn draw_distinct<'a, T>(&mut self, mut pool: Vec<&'a T>, count: usize) -> Result<Vec<&'a T>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        require!(
            count <= pool.len(),
            "count ({count}) exceeds eligible pool size ({})",
            pool.len()
        );

        let mut result = Vec::with_capacity(count);
        for _ in 0..count {
            let idx = self.index(pool.len())?;
            result.push(pool.swap_remove(idx));
        }
        Ok(result)
    }
}
