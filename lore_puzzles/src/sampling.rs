//! Category-tagged pools, tallies and bounded rejection sampling.
//!
//! Quiz answers, placement entities and deduction candidates are all pools
//! of items tagged with a category. They share these helpers.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An item tagged with the category it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tagged<T, C> {
    pub item: T,
    pub tag: C,
}

impl<T, C> Tagged<T, C> {
    pub fn new(item: T, tag: C) -> Self {
        Self { item, tag }
    }
}

/// Per-category point counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally<C: Ord + Copy> {
    counts: BTreeMap<C, u32>,
}

impl<C: Ord + Copy> Tally<C> {
    /// A tally with every listed category at zero.
    pub fn new(categories: impl IntoIterator<Item = C>) -> Self {
        Self {
            counts: categories.into_iter().map(|c| (c, 0)).collect(),
        }
    }

    /// Add one point to `category`.
    pub fn add(&mut self, category: C) {
        *self.counts.entry(category).or_insert(0) += 1;
    }

    pub fn get(&self, category: C) -> u32 {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    /// Highest count, zero for an empty tally.
    pub fn max(&self) -> u32 {
        self.counts.values().copied().max().unwrap_or(0)
    }

    /// Categories holding the highest count, in category order.
    pub fn leaders(&self) -> Vec<C> {
        let max = self.max();
        self.counts
            .iter()
            .filter(|(_, count)| **count == max)
            .map(|(category, _)| *category)
            .collect()
    }

    /// Whether every tracked category holds the same count.
    pub fn all_equal(&self) -> bool {
        let mut values = self.counts.values();
        match values.next() {
            Some(first) => values.all(|v| v == first),
            None => true,
        }
    }

    /// Number of categories with a non-zero count.
    pub fn distinct(&self) -> usize {
        self.counts.values().filter(|count| **count > 0).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (C, u32)> + '_ {
        self.counts.iter().map(|(c, n)| (*c, *n))
    }
}

impl<C: Ord + Copy> FromIterator<C> for Tally<C> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        let mut tally = Tally {
            counts: BTreeMap::new(),
        };
        for category in iter {
            tally.add(category);
        }
        tally
    }
}

/// Outcome of [`sample_constrained`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample<T> {
    pub items: Vec<T>,
    /// `false` when every attempt was rejected and the unconstrained
    /// fallback was used.
    pub constrained: bool,
}

/// Draw `n` distinct items from `pool` in random order.
pub fn sample<T: Clone, R: Rng + ?Sized>(pool: &[T], n: usize, rng: &mut R) -> Vec<T> {
    let mut items: Vec<T> = pool.choose_multiple(rng, n).cloned().collect();
    items.shuffle(rng);
    items
}

/// Draw `n` distinct items from `pool` until `accept` approves the draw.
///
/// At most `max_attempts` draws are tried; after that one fresh draw is
/// returned without the check, so the call always terminates.
pub fn sample_constrained<T, R, F>(
    pool: &[T],
    n: usize,
    rng: &mut R,
    max_attempts: usize,
    mut accept: F,
) -> Sample<T>
where
    T: Clone,
    R: Rng + ?Sized,
    F: FnMut(&[T]) -> bool,
{
    for _ in 0..max_attempts {
        let items = sample(pool, n, rng);
        if accept(&items) {
            return Sample {
                items,
                constrained: true,
            };
        }
    }

    tracing::debug!(max_attempts, "constraint unmet, using unconstrained sample");
    Sample {
        items: sample(pool, n, rng),
        constrained: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_tally_leaders_and_ties() {
        let tally: Tally<char> = "aabbc".chars().collect();
        assert_eq!(tally.max(), 2);
        assert_eq!(tally.leaders(), vec!['a', 'b']);
        assert_eq!(tally.distinct(), 3);
        assert!(!tally.all_equal());
    }

    #[test]
    fn test_tally_seeded_zeros_count_for_equality() {
        let mut tally = Tally::new(['a', 'b', 'c']);
        assert!(tally.all_equal());
        assert_eq!(tally.leaders(), vec!['a', 'b', 'c']);

        tally.add('a');
        tally.add('b');
        assert!(!tally.all_equal());
        assert_eq!(tally.get('c'), 0);
    }

    #[test]
    fn test_sample_is_distinct() {
        let mut rng = StdRng::seed_from_u64(11);
        let pool: Vec<u32> = (0..20).collect();

        let mut items = sample(&pool, 8, &mut rng);
        items.sort_unstable();
        items.dedup();
        assert_eq!(items.len(), 8);
    }

    #[test]
    fn test_constrained_sample_accepts() {
        let mut rng = StdRng::seed_from_u64(5);
        let pool: Vec<u32> = (0..10).collect();

        let result = sample_constrained(&pool, 3, &mut rng, 500, |items| items.contains(&4));
        assert!(result.constrained);
        assert!(result.items.contains(&4));
    }

    #[test]
    fn test_impossible_constraint_falls_back() {
        let mut rng = StdRng::seed_from_u64(9);
        let pool: Vec<u32> = (0..10).collect();
        let mut calls = 0;

        let result = sample_constrained(&pool, 3, &mut rng, 7, |_| {
            calls += 1;
            false
        });

        assert!(!result.constrained);
        assert_eq!(result.items.len(), 3);
        assert_eq!(calls, 7);
    }
}
