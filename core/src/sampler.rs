//! Seeded, duplicate-free selection of items from a pool.
//!
//! The output is a prefix of a seeded Fisher-Yates permutation of the
//! pool, so it can never repeat an element. Pool order is part of the
//! input: callers comparing two draws must enumerate the pool in the
//! same order both times.

use crate::rng::Mulberry32;

/// Pick `count` distinct elements of `pool` in an order fixed by `seed`.
///
/// `count` larger than the pool clamps to the pool length.
pub fn sample_unique<T: Clone>(pool: &[T], count: usize, seed: &str) -> Vec<T> {
    let n = count.min(pool.len());
    if n == 0 {
        return Vec::new();
    }
    if pool.len() <= 1 {
        return pool[..n].to_vec();
    }

    let mut rng = Mulberry32::from_seed_str(seed);
    let mut shuffled = pool.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.index_below(i + 1);
        shuffled.swap(i, j);
    }
    shuffled.truncate(n);
    shuffled
}

/// Same as [`sample_unique`] for untrusted numeric counts: fractional
/// counts are floored, negative and NaN counts select nothing.
pub fn sample_unique_lenient<T: Clone>(pool: &[T], count: f64, seed: &str) -> Vec<T> {
    sample_unique(pool, clamp_count(count, pool.len()), seed)
}

fn clamp_count(count: f64, len: usize) -> usize {
    if count.is_nan() || count <= 0.0 {
        return 0;
    }
    let floored = count.floor();
    if floored >= len as f64 {
        len
    } else {
        floored as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters() -> Vec<&'static str> {
        vec!["A", "B", "C", "D", "E"]
    }

    #[test]
    fn golden_vector_for_reading_123() {
        let picked = sample_unique(&letters(), 3, "reading-123");
        assert_eq!(picked, vec!["D", "A", "B"]);
        // Repeat calls reproduce it exactly.
        for _ in 0..10 {
            assert_eq!(sample_unique(&letters(), 3, "reading-123"), picked);
        }
    }

    #[test]
    fn full_draw_is_a_permutation_with_golden_prefix() {
        let all = sample_unique(&letters(), 5, "reading-123");
        assert_eq!(all, vec!["D", "A", "B", "E", "C"]);
    }

    #[test]
    fn other_seeds_give_other_orders() {
        assert_eq!(sample_unique(&letters(), 3, "reading-124"), vec!["A", "C", "B"]);
        assert_eq!(sample_unique(&letters(), 3, "other"), vec!["E", "A", "C"]);
    }

    #[test]
    fn count_above_pool_clamps() {
        let picked = sample_unique(&letters(), 50, "clamp");
        assert_eq!(picked.len(), 5);
    }

    #[test]
    fn zero_count_and_empty_pool_select_nothing() {
        assert!(sample_unique(&letters(), 0, "zero").is_empty());
        let empty: Vec<u32> = Vec::new();
        assert!(sample_unique(&empty, 3, "empty").is_empty());
    }

    #[test]
    fn single_item_pool_returns_it_without_rolling() {
        assert_eq!(sample_unique(&["only"], 3, "any"), vec!["only"]);
    }

    #[test]
    fn lenient_count_floors_and_clamps() {
        assert_eq!(sample_unique_lenient(&letters(), 2.9, "s").len(), 2);
        assert!(sample_unique_lenient(&letters(), -1.0, "s").is_empty());
        assert!(sample_unique_lenient(&letters(), f64::NAN, "s").is_empty());
        assert_eq!(sample_unique_lenient(&letters(), 1e9, "s").len(), 5);
        assert_eq!(
            sample_unique_lenient(&letters(), 3.5, "reading-123"),
            sample_unique(&letters(), 3, "reading-123")
        );
    }
}
