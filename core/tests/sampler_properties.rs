//! Properties of the seeded sampler over randomized pools and seeds.
//!
//! The generator that builds the cases is itself seeded, so every run
//! checks the same cases.

use oracle_core::{
    rng::{fnv1a32, Mulberry32},
    sampler::{sample_unique, sample_unique_lenient},
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::collections::HashSet;

fn random_seed(rng: &mut Pcg64Mcg) -> String {
    let len = rng.gen_range(1..24);
    (0..len)
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect()
}

#[test]
fn draws_never_repeat_and_have_exact_length() {
    let mut rng = Pcg64Mcg::seed_from_u64(0x0AC1E);

    for case in 0..500 {
        let pool_len = rng.gen_range(0..40);
        let count = rng.gen_range(0..50);
        let pool: Vec<u32> = (0..pool_len).collect();
        let seed = random_seed(&mut rng);

        let drawn = sample_unique(&pool, count, &seed);

        assert_eq!(
            drawn.len(),
            count.min(pool.len()),
            "case {case}: pool {pool_len}, count {count}, seed {seed:?}"
        );
        let distinct: HashSet<_> = drawn.iter().collect();
        assert_eq!(
            distinct.len(),
            drawn.len(),
            "case {case}: duplicate in draw {drawn:?}"
        );
        assert!(
            drawn.iter().all(|v| pool.contains(v)),
            "case {case}: draw {drawn:?} contains an element outside the pool"
        );
    }
}

#[test]
fn same_seed_same_draw() {
    let mut rng = Pcg64Mcg::seed_from_u64(42);
    let pool: Vec<String> = (0..30).map(|i| format!("card-{i}")).collect();

    for _ in 0..200 {
        let seed = random_seed(&mut rng);
        let count = rng.gen_range(1..=pool.len());
        let a = sample_unique(&pool, count, &seed);
        let b = sample_unique(&pool, count, &seed);
        assert_eq!(a, b, "seed {seed:?} produced two different draws");
    }
}

#[test]
fn different_seeds_usually_differ() {
    let mut rng = Pcg64Mcg::seed_from_u64(7);
    let pool: Vec<u32> = (0..20).collect();

    let mut differing = 0;
    let pairs = 200;
    for i in 0..pairs {
        let a = format!("reading-{i}-{}", random_seed(&mut rng));
        let b = format!("reading-{i}-{}", random_seed(&mut rng));
        if sample_unique(&pool, 5, &a) != sample_unique(&pool, 5, &b) {
            differing += 1;
        }
    }
    assert!(
        differing >= pairs - 5,
        "only {differing} of {pairs} seed pairs produced different draws"
    );
}

#[test]
fn known_answers_hold() {
    assert_eq!(fnv1a32("reading-123"), 0xcfe2_9936);

    let mut prng = Mulberry32::from_seed_str("reading-123");
    assert_eq!(prng.next_raw(), 1_811_131_189);

    let pool = ["A", "B", "C", "D", "E"];
    assert_eq!(sample_unique(&pool, 3, "reading-123"), vec!["D", "A", "B"]);
    assert_eq!(sample_unique(&pool, 3, "reading-124"), vec!["A", "C", "B"]);
    assert_eq!(sample_unique(&pool, 3, "other"), vec!["E", "A", "C"]);
}

#[test]
fn shorter_draw_is_prefix_of_longer_draw() {
    let pool = ["A", "B", "C", "D", "E"];
    let full = sample_unique(&pool, 5, "reading-123");
    assert_eq!(full, vec!["D", "A", "B", "E", "C"]);
    for k in 0..=5 {
        assert_eq!(sample_unique(&pool, k, "reading-123"), full[..k].to_vec());
    }
}

#[test]
fn lenient_counts_are_floored_and_clamped() {
    let pool = ["A", "B", "C", "D", "E"];
    assert!(sample_unique_lenient(&pool, -2.0, "s").is_empty());
    assert!(sample_unique_lenient(&pool, f64::NAN, "s").is_empty());
    assert_eq!(sample_unique_lenient(&pool, 2.9, "s").len(), 2);
    assert_eq!(sample_unique_lenient(&pool, 99.0, "s").len(), 5);
}
