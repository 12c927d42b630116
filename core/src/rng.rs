//! Deterministic random number generation for card draws.
//!
//! RULE: A draw never touches a platform RNG.
//! All randomness for a draw flows from one string seed:
//!   seed string --fnv1a32--> u32 state --mulberry32--> stream of f64 in [0, 1)
//!
//! Both algorithms are specified bit-for-bit, so a stored seed replays
//! the same stream on any machine, in any process, at any later time.

use rand::{Error, RngCore, SeedableRng};

pub const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
pub const FNV_PRIME: u32 = 0x0100_0193;

const MULBERRY_INCREMENT: u32 = 0x6d2b_79f5;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// 32-bit FNV-1a over the UTF-16 code units of `seed`.
///
/// Hashing UTF-16 units (not UTF-8 bytes) keeps seeds containing
/// non-ASCII text compatible with readings created by browser clients.
pub fn fnv1a32(seed: &str) -> u32 {
    seed.encode_utf16().fold(FNV_OFFSET_BASIS, |hash, unit| {
        (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}

/// mulberry32: a 32-bit state generator. One instance per draw; not shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Seed from a human-readable string (e.g. a reading id).
    pub fn from_seed_str(seed: &str) -> Self {
        Self::new(fnv1a32(seed))
    }

    /// Advance the state and return the raw 32-bit mix.
    pub fn next_raw(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let t = self.state;
        let mut x = (t ^ (t >> 15)).wrapping_mul(1 | t);
        x ^= x.wrapping_add((x ^ (x >> 7)).wrapping_mul(61 | x));
        x ^ (x >> 14)
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_raw()) / TWO_POW_32
    }

    /// Roll an index in [0, bound). `bound` must be > 0.
    pub fn index_below(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0, "bound must be > 0");
        (self.next_f64() * bound as f64).floor() as usize
    }
}

impl RngCore for Mulberry32 {
    fn next_u32(&mut self) -> u32 {
        self.next_raw()
    }

    fn next_u64(&mut self) -> u64 {
        let lo = u64::from(self.next_raw());
        let hi = u64::from(self.next_raw());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_raw().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Mulberry32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn fnv1a32_matches_reference_values() {
        assert_eq!(fnv1a32(""), 0x811c_9dc5);
        assert_eq!(fnv1a32("a"), 0xe40c_292c);
        assert_eq!(fnv1a32("foobar"), 0xbf9c_f968);
        assert_eq!(fnv1a32("reading-123"), 0xcfe2_9936);
    }

    #[test]
    fn fnv1a32_hashes_utf16_units() {
        assert_eq!(fnv1a32("ñandú"), 0x4e00_d685);
    }

    #[test]
    fn mulberry32_matches_reference_stream() {
        let mut rng = Mulberry32::new(0);
        assert_eq!(rng.next_raw(), 1_144_304_738);
        assert_eq!(rng.next_raw(), 1_416_247);
        assert_eq!(rng.next_raw(), 958_946_056);

        let mut seeded = Mulberry32::from_seed_str("reading-123");
        assert_eq!(seeded.next_raw(), 1_811_131_189);
        assert_eq!(seeded.next_raw(), 2_555_112_184);
        assert_eq!(seeded.next_raw(), 1_433_854_437);
    }

    #[test]
    fn next_f64_is_raw_over_two_pow_32() {
        let mut rng = Mulberry32::new(0);
        let v = rng.next_f64();
        assert_eq!(v, 1_144_304_738.0 / 4_294_967_296.0);
        for _ in 0..10_000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x), "value out of range: {x}");
        }
    }

    #[test]
    fn same_seed_replays_same_stream() {
        let mut a = Mulberry32::from_seed_str("replay");
        let mut b = Mulberry32::from_seed_str("replay");
        for i in 0..1_000 {
            assert_eq!(a.next_raw(), b.next_raw(), "streams diverged at call {i}");
        }
    }

    #[test]
    fn seedable_rng_uses_little_endian_state() {
        let mut a = Mulberry32::from_seed(42u32.to_le_bytes());
        let mut b = Mulberry32::new(42);
        assert_eq!(a.next_u32(), b.next_raw());

        // Composes with the rand ecosystem.
        let roll: u8 = a.gen_range(1..=6);
        assert!((1..=6).contains(&roll));
    }
}
