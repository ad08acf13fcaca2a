//! # Primespan — Segmented Wheel Sieve of Eratosthenes
//!
//! A prime enumeration engine that counts, prints, streams or iterates all
//! primes and prime k-tuplets (k ≤ 7) in an interval [start, stop] of
//! 64-bit integers.
//!
//! ## Module Organization
//!
//! **Sieve kernel** (the fast path):
//! - [`wheel`] — mod-30 and mod-210 factorization tables; byte/bit mapping.
//! - [`presieve`] — copy-in pattern removing multiples of the primes ≤ 23.
//! - [`bucket`] — arena-backed bucket store for sieving-prime records.
//! - [`erat_small`], [`erat_medium`], [`erat_big`] — the three cross-off
//!   tiers, split by multiples-per-segment density.
//! - [`sieve`] — the segment driver sequencing the bitmap across the
//!   interval.
//!
//! **Recognition and delivery**:
//! - [`finder`] — popcount/mask-table counting, printing, callbacks.
//! - [`generator`] — produces the sieving primes ≤ √stop.
//! - [`iter`] — forward/backward cursor with adaptive chunking.
//! - [`parallel`] — sub-interval fan-out and count reduction (rayon).
//!
//! **Surface**: [`PrimeSieve`], the [`flags`] bitfield, [`Config`],
//! [`Error`]/[`Result`], and the free convenience functions below.
//!
//! ## Algorithm Sketch
//!
//! Only residues coprime to 30 are represented: one byte covers 30
//! integers (≈27% density). Segments sized to the L1 cache are initialized
//! from a pre-sieve pattern, crossed off by three tiers of sieving primes
//! (hot per-prime loops, bucketed few-multiples primes, and a
//! bucket-per-future-segment schedule for primes beyond the span), then
//! scanned with per-byte popcount and constellation mask tables.
//!
//! ```
//! assert_eq!(primespan::count_primes(0, 100).unwrap(), 25);
//!
//! let mut it = primespan::PrimeIterator::new(1000).unwrap();
//! assert_eq!(it.next().unwrap(), 1009);
//! ```
//!
//! ## References
//!
//! - Jonathan Sorenson, "An Introduction to Prime Number Sieves", 1990.
//! - <https://github.com/kimwalisch/primesieve/wiki/Segmented-sieve-of-Eratosthenes>
//! - OEIS [A000720](https://oeis.org/A000720) (π(n)), [A007508](https://oeis.org/A007508)
//!   (twin prime counts).

pub mod bucket;
pub mod config;
pub mod erat_big;
pub mod erat_medium;
pub mod erat_small;
pub mod error;
pub mod finder;
pub mod flags;
pub mod generator;
pub mod iter;
pub mod parallel;
pub mod presieve;
pub mod prime_sieve;
pub mod sieve;
pub mod status;
pub mod wheel;

pub use config::Config;
pub use error::{Error, Result};
pub use finder::{Counts, PrimeSink};
pub use iter::PrimeIterator;
pub use prime_sieve::{max_stop, PrimeSieve, MAX_STOP};

/// Number of primes in [start, stop].
pub fn count_primes(start: u64, stop: u64) -> Result<u64> {
    PrimeSieve::new().count_primes(start, stop)
}

/// Number of twin prime pairs (p, p+2) fully inside [start, stop].
pub fn count_twins(start: u64, stop: u64) -> Result<u64> {
    PrimeSieve::new().count_twins(start, stop)
}

/// Number of prime triplets fully inside [start, stop].
pub fn count_triplets(start: u64, stop: u64) -> Result<u64> {
    PrimeSieve::new().count_triplets(start, stop)
}

/// Number of prime quadruplets fully inside [start, stop].
pub fn count_quadruplets(start: u64, stop: u64) -> Result<u64> {
    PrimeSieve::new().count_quadruplets(start, stop)
}

/// Number of prime quintuplets fully inside [start, stop].
pub fn count_quintuplets(start: u64, stop: u64) -> Result<u64> {
    PrimeSieve::new().count_quintuplets(start, stop)
}

/// Number of prime sextuplets fully inside [start, stop].
pub fn count_sextuplets(start: u64, stop: u64) -> Result<u64> {
    PrimeSieve::new().count_sextuplets(start, stop)
}

/// Number of prime septuplets fully inside [start, stop].
pub fn count_septuplets(start: u64, stop: u64) -> Result<u64> {
    PrimeSieve::new().count_septuplets(start, stop)
}

/// Print the primes in [start, stop] to stdout, one per line.
pub fn print_primes(start: u64, stop: u64) -> Result<()> {
    PrimeSieve::new().print_primes(start, stop)
}

/// Print the twin prime pairs in [start, stop], one `(a, b)` per line.
pub fn print_twins(start: u64, stop: u64) -> Result<()> {
    PrimeSieve::new().print_twins(start, stop)
}

/// Invoke `callback` for every prime in [start, stop], in increasing order.
pub fn generate_primes(start: u64, stop: u64, callback: impl FnMut(u64)) -> Result<()> {
    PrimeSieve::new().generate_primes(start, stop, callback)
}

/// 32-bit variant of [`generate_primes`]; `stop` must fit in a `u32`.
pub fn generate_primes_u32(start: u64, stop: u64, callback: impl FnMut(u32)) -> Result<()> {
    PrimeSieve::new().generate_primes_u32(start, stop, callback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_functions_share_one_behavior() {
        assert_eq!(count_primes(0, 100).unwrap(), 25);
        assert_eq!(count_twins(0, 100).unwrap(), 8);
        let mut seen = Vec::new();
        generate_primes(0, 30, |p| seen.push(p)).unwrap();
        assert_eq!(seen, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    }

    #[test]
    fn u32_variant_checks_its_window() {
        assert!(generate_primes_u32(0, u32::MAX as u64 + 1, |_| {}).is_err());
        let mut n = 0u32;
        generate_primes_u32(0, 100, |_| n += 1).unwrap();
        assert_eq!(n, 25);
    }
}
