//! # Generator — Producing the Sieving Primes
//!
//! The finder needs every prime up to √stop. Those are themselves sieved:
//! a second segment driver runs over [7, √stop] with its own (depth-13)
//! pre-sieve and the mod-210 wheel on its medium tier, scanning each
//! finished bitmap and feeding the primes it finds — in increasing order —
//! to the caller. The generator in turn is seeded by a tiny classical
//! odd-number sieve up to stop^¼, whose handful of primes are its own
//! sieving primes.

use std::sync::Arc;

use tracing::debug;

use crate::config::{Config, GENERATOR_PRE_SIEVE};
use crate::error::Result;
use crate::presieve::PreSieve;
use crate::sieve::{SegmentSink, SegmentedSieve};
use crate::wheel::{wheel210, BIT_VALUES};

struct FeedSink<'a> {
    feed: &'a mut dyn FnMut(u64) -> Result<()>,
    produced: u64,
}

impl SegmentSink for FeedSink<'_> {
    fn segment(&mut self, sieve: &[u8], low: u64) -> Result<()> {
        for (byte, &b) in sieve.iter().enumerate() {
            let mut bits = b;
            while bits != 0 {
                let bit = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                self.produced += 1;
                (self.feed)(low + byte as u64 * 30 + BIT_VALUES[bit])?;
            }
        }
        Ok(())
    }
}

/// Sieve [7, stop] and hand every prime to `feed`, ascending.
pub fn feed_sieving_primes(
    stop: u64,
    cfg: &Config,
    feed: &mut dyn FnMut(u64) -> Result<()>,
) -> Result<()> {
    debug_assert!(stop >= 7);
    let presieve = Arc::new(PreSieve::new(GENERATOR_PRE_SIEVE));
    let mut driver = SegmentedSieve::new(
        7,
        stop,
        cfg.generator_sieve_bytes(),
        presieve,
        wheel210(),
        cfg.bucket_capacity,
        None,
    )?;
    let mut sink = FeedSink { feed, produced: 0 };
    for q in tiny_primes(stop.isqrt()) {
        if q > GENERATOR_PRE_SIEVE as u64 {
            driver.sieve_prime(q, &mut sink)?;
        }
    }
    driver.finish(&mut sink)?;
    debug!(stop, sieving_primes = sink.produced, "generator done");
    Ok(())
}

/// Classical sieve over the odd numbers, used to seed the generator.
/// Returns the odd primes ≤ n (n is at most stop^¼ < 2^16).
fn tiny_primes(n: u64) -> Vec<u64> {
    if n < 3 {
        return Vec::new();
    }
    let n = n as usize;
    // Bit i of the array tracks integer i; odd indices start set.
    let mut is_prime = vec![0xAAAA_AAAAu32; n / 32 + 1];
    let mut i = 3;
    while i * i <= n {
        if is_prime[i >> 5] & (1 << (i & 31)) != 0 {
            let mut j = i * i;
            while j <= n {
                is_prime[j >> 5] &= !(1 << (j & 31));
                j += 2 * i;
            }
        }
        i += 2;
    }
    (3..=n)
        .step_by(2)
        .filter(|&i| is_prime[i >> 5] & (1 << (i & 31)) != 0)
        .map(|i| i as u64)
        .collect()
}
