//! # Iter — Stateful Forward/Backward Prime Cursor
//!
//! `PrimeIterator` materializes primes into a cached vector in adaptive
//! chunks and walks it in either direction. One cursor invariant covers
//! both: `next()` yields `primes[i]` then increments, `previous()` yields
//! `primes[i − 1]` then decrements — so `previous()` immediately after
//! `next()` returns the same prime.
//!
//! After `skip_to(v)` the first `next()` positions the cursor with a lower
//! bound (smallest cached prime ≥ v) and the first `previous()` with an
//! upper bound (largest ≤ v); each direction seeks its own side, which
//! replaces the error-prone shared "adjust" flag with two explicit
//! transitions out of the just-seeked state.
//!
//! ## Chunk Sizing
//!
//! Let n be the current frontier. The chunk aims for
//! `clamp(base, √n/(ln √n − 1), 512 MB/8)` primes — the prime-counting
//! approximation of how many primes fit — times ln n integers. `base` is
//! 32 KB/8 for the first ten chunks after a seek (amortizing first-call
//! latency) and 4 MB/8 afterwards (amortizing per-run overhead). An empty
//! chunk is not a sentinel: the frontier simply advances and sieving
//! continues until a prime appears or the legal window ends.

use crate::error::{Error, Result};
use crate::prime_sieve::{PrimeSieve, MAX_STOP};

pub struct PrimeIterator {
    sieve: PrimeSieve,
    primes: Vec<u64>,
    /// Cursor: `next()` reads `primes[i]`, `previous()` reads `primes[i-1]`.
    i: usize,
    start: u64,
    /// A `skip_to` happened and the cursor has not been re-anchored yet.
    seeked: bool,
    /// Chunks generated since the last seek (drives the base size).
    calls: u64,
    /// Fully sieved value window backing `primes` (may be wider than the
    /// primes it contains; empty stretches still advance it).
    window: Option<(u64, u64)>,
}

impl PrimeIterator {
    /// A cursor positioned at `start`.
    pub fn new(start: u64) -> Result<PrimeIterator> {
        let mut it = PrimeIterator {
            sieve: PrimeSieve::new(),
            primes: Vec::new(),
            i: 0,
            start: 0,
            seeked: true,
            calls: 0,
            window: None,
        };
        it.skip_to(start)?;
        Ok(it)
    }

    /// Reposition at `start`. A position inside the cached vector keeps the
    /// cache; anything else drops it. On error the cursor is unchanged.
    pub fn skip_to(&mut self, start: u64) -> Result<()> {
        if start > MAX_STOP {
            return Err(Error::out_of_range(format!(
                "start must be <= {}",
                MAX_STOP
            )));
        }
        self.start = start;
        self.seeked = true;
        self.calls = 0;
        if !self.cache_covers(start) {
            self.primes.clear();
            self.i = 0;
            self.window = None;
        }
        Ok(())
    }

    fn cache_covers(&self, v: u64) -> bool {
        match (self.primes.first(), self.primes.last()) {
            (Some(&lo), Some(&hi)) => lo <= v && v <= hi,
            _ => false,
        }
    }

    /// The smallest prime ≥ the cursor; errors past the legal window.
    pub fn next(&mut self) -> Result<u64> {
        if self.seeked {
            self.seeked = false;
            if self.cache_covers(self.start) {
                self.i = self.primes.partition_point(|&p| p < self.start);
            }
        }
        while self.i >= self.primes.len() {
            self.fetch_forward()?;
        }
        let prime = self.primes[self.i];
        self.i += 1;
        Ok(prime)
    }

    /// The largest prime ≤ the cursor, or `None` below 2.
    pub fn previous(&mut self) -> Result<Option<u64>> {
        if self.seeked {
            self.seeked = false;
            if self.cache_covers(self.start) {
                self.i = self.primes.partition_point(|&p| p <= self.start);
            }
        }
        while self.i == 0 {
            if !self.fetch_backward()? {
                return Ok(None);
            }
        }
        self.i -= 1;
        Ok(Some(self.primes[self.i]))
    }

    fn fetch_forward(&mut self) -> Result<()> {
        let from = match self.window {
            Some((_, hi)) if hi >= MAX_STOP => {
                return Err(Error::out_of_range(
                    "no primes beyond the sieving limit",
                ))
            }
            Some((_, hi)) => hi + 1,
            None => self.start,
        };
        let interval = self.interval_size(from);
        let to = from.saturating_add(interval).min(MAX_STOP);
        let chunk = self.collect(from, to)?;
        self.primes = chunk;
        self.i = 0;
        self.window = Some((from, to));
        Ok(())
    }

    /// Returns false once nothing below the window remains.
    fn fetch_backward(&mut self) -> Result<bool> {
        let until = match self.window {
            Some((0, _)) => return Ok(false),
            Some((lo, _)) => lo - 1,
            None => self.start,
        };
        if until < 2 {
            return Ok(false);
        }
        let interval = self.interval_size(until);
        let from = until.saturating_sub(interval);
        let chunk = self.collect(from, until)?;
        self.i = chunk.len();
        self.primes = chunk;
        self.window = Some((from, until));
        Ok(true)
    }

    fn collect(&mut self, from: u64, to: u64) -> Result<Vec<u64>> {
        let mut primes = Vec::new();
        self.sieve.generate_primes(from, to, |p| primes.push(p))?;
        Ok(primes)
    }

    /// Interval length in integers for a chunk at frontier `n`.
    fn interval_size(&mut self, n: u64) -> u64 {
        const KILOBYTE: u64 = 1 << 10;
        const MEGABYTE: u64 = 1 << 20;
        self.calls += 1;

        let x = (n as f64).max(10.0);
        let sqrtx = x.sqrt();
        let sqrtx_primes = (sqrtx / (sqrtx.ln() - 1.0)) as u64;

        let base = if self.calls < 10 {
            KILOBYTE * 32 / 8
        } else {
            MEGABYTE * 4 / 8
        };
        let cap = MEGABYTE * 512 / 8;
        let primes = base.max(sqrtx_primes).min(cap);
        (primes as f64 * x.ln()) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_from_zero() {
        let mut it = PrimeIterator::new(0).unwrap();
        let first: Vec<u64> = (0..10).map(|_| it.next().unwrap()).collect();
        assert_eq!(first, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    }

    #[test]
    fn next_after_seek_is_smallest_prime_at_or_above() {
        for (v, expected) in [(0u64, 2u64), (2, 2), (3, 3), (4, 5), (90, 97), (97, 97)] {
            let mut it = PrimeIterator::new(v).unwrap();
            assert_eq!(it.next().unwrap(), expected, "seek {}", v);
        }
    }

    #[test]
    fn previous_after_seek_is_largest_prime_at_or_below() {
        for (v, expected) in [(2u64, Some(2u64)), (4, Some(3)), (100, Some(97)), (1, None), (0, None)]
        {
            let mut it = PrimeIterator::new(v).unwrap();
            assert_eq!(it.previous().unwrap(), expected, "seek {}", v);
        }
    }

    #[test]
    fn previous_after_next_returns_the_same_prime() {
        let mut it = PrimeIterator::new(1000).unwrap();
        let a = it.next().unwrap();
        assert_eq!(it.previous().unwrap(), Some(a));
        // And the cursor keeps walking down from there.
        assert_eq!(it.previous().unwrap(), Some(997));
    }

    #[test]
    fn walking_backward_exhausts_below_two() {
        let mut it = PrimeIterator::new(10).unwrap();
        let mut seen = Vec::new();
        while let Some(p) = it.previous().unwrap() {
            seen.push(p);
        }
        assert_eq!(seen, vec![7, 5, 3, 2]);
        // Exhaustion is stable.
        assert_eq!(it.previous().unwrap(), None);
    }

    #[test]
    fn direction_changes_are_consistent() {
        let mut it = PrimeIterator::new(50).unwrap();
        assert_eq!(it.next().unwrap(), 53);
        assert_eq!(it.next().unwrap(), 59);
        assert_eq!(it.previous().unwrap(), Some(59));
        assert_eq!(it.previous().unwrap(), Some(53));
        assert_eq!(it.previous().unwrap(), Some(47));
        assert_eq!(it.next().unwrap(), 47);
        assert_eq!(it.next().unwrap(), 53);
    }

    #[test]
    fn skip_to_inside_the_cache_repositions() {
        let mut it = PrimeIterator::new(0).unwrap();
        // Fill the cache well past 100.
        for _ in 0..30 {
            it.next().unwrap();
        }
        it.skip_to(50).unwrap();
        assert_eq!(it.next().unwrap(), 53);
        it.skip_to(53).unwrap();
        assert_eq!(it.next().unwrap(), 53);
        it.skip_to(53).unwrap();
        assert_eq!(it.previous().unwrap(), Some(53));
    }

    #[test]
    fn seek_past_the_window_fails_and_preserves_state() {
        let mut it = PrimeIterator::new(100).unwrap();
        assert_eq!(it.next().unwrap(), 101);
        assert!(it.skip_to(MAX_STOP + 1).is_err());
        // Last successful state: the cursor still walks from 101.
        assert_eq!(it.next().unwrap(), 103);
    }

    #[test]
    fn crosses_chunk_boundaries_both_ways() {
        let mut it = PrimeIterator::new(1_000_000).unwrap();
        assert_eq!(it.next().unwrap(), 1_000_003);
        let mut down = PrimeIterator::new(1_000_000).unwrap();
        assert_eq!(down.previous().unwrap(), Some(999_983));
    }

    #[test]
    fn billion_boundary_round_trip() {
        let mut it = PrimeIterator::new(1_000_000_000).unwrap();
        assert_eq!(it.next().unwrap(), 1_000_000_007);
        assert_eq!(it.next().unwrap(), 1_000_000_009);
        assert_eq!(it.previous().unwrap(), Some(1_000_000_009));
    }
}
