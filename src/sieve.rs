//! # Sieve — The Segment Driver
//!
//! `SegmentedSieve` owns one cache-sized bitmap and walks it across
//! [start, stop]. Per segment it:
//!
//! 1. copies the pre-sieve pattern in at the right phase (re-asserting the
//!    pattern primes' own bits in the one segment that contains them),
//! 2. dispatches the three cross-off tiers,
//! 3. masks the boundary bytes against [start, stop],
//! 4. hands the finished bitmap to the sink, and
//! 5. advances, updating the shared status.
//!
//! ## Lazy Prime Feeding
//!
//! Sieving primes arrive in increasing order through
//! [`SegmentedSieve::sieve_prime`]. Before a prime p is stored, every
//! segment whose top value is below p² is sieved to completion: those
//! segments cannot contain a multiple of p, and afterwards p's first
//! multiple (≥ p²) lies at most one segment plus one wheel step ahead,
//! which is what bounds the tiers' stored multiple indices and the big
//! tier's schedule length.
//!
//! A byte's bits span the values base + {7, ..., 31}, so a segment of L
//! bytes based at `low` represents the candidates in (low, low + 30·L + 1].
//! `high` is that inclusive top value.

use std::sync::Arc;

use crate::erat_big::EratBig;
use crate::erat_medium::EratMedium;
use crate::erat_small::EratSmall;
use crate::error::{Error, Result};
use crate::presieve::PreSieve;
use crate::status::Status;
use crate::wheel::{byte_of, wheel210, wheel30, Wheel, BIT_VALUES, NUMBERS_PER_BYTE, RESIDUE_BIT};

/// Receives each finished segment bitmap.
pub trait SegmentSink {
    fn segment(&mut self, sieve: &[u8], low: u64) -> Result<()>;
}

pub struct SegmentedSieve {
    start: u64,
    stop: u64,
    low: u64,
    high: u64,
    span: u64,
    sieve: Vec<u8>,
    presieve: Arc<PreSieve>,
    small: EratSmall,
    medium: EratMedium,
    big: EratBig,
    status: Option<Arc<Status>>,
}

impl SegmentedSieve {
    /// `medium_wheel` selects the wheel the medium tier walks: mod-30 for
    /// the prime finder, mod-210 for the generator (whose candidates' 7-
    /// multiples are always pre-sieved).
    pub fn new(
        start: u64,
        stop: u64,
        sieve_bytes: usize,
        presieve: Arc<PreSieve>,
        medium_wheel: &'static Wheel,
        bucket_capacity: u32,
        status: Option<Arc<Status>>,
    ) -> Result<SegmentedSieve> {
        debug_assert!(start <= stop);
        debug_assert!(sieve_bytes.is_power_of_two());

        let mut sieve = Vec::new();
        sieve
            .try_reserve_exact(sieve_bytes)
            .map_err(|_| Error::resource_exhausted("segment buffer allocation failed"))?;
        sieve.resize(sieve_bytes, 0);

        let span = sieve_bytes as u64 * NUMBERS_PER_BYTE;
        // Align down far enough that the byte holding a residue-1 value just
        // above `start` is still inside the first segment.
        let low = start.saturating_sub(2) / 30 * 30;
        let sqrt_stop = stop.isqrt();

        Ok(SegmentedSieve {
            start,
            stop,
            low,
            high: low + span + 1,
            span,
            sieve,
            presieve,
            small: EratSmall::new(sieve_bytes as u64, wheel30()),
            medium: EratMedium::new(span, medium_wheel, bucket_capacity),
            big: EratBig::new(sieve_bytes, sqrt_stop, wheel210(), bucket_capacity),
            status,
        })
    }

    /// Consume the next sieving prime (callers feed them ascending). All
    /// segments that cannot contain a multiple of `prime` are finished
    /// first; primes covered by the pre-sieve are consumed without storing.
    pub fn sieve_prime(&mut self, prime: u64, sink: &mut dyn SegmentSink) -> Result<()> {
        while prime * prime > self.high {
            self.sieve_segment(sink)?;
        }
        if prime <= self.presieve.limit() {
            return Ok(());
        }
        if prime <= self.small.limit() {
            self.small.store(prime, self.low, self.stop)
        } else if prime <= self.medium.limit() {
            self.medium.store(prime, self.low, self.stop)
        } else {
            self.big.store(prime, self.low, self.stop)
        }
    }

    /// Sieve the remaining segments up to `stop`.
    pub fn finish(&mut self, sink: &mut dyn SegmentSink) -> Result<()> {
        while self.low <= self.stop {
            self.sieve_segment(sink)?;
        }
        Ok(())
    }

    fn sieve_segment(&mut self, sink: &mut dyn SegmentSink) -> Result<()> {
        self.presieve.apply(&mut self.sieve, self.low);
        if self.low <= self.presieve.limit() {
            // The pattern cleared the pattern primes themselves (p | p).
            for &p in self.presieve.primes() {
                let p = p as u64;
                if p >= self.low + 7 && p <= self.high {
                    self.sieve[byte_of(p - self.low) as usize] |=
                        1 << RESIDUE_BIT[(p % 30) as usize];
                }
            }
        }

        self.small.cross_off(&mut self.sieve);
        self.medium.cross_off(&mut self.sieve);
        self.big.cross_off(&mut self.sieve)?;

        if self.low <= self.start {
            self.mask_below_start();
        }
        if self.high > self.stop {
            self.mask_above_stop();
        }

        sink.segment(&self.sieve, self.low)?;

        if let Some(status) = &self.status {
            let top = (self.low + self.span - 1).min(self.stop);
            let bottom = self.low.max(self.start);
            status.advance(top.saturating_sub(bottom) + 1);
        }

        self.low += self.span;
        self.high = self.low.saturating_add(self.span + 1);
        Ok(())
    }

    /// Clear the bits of values below `start`; they all sit in byte 0 of
    /// the first segment (start ≤ low + 31 by construction of `low`).
    fn mask_below_start(&mut self) {
        for (bit, &val) in BIT_VALUES.iter().enumerate() {
            if self.low + val < self.start {
                self.sieve[0] &= !(1 << bit);
            }
        }
    }

    /// Clear the bits of values above `stop`.
    fn mask_above_stop(&mut self) {
        if self.stop < self.low + 7 {
            self.sieve.fill(0);
            return;
        }
        let b = byte_of(self.stop - self.low) as usize;
        if b + 1 < self.sieve.len() {
            self.sieve[b + 1..].fill(0);
        }
        let base = self.low + b as u64 * 30;
        for (bit, &val) in BIT_VALUES.iter().enumerate() {
            if base + val > self.stop {
                self.sieve[b] &= !(1 << bit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    struct Collect {
        values: Vec<u64>,
    }

    impl SegmentSink for Collect {
        fn segment(&mut self, sieve: &[u8], low: u64) -> Result<()> {
            for (byte, &b) in sieve.iter().enumerate() {
                for (bit, &val) in BIT_VALUES.iter().enumerate() {
                    if b & (1 << bit) != 0 {
                        self.values.push(low + byte as u64 * 30 + val);
                    }
                }
            }
            Ok(())
        }
    }

    /// Drive a sieve by hand: feed the odd primes up to √stop, finish, and
    /// return every surviving candidate (the primes ≥ 7 within [start, stop]).
    fn survivors(start: u64, stop: u64, sieve_bytes: usize) -> Vec<u64> {
        let cfg = Config::default();
        let presieve = Arc::new(PreSieve::new(13));
        let mut driver = SegmentedSieve::new(
            start,
            stop,
            sieve_bytes,
            presieve,
            wheel30(),
            cfg.bucket_capacity,
            None,
        )
        .unwrap();
        let mut sink = Collect { values: Vec::new() };
        let sqrt = stop.isqrt();
        let mut p = 3;
        while p <= sqrt {
            if (3..p).step_by(2).all(|d| p % d != 0) {
                driver.sieve_prime(p, &mut sink).unwrap();
            }
            p += 2;
        }
        driver.finish(&mut sink).unwrap();
        sink.values
    }

    fn naive_primes(start: u64, stop: u64) -> Vec<u64> {
        (start.max(7)..=stop)
            .filter(|&n| (2..).take_while(|d| d * d <= n).all(|d| n % d != 0))
            .collect()
    }

    #[test]
    fn full_range_matches_trial_division() {
        assert_eq!(survivors(0, 1000, 16), naive_primes(0, 1000));
    }

    #[test]
    fn boundary_masking_is_exact() {
        for (start, stop) in [(10, 30), (29, 31), (30, 32), (31, 31), (90, 121), (7, 7)] {
            assert_eq!(
                survivors(start, stop, 16),
                naive_primes(start, stop),
                "[{}, {}]",
                start,
                stop
            );
        }
    }

    #[test]
    fn segment_size_does_not_change_the_result() {
        let expected = survivors(0, 5000, 256);
        for bytes in [8usize, 16, 64, 1024] {
            assert_eq!(survivors(0, 5000, bytes), expected, "bytes {}", bytes);
        }
    }

    #[test]
    fn offset_ranges_cross_tiers() {
        // √stop ≈ 316 forces small, medium and big tiers at 8-byte segments.
        assert_eq!(survivors(99_000, 100_000, 8), naive_primes(99_000, 100_000));
    }
}
