//! # PrimeSieve — The Public Façade
//!
//! One `PrimeSieve` value holds the configuration (segment size, pre-sieve
//! depth, thread count, flags) and the results of its last run (counts,
//! status, elapsed seconds). `sieve()` validates, emits the sub-wheel
//! primes {2, 3, 5} and their tuplets from the literal table, then hands
//! [max(7,·), stop] to the parallel driver.
//!
//! Convenience wrappers cover the common one-shot uses: `count_primes`,
//! `count_twins`, ..., `print_primes`, ..., and callback enumeration via
//! `generate_primes` (a closure carries any context the caller needs) or
//! `sieve_with_sink` for reentrant multi-threaded delivery.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::finder::{Counts, Emit, PrimeFinder, PrimeSink};
use crate::flags;
use crate::parallel;
use crate::status::Status;

/// Largest legal `start`/`stop`: 2⁶⁴ − 1 − 10·(2³² − 1). The margin covers
/// the worst wheel overshoot (10 factor steps of a 32-bit sieving prime)
/// so segment arithmetic never wraps.
pub const MAX_STOP: u64 = u64::MAX - 10 * (u32::MAX as u64);

/// Largest value `stop` may take.
pub fn max_stop() -> u64 {
    MAX_STOP
}

pub struct PrimeSieve {
    cfg: Config,
    flag_bits: u32,
    threads: usize,
    counts: Counts,
    status: Option<Arc<Status>>,
    seconds: f64,
}

impl Default for PrimeSieve {
    fn default() -> PrimeSieve {
        PrimeSieve {
            cfg: Config::default(),
            flag_bits: flags::COUNT_PRIMES,
            threads: 1,
            counts: Counts::default(),
            status: None,
            seconds: 0.0,
        }
    }
}

impl PrimeSieve {
    pub fn new() -> PrimeSieve {
        PrimeSieve::default()
    }

    // ── Configuration ──────────────────────────────────────────────

    /// Segment size in kilobytes; rounded up to a power of two and clamped
    /// to [1, 4096].
    pub fn set_sieve_size(&mut self, kilobytes: u32) {
        self.cfg.sieve_size_kb = kilobytes;
        self.cfg = self.cfg.normalized();
    }

    pub fn sieve_size(&self) -> u32 {
        self.cfg.sieve_size_kb
    }

    /// Pre-sieve the multiples of primes up to `limit`; clamped to [13, 23].
    pub fn set_pre_sieve(&mut self, limit: u32) {
        self.cfg.pre_sieve = limit;
        self.cfg = self.cfg.normalized();
    }

    pub fn pre_sieve(&self) -> u32 {
        self.cfg.pre_sieve
    }

    /// Worker count for count-mode runs; 0 means every rayon thread.
    pub fn set_threads(&mut self, threads: usize) {
        self.threads = threads;
    }

    pub fn set_flags(&mut self, flag_bits: u32) -> Result<()> {
        flags::validate(flag_bits)?;
        self.flag_bits = flag_bits;
        Ok(())
    }

    pub fn add_flags(&mut self, flag_bits: u32) -> Result<()> {
        flags::validate(flag_bits)?;
        self.flag_bits |= flag_bits;
        Ok(())
    }

    // ── Results of the last run ────────────────────────────────────

    pub fn counts(&self) -> Counts {
        self.counts
    }

    /// Completion percentage of the last run, when a status flag was set.
    pub fn status(&self) -> Option<f64> {
        self.status.as_ref().map(|s| s.percent())
    }

    /// Wall-clock seconds of the last `sieve()` call.
    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    // ── Sieving ────────────────────────────────────────────────────

    /// Sieve [start, stop] under the currently set flags.
    pub fn sieve(&mut self, start: u64, stop: u64) -> Result<()> {
        if self.flag_bits & flags::CALLBACK_MASK != 0 {
            return Err(Error::invalid_argument(
                "callback flag set but no callback registered",
            ));
        }
        self.sieve_with_emit(start, stop, Emit::None)
    }

    /// Set `flag_bits` and sieve [start, stop].
    pub fn sieve_flags(&mut self, start: u64, stop: u64, flag_bits: u32) -> Result<()> {
        self.set_flags(flag_bits)?;
        self.sieve(start, stop)
    }

    /// Invoke `callback` once per prime in [start, stop], ascending.
    pub fn generate_primes(
        &mut self,
        start: u64,
        stop: u64,
        mut callback: impl FnMut(u64),
    ) -> Result<()> {
        self.flag_bits = flags::CALLBACK64_PRIMES;
        self.sieve_with_emit(start, stop, Emit::Each(&mut callback))
    }

    /// 32-bit variant of [`PrimeSieve::generate_primes`].
    pub fn generate_primes_u32(
        &mut self,
        start: u64,
        stop: u64,
        mut callback: impl FnMut(u32),
    ) -> Result<()> {
        if stop > u32::MAX as u64 {
            return Err(Error::invalid_argument(
                "STOP must fit in 32 bits for the 32-bit callback",
            ));
        }
        self.flag_bits = flags::CALLBACK32_PRIMES;
        let mut widen = |p: u64| callback(p as u32);
        self.sieve_with_emit(start, stop, Emit::Each(&mut widen))
    }

    /// Deliver every prime to a shared sink, fanning out across threads.
    /// Calls are not serialized; the sink must be reentrant.
    pub fn sieve_with_sink(&mut self, start: u64, stop: u64, sink: &dyn PrimeSink) -> Result<()> {
        self.flag_bits |= flags::CALLBACK64_PRIMES;
        self.sieve_with_emit(start, stop, Emit::Shared(sink))
    }

    fn sieve_with_emit(&mut self, start: u64, stop: u64, emit: Emit<'_>) -> Result<()> {
        if start > MAX_STOP || stop > MAX_STOP {
            return Err(Error::invalid_argument(format!(
                "START and STOP must be <= {}",
                MAX_STOP
            )));
        }
        if stop < start {
            return Err(Error::invalid_argument("STOP must be >= START"));
        }
        flags::validate(self.flag_bits)?;

        self.counts = Counts::default();
        self.seconds = 0.0;
        let started = Instant::now();
        self.status = Status::new(stop - start + 1, self.flag_bits);

        let mut emit = emit;
        let mut counts = Counts::default();
        if start <= 5 {
            let mut small = PrimeFinder::new(self.flag_bits, emit);
            small.emit_small_primes(start, stop);
            counts += small.counts();
            emit = small.into_emit();
        }

        if stop >= 7 {
            counts += parallel::run(
                start,
                stop,
                self.flag_bits,
                &self.cfg,
                self.threads,
                emit,
                self.status.clone(),
            )?;
        }

        if let Some(status) = &self.status {
            status.finalize();
        }
        self.counts = counts;
        self.seconds = started.elapsed().as_secs_f64();
        debug!(
            start,
            stop,
            flags = self.flag_bits,
            seconds = self.seconds,
            "sieve finished"
        );
        Ok(())
    }

    // ── Convenience counters and printers ──────────────────────────

    pub fn count_primes(&mut self, start: u64, stop: u64) -> Result<u64> {
        self.sieve_flags(start, stop, flags::COUNT_PRIMES)?;
        Ok(self.counts.primes())
    }

    pub fn count_twins(&mut self, start: u64, stop: u64) -> Result<u64> {
        self.sieve_flags(start, stop, flags::COUNT_TWINS)?;
        Ok(self.counts.twins())
    }

    pub fn count_triplets(&mut self, start: u64, stop: u64) -> Result<u64> {
        self.sieve_flags(start, stop, flags::COUNT_TRIPLETS)?;
        Ok(self.counts.triplets())
    }

    pub fn count_quadruplets(&mut self, start: u64, stop: u64) -> Result<u64> {
        self.sieve_flags(start, stop, flags::COUNT_QUADRUPLETS)?;
        Ok(self.counts.quadruplets())
    }

    pub fn count_quintuplets(&mut self, start: u64, stop: u64) -> Result<u64> {
        self.sieve_flags(start, stop, flags::COUNT_QUINTUPLETS)?;
        Ok(self.counts.quintuplets())
    }

    pub fn count_sextuplets(&mut self, start: u64, stop: u64) -> Result<u64> {
        self.sieve_flags(start, stop, flags::COUNT_SEXTUPLETS)?;
        Ok(self.counts.sextuplets())
    }

    pub fn count_septuplets(&mut self, start: u64, stop: u64) -> Result<u64> {
        self.sieve_flags(start, stop, flags::COUNT_SEPTUPLETS)?;
        Ok(self.counts.septuplets())
    }

    pub fn print_primes(&mut self, start: u64, stop: u64) -> Result<()> {
        self.sieve_flags(start, stop, flags::PRINT_PRIMES)
    }

    pub fn print_twins(&mut self, start: u64, stop: u64) -> Result<()> {
        self.sieve_flags(start, stop, flags::PRINT_TWINS)
    }

    pub fn print_triplets(&mut self, start: u64, stop: u64) -> Result<()> {
        self.sieve_flags(start, stop, flags::PRINT_TRIPLETS)
    }

    pub fn print_quadruplets(&mut self, start: u64, stop: u64) -> Result<()> {
        self.sieve_flags(start, stop, flags::PRINT_QUADRUPLETS)
    }

    pub fn print_quintuplets(&mut self, start: u64, stop: u64) -> Result<()> {
        self.sieve_flags(start, stop, flags::PRINT_QUINTUPLETS)
    }

    pub fn print_sextuplets(&mut self, start: u64, stop: u64) -> Result<()> {
        self.sieve_flags(start, stop, flags::PRINT_SEXTUPLETS)
    }

    pub fn print_septuplets(&mut self, start: u64, stop: u64) -> Result<()> {
        self.sieve_flags(start, stop, flags::PRINT_SEPTUPLETS)
    }
}
