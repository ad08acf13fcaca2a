//! # Parallel — Fanning a Sieve Across Rayon Workers
//!
//! [start, stop] splits into per-worker sub-intervals whose boundaries sit
//! at values ≡ 2 (mod 30): between the top residue-1 bit of one byte and
//! the first candidate of the next, so no segment byte — and therefore no
//! single-byte k-tuplet constellation — is shared or split between
//! workers. Workers are fully independent (own segment buffer, own tiers,
//! own generator run) and share only the read-only pre-sieve pattern and
//! the status counter; their `Counts` are reduced element-wise after the
//! join.
//!
//! Print modes run on one worker: emitting in numeric order from many
//! workers would require unbounded buffering, and a single sieving pass is
//! printing-bound anyway. Callback modes fan out; the sink contract
//! requires reentrancy.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::finder::{Counts, Emit, PrimeFinder, PrimeSink};
use crate::flags;
use crate::generator;
use crate::presieve::PreSieve;
use crate::sieve::SegmentedSieve;
use crate::status::Status;
use crate::wheel::wheel30;

/// Sieve [start, stop] (stop ≥ 7) under `flag_bits`, splitting across up
/// to `threads` rayon workers (0 = all). Returns the summed counts.
pub(crate) fn run(
    start: u64,
    stop: u64,
    flag_bits: u32,
    cfg: &Config,
    threads: usize,
    emit: Emit<'_>,
    status: Option<Arc<Status>>,
) -> Result<Counts> {
    debug_assert!(start <= stop && stop >= 7);
    let presieve = Arc::new(PreSieve::new(cfg.pre_sieve));
    let span = stop - start + 1;

    // Ordered output cannot fan out; closures cannot cross threads.
    let sequential =
        matches!(emit, Emit::Each(_)) || flag_bits & flags::PRINT_MASK != 0;
    let threads = if threads == 0 {
        rayon::current_num_threads()
    } else {
        threads
    };
    let pieces = if sequential {
        1
    } else {
        threads
            .min(usize::try_from(span / cfg.min_span_per_thread).unwrap_or(usize::MAX).max(1))
            .max(1)
    };

    if pieces <= 1 {
        return worker(start, stop, flag_bits, cfg, presieve, emit, status);
    }

    let ranges = partition(start, stop, pieces);
    debug!(workers = ranges.len(), start, stop, "parallel sieve");
    let shared: Option<&dyn PrimeSink> = match emit {
        Emit::Shared(sink) => Some(sink),
        _ => None,
    };
    ranges
        .into_par_iter()
        .map(|(a, b)| {
            let emit = match shared {
                Some(sink) => Emit::Shared(sink),
                None => Emit::None,
            };
            worker(a, b, flag_bits, cfg, presieve.clone(), emit, status.clone())
        })
        .try_reduce(Counts::default, |mut acc, c| {
            acc += c;
            Ok(acc)
        })
}

/// One independent finder over [start, stop].
fn worker(
    start: u64,
    stop: u64,
    flag_bits: u32,
    cfg: &Config,
    presieve: Arc<PreSieve>,
    emit: Emit<'_>,
    status: Option<Arc<Status>>,
) -> Result<Counts> {
    let mut finder = PrimeFinder::new(flag_bits, emit);
    let mut driver = SegmentedSieve::new(
        start,
        stop,
        cfg.sieve_bytes(),
        presieve,
        wheel30(),
        cfg.bucket_capacity,
        status,
    )?;
    let sqrt = stop.isqrt();
    if sqrt >= 7 {
        generator::feed_sieving_primes(sqrt, cfg, &mut |q| driver.sieve_prime(q, &mut finder))?;
    }
    driver.finish(&mut finder)?;
    Ok(finder.counts())
}

/// Split [start, stop] into at most `pieces` disjoint covering ranges with
/// inner boundaries ≡ 2 (mod 30).
fn partition(start: u64, stop: u64, pieces: usize) -> Vec<(u64, u64)> {
    let span = stop - start + 1;
    let chunk = (span / pieces as u64).max(1);
    let mut ranges = Vec::with_capacity(pieces);
    let mut lo = start;
    for i in 1..pieces as u64 {
        let b = align_split(start.saturating_add(chunk * i));
        if b > lo && b <= stop {
            ranges.push((lo, b - 1));
            lo = b;
        }
    }
    ranges.push((lo, stop));
    ranges
}

/// Largest value ≤ raw that is ≡ 2 (mod 30).
fn align_split(raw: u64) -> u64 {
    raw - (raw % 30 + 28) % 30
}
