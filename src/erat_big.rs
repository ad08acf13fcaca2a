//! # EratBig — Cross-Off Tier for Large Sieving Primes
//!
//! A prime above the segment span has at most one multiple per segment and
//! usually none, so touching every prime every segment would be wasted
//! work. Instead each prime lives in the bucket list of the segment its
//! next multiple falls in: the lists form a circular schedule, one slot per
//! in-flight segment. Sieving a segment drains exactly its own list; every
//! drained prime gets one bit cleared, advances one wheel step and is
//! re-homed into the slot of the segment its new multiple lands in.
//!
//! The list count is sized so the farthest possible multiple (one wheel
//! step of at most 10·p past the segment, for the largest sieving prime)
//! still fits without wrapping onto a pending slot.
//!
//! This tier walks the mod-210 wheel: multiples sharing the factor 7 are
//! never visited, which is sound because the pre-sieve always covers 7.

use crate::bucket::{BucketArena, BucketList, SievingPrime};
use crate::error::{Error, Result};
use crate::wheel::{byte_of, Wheel};

pub struct EratBig {
    limit: u64,
    wheel: &'static Wheel,
    log2_len: u32,
    arena: BucketArena,
    lists: Vec<BucketList>,
    current: usize,
}

impl EratBig {
    /// `sieve_bytes` must be a power of two; `limit` is the largest sieving
    /// prime this tier will ever see (√stop).
    pub fn new(
        sieve_bytes: usize,
        limit: u64,
        wheel: &'static Wheel,
        bucket_capacity: u32,
    ) -> EratBig {
        debug_assert!(sieve_bytes.is_power_of_two());
        let log2_len = sieve_bytes.trailing_zeros();
        // Farthest byte index a stored multiple can have, relative to the
        // segment about to be sieved: one full segment, plus one maximal
        // wheel step of the largest prime, plus the sub-step remainder a
        // first multiple may add on top.
        let max_index = sieve_bytes as u64 + (limit / 30 + 1) * (wheel.max_factor_gap + 1) + 16;
        let slots = ((max_index >> log2_len) + 1).next_power_of_two() as usize;
        EratBig {
            limit,
            wheel,
            log2_len,
            arena: BucketArena::new(bucket_capacity),
            lists: vec![BucketList::new(); slots],
            current: 0,
        }
    }

    #[inline]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn store(&mut self, prime: u64, low: u64, stop: u64) -> Result<()> {
        if prime > self.limit {
            return Err(Error::out_of_range(format!(
                "prime {} exceeds the big tier limit {}",
                prime, self.limit
            )));
        }
        let Some((multiple, wheel_index)) = self.wheel.first_multiple(prime, low, stop)? else {
            return Ok(());
        };
        let index = byte_of(multiple - low);
        let seg = (index >> self.log2_len) as usize;
        if seg >= self.lists.len() {
            return Err(Error::internal(format!(
                "sieving prime {} scheduled {} segments ahead, {} slots exist",
                prime,
                seg,
                self.lists.len()
            )));
        }
        let slot = (self.current + seg) & (self.lists.len() - 1);
        let len_mask = (1u64 << self.log2_len) - 1;
        self.lists[slot].push(
            &mut self.arena,
            SievingPrime {
                prime_div_30: (prime / 30) as u32,
                multiple_index: (index & len_mask) as u32,
                wheel_index,
            },
        )
    }

    /// Drain the current segment's list, then rotate the schedule.
    pub fn cross_off(&mut self, sieve: &mut [u8]) -> Result<()> {
        let len = sieve.len();
        let log2 = self.log2_len;
        let len_mask = (len - 1) as u64;
        let slots_mask = self.lists.len() - 1;
        let current = self.current;
        let wheel = self.wheel;

        let mut drained = std::mem::take(&mut self.lists[current]);
        let lists = &mut self.lists;
        let result = drained.drain(&mut self.arena, |arena, records| {
            for rec in records {
                let i = rec.multiple_index as usize;
                debug_assert!(i < len);
                let e = wheel.element(rec.wheel_index);
                sieve[i] &= e.unset_bit;
                let next = i as u64
                    + e.next_multiple_factor as u64 * rec.prime_div_30 as u64
                    + e.correct as u64;
                let seg = (next >> log2) as usize;
                debug_assert!(seg >= 1, "big-tier prime re-landed in its own segment");
                if seg > slots_mask {
                    return Err(Error::internal(
                        "big-tier schedule too small for re-homed prime",
                    ));
                }
                lists[(current + seg) & slots_mask].push(
                    arena,
                    SievingPrime {
                        prime_div_30: rec.prime_div_30,
                        multiple_index: (next & len_mask) as u32,
                        wheel_index: e.next as u32,
                    },
                )?;
            }
            Ok(())
        });
        self.current = (current + 1) & slots_mask;
        result
    }
}
