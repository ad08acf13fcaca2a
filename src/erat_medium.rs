//! # EratMedium — Cross-Off Tier for Medium Sieving Primes
//!
//! Primes between the segment byte length and the full segment span have
//! only a handful of multiples per segment. They sit in one bucket list;
//! each segment visits every record, clears its few positions through the
//! wheel's crossing table and leaves the multiple index pointing into the
//! next segment.

use crate::bucket::{BucketArena, BucketList, SievingPrime};
use crate::error::{Error, Result};
use crate::wheel::{byte_of, Wheel};

pub struct EratMedium {
    limit: u64,
    wheel: &'static Wheel,
    arena: BucketArena,
    list: BucketList,
}

impl EratMedium {
    pub fn new(limit: u64, wheel: &'static Wheel, bucket_capacity: u32) -> EratMedium {
        EratMedium {
            limit,
            wheel,
            arena: BucketArena::new(bucket_capacity),
            list: BucketList::new(),
        }
    }

    #[inline]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn store(&mut self, prime: u64, low: u64, stop: u64) -> Result<()> {
        if prime > self.limit {
            return Err(Error::out_of_range(format!(
                "prime {} exceeds the medium tier limit {}",
                prime, self.limit
            )));
        }
        let Some((multiple, wheel_index)) = self.wheel.first_multiple(prime, low, stop)? else {
            return Ok(());
        };
        self.list.push(
            &mut self.arena,
            SievingPrime {
                prime_div_30: (prime / 30) as u32,
                multiple_index: byte_of(multiple - low) as u32,
                wheel_index,
            },
        )
    }

    pub fn cross_off(&mut self, sieve: &mut [u8]) {
        let len = sieve.len();
        let wheel = self.wheel;
        self.list.for_each_mut(&mut self.arena, |rec| {
            let t = rec.prime_div_30 as usize;
            let mut i = rec.multiple_index as usize;
            let mut wi = rec.wheel_index;
            while i < len {
                let e = wheel.element(wi);
                sieve[i] &= e.unset_bit;
                i += e.next_multiple_factor as usize * t + e.correct as usize;
                wi = e.next as u32;
            }
            rec.multiple_index = (i - len) as u32;
            rec.wheel_index = wi;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wheel::{wheel30, wheel210, BIT_VALUES};

    fn run(wheel: &'static Wheel, primes: &[u64], bytes: usize, segments: usize) -> Vec<u64> {
        let stop = (bytes * segments) as u64 * 30 + 1;
        let mut tier = EratMedium::new(30 * bytes as u64, wheel, 8);
        for &p in primes {
            tier.store(p, 0, stop).unwrap();
        }
        let mut survivors = Vec::new();
        for s in 0..segments {
            let mut seg = vec![0xffu8; bytes];
            tier.cross_off(&mut seg);
            let low = (s * bytes) as u64 * 30;
            for (byte, &b) in seg.iter().enumerate() {
                for (bit, &val) in BIT_VALUES.iter().enumerate() {
                    if b & (1 << bit) != 0 {
                        survivors.push(low + byte as u64 * 30 + val);
                    }
                }
            }
        }
        survivors
    }

    #[test]
    fn medium_primes_cross_their_squares_onward() {
        // 37² = 1369 and 41² = 1681 lie in the second of four 16-byte
        // segments; every later wheel multiple must be gone too.
        let survivors = run(wheel30(), &[37, 41], 16, 4);
        for v in survivors {
            assert!(v < 37 * 37 || (v % 37 != 0 && v % 41 != 0), "{}", v);
        }
        assert!(!run(wheel30(), &[37], 16, 4).contains(&1369));
    }

    #[test]
    fn mod210_wheel_skips_only_presieved_positions() {
        // With the mod-210 wheel, multiples divisible by 7 are skipped; all
        // remaining multiples of 11 must still be crossed.
        let survivors = run(wheel210(), &[11], 16, 4);
        for v in survivors {
            assert!(
                v < 121 || v % 11 != 0 || v % 7 == 0,
                "{} is an 11-multiple the 210 wheel should cross",
                v
            );
        }
    }

    #[test]
    fn rejects_primes_above_the_limit() {
        let mut tier = EratMedium::new(480, wheel30(), 8);
        assert!(tier.store(481, 0, 100_000).is_err());
        assert!(tier.store(479, 0, 100_000).is_ok());
    }
}
