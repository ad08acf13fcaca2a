//! # Wheel — Modulo-30 and Modulo-210 Factorization Tables
//!
//! A wheel of modulus m = 2·3·5(·7) partitions the integers into m residue
//! classes; only the classes coprime to m can contain primes. The segment
//! bitmap always uses the mod-30 wheel: each byte covers 30 consecutive
//! integers and its 8 bits represent the residues {7, 11, 13, 17, 19, 23,
//! 29, 31} relative to the byte's base, so bit 7 holds the "1" residue of
//! the *next* block and every coprime residue lives in exactly one byte.
//! This packing is what lets all standard k-tuplet constellations of order
//! 2..=7 be recognized with single-byte masks.
//!
//! ## Crossing Without Division
//!
//! For a sieving prime p = 30t + r, consecutive wheel multiples are p·f and
//! p·f' where f, f' are consecutive totatives of the modulus. The byte
//! distance between them decomposes as
//!
//! ```text
//! byte(p·f') − byte(p·f) = (f' − f)·t + ⌊(r·f' − 7)/30⌋ − ⌊(r·f − 7)/30⌋
//! ```
//!
//! with byte(v) = (v − 7)/30. Both the factor gap f' − f and the correction
//! term depend only on (r, position of f), so one table of 8 classes ×
//! `totatives` positions drives the whole cross-off: clear a precomputed bit
//! mask, advance by `gap·t + correction` bytes, move to the next table slot.
//! No division or modulo is executed per crossing.
//!
//! The mod-210 wheel additionally skips multiples sharing the factor 7.
//! That is sound only where those multiples are already pre-sieved, which
//! the engine guarantees by keeping 7 in every pre-sieve pattern.
//!
//! ## References
//!
//! - Jonathan Sorenson, "An Introduction to Prime Number Sieves", 1990.
//! - <https://github.com/kimwalisch/primesieve/wiki/Segmented-sieve-of-Eratosthenes>

use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Integers covered by one sieve byte.
pub const NUMBERS_PER_BYTE: u64 = 30;

/// Value of bit i relative to its byte's base (a multiple of 30).
pub const BIT_VALUES: [u64; 8] = [7, 11, 13, 17, 19, 23, 29, 31];

/// Residue classes mod 30 that a prime > 5 can occupy, in bit order
/// (class of bit 7 is the residue 1).
pub const PRIME_CLASSES: [u64; 8] = [7, 11, 13, 17, 19, 23, 29, 1];

/// residue mod 30 → bit position, 0xff for excluded residues.
pub const RESIDUE_BIT: [u8; 30] = [
    0xff, 7, 0xff, 0xff, 0xff, 0xff, 0xff, 0, 0xff, 0xff, 0xff, 1, 0xff, 2, 0xff, 0xff, 0xff, 3,
    0xff, 4, 0xff, 0xff, 0xff, 5, 0xff, 0xff, 0xff, 0xff, 0xff, 6,
];

/// residue mod 30 → row index into the crossing table, 0xff for residues a
/// prime cannot occupy. Row order follows [`PRIME_CLASSES`].
const CLASS_INDEX: [u8; 30] = [
    0xff, 7, 0xff, 0xff, 0xff, 0xff, 0xff, 0, 0xff, 0xff, 0xff, 1, 0xff, 2, 0xff, 0xff, 0xff, 3,
    0xff, 4, 0xff, 0xff, 0xff, 5, 0xff, 0xff, 0xff, 0xff, 0xff, 6,
];

/// Entry of the initialization table, indexed by `quotient % modulus`:
/// how far the quotient must grow to reach the next totative, and where
/// that totative sits in the factor sequence.
#[derive(Debug, Clone, Copy)]
pub struct WheelInit {
    pub next_multiple_factor: u8,
    pub wheel_index: u8,
}

/// Entry of the crossing table, indexed by `class_row * totatives + position`.
#[derive(Debug, Clone, Copy)]
pub struct WheelElement {
    /// AND-mask that clears the bit of the current multiple.
    pub unset_bit: u8,
    /// Factor gap to the next multiple; byte advance is `gap·(p/30) + correct`.
    pub next_multiple_factor: u8,
    /// Remainder correction of the byte advance.
    pub correct: u8,
    /// Absolute index of the next table entry.
    pub next: u16,
}

/// A wheel descriptor: the modulus plus its two lookup tables.
pub struct Wheel {
    pub modulus: u64,
    /// Number of residues coprime to the modulus (8 for 30, 48 for 210).
    pub totatives: usize,
    /// Largest factor gap anywhere in `init` or `elements`; bounds how far
    /// past `stop` a first multiple may overshoot (≤ 10·p).
    pub max_factor_gap: u64,
    init: Vec<WheelInit>,
    elements: Vec<WheelElement>,
}

impl Wheel {
    fn build(modulus: u64) -> Wheel {
        let factors: Vec<u64> = (1..=modulus).filter(|&f| gcd(f, modulus) == 1).collect();
        let totatives = factors.len();

        let mut init = Vec::with_capacity(modulus as usize);
        for q in 0..modulus {
            let (gap, pos) = match factors.iter().position(|&f| f >= q) {
                Some(k) => (factors[k] - q, k),
                None => (modulus + 1 - q, 0),
            };
            init.push(WheelInit {
                next_multiple_factor: gap as u8,
                wheel_index: pos as u8,
            });
        }

        let mut elements = Vec::with_capacity(8 * totatives);
        for (row, &r) in PRIME_CLASSES.iter().enumerate() {
            for (k, &f) in factors.iter().enumerate() {
                let f_next = if k + 1 < totatives {
                    factors[k + 1]
                } else {
                    modulus + 1
                };
                let bit = RESIDUE_BIT[(r * f % 30) as usize];
                debug_assert_ne!(bit, 0xff);
                // Signed floor: r·f = 1 (class 1, factor 1) sits one byte
                // *below* its 30-block, at the previous byte's top bit.
                let signed_byte = |v: u64| (v as i64 - 7).div_euclid(30);
                elements.push(WheelElement {
                    unset_bit: !(1u8 << bit),
                    next_multiple_factor: (f_next - f) as u8,
                    correct: (signed_byte(r * f_next) - signed_byte(r * f)) as u8,
                    next: (row * totatives + (k + 1) % totatives) as u16,
                });
            }
        }

        let max_factor_gap = init
            .iter()
            .map(|i| i.next_multiple_factor as u64)
            .chain(elements.iter().map(|e| e.next_multiple_factor as u64))
            .max()
            .unwrap_or(0);

        Wheel {
            modulus,
            totatives,
            max_factor_gap,
            init,
            elements,
        }
    }

    /// Crossing-table entry at `wheel_index`.
    #[inline]
    pub fn element(&self, wheel_index: u32) -> &WheelElement {
        &self.elements[wheel_index as usize]
    }

    /// First multiple of `prime` that is ≥ max(prime², low), lands on a
    /// residue this wheel visits, and does not exceed `stop`, together with
    /// its crossing-table index. `Ok(None)` means the prime has nothing to
    /// cross off in [low, stop].
    pub fn first_multiple(&self, prime: u64, low: u64, stop: u64) -> Result<Option<(u64, u32)>> {
        debug_assert!(prime > 5 && prime % 2 != 0);
        let quotient = low.div_ceil(prime).max(prime);
        let multiple = prime
            .checked_mul(quotient)
            .ok_or_else(|| overflow(prime))?;
        if multiple > stop {
            return Ok(None);
        }
        let init = &self.init[(quotient % self.modulus) as usize];
        let mut multiple = multiple
            .checked_add(prime * init.next_multiple_factor as u64)
            .ok_or_else(|| overflow(prime))?;
        let row = CLASS_INDEX[(prime % 30) as usize];
        debug_assert_ne!(row, 0xff);
        let mut index = row as u32 * self.totatives as u32 + init.wheel_index as u32;
        if multiple == low + 1 {
            // The residue-1 value low+1 is the top bit of the byte *before*
            // the segment base; its segment has already been sieved. Step to
            // the next wheel multiple.
            let e = self.element(index);
            multiple = multiple
                .checked_add(prime * e.next_multiple_factor as u64)
                .ok_or_else(|| overflow(prime))?;
            index = e.next as u32;
        }
        if multiple > stop {
            return Ok(None);
        }
        Ok(Some((multiple, index)))
    }
}

fn overflow(prime: u64) -> Error {
    Error::out_of_range(format!(
        "first multiple of sieving prime {} overflows the segment arithmetic",
        prime
    ))
}

/// Byte index of a wheel candidate value (v ≥ 7), counted from value 0.
#[inline]
pub fn byte_of(v: u64) -> u64 {
    (v - 7) / 30
}

/// The default mod-30 wheel backing the segment bitmap.
pub fn wheel30() -> &'static Wheel {
    static WHEEL30: OnceLock<Wheel> = OnceLock::new();
    WHEEL30.get_or_init(|| Wheel::build(30))
}

/// The mod-210 wheel used by the large-prime crossing paths.
pub fn wheel210() -> &'static Wheel {
    static WHEEL210: OnceLock<Wheel> = OnceLock::new();
    WHEEL210.get_or_init(|| Wheel::build(210))
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

#[cfg(test)]
mod tests {
    //! The crossing tables are verified against brute force: walking a wheel
    //! from `first_multiple` must visit exactly the multiples p·f with f
    //! coprime to the modulus, in order, under the byte/bit mapping.

    use super::*;

    #[test]
    fn wheel_shapes() {
        assert_eq!(wheel30().totatives, 8);
        assert_eq!(wheel210().totatives, 48);
        // The documented worst-case overshoot: ≤ 10 factor steps.
        assert!(wheel30().max_factor_gap <= 10);
        assert_eq!(wheel210().max_factor_gap, 10);
    }

    #[test]
    fn bit_mapping_round_trips() {
        for byte in 0..4u64 {
            for (bit, &val) in BIT_VALUES.iter().enumerate() {
                let v = byte * 30 + val;
                assert_eq!(byte_of(v), byte);
                assert_eq!(RESIDUE_BIT[(v % 30) as usize] as usize, bit);
            }
        }
    }

    /// Walk `steps` crossings from `first_multiple(p, low, stop)` and return
    /// the visited (byte, bit) pairs.
    fn table_walk(wheel: &Wheel, p: u64, low: u64, steps: usize) -> Vec<(u64, u8)> {
        let (multiple, mut wi) = wheel
            .first_multiple(p, low, u64::MAX / 2)
            .unwrap()
            .expect("multiple in range");
        let t = p / 30;
        let mut byte = byte_of(multiple - low);
        let mut out = Vec::with_capacity(steps);
        for _ in 0..steps {
            let e = wheel.element(wi);
            let bit = (!e.unset_bit).trailing_zeros() as u8;
            out.push((byte, bit));
            byte += e.next_multiple_factor as u64 * t + e.correct as u64;
            wi = e.next as u32;
        }
        out
    }

    /// Brute-force multiples of p that are ≥ max(p², low), coprime to the
    /// wheel modulus, mapped to (byte, bit) relative to `low`.
    fn naive_walk(modulus: u64, p: u64, low: u64, steps: usize) -> Vec<(u64, u8)> {
        let first = low.div_ceil(p).max(p);
        (first..)
            .map(|q| p * q)
            .filter(|m| gcd(m % modulus, modulus) == 1)
            .filter(|&m| m >= low + 7) // low+1 sits in the previous segment
            .take(steps)
            .map(|m| {
                (
                    byte_of(m - low),
                    RESIDUE_BIT[(m % 30) as usize],
                )
            })
            .collect()
    }

    #[test]
    fn mod30_walk_matches_brute_force() {
        for &p in &[7u64, 11, 13, 17, 19, 23, 29, 31, 37, 97, 101, 1009] {
            for &low in &[0u64, 30, 990, 121 * 30] {
                assert_eq!(
                    table_walk(wheel30(), p, low, 40),
                    naive_walk(30, p, low, 40),
                    "p={} low={}",
                    p,
                    low
                );
            }
        }
    }

    #[test]
    fn mod210_walk_matches_brute_force() {
        for &p in &[11u64, 13, 17, 19, 23, 29, 31, 37, 97, 211, 1013] {
            for &low in &[0u64, 30, 2100, 44 * 30] {
                assert_eq!(
                    table_walk(wheel210(), p, low, 100),
                    naive_walk(210, p, low, 100),
                    "p={} low={}",
                    p,
                    low
                );
            }
        }
    }

    #[test]
    fn eight_steps_return_to_start_residue() {
        let wheel = wheel30();
        for row in 0..8u32 {
            let mut wi = row * 8;
            for _ in 0..8 {
                wi = wheel.element(wi).next as u32;
            }
            assert_eq!(wi, row * 8, "row {} does not close after 8 steps", row);
        }
    }

    #[test]
    fn first_multiple_is_at_least_square_and_low() {
        let wheel = wheel30();
        for &p in &[7u64, 11, 31, 97] {
            for &low in &[0u64, 100, 10_000] {
                let (m, _) = wheel.first_multiple(p, low, u64::MAX / 2).unwrap().unwrap();
                assert!(m >= p * p);
                assert!(m >= low);
                assert_eq!(gcd(m % 30, 30), 1);
            }
        }
    }

    #[test]
    fn first_multiple_past_stop_is_none() {
        // 7² = 49 > 40, and no smaller coprime multiple exists.
        assert_eq!(wheel30().first_multiple(7, 0, 40).unwrap(), None);
        // 7·13 = 91 is the residue-1 top bit of the byte before base 90,
        // so the first in-segment multiple is 7·17 = 119.
        let (m, _) = wheel30().first_multiple(7, 90, 1000).unwrap().unwrap();
        assert_eq!(m, 119);
        // From base 60 the same multiple 91 is a regular in-segment bit.
        let (m, _) = wheel30().first_multiple(7, 60, 1000).unwrap().unwrap();
        assert_eq!(m, 77);
    }
}
