//! # Flags — Public Bitfield for `sieve()`
//!
//! A `u32` bitfield below 2²⁰ selects what a sieve run does: count and/or
//! print primes or prime k-tuplets, deliver primes to a callback, and track
//! a completion percentage. Count flags combine freely; print flags and
//! callback modes are mutually exclusive by front-end contract.

use crate::error::{Error, Result};

pub const COUNT_PRIMES: u32 = 1 << 0;
pub const COUNT_TWINS: u32 = 1 << 1;
pub const COUNT_TRIPLETS: u32 = 1 << 2;
pub const COUNT_QUADRUPLETS: u32 = 1 << 3;
pub const COUNT_QUINTUPLETS: u32 = 1 << 4;
pub const COUNT_SEXTUPLETS: u32 = 1 << 5;
pub const COUNT_SEPTUPLETS: u32 = 1 << 6;
pub const PRINT_PRIMES: u32 = 1 << 7;
pub const PRINT_TWINS: u32 = 1 << 8;
pub const PRINT_TRIPLETS: u32 = 1 << 9;
pub const PRINT_QUADRUPLETS: u32 = 1 << 10;
pub const PRINT_QUINTUPLETS: u32 = 1 << 11;
pub const PRINT_SEXTUPLETS: u32 = 1 << 12;
pub const PRINT_SEPTUPLETS: u32 = 1 << 13;
pub const CALLBACK32_PRIMES: u32 = 1 << 14;
pub const CALLBACK64_PRIMES: u32 = 1 << 15;
pub const CALLBACK32_CONTEXT_PRIMES: u32 = 1 << 16;
pub const CALLBACK64_CONTEXT_PRIMES: u32 = 1 << 17;
pub const CALCULATE_STATUS: u32 = 1 << 18;
pub const PRINT_STATUS: u32 = 1 << 19;

/// All seven count flags.
pub const COUNT_MASK: u32 = 0x7f;
/// All seven print flags.
pub const PRINT_MASK: u32 = 0x7f << 7;
/// All four callback modes.
pub const CALLBACK_MASK: u32 =
    CALLBACK32_PRIMES | CALLBACK64_PRIMES | CALLBACK32_CONTEXT_PRIMES | CALLBACK64_CONTEXT_PRIMES;

/// Count flag for k-tuplets of the given order (1 = primes, 2 = twins, ...).
#[inline]
pub fn count_flag(order: usize) -> u32 {
    debug_assert!((1..=7).contains(&order));
    1 << (order - 1)
}

/// Print flag for k-tuplets of the given order.
#[inline]
pub fn print_flag(order: usize) -> u32 {
    debug_assert!((1..=7).contains(&order));
    1 << (order + 6)
}

/// Reject bitfields outside the legal window.
pub fn validate(flags: u32) -> Result<()> {
    if flags >= 1 << 20 {
        return Err(Error::invalid_argument(format!(
            "flags must be < 2^20, got {:#x}",
            flags
        )));
    }
    Ok(())
}
