//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim: flag-bitfield
//! assembly, the sieve run, and result formatting.

use anyhow::{bail, Result};
use primespan::{flags, PrimeSieve};

use super::Cli;

const TUPLET_NAMES: [&str; 7] = [
    "Primes",
    "Twin primes",
    "Prime triplets",
    "Prime quadruplets",
    "Prime quintuplets",
    "Prime sextuplets",
    "Prime septuplets",
];

/// Translate the parsed arguments into the engine's flag bitfield.
pub fn flag_bits(cli: &Cli) -> Result<u32> {
    let mut bits = 0u32;

    if let Some(orders) = &cli.print {
        let order = orders.parse::<usize>().unwrap_or(0);
        if !(1..=7).contains(&order) {
            bail!("--print takes a tuplet order between 1 and 7");
        }
        bits |= flags::print_flag(order);
    }

    if let Some(orders) = &cli.count {
        for ch in orders.chars() {
            let order = ch.to_digit(10).unwrap_or(0) as usize;
            if !(1..=7).contains(&order) {
                bail!("--count takes tuplet orders between 1 and 7, e.g. 12 for primes and twins");
            }
            bits |= flags::count_flag(order);
        }
    }

    // Counting primes is the default job.
    if bits == 0 {
        bits |= flags::COUNT_PRIMES;
    }
    if !cli.no_status && !cli.quiet && bits & flags::PRINT_MASK == 0 {
        bits |= flags::PRINT_STATUS;
    }
    Ok(bits)
}

/// Run the sieve and report counts and timing.
pub fn run(cli: &Cli) -> Result<()> {
    let (start, stop) = match (cli.start, cli.stop) {
        (start, Some(stop)) => (start, stop),
        (stop, None) => (0, stop),
    };

    let bits = flag_bits(cli)?;
    let mut sieve = PrimeSieve::new();
    sieve.set_flags(bits)?;
    sieve.set_threads(cli.threads);
    if let Some(kb) = cli.size {
        sieve.set_sieve_size(kb);
    }
    if let Some(limit) = cli.presieve {
        sieve.set_pre_sieve(limit);
    }

    sieve.sieve(start, stop)?;

    for order in 1..=7 {
        if bits & flags::count_flag(order) != 0 {
            if cli.quiet {
                println!("{}", sieve.counts().order(order));
            } else {
                println!("{}: {}", TUPLET_NAMES[order - 1], sieve.counts().order(order));
            }
        }
    }
    if cli.time {
        println!("Seconds: {:.3}", sieve.seconds());
    }
    Ok(())
}
