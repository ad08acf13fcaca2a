//! # Main — Console Entry Point
//!
//! `primespan [OPTIONS] START STOP` (one number sieves [0, N]). Counting
//! is the default; `--print` streams primes or tuplets one per line, and
//! count orders combine as a digit string (`--count 12` counts primes and
//! twins in one pass).

mod cli;

use anyhow::Result;
use clap::Parser;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "primespan", about = "Count, print or stream primes and prime k-tuplets")]
pub struct Cli {
    /// Start of the interval (or its stop, when only one number is given)
    pub start: u64,

    /// End of the interval
    pub stop: Option<u64>,

    /// Count tuplet orders, combined as digits: 1 primes .. 7 septuplets
    #[arg(short, long, value_name = "ORDERS")]
    pub count: Option<String>,

    /// Print tuplets of one order (1 primes .. 7 septuplets) line by line
    #[arg(short, long, value_name = "ORDER", num_args = 0..=1, default_missing_value = "1")]
    pub print: Option<String>,

    /// Worker threads for counting runs (0 = all logical cores)
    #[arg(short, long, default_value_t = 0)]
    pub threads: usize,

    /// Segment size in KB (1..4096, rounded up to a power of two)
    #[arg(short, long, value_name = "KB")]
    pub size: Option<u32>,

    /// Pre-sieve depth (13..23)
    #[arg(long, value_name = "LIMIT")]
    pub presieve: Option<u32>,

    /// Print numbers only, no labels
    #[arg(short, long)]
    pub quiet: bool,

    /// Suppress the progress percentage
    #[arg(long)]
    pub no_status: bool,

    /// Report elapsed seconds
    #[arg(long)]
    pub time: bool,
}

fn main() -> Result<()> {
    // Structured logging: LOG_FORMAT=json for machines, human-readable otherwise.
    if std::env::var("LOG_FORMAT").unwrap_or_default() == "json" {
        tracing_subscriber::fmt().json().with_target(false).init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let args = Cli::parse();
    cli::run(&args)
}
