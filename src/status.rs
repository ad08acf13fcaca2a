//! # Status — Shared Sieve Progress
//!
//! Workers advance one atomic counter of processed integers; a mutex guards
//! only the printed line so the `\r`-updated percentage never interleaves.
//! The displayed value is monotone and clamped to 100.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::flags;

pub struct Status {
    total: u64,
    processed: AtomicU64,
    print: bool,
    last_printed: Mutex<i32>,
}

impl Status {
    /// Build shared status tracking when either status flag is set.
    pub fn new(total: u64, sieve_flags: u32) -> Option<Arc<Status>> {
        if sieve_flags & (flags::CALCULATE_STATUS | flags::PRINT_STATUS) == 0 {
            return None;
        }
        let status = Arc::new(Status {
            total,
            processed: AtomicU64::new(0),
            print: sieve_flags & flags::PRINT_STATUS != 0,
            last_printed: Mutex::new(-1),
        });
        if status.print {
            status.print_percent(0);
        }
        Some(status)
    }

    fn percent_of(&self, processed: u64) -> u64 {
        if self.total == 0 {
            return 100;
        }
        (processed as u128 * 100 / self.total as u128).min(100) as u64
    }

    /// Record `span` more processed integers.
    pub fn advance(&self, span: u64) {
        let done = self.processed.fetch_add(span, Ordering::Relaxed) + span;
        if self.print {
            self.print_percent(self.percent_of(done));
        }
    }

    fn print_percent(&self, percent: u64) {
        let mut last = self.last_printed.lock().unwrap();
        if percent as i32 > *last {
            *last = percent as i32;
            print!("\r{}%", percent);
            let _ = std::io::stdout().flush();
        }
    }

    /// Force 100% after all workers joined.
    pub fn finalize(&self) {
        self.processed.store(self.total, Ordering::Relaxed);
        if self.print {
            self.print_percent(100);
            println!();
        }
    }

    /// Current percentage in [0, 100].
    pub fn percent(&self) -> f64 {
        self.percent_of(self.processed.load(Ordering::Relaxed)) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn no_status_without_flags() {
        assert!(Status::new(100, flags::COUNT_PRIMES).is_none());
        assert!(Status::new(100, flags::CALCULATE_STATUS).is_some());
    }

    #[test]
    fn percent_is_clamped_and_monotone() {
        let st = Status::new(200, flags::CALCULATE_STATUS).unwrap();
        assert_eq!(st.percent(), 0.0);
        st.advance(50);
        assert_eq!(st.percent(), 25.0);
        st.advance(300); // overshoot clamps
        assert_eq!(st.percent(), 100.0);
        st.finalize();
        assert_eq!(st.percent(), 100.0);
    }

    #[test]
    fn concurrent_advances_sum_exactly() {
        let st = Status::new(8_000, flags::CALCULATE_STATUS).unwrap();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let st = Arc::clone(&st);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        st.advance(1);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(st.percent(), 100.0);
    }

    #[test]
    fn zero_length_interval_is_complete() {
        let st = Status::new(0, flags::CALCULATE_STATUS).unwrap();
        assert_eq!(st.percent(), 100.0);
    }
}
