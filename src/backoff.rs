//! Contention backoff for CAS retry loops.

use core::hint;
use std::thread;

/// Alternating spin/yield backoff.
///
/// Called with the 0-based index of the failed attempt. Odd attempts give up the rest of the
/// thread's time slice; even attempts busy-wait for a fixed number of pause instructions. Backoff
/// only shapes throughput, never correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    spins: u32,
}

impl Backoff {
    /// Number of pause iterations used on even retries by default.
    pub const DEFAULT_SPINS: u32 = 64;

    /// Creates a backoff with [`Backoff::DEFAULT_SPINS`].
    pub const fn new() -> Self {
        Self::with_spins(Self::DEFAULT_SPINS)
    }

    /// Creates a backoff that spins `spins` times on even retries. `0` disables spinning.
    pub const fn with_spins(spins: u32) -> Self {
        Self { spins }
    }

    /// Returns the spin length.
    pub const fn spins(&self) -> u32 {
        self.spins
    }

    #[inline]
    fn step(&self, retry: usize) -> Step {
        if retry & 1 != 0 {
            Step::Yield
        } else {
            Step::Spin(self.spins)
        }
    }

    /// Backs off after the `retry`-th failed attempt.
    #[inline]
    pub fn snooze(&self, retry: usize) {
        match self.step(retry) {
            Step::Yield => thread::yield_now(),
            Step::Spin(spins) => {
                // Must not be an empty loop: the optimizer would delete it.
                for _ in 0..spins {
                    hint::spin_loop();
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Yield,
    Spin(u32),
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}
