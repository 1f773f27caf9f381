//! Sub-millisecond waits on top of a coarse OS sleep.
//!
//! A plain `thread::sleep` routinely overshoots by whole scheduler quanta,
//! which is useless when the bit period itself is under a millisecond.
//! The strategy: coarse-sleep while the remaining time is safely above the
//! observed cost of one coarse sleep, then spin out the tail.

use std::thread;
use std::time::Instant;

use crate::utils::RunningStats;
use crate::utils::consts::{COARSE_SLEEP, SLEEP_SEED_SECONDS};

/// Adaptive estimate of how long one coarse sleep quantum really takes.
///
/// The estimate describes host scheduler behaviour, not any particular
/// request, so one value lives as long as the loop that owns it and is
/// threaded by `&mut` through every wait call. It converges over repeated
/// calls as observations accumulate.
#[derive(Debug, Clone)]
pub struct SleepCalibration {
    stats: RunningStats,
    threshold: f64,
}

impl SleepCalibration {
    pub fn new() -> Self {
        Self {
            stats: RunningStats::new(),
            threshold: SLEEP_SEED_SECONDS,
        }
    }

    /// Crossover point below which we stop coarse-sleeping and spin.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn observe(&mut self, observed_seconds: f64) {
        self.stats.observe(observed_seconds);
        self.threshold = self.stats.mean() + self.stats.stddev();
    }
}

impl Default for SleepCalibration {
    fn default() -> Self {
        Self::new()
    }
}

/// Delay for `seconds`, coarse-sleeping while the remainder exceeds the
/// calibrated quantum cost and busy-waiting the rest.
///
/// Zero and negative requests return immediately.
pub fn precise_sleep(calibration: &mut SleepCalibration, seconds: f64) {
    if seconds <= 0.0 {
        return;
    }

    let start = Instant::now();
    let mut remaining = seconds;

    while remaining > calibration.threshold() {
        let before = Instant::now();
        thread::sleep(COARSE_SLEEP);
        let observed = before.elapsed().as_secs_f64();
        remaining -= observed;
        calibration.observe(observed);
    }

    // Spin out the tail; no scheduling yield, precision is the whole point.
    while start.elapsed().as_secs_f64() < seconds {
        std::hint::spin_loop();
    }
}
