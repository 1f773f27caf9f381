//! Drives an output line through a framed bit sequence at a fixed rate.

use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use tracing::{info, warn};

use crate::error::{LinkError, Result};
use crate::link::cancel::CancelToken;
use crate::link::line::{LineGuard, OutputLine};
use crate::link::log::RunLog;
use crate::phy::Bit;
use crate::timing::{SleepCalibration, precise_sleep};

/// Outcome of a transmission run.
#[derive(Debug)]
pub struct TransmitSummary {
    pub log: RunLog,
    pub transmitted: usize,
    pub failed: usize,
    pub cancelled: bool,
}

/// Clocks bits out on an output line, one per symbol period.
///
/// Each attempt is logged whether the line write succeeds or not; a
/// failed write becomes an `Unknown` symbol and the loop moves straight
/// on to the next bit boundary. Retrying would push every following bit
/// off its slot, so drops are terminal per bit and only ever surface in
/// the aggregate counts.
pub struct Transmitter {
    frequency_hz: f64,
    cycles: u32,
    cancel: CancelToken,
    calibration: SleepCalibration,
}

impl Transmitter {
    pub fn new(frequency_hz: f64, cycles: u32, cancel: CancelToken) -> Result<Self> {
        if !(frequency_hz > 0.0) {
            return Err(LinkError::InvalidConfig(format!(
                "frequency must be positive, got {frequency_hz} Hz"
            )));
        }
        if cycles == 0 {
            return Err(LinkError::InvalidConfig("cycles must be at least 1".into()));
        }
        Ok(Self {
            frequency_hz,
            cycles,
            cancel,
            calibration: SleepCalibration::new(),
        })
    }

    /// Drive `line` through `bits`, repeated over the configured cycles.
    ///
    /// The line is reset to 0 on every exit path, including cancellation.
    pub fn run<L: OutputLine>(
        &mut self,
        line: &mut L,
        bits: &[Bit],
        progress: Option<&ProgressBar>,
    ) -> TransmitSummary {
        let period = 1.0 / self.frequency_hz;
        let mut log = RunLog::new();
        let mut transmitted = 0usize;
        let mut failed = 0usize;
        let mut cancelled = false;

        let mut line = LineGuard::new(line);
        let run_start = Instant::now();

        'run: for _ in 0..self.cycles {
            for &bit in bits {
                if self.cancel.is_cancelled() {
                    cancelled = true;
                    break 'run;
                }

                let bit_start = Instant::now();
                debug_assert!(bit != Bit::Unknown, "cannot transmit an unknown bit");
                let level = bit.level().unwrap_or(0);

                match line.set_level(level) {
                    Ok(()) => {
                        transmitted += 1;
                        log.push(run_start.elapsed(), bit, None);
                    }
                    Err(reason) => {
                        failed += 1;
                        log.push(
                            run_start.elapsed(),
                            Bit::Unknown,
                            Some(format!("bit dropped: {reason}")),
                        );
                    }
                }

                if let Some(pb) = progress {
                    pb.inc(1);
                    if failed > 0 {
                        pb.set_message(format!("{failed} failed"));
                    }
                }

                let residual = period - bit_start.elapsed().as_secs_f64();
                precise_sleep(&mut self.calibration, residual);
            }
        }

        drop(line);
        if cancelled {
            warn!("Transmission interrupted, line reset");
        }
        info!("Transmitted: {transmitted}\t Failed: {failed}");

        TransmitSummary {
            log,
            transmitted,
            failed,
            cancelled,
        }
    }

    /// Hold the line at a fixed level until cancelled, then release it.
    pub fn hold_level<L: OutputLine>(&self, line: &mut L, level: u8) {
        let mut line = LineGuard::new(line);
        if let Err(reason) = line.set_level(level) {
            warn!("Failed to set line level: {reason}");
        }
        info!("Holding line at {level}, press Ctrl-C to release");
        while !self.cancel.is_cancelled() {
            std::thread::sleep(Duration::from_millis(50));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::line::SimulatedLine;
    use crate::phy::alternating_bits;

    fn fast_transmitter(cycles: u32, cancel: CancelToken) -> Transmitter {
        Transmitter::new(1000.0, cycles, cancel).unwrap()
    }

    #[test]
    fn test_rejects_zero_frequency() {
        assert!(Transmitter::new(0.0, 1, CancelToken::new()).is_err());
    }

    #[test]
    fn test_logs_every_bit_and_resets_line() {
        let bits = alternating_bits(16);
        let mut line = SimulatedLine::open().unwrap();
        let mut tx = fast_transmitter(1, CancelToken::new());

        let summary = tx.run(&mut line, &bits, None);

        assert_eq!(summary.transmitted, 16);
        assert_eq!(summary.failed, 0);
        assert!(!summary.cancelled);
        assert_eq!(summary.log.len(), 16);
        assert_eq!(summary.log.bits(), bits);
        // Final write is the guard releasing the line
        assert_eq!(line.current_level(), 0);

        // Indices contiguous, timestamps monotonic
        let symbols = summary.log.symbols();
        for pair in symbols.windows(2) {
            assert_eq!(pair[1].index, pair[0].index + 1);
            assert!(pair[0].elapsed <= pair[1].elapsed);
        }
    }

    #[test]
    fn test_cycles_repeat_the_sequence() {
        let bits = alternating_bits(8);
        let mut line = SimulatedLine::open().unwrap();
        let mut tx = fast_transmitter(3, CancelToken::new());

        let summary = tx.run(&mut line, &bits, None);
        assert_eq!(summary.log.len(), 24);
        assert_eq!(summary.log.bits()[..8], summary.log.bits()[8..16]);
    }

    #[test]
    fn test_dropped_writes_become_unknown_symbols() {
        let bits = alternating_bits(8);
        let mut line = SimulatedLine::with_failing_writes(vec![2, 5]);
        let mut tx = fast_transmitter(1, CancelToken::new());

        let summary = tx.run(&mut line, &bits, None);

        assert_eq!(summary.transmitted, 6);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.log.len(), 8);
        assert_eq!(summary.log.symbols()[2].bit, Bit::Unknown);
        assert!(
            summary.log.symbols()[2]
                .note
                .as_deref()
                .unwrap()
                .starts_with("bit dropped")
        );
        // The run keeps going after a drop
        assert_eq!(summary.log.symbols()[3].bit, bits[3]);
    }

    #[test]
    fn test_cancellation_stops_the_run_and_resets_the_line() {
        let bits = alternating_bits(8);
        let mut line = SimulatedLine::open().unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut tx = fast_transmitter(1, cancel);

        let summary = tx.run(&mut line, &bits, None);
        assert!(summary.cancelled);
        assert!(summary.log.is_empty());
        assert_eq!(line.current_level(), 0);
        // The guard still wrote the release level
        assert_eq!(line.levels(), &[0]);
    }

    #[test]
    fn test_hold_level_releases_on_cancel() {
        let mut line = SimulatedLine::open().unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let tx = fast_transmitter(1, cancel);

        tx.hold_level(&mut line, 1);
        assert_eq!(line.levels(), &[1, 0]);
    }
}
