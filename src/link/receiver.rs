//! Samples an intensity channel and deduces bits against a calibrated
//! threshold.

use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use tracing::{info, warn};

use crate::error::{LinkError, Result};
use crate::link::cancel::CancelToken;
use crate::link::log::FrameSample;
use crate::phy::Bit;
use crate::timing::{SleepCalibration, precise_sleep};
use crate::utils::RunningStats;
use crate::utils::consts::{ADC_FULL_SCALE, ADC_REFERENCE_VOLTS};

/// A lazy, finite source of per-frame intensity readings.
///
/// `None` means the input is exhausted and the run is over; a read that
/// fails comes back as `Some(Err(reason))` so the loop can log the miss
/// and keep its cadence. Sources are not restartable.
pub trait SampleSource {
    fn read(&mut self) -> Option<std::result::Result<[f64; 3], String>>;
}

/// In-memory source for offline runs and tests.
#[derive(Debug, Default)]
pub struct VecSource {
    frames: std::vec::IntoIter<[f64; 3]>,
    reads: usize,
    failing_reads: Vec<usize>,
}

impl VecSource {
    pub fn new(frames: Vec<[f64; 3]>) -> Self {
        Self {
            frames: frames.into_iter(),
            reads: 0,
            failing_reads: Vec::new(),
        }
    }

    /// Fail the given read attempts (0-based, counted across the run).
    pub fn with_failing_reads(frames: Vec<[f64; 3]>, failing_reads: Vec<usize>) -> Self {
        Self {
            frames: frames.into_iter(),
            reads: 0,
            failing_reads,
        }
    }
}

impl SampleSource for VecSource {
    fn read(&mut self) -> Option<std::result::Result<[f64; 3], String>> {
        let attempt = self.reads;
        self.reads += 1;
        let frame = self.frames.next()?;
        if self.failing_reads.contains(&attempt) {
            return Some(Err("sample read failed".into()));
        }
        Some(Ok(frame))
    }
}

/// Measured on/off intensity levels and the derived decision threshold.
///
/// Built once from two labeled calibration captures, then read-only for
/// the rest of the decoding run.
#[derive(Debug, Clone)]
pub struct CalibrationBaseline {
    pub on_level: [f64; 3],
    pub off_level: [f64; 3],
    pub threshold: f64,
    channel: usize,
}

impl CalibrationBaseline {
    /// Derive the baseline from a "line held on" and a "line held off"
    /// capture. The threshold is the midpoint of the two means on the
    /// decision channel.
    pub fn from_captures(on: &[[f64; 3]], off: &[[f64; 3]], channel: usize) -> Result<Self> {
        if channel > 2 {
            return Err(LinkError::InvalidConfig(format!(
                "decision channel must be 0..=2, got {channel}"
            )));
        }
        if on.is_empty() || off.is_empty() {
            return Err(LinkError::InvalidConfig(
                "calibration captures must not be empty".into(),
            ));
        }

        let on_level = channel_means(on);
        let off_level = channel_means(off);
        let threshold = (on_level[channel] + off_level[channel]) / 2.0;
        Ok(Self {
            on_level,
            off_level,
            threshold,
            channel,
        })
    }

    /// Classify one sample: strictly above the threshold reads as on,
    /// strictly below as off, exactly at the threshold as unclassifiable.
    pub fn classify(&self, channels: &[f64; 3]) -> Bit {
        let value = channels[self.channel];
        if value > self.threshold {
            Bit::One
        } else if value < self.threshold {
            Bit::Zero
        } else {
            Bit::Unknown
        }
    }
}

fn channel_means(capture: &[[f64; 3]]) -> [f64; 3] {
    let mut stats = [
        RunningStats::new(),
        RunningStats::new(),
        RunningStats::new(),
    ];
    for frame in capture {
        for (stat, &value) in stats.iter_mut().zip(frame) {
            stat.observe(value);
        }
    }
    [stats[0].mean(), stats[1].mean(), stats[2].mean()]
}

/// How each sample turns into a logged record.
#[derive(Debug, Clone)]
pub enum DecodeMode {
    /// Threshold decoding against a calibration baseline
    Calibrated(CalibrationBaseline),
    /// No baseline: rescale raw ADC codes to volts and store them
    /// undecoded; bit decisions are deferred to the analysis stage
    RawAnalog { reference_volts: f64, full_scale: f64 },
}

impl DecodeMode {
    pub fn raw_analog_default() -> Self {
        DecodeMode::RawAnalog {
            reference_volts: ADC_REFERENCE_VOLTS,
            full_scale: ADC_FULL_SCALE,
        }
    }

    fn decode(&self, channels: [f64; 3]) -> ([f64; 3], Bit) {
        match self {
            DecodeMode::Calibrated(baseline) => (channels, baseline.classify(&channels)),
            DecodeMode::RawAnalog {
                reference_volts,
                full_scale,
            } => {
                let mut scaled = channels;
                for value in &mut scaled {
                    *value = *value * reference_volts / full_scale;
                }
                (scaled, Bit::Unknown)
            }
        }
    }
}

/// Outcome of a sampling run.
#[derive(Debug)]
pub struct CaptureSummary {
    pub samples: Vec<FrameSample>,
    pub sampled: usize,
    pub failed: usize,
    pub cancelled: bool,
}

/// Polls a sample source at a fixed rate and decodes bits as they arrive.
///
/// The loop mirrors the transmitter: read, decode, log, wait out the
/// residual of the sample period, poll for cancellation. A failed read
/// is logged as an `Unknown` sample and never retried.
pub struct Receiver {
    frequency_hz: f64,
    mode: DecodeMode,
    cancel: CancelToken,
    calibration: SleepCalibration,
}

impl Receiver {
    pub fn new(frequency_hz: f64, mode: DecodeMode, cancel: CancelToken) -> Result<Self> {
        if !(frequency_hz > 0.0) {
            return Err(LinkError::InvalidConfig(format!(
                "frequency must be positive, got {frequency_hz} Hz"
            )));
        }
        Ok(Self {
            frequency_hz,
            mode,
            cancel,
            calibration: SleepCalibration::new(),
        })
    }

    /// Poll `source` at the configured rate until it is exhausted or the
    /// run is cancelled.
    pub fn run<S: SampleSource>(
        &mut self,
        source: &mut S,
        progress: Option<&ProgressBar>,
    ) -> CaptureSummary {
        let period = 1.0 / self.frequency_hz;
        let mut samples = Vec::new();
        let mut sampled = 0usize;
        let mut failed = 0usize;
        let mut cancelled = false;

        let run_start = Instant::now();

        loop {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let sample_start = Instant::now();
            match source.read() {
                None => break,
                Some(Ok(channels)) => {
                    sampled += 1;
                    let (channels, bit) = self.mode.decode(channels);
                    samples.push(FrameSample {
                        elapsed: run_start.elapsed(),
                        channels,
                        bit,
                    });
                }
                Some(Err(reason)) => {
                    failed += 1;
                    warn!("Sample read failed: {reason}");
                    samples.push(FrameSample {
                        elapsed: run_start.elapsed(),
                        channels: [0.0; 3],
                        bit: Bit::Unknown,
                    });
                }
            }

            if let Some(pb) = progress {
                pb.inc(1);
                if failed > 0 {
                    pb.set_message(format!("{failed} failed"));
                }
            }

            let residual = period - sample_start.elapsed().as_secs_f64();
            precise_sleep(&mut self.calibration, residual);
        }

        info!("Sampled: {sampled}\t Failed: {failed}");
        CaptureSummary {
            samples,
            sampled,
            failed,
            cancelled,
        }
    }

    /// Decode an already-captured intensity series without pacing.
    ///
    /// Timestamps are reconstructed from the capture rate; this is the
    /// offline path for material recorded by an external frame grabber.
    pub fn decode_capture(&self, frames: &[[f64; 3]]) -> Vec<FrameSample> {
        let period = 1.0 / self.frequency_hz;
        frames
            .iter()
            .enumerate()
            .map(|(i, &frame)| {
                let (channels, bit) = self.mode.decode(frame);
                FrameSample {
                    elapsed: Duration::from_secs_f64(i as f64 * period),
                    channels,
                    bit,
                }
            })
            .collect()
    }
}
