//! Windowed majority decoding and bit-error-rate computation.

use tracing::info;

use crate::analysis::alignment::{alignment_offset, decimation_ratio};
use crate::error::Result;
use crate::phy::Bit;

/// Majority vote over one receiver window.
///
/// Ones and zeros are counted; `Unknown` samples count for neither side.
/// Equal counts (a tie on even windows, or a window of nothing but
/// unknowns) decode to `Unknown` rather than a guess.
pub fn majority_vote(window: &[Bit]) -> Bit {
    let mut ones = 0usize;
    let mut zeros = 0usize;
    for &bit in window {
        match bit {
            Bit::One => ones += 1,
            Bit::Zero => zeros += 1,
            Bit::Unknown => {}
        }
    }

    if ones > zeros {
        Bit::One
    } else if zeros > ones {
        Bit::Zero
    } else {
        Bit::Unknown
    }
}

/// Outcome of aligning one transmission against one capture.
#[derive(Debug, Clone, PartialEq)]
pub struct BerReport {
    /// Receiver sample index where the transmission starts
    pub offset: usize,
    /// Receiver samples per transmitted bit
    pub ratio: usize,
    /// Transmitted bits that had a full receiver window; the capture
    /// usually runs out before the transmission does, so this is the BER
    /// denominator, not the nominal bit count
    pub compared: usize,
    /// Compared bits that failed to decode or decoded wrongly
    pub errors: usize,
}

impl BerReport {
    /// Fraction of compared bits not recovered, as a percentage.
    /// An empty comparison reports 0 over 0 bits.
    pub fn ber_percent(&self) -> f64 {
        if self.compared == 0 {
            0.0
        } else {
            100.0 * self.errors as f64 / self.compared as f64
        }
    }
}

/// Score every transmitted bit that has a full receiver window starting
/// at `offset`, returning (compared, errors).
///
/// A window that decodes to `Unknown`, or a transmitted attempt that was
/// itself dropped, counts as an error; neither is ever a match by
/// coincidence.
pub fn score_windows(
    transmitted: &[Bit],
    received: &[Bit],
    offset: usize,
    ratio: usize,
) -> (usize, usize) {
    let mut compared = 0usize;
    let mut errors = 0usize;

    for (i, &sent) in transmitted.iter().enumerate() {
        let start = offset + i * ratio;
        let end = start + ratio;
        if end > received.len() {
            break; // capture ran out before the transmission did
        }

        let decoded = majority_vote(&received[start..end]);
        compared += 1;
        if decoded == Bit::Unknown || sent == Bit::Unknown || decoded != sent {
            errors += 1;
        }
    }

    (compared, errors)
}

/// Align `received` against `transmitted` and score every transmitted
/// bit that has a full receiver window.
pub fn compute_ber(
    transmitted: &[Bit],
    received: &[Bit],
    transmit_hz: f64,
    receive_hz: f64,
    preamble: &[Bit],
) -> Result<BerReport> {
    let ratio = decimation_ratio(transmit_hz, receive_hz)?;
    let offset = alignment_offset(received, preamble, ratio)?;
    info!("Transmission starts at receiver sample {offset} (ratio {ratio})");

    let (compared, errors) = score_windows(transmitted, received, offset, ratio);

    Ok(BerReport {
        offset,
        ratio,
        compared,
        errors,
    })
}
