//! Locates the start of a transmission inside a receiver bit stream.

use crate::error::{LinkError, Result};
use crate::phy::Bit;

/// Integer ratio of the receive sampling rate to the transmit symbol
/// rate. The two must be harmonically related for windowed decoding to
/// be well defined, so anything non-integer is a configuration error.
pub fn decimation_ratio(transmit_hz: f64, receive_hz: f64) -> Result<usize> {
    if !(transmit_hz > 0.0) || !(receive_hz > 0.0) {
        return Err(LinkError::InvalidConfig(format!(
            "rates must be positive, got transmit {transmit_hz} Hz / receive {receive_hz} Hz"
        )));
    }

    let ratio = receive_hz / transmit_hz;
    let rounded = ratio.round();
    if rounded < 1.0 || (ratio - rounded).abs() > 1e-9 {
        return Err(LinkError::RateMismatch {
            transmit_hz,
            receive_hz,
        });
    }
    Ok(rounded as usize)
}

/// Expected receiver-rate rendering of the preamble: each transmitted
/// preamble bit repeated once per receiver sample of its symbol period.
pub fn tracking_pattern(preamble: &[Bit], ratio: usize) -> Result<String> {
    if preamble.is_empty() || ratio == 0 {
        return Err(LinkError::InvalidConfig("alignment pattern is empty".into()));
    }
    Ok(preamble
        .iter()
        .flat_map(|&bit| std::iter::repeat_n(bit.pattern_char(), ratio))
        .collect())
}

/// Flat rendering of a decoded bit stream. `Unknown` becomes `?`, which
/// never occurs in a tracking pattern, so unclassified samples can never
/// fake a match.
pub fn bit_string(bits: &[Bit]) -> String {
    bits.iter().map(|b| b.pattern_char()).collect()
}

/// Index of the first receiver sample of the transmission, found by an
/// exact search for the tracking pattern. There is no retry on failure;
/// a missing pattern means miscalibration or a gross rate mismatch, and
/// no amount of re-searching the same capture will fix that.
pub fn alignment_offset(received: &[Bit], preamble: &[Bit], ratio: usize) -> Result<usize> {
    let pattern = tracking_pattern(preamble, ratio)?;
    bit_string(received)
        .find(&pattern)
        .ok_or(LinkError::AlignmentFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREAMBLE: [Bit; 3] = [Bit::One, Bit::One, Bit::Zero];

    #[test]
    fn test_ratio_must_be_integer() {
        assert_eq!(decimation_ratio(25.0, 100.0).unwrap(), 4);
        assert_eq!(decimation_ratio(25.0, 25.0).unwrap(), 1);
        assert!(matches!(
            decimation_ratio(25.0, 90.0),
            Err(LinkError::RateMismatch { .. })
        ));
        // A receiver slower than the transmitter can never window-decode
        assert!(decimation_ratio(100.0, 25.0).is_err());
        assert!(decimation_ratio(0.0, 100.0).is_err());
    }

    #[test]
    fn test_tracking_pattern_repeats_each_bit() {
        assert_eq!(tracking_pattern(&PREAMBLE, 1).unwrap(), "110");
        assert_eq!(tracking_pattern(&PREAMBLE, 3).unwrap(), "111111000");
        assert!(tracking_pattern(&[], 2).is_err());
    }

    #[test]
    fn test_offset_of_clean_stream_is_zero() {
        let received = [Bit::One, Bit::One, Bit::One, Bit::One, Bit::Zero, Bit::Zero];
        assert_eq!(alignment_offset(&received, &PREAMBLE, 2).unwrap(), 0);
    }

    #[test]
    fn test_offset_skips_leading_noise() {
        let mut received = vec![Bit::Zero, Bit::Zero, Bit::One];
        received.extend([Bit::One, Bit::One, Bit::Zero]);
        assert_eq!(alignment_offset(&received, &PREAMBLE, 1).unwrap(), 3);
    }

    #[test]
    fn test_unknown_samples_never_match() {
        let received = [Bit::One, Bit::Unknown, Bit::Zero, Bit::One, Bit::One, Bit::Zero];
        assert_eq!(alignment_offset(&received, &PREAMBLE, 1).unwrap(), 3);
    }

    #[test]
    fn test_missing_pattern_is_a_distinct_failure() {
        let received = [Bit::Zero; 16];
        assert!(matches!(
            alignment_offset(&received, &PREAMBLE, 2),
            Err(LinkError::AlignmentFailed)
        ));
    }
}
