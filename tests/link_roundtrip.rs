use lightlink_rs::analysis::compute_ber;
use lightlink_rs::link::{
    CalibrationBaseline, CancelToken, DecodeMode, Receiver, SimulatedLine, Transmitter, VecSource,
};
use lightlink_rs::phy::{Bit, Framer};

const ON_FRAME: [f64; 3] = [200.0, 60.0, 50.0];
const OFF_FRAME: [f64; 3] = [40.0, 35.0, 30.0];

fn baseline() -> CalibrationBaseline {
    CalibrationBaseline::from_captures(&[ON_FRAME; 20], &[OFF_FRAME; 20], 0).unwrap()
}

fn preamble_bits(framer: &Framer) -> Vec<Bit> {
    framer.preamble().to_vec()
}

/// Render transmitted bits as the intensity frames a noiseless receiver
/// would capture, one frame per receiver sample.
fn capture_frames(bits: &[Bit], ratio: usize) -> Vec<[f64; 3]> {
    bits.iter()
        .flat_map(|&bit| {
            let frame = if bit == Bit::One { ON_FRAME } else { OFF_FRAME };
            std::iter::repeat_n(frame, ratio)
        })
        .collect()
}

#[test]
fn single_letter_frame_round_trip_without_hardware() {
    // 'A' = 0x41, low bit set: 7-bit preamble + parity 1 + 8 payload
    // bits + 8-bit terminator = 24 bits on the wire
    let framer = Framer::new_default();
    let frame_bits = framer.encode_message(b"A");
    assert_eq!(frame_bits.len(), 24);

    // Clock the frame out on an in-memory line at 1 kHz
    let mut line = SimulatedLine::open().unwrap();
    let mut transmitter = Transmitter::new(1000.0, 1, CancelToken::new()).unwrap();
    let summary = transmitter.run(&mut line, &frame_bits, None);
    assert_eq!(summary.transmitted, 24);
    assert_eq!(summary.failed, 0);
    assert_eq!(line.current_level(), 0);

    // Sample the noiseless channel at four times the symbol rate
    let ratio = 4;
    let transmitted = summary.log.bits();
    let frames = capture_frames(&transmitted, ratio);
    let receiver = Receiver::new(4000.0, DecodeMode::Calibrated(baseline()), CancelToken::new())
        .unwrap();
    let samples = receiver.decode_capture(&frames);
    let received: Vec<Bit> = samples.iter().map(|s| s.bit).collect();

    let report = compute_ber(
        &transmitted,
        &received,
        1000.0,
        4000.0,
        &preamble_bits(&framer),
    )
    .unwrap();

    assert_eq!(report.offset, 0);
    assert_eq!(report.ratio, ratio);
    assert_eq!(report.compared, 24);
    assert_eq!(report.errors, 0);
    assert_eq!(report.ber_percent(), 0.0);
}

#[test]
fn multi_frame_message_survives_the_paced_sampling_loop() {
    let framer = Framer::new_default();
    let message = b"Rust links!"; // two chunks: 8 + 3 payload bytes
    let frame_bits = framer.encode_message(message);
    assert_eq!(
        frame_bits.len(),
        framer.frame_len(8) + framer.frame_len(3)
    );

    let mut line = SimulatedLine::open().unwrap();
    let mut transmitter = Transmitter::new(2000.0, 1, CancelToken::new()).unwrap();
    let transmitted = transmitter.run(&mut line, &frame_bits, None).log.bits();

    // Drive the live sampling loop from an in-memory source at twice the
    // symbol rate
    let ratio = 2;
    let mut source = VecSource::new(capture_frames(&transmitted, ratio));
    let mut receiver = Receiver::new(4000.0, DecodeMode::Calibrated(baseline()), CancelToken::new())
        .unwrap();
    let capture = receiver.run(&mut source, None);
    assert!(!capture.cancelled);
    assert_eq!(capture.sampled, transmitted.len() * ratio);

    let received: Vec<Bit> = capture.samples.iter().map(|s| s.bit).collect();
    let report = compute_ber(
        &transmitted,
        &received,
        2000.0,
        4000.0,
        &preamble_bits(&framer),
    )
    .unwrap();

    assert_eq!(report.offset, 0);
    assert_eq!(report.compared, transmitted.len());
    assert_eq!(report.ber_percent(), 0.0);
}

#[test]
fn corrupted_windows_show_up_as_bit_errors() {
    let framer = Framer::new_default();
    let frame_bits = framer.encode_message(b"A");

    let mut line = SimulatedLine::open().unwrap();
    let mut transmitter = Transmitter::new(1000.0, 1, CancelToken::new()).unwrap();
    let transmitted = transmitter.run(&mut line, &frame_bits, None).log.bits();

    let ratio = 4;
    let mut frames = capture_frames(&transmitted, ratio);
    // Invert every sample of one payload bit's window, past the preamble
    let target = 12;
    for frame in frames.iter_mut().skip(target * ratio).take(ratio) {
        *frame = if frame == &ON_FRAME { OFF_FRAME } else { ON_FRAME };
    }

    let receiver = Receiver::new(4000.0, DecodeMode::Calibrated(baseline()), CancelToken::new())
        .unwrap();
    let received: Vec<Bit> = receiver
        .decode_capture(&frames)
        .iter()
        .map(|s| s.bit)
        .collect();

    let report = compute_ber(
        &transmitted,
        &received,
        1000.0,
        4000.0,
        &preamble_bits(&framer),
    )
    .unwrap();

    assert_eq!(report.offset, 0);
    assert_eq!(report.errors, 1);
    assert!((report.ber_percent() - 100.0 / 24.0).abs() < 1e-9);
}
