use std::path::Path;

use clap::Parser;
use tracing::{error, info};

use lightlink_rs::error::{LinkError, Result};
use lightlink_rs::link::csv::{read_capture_log, write_capture_log};
use lightlink_rs::link::{
    CalibrationBaseline, CancelToken, DecodeMode, LinkConfig, Receiver, VecSource,
};
use lightlink_rs::phy::Bit;
use lightlink_rs::ui::progress::templates;
use lightlink_rs::ui::symbol_bar;
use lightlink_rs::utils::logging::init_logging;

#[derive(Parser)]
#[command(version, about = "Decodes an intensity capture into a received bit log")]
struct Cli {
    /// Capture CSV of per-frame channel intensities
    #[arg(short, long)]
    input: String,

    /// "Line held on" calibration capture CSV
    #[arg(long)]
    on: Option<String>,

    /// "Line held off" calibration capture CSV
    #[arg(long)]
    off: Option<String>,

    /// Treat the capture as raw ADC codes and rescale to volts instead of
    /// decoding bits
    #[arg(long, conflicts_with_all = ["on", "off"])]
    raw: bool,

    /// Replay the capture through the paced sampling loop at the
    /// configured rate, timestamping each sample off the wall clock
    #[arg(long)]
    paced: bool,

    /// Sampling rate of the capture in Hz (overrides the config file)
    #[arg(short, long)]
    frequency: Option<f64>,

    /// Output CSV name, without extension
    #[arg(short, long)]
    output: Option<String>,

    /// JSON link configuration file
    #[arg(long)]
    config: Option<String>,
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => LinkConfig::from_json_file(path)?,
        None => LinkConfig::default(),
    };
    if let Some(frequency) = cli.frequency {
        config.frequency_hz = frequency;
    }
    config.validate()?;

    let frames: Vec<[f64; 3]> = read_capture_log(&cli.input)?
        .iter()
        .map(|sample| sample.channels)
        .collect();
    info!("Read {} frames from {}", frames.len(), cli.input);

    let mode = if cli.raw {
        DecodeMode::raw_analog_default()
    } else {
        let (on, off) = match (&cli.on, &cli.off) {
            (Some(on), Some(off)) => (on, off),
            _ => {
                return Err(LinkError::InvalidConfig(
                    "calibration captures (--on and --off) or --raw are required".into(),
                ));
            }
        };
        let on_frames: Vec<[f64; 3]> = read_capture_log(on)?
            .iter()
            .map(|sample| sample.channels)
            .collect();
        let off_frames: Vec<[f64; 3]> = read_capture_log(off)?
            .iter()
            .map(|sample| sample.channels)
            .collect();
        let baseline =
            CalibrationBaseline::from_captures(&on_frames, &off_frames, config.decision_channel)?;
        info!(
            "Decision threshold {:.2} on channel {} (on {:.2} / off {:.2})",
            baseline.threshold,
            config.decision_channel,
            baseline.on_level[config.decision_channel],
            baseline.off_level[config.decision_channel]
        );
        DecodeMode::Calibrated(baseline)
    };

    let samples = if cli.paced {
        let cancel = CancelToken::new();
        cancel.install_ctrlc_handler();
        let mut receiver = Receiver::new(config.frequency_hz, mode, cancel)?;
        let pb = symbol_bar(frames.len() as u64, templates::SAMPLE);
        let mut source = VecSource::new(frames);
        let summary = receiver.run(&mut source, Some(&pb));
        pb.finish();
        summary.samples
    } else {
        let receiver = Receiver::new(config.frequency_hz, mode, CancelToken::new())?;
        receiver.decode_capture(&frames)
    };

    let undecoded = samples.iter().filter(|s| s.bit == Bit::Unknown).count();
    info!(
        "Decoded: {}\t Undecoded: {}",
        samples.len() - undecoded,
        undecoded
    );

    let output = cli.output.unwrap_or_else(|| {
        let stem = Path::new(&cli.input)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("capture");
        format!("{stem}_decoded")
    });
    let path = format!("{output}.csv");
    write_capture_log(&path, &samples)?;
    info!("Capture log written to {path}");
    Ok(())
}
