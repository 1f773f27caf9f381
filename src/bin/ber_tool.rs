use clap::Parser;
use tracing::{error, info};

use lightlink_rs::analysis::compute_ber;
use lightlink_rs::error::{LinkError, Result};
use lightlink_rs::link::LinkConfig;
use lightlink_rs::link::csv::{read_capture_log, read_transmit_log};
use lightlink_rs::phy::Bit;
use lightlink_rs::utils::logging::init_logging;

#[derive(Parser)]
#[command(
    version,
    about = "Aligns a transmit log with a receive capture and reports the bit-error rate"
)]
struct Cli {
    /// Transmitter run log CSV
    #[arg(short, long)]
    transmitter: String,

    /// Receiver capture CSV
    #[arg(short, long)]
    receiver: String,

    /// Transmit symbol rate in Hz
    #[arg(long)]
    transmit_rate: f64,

    /// Receive sampling rate in Hz
    #[arg(long)]
    receive_rate: f64,

    /// JSON link configuration file (supplies the preamble)
    #[arg(long)]
    config: Option<String>,
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{e}");
        // Alignment failure means miscalibration or a gross rate
        // mismatch, not bit errors; give it its own exit status.
        let status = match e {
            LinkError::AlignmentFailed => 2,
            _ => 1,
        };
        std::process::exit(status);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => LinkConfig::from_json_file(path)?,
        None => LinkConfig::default(),
    };
    config.validate()?;

    let transmitted: Vec<Bit> = read_transmit_log(&cli.transmitter)?
        .iter()
        .map(|symbol| symbol.bit)
        .collect();
    let received: Vec<Bit> = read_capture_log(&cli.receiver)?
        .iter()
        .map(|sample| sample.bit)
        .collect();
    info!(
        "Comparing {} transmitted bits against {} receiver samples",
        transmitted.len(),
        received.len()
    );

    let preamble: Vec<Bit> = config.preamble.iter().map(|&b| Bit::from_level(b)).collect();
    let report = compute_ber(
        &transmitted,
        &received,
        cli.transmit_rate,
        cli.receive_rate,
        &preamble,
    )?;

    info!("Aligned at receiver sample {}", report.offset);
    info!(
        "Compared: {} of {} transmitted bits\t Errors: {}",
        report.compared,
        transmitted.len(),
        report.errors
    );
    info!("BER: {:.2}%", report.ber_percent());
    Ok(())
}
