use clap::{Parser, Subcommand};
use tracing::{error, info};

use lightlink_rs::error::{LinkError, Result};
use lightlink_rs::link::csv::write_transmit_log;
use lightlink_rs::link::{CancelToken, LinkConfig, SimulatedLine, Transmitter};
use lightlink_rs::phy::{Framer, alternating_bits, random_bits};
use lightlink_rs::ui::progress::templates;
use lightlink_rs::ui::symbol_bar;
use lightlink_rs::utils::consts::DEFAULT_GENERATED_BITS;
use lightlink_rs::utils::logging::init_logging;

#[derive(Parser)]
#[command(version, about = "Clocks framed bit sequences out on the transmitter line")]
struct Cli {
    /// Symbol rate in Hz (overrides the config file)
    #[arg(short, long)]
    frequency: Option<f64>,

    /// Repeat the transmission this many times (overrides the config file)
    #[arg(short, long)]
    cycles: Option<u32>,

    /// Output CSV name, without extension
    #[arg(short, long)]
    output: Option<String>,

    /// JSON link configuration file
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Frame a text message and transmit it
    Message { text: String },
    /// Transmit randomly generated bits
    Random {
        #[arg(default_value_t = DEFAULT_GENERATED_BITS)]
        bits: usize,
    },
    /// Transmit an alternating 0/1 pattern for bit-clock validation
    Pattern {
        #[arg(default_value_t = DEFAULT_GENERATED_BITS)]
        bits: usize,
    },
    /// Hold the line at a fixed state until interrupted
    State {
        /// on or off
        state: String,
    },
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
    if let Some(cycles) = cli.cycles {
        config.cycles = cycles;
    }
    config.validate()?;

    let cancel = CancelToken::new();
    cancel.install_ctrlc_handler();

    // In-memory line; a GPIO driver slots in behind `OutputLine` on the
    // deployment rig.
    let mut line = SimulatedLine::open()?;

    let bits = match &cli.command {
        Commands::State { state } => {
            let level = parse_state(state)?;
            let transmitter = Transmitter::new(config.frequency_hz, config.cycles, cancel)?;
            transmitter.hold_level(&mut line, level);
            return Ok(());
        }
        Commands::Message { text } => {
            let framer = Framer::new(&config.preamble, &config.terminator, config.chunk_size);
            framer.encode_message(text.as_bytes())
        }
        Commands::Random { bits } => random_bits(*bits),
        Commands::Pattern { bits } => alternating_bits(*bits),
    };

    info!(
        "Transmitting {} bits at {} Hz over {} cycle(s)",
        bits.len(),
        config.frequency_hz,
        config.cycles
    );

    let mut transmitter = Transmitter::new(config.frequency_hz, config.cycles, cancel)?;
    let pb = symbol_bar(
        bits.len() as u64 * config.cycles as u64,
        templates::TRANSMIT,
    );
    let summary = transmitter.run(&mut line, &bits, Some(&pb));
    pb.finish();

    let output = cli.output.unwrap_or_else(|| {
        format!(
            "transmitter_{}bits_{}hz_{}cycles",
            bits.len(),
            config.frequency_hz,
            config.cycles
        )
    });
    let path = format!("{output}.csv");
    write_transmit_log(&path, &summary.log)?;
    info!("Run log written to {path}");
    Ok(())
}

fn parse_state(input: &str) -> Result<u8> {
    match input.to_ascii_lowercase().as_str() {
        "on" => Ok(1),
        "off" => Ok(0),
        other => Err(LinkError::InvalidConfig(format!(
            "state must be on or off, got {other:?}"
        ))),
    }
}
