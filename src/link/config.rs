use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::{LinkError, Result};
use crate::utils::consts::{
    DEFAULT_CYCLES, DEFAULT_DECISION_CHANNEL, DEFAULT_FREQUENCY_HZ, PAYLOAD_SIZE, PREAMBLE,
    TERMINATOR,
};

/// Link-level parameters shared by the transmit and sampling loops.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Symbol rate on the wire (Hz)
    pub frequency_hz: f64,
    /// How many times the whole bit sequence is repeated
    pub cycles: u32,
    /// Payload bytes per frame
    pub chunk_size: usize,
    /// Sync preamble bits
    pub preamble: Vec<u8>,
    /// Frame terminator bits
    pub terminator: Vec<u8>,
    /// Colour channel bit decisions key off
    pub decision_channel: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            cycles: DEFAULT_CYCLES,
            chunk_size: PAYLOAD_SIZE,
            preamble: PREAMBLE.to_vec(),
            terminator: TERMINATOR.to_vec(),
            decision_channel: DEFAULT_DECISION_CHANNEL,
        }
    }
}

impl LinkConfig {
    /// Load from a JSON file; missing fields fall back to the defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: LinkConfig = serde_json::from_reader(reader)
            .map_err(|e| LinkError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Startup validation; anything wrong here is fatal before a run.
    pub fn validate(&self) -> Result<()> {
        if !(self.frequency_hz > 0.0) {
            return Err(LinkError::InvalidConfig(format!(
                "frequency must be positive, got {} Hz",
                self.frequency_hz
            )));
        }
        if self.cycles == 0 {
            return Err(LinkError::InvalidConfig("cycles must be at least 1".into()));
        }
        if self.chunk_size == 0 {
            return Err(LinkError::InvalidConfig("chunk size must be at least 1 byte".into()));
        }
        if self.preamble.is_empty() {
            return Err(LinkError::InvalidConfig("preamble must not be empty".into()));
        }
        if self.preamble.iter().chain(&self.terminator).any(|&b| b > 1) {
            return Err(LinkError::InvalidConfig(
                "preamble and terminator may only contain 0s and 1s".into(),
            ));
        }
        if self.decision_channel > 2 {
            return Err(LinkError::InvalidConfig(format!(
                "decision channel must be 0..=2, got {}",
                self.decision_channel
            )));
        }
        Ok(())
    }
}
