use std::time::Duration;

/// Log level (overridable with RUST_LOG)
pub const LOG_LEVEL: &str = "info";

// ============================================================================
// Framing Parameters
// ============================================================================

/// 7-bit Barker sync code opening every frame (1 -> line high, 0 -> line low)
pub const PREAMBLE: [u8; 7] = [1, 1, 1, 0, 0, 1, 0];

/// All-zero terminator closing every frame
pub const TERMINATOR: [u8; 8] = [0; 8];

/// Payload bytes per frame
pub const PAYLOAD_SIZE: usize = 8;

// ============================================================================
// Timing Parameters
// ============================================================================

/// First guess for how long one coarse sleep really takes (seconds)
pub const SLEEP_SEED_SECONDS: f64 = 5e-3;

/// Nominal coarse sleep quantum
pub const COARSE_SLEEP: Duration = Duration::from_millis(1);

// ============================================================================
// Run Defaults
// ============================================================================

/// Default symbol rate (Hz)
pub const DEFAULT_FREQUENCY_HZ: f64 = 25.0;

/// Default repeat count for a transmission sequence
pub const DEFAULT_CYCLES: u32 = 1;

/// Default length of a generated test transmission (bits)
pub const DEFAULT_GENERATED_BITS: usize = 300;

// ============================================================================
// Receiver Parameters
// ============================================================================

/// Colour channel bit decisions key off by default (B of BGR; the light
/// source is blue, so that channel has the widest on/off separation)
pub const DEFAULT_DECISION_CHANNEL: usize = 0;

/// ADC reference voltage for the raw analog receiver path
pub const ADC_REFERENCE_VOLTS: f64 = 3.3;

/// Full-scale code of the raw analog receiver's 10-bit ADC
pub const ADC_FULL_SCALE: f64 = 1023.0;
