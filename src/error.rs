//! Error types for the link testbed.
//!
//! Only fatal conditions surface as `Err`: everything that can go wrong
//! per-symbol inside a timed loop (a dropped line write, an unreadable
//! sample) is folded into the run log instead, so the loop never loses
//! its cadence to error plumbing.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkError {
    /// The output line could not be acquired before the run started
    #[error("output line failed to open: {0}")]
    LineOpen(String),

    /// Malformed startup configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The two sampling rates are not harmonically related
    #[error(
        "receive rate {receive_hz} Hz is not an integer multiple of transmit rate {transmit_hz} Hz"
    )]
    RateMismatch { transmit_hz: f64, receive_hz: f64 },

    /// The tracking pattern never occurs in the receiver stream
    #[error("tracking pattern not found in receiver stream")]
    AlignmentFailed,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A log file row that cannot be parsed back into a record
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, LinkError>;
