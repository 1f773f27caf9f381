/// Offline alignment and bit-error-rate analysis over two run logs
pub mod alignment;
pub mod ber;

pub use alignment::{alignment_offset, bit_string, decimation_ratio, tracking_pattern};
pub use ber::{BerReport, compute_ber, majority_vote, score_windows};
