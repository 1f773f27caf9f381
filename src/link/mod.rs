/// Link engines: timed transmission and sampling loops plus their logs
pub mod cancel;
pub mod config;
pub mod csv;
pub mod line;
pub mod log;
pub mod receiver;
pub mod transmitter;

pub use cancel::CancelToken;
pub use config::LinkConfig;
pub use line::{LineGuard, OutputLine, SimulatedLine};
pub use log::{FrameSample, RunLog, Symbol};
pub use receiver::{
    CalibrationBaseline, CaptureSummary, DecodeMode, Receiver, SampleSource, VecSource,
};
pub use transmitter::{TransmitSummary, Transmitter};
