use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar over `total` symbol periods.
///
/// The message slot carries the running failure count, so a struggling
/// line is visible mid-run without scrolling the log.
pub fn symbol_bar(total: u64, template: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(template)
            .unwrap()
            .progress_chars("█▉▊▋▌▍▎▏ "),
    );
    pb
}

pub mod templates {
    pub const TRANSMIT: &str =
        "TX [{bar:30.cyan}] {percent}% ({pos}/{len} bits) {msg}";
    pub const SAMPLE: &str =
        "RX [{bar:30.blue}] {percent}% ({pos}/{len} samples) {msg}";
}
