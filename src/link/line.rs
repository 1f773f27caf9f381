//! Output line abstraction over whatever driver ends up toggling the LED.

use crate::error::{LinkError, Result};

/// One hardware output line.
///
/// Implementations wrap a GPIO or serial driver. Per-call failures come
/// back as `Err(reason)` rather than panics or unwinding, so a timed loop
/// can log the drop and keep its cadence; calls are assumed to return
/// promptly whether they succeed or not.
pub trait OutputLine {
    fn set_level(&mut self, level: u8) -> std::result::Result<(), String>;
}

/// Holds a line for the duration of a run and forces it back to 0 when
/// dropped, whatever path the loop exits through (completion,
/// cancellation, panic).
pub struct LineGuard<'a, L: OutputLine + ?Sized> {
    line: &'a mut L,
}

impl<'a, L: OutputLine + ?Sized> LineGuard<'a, L> {
    pub fn new(line: &'a mut L) -> Self {
        Self { line }
    }

    pub fn set_level(&mut self, level: u8) -> std::result::Result<(), String> {
        self.line.set_level(level)
    }
}

impl<L: OutputLine + ?Sized> Drop for LineGuard<'_, L> {
    fn drop(&mut self) {
        // Release is unconditional; a failure here has nowhere to go.
        let _ = self.line.set_level(0);
    }
}

/// In-memory line for offline runs and tests.
///
/// Records every level written; write attempts listed in
/// `failing_writes` report a driver error instead, which is how the
/// engine's drop handling gets exercised without hardware.
#[derive(Debug, Default)]
pub struct SimulatedLine {
    levels: Vec<u8>,
    writes: usize,
    failing_writes: Vec<usize>,
}

impl SimulatedLine {
    pub fn open() -> Result<Self> {
        Ok(Self::default())
    }

    /// A line that refuses to open, for exercising fatal startup paths.
    pub fn open_broken() -> Result<Self> {
        Err(LinkError::LineOpen("simulated line held by another process".into()))
    }

    /// Fail the given write attempts (0-based, counted across the run).
    pub fn with_failing_writes(failing_writes: Vec<usize>) -> Self {
        Self {
            failing_writes,
            ..Self::default()
        }
    }

    /// Every level successfully written, in order.
    pub fn levels(&self) -> &[u8] {
        &self.levels
    }

    pub fn current_level(&self) -> u8 {
        self.levels.last().copied().unwrap_or(0)
    }
}

impl OutputLine for SimulatedLine {
    fn set_level(&mut self, level: u8) -> std::result::Result<(), String> {
        let attempt = self.writes;
        self.writes += 1;
        if self.failing_writes.contains(&attempt) {
            return Err("line write rejected".into());
        }
        self.levels.push(level);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_resets_line_on_drop() {
        let mut line = SimulatedLine::open().unwrap();
        {
            let mut guard = LineGuard::new(&mut line);
            guard.set_level(1).unwrap();
            assert_eq!(guard.line.current_level(), 1);
        }
        assert_eq!(line.current_level(), 0);
    }

    #[test]
    fn test_broken_line_fails_to_open() {
        assert!(matches!(
            SimulatedLine::open_broken(),
            Err(LinkError::LineOpen(_))
        ));
    }

    #[test]
    fn test_injected_write_failures() {
        let mut line = SimulatedLine::with_failing_writes(vec![1]);
        assert!(line.set_level(1).is_ok());
        assert!(line.set_level(1).is_err());
        assert!(line.set_level(0).is_ok());
        assert_eq!(line.levels(), &[1, 0]);
    }
}
