use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag shared between a Ctrl-C handler and an
/// engine loop.
///
/// The loops poll it once per symbol period, so worst-case cancellation
/// latency is one bit period. Nothing is preempted; the loop exits on its
/// own and releases the line on the way out.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Wire this token to Ctrl-C.
    pub fn install_ctrlc_handler(&self) {
        let token = self.clone();
        ctrlc::set_handler(move || {
            token.cancel();
        })
        .ok(); // Ignore error if handler already set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }
}
