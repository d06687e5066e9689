//! Cooperative cancellation for decode and feature extraction
//!
//! Decoding and STFT cost scale with track length, so long-running stages poll
//! a [`CancelToken`] between packets / frame blocks. The analysis core itself
//! works on already-computed arrays and never polls.

use crate::error::{MixmapError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cloneable cancellation handle with an optional deadline
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token that is never cancelled unless [`cancel`](Self::cancel) is called
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also expires once `timeout` has elapsed
    ///
    /// A timeout too large to represent as an `Instant` means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || self.is_expired()
    }

    fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Return `Cancelled` if the token fired, naming the stage that noticed
    pub fn check(&self, stage: &str) -> Result<()> {
        if self.flag.load(Ordering::Relaxed) {
            return Err(MixmapError::cancelled(format!("cancelled during {stage}")));
        }
        if self.is_expired() {
            return Err(MixmapError::cancelled(format!("timed out during {stage}")));
        }
        Ok(())
    }
}

/// Cancels the wrapped token when dropped, unless disarmed
///
/// Held by request handlers so that a dropped request (client gone, outer
/// timeout) stops the blocking work it spawned.
pub struct CancelOnDrop {
    token: CancelToken,
    armed: bool,
}

impl CancelOnDrop {
    pub fn new(token: CancelToken) -> Self {
        Self { token, armed: true }
    }

    /// Completed normally; do not cancel on drop
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
        assert!(matches!(clone.check("decode"), Err(MixmapError::Cancelled { .. })));
    }

    #[test]
    fn test_zero_timeout_expires_immediately() {
        let token = CancelToken::with_timeout(Duration::ZERO);
        let err = token.check("stft").unwrap_err();
        assert!(err.to_string().contains("timed out during stft"));
    }

    #[test]
    fn test_unrepresentable_timeout_never_expires() {
        let token = CancelToken::with_timeout(Duration::from_secs(u64::MAX));
        assert!(token.check("decode").is_ok());
        assert!(!token.is_cancelled());

        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_guard_cancels_unless_disarmed() {
        let token = CancelToken::new();
        drop(CancelOnDrop::new(token.clone()));
        assert!(token.is_cancelled());

        let token = CancelToken::new();
        CancelOnDrop::new(token.clone()).disarm();
        assert!(!token.is_cancelled());
    }
}
