//! Cooperative cancellation for long-running build phases.
//!
//! A [`CancelToken`] is shared between the build orchestrator and the phase
//! being run. Phases check it only at documented boundaries (between file
//! insertions, after condensing, after sorting); nothing is preempted
//! mid-operation. On cancellation the caller discards the in-progress result
//! whole rather than publishing a partial one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Error returned by a phase that observed a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// A shared flag requesting that the current build be abandoned.
///
/// Cloning produces a token observing the same flag. A freshly created token
/// is not cancelled and stays that way until some holder calls
/// [`cancel`](CancelToken::cancel), so `CancelToken::default()` serves as the
/// "never cancelled" token for non-interactive callers and tests.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a new, not-yet-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; all clones of this token observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns `true` if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Boundary check, composing with `?` in fallible phases.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}
