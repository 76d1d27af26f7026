//! Cancellable waiting between delivery attempts.

use std::{sync::Arc, time::Duration};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use parking_lot::Mutex;

/// Result of waiting out a backoff interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseOutcome {
    /// The full interval elapsed.
    Elapsed,
    /// The wait was cut short by cancellation.
    Cancelled,
}

/// Shared cancellation signal.
///
/// Clones observe the same signal. Cancelling wakes every thread blocked in
/// [`CancellationToken::wait`] and is permanent.
#[derive(Clone, Debug)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    // Dropping the sender disconnects `signal`, which wakes all waiters.
    trigger: Mutex<Option<Sender<()>>>,
    signal: Receiver<()>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            inner: Arc::new(Inner {
                trigger: Mutex::new(Some(tx)),
                signal: rx,
            }),
        }
    }

    /// Fire the signal. Subsequent calls are no-ops.
    pub fn cancel(&self) {
        self.inner.trigger.lock().take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.trigger.lock().is_none()
    }

    /// Block for up to `timeout`, returning early if cancelled.
    pub fn wait(&self, timeout: Duration) -> PauseOutcome {
        match self.inner.signal.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => PauseOutcome::Elapsed,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => PauseOutcome::Cancelled,
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits out the backoff interval between attempts.
///
/// The client calls this instead of sleeping directly so tests can substitute
/// a recording implementation.
pub trait Pause: Send + Sync {
    fn pause(&self, duration: Duration, cancel: &CancellationToken) -> PauseOutcome;
}

/// Blocks the calling thread on the cancellation token.
#[derive(Clone, Copy, Debug, Default)]
pub struct CancellablePause;

impl Pause for CancellablePause {
    fn pause(&self, duration: Duration, cancel: &CancellationToken) -> PauseOutcome {
        cancel.wait(duration)
    }
}
