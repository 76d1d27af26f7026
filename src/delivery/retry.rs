//! Retry state machine for a single delivery.
//!
//! The client feeds each response status into [`RetryState::on_status`] and
//! acts on the returned [`RetryStep`]. Only rate-limited responses (503) are
//! retried, and only while attempts remain in the budget.

use super::{DeliveryError, DeliveryOutcome};

/// Status code the service uses to ask callers to slow down.
pub const RATE_LIMITED_STATUS: u16 = 503;

/// Classification of an HTTP status for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// 2xx, the notice was accepted.
    Success,
    /// 503, retry after the backoff interval.
    RateLimited,
    /// Anything else; not retried.
    Rejected,
}

/// Classify a status code.
///
/// * **2xx** → [`ResponseClass::Success`]
/// * **503** → [`ResponseClass::RateLimited`]
/// * **Other** → [`ResponseClass::Rejected`], including other 5xx and 429
pub fn classify_status(status: u16) -> ResponseClass {
    match status {
        200..=299 => ResponseClass::Success,
        RATE_LIMITED_STATUS => ResponseClass::RateLimited,
        _ => ResponseClass::Rejected,
    }
}

/// What the client should do after an attempt.
#[derive(Debug)]
pub enum RetryStep {
    /// Delivery finished successfully.
    Done(DeliveryOutcome),
    /// Wait for the backoff interval, then try again.
    Wait,
    /// Delivery finished with a terminal error.
    Fail(DeliveryError),
}

/// Attempt counter and last observed status for one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    max_attempts: u32,
    attempts: u32,
    last_status: Option<u16>,
}

impl RetryState {
    /// Fresh state with the given attempt budget.
    ///
    /// A budget of zero is treated as one attempt.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            attempts: 0,
            last_status: None,
        }
    }

    /// Record the start of an attempt and return its 1-based number.
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    /// Attempts started so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Status returned by the most recent attempt.
    pub fn last_status(&self) -> Option<u16> {
        self.last_status
    }

    /// Decide the next step from the status of the current attempt.
    pub fn on_status(&mut self, status: u16) -> RetryStep {
        self.last_status = Some(status);
        match classify_status(status) {
            ResponseClass::Success => RetryStep::Done(DeliveryOutcome {
                status,
                attempts: self.attempts,
            }),
            ResponseClass::Rejected => RetryStep::Fail(DeliveryError::Rejected {
                status,
                attempts: self.attempts,
            }),
            ResponseClass::RateLimited if self.attempts >= self.max_attempts => {
                RetryStep::Fail(DeliveryError::RetryBudgetExhausted {
                    attempts: self.attempts,
                })
            }
            ResponseClass::RateLimited => RetryStep::Wait,
        }
    }

    /// Error describing cancellation at the current point.
    pub fn cancelled(&self) -> DeliveryError {
        DeliveryError::Cancelled {
            attempts: self.attempts,
            last_status: self.last_status,
        }
    }
}
