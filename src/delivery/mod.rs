//! Delivery of serialized notices to the tracking service.
//!
//! [`DeliveryClient`] POSTs the XML body with `Content-Type: text/xml` and
//! interprets only the response status code.
//!
//! # Retry Semantics
//!
//! - **2xx**: Success, returned with the number of attempts used.
//! - **503**: Rate limited. Wait the fixed backoff interval and retry until
//!   the attempt budget is spent, then fail with
//!   [`DeliveryError::RetryBudgetExhausted`].
//! - **Anything else**: [`DeliveryError::Rejected`] immediately, no retry.
//! - **Network errors**: [`DeliveryError::Transport`], no retry.
//!
//! A [`CancellationToken`] aborts a pending backoff wait, in which case the
//! call returns [`DeliveryError::Cancelled`].

mod cancel;
mod client;
mod config;
mod retry;
mod transport;


pub use cancel::{CancellablePause, CancellationToken, Pause, PauseOutcome};
pub use client::DeliveryClient;
pub use config::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_ENDPOINT, DEFAULT_MAX_ATTEMPTS, DEFAULT_RATE_LIMIT_BACKOFF,
    DEFAULT_REQUEST_TIMEOUT, DeliveryConfig,
};
pub use retry::{RATE_LIMITED_STATUS, ResponseClass, RetryState, RetryStep, classify_status};
pub use transport::{API_KEY_HEADER, Transport, TransportError, UreqTransport, XML_CONTENT_TYPE};

use thiserror::Error;

/// Result of a successful delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryOutcome {
    /// Final (2xx) status code.
    pub status: u16,
    /// Attempts made, including the successful one.
    pub attempts: u32,
}

/// Terminal delivery failures.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The service answered with a non-retryable status.
    #[error("notice rejected with status {status} after {attempts} attempt(s)")]
    Rejected { status: u16, attempts: u32 },
    /// Every attempt in the budget was rate limited.
    #[error("notice still rate limited after {attempts} attempt(s)")]
    RetryBudgetExhausted { attempts: u32 },
    /// Cancellation fired before delivery finished.
    #[error("notice delivery cancelled after {attempts} attempt(s)")]
    Cancelled {
        attempts: u32,
        last_status: Option<u16>,
    },
    /// No HTTP response was received.
    #[error("notice delivery failed on attempt {attempts}")]
    Transport {
        attempts: u32,
        #[source]
        source: TransportError,
    },
}

impl DeliveryError {
    /// Attempts made before the failure.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Rejected { attempts, .. }
            | Self::RetryBudgetExhausted { attempts }
            | Self::Cancelled { attempts, .. }
            | Self::Transport { attempts, .. } => *attempts,
        }
    }

    /// Last HTTP status received, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::RetryBudgetExhausted { .. } => Some(RATE_LIMITED_STATUS),
            Self::Cancelled { last_status, .. } => *last_status,
            Self::Transport { .. } => None,
        }
    }
}
