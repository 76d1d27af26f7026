//! Blocking delivery client with rate-limit retries.

use std::time::Duration;

use log::debug;

use super::{
    DeliveryError, DeliveryOutcome,
    cancel::{CancellablePause, CancellationToken, Pause, PauseOutcome},
    config::DeliveryConfig,
    retry::{RetryState, RetryStep},
    transport::{Transport, UreqTransport},
};

/// Posts serialized notices and retries while the service answers 503.
///
/// Each call to [`deliver`](Self::deliver) owns its retry state, so a single
/// client can serve concurrent deliveries from several threads.
#[derive(Clone, Debug)]
pub struct DeliveryClient<T = UreqTransport, P = CancellablePause> {
    transport: T,
    pause: P,
    max_attempts: u32,
    backoff: Duration,
}

impl DeliveryClient {
    /// Client using `ureq` and real (cancellable) waits.
    pub fn from_config(config: &DeliveryConfig) -> Self {
        Self::with_parts(UreqTransport::from_config(config), CancellablePause, config)
    }
}

impl<T: Transport, P: Pause> DeliveryClient<T, P> {
    /// Client with explicit transport and pause implementations.
    pub fn with_parts(transport: T, pause: P, config: &DeliveryConfig) -> Self {
        Self {
            transport,
            pause,
            max_attempts: config.max_attempts,
            backoff: config.backoff,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// POST `xml` to `endpoint`, retrying on 503.
    ///
    /// # Errors
    ///
    /// * [`DeliveryError::Rejected`] for any non-2xx status other than 503
    /// * [`DeliveryError::RetryBudgetExhausted`] when every attempt got 503
    /// * [`DeliveryError::Transport`] when no response was received
    pub fn deliver(
        &self,
        xml: &str,
        endpoint: &str,
        api_key: &str,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        self.deliver_with_cancel(xml, endpoint, api_key, &CancellationToken::new())
    }

    /// Like [`deliver`](Self::deliver) but abortable through `cancel`.
    ///
    /// # Errors
    ///
    /// As for [`deliver`](Self::deliver), plus [`DeliveryError::Cancelled`]
    /// when `cancel` fires before an attempt or during a backoff wait.
    pub fn deliver_with_cancel(
        &self,
        xml: &str,
        endpoint: &str,
        api_key: &str,
        cancel: &CancellationToken,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        let mut state = RetryState::new(self.max_attempts);
        loop {
            if cancel.is_cancelled() {
                return Err(state.cancelled());
            }
            let attempt = state.begin_attempt();
            debug!(
                "posting notice to {endpoint} (attempt {attempt}/{})",
                state.max_attempts()
            );
            let status = self
                .transport
                .post_xml(endpoint, xml, api_key)
                .map_err(|source| DeliveryError::Transport {
                    attempts: attempt,
                    source,
                })?;
            match state.on_status(status) {
                RetryStep::Done(outcome) => return Ok(outcome),
                RetryStep::Fail(err) => return Err(err),
                RetryStep::Wait => {
                    debug!(
                        "notice rate limited with status {status}; retrying in {:?}",
                        self.backoff
                    );
                    if self.pause.pause(self.backoff, cancel) == PauseOutcome::Cancelled {
                        return Err(state.cancelled());
                    }
                }
            }
        }
    }
}
