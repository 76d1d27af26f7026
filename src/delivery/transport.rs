//! HTTP transport used by the delivery client.
//!
//! [`UreqTransport`] wraps a `ureq::Agent`, whose connection pool is shared
//! by every delivery made through the same transport.

use std::time::Duration;

use thiserror::Error;
use ureq::{Agent, AgentBuilder};

use super::config::DeliveryConfig;

/// Content type of the notice body.
pub const XML_CONTENT_TYPE: &str = "text/xml";
/// Header carrying the API key alongside the body.
pub const API_KEY_HEADER: &str = "X-Hoptoad-API-Key";

/// Network-level failure; no status code was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to post notice to {endpoint}: {message}")]
pub struct TransportError {
    pub endpoint: String,
    pub message: String,
}

/// Posts a serialized notice and reports the response status.
pub trait Transport: Send + Sync {
    /// POST `body` to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no HTTP response was received. Non-2xx
    /// responses are not errors at this level.
    fn post_xml(&self, endpoint: &str, body: &str, api_key: &str) -> Result<u16, TransportError>;
}

/// Blocking HTTP transport backed by `ureq`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    /// Agent with the given timeouts.
    ///
    /// Redirects are not followed: a 3xx answer is reported as its own status
    /// and treated as a rejection.
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Self {
        let agent = AgentBuilder::new()
            .timeout_connect(connect_timeout)
            .timeout(request_timeout)
            .redirects(0)
            .build();
        Self { agent }
    }

    /// Transport using the timeouts from `config`.
    pub fn from_config(config: &DeliveryConfig) -> Self {
        Self::new(config.connect_timeout, config.request_timeout)
    }
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::from_config(&DeliveryConfig::default())
    }
}

impl Transport for UreqTransport {
    fn post_xml(&self, endpoint: &str, body: &str, api_key: &str) -> Result<u16, TransportError> {
        let result = self
            .agent
            .post(endpoint)
            .set("Content-Type", XML_CONTENT_TYPE)
            .set("Accept", "text/xml, application/xml")
            .set(API_KEY_HEADER, api_key)
            .send_string(body);
        match result {
            Ok(response) => Ok(response.status()),
            Err(ureq::Error::Status(code, _)) => Ok(code),
            Err(ureq::Error::Transport(err)) => Err(TransportError {
                endpoint: endpoint.to_owned(),
                message: err.to_string(),
            }),
        }
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn post_xml(&self, endpoint: &str, body: &str, api_key: &str) -> Result<u16, TransportError> {
        (**self).post_xml(endpoint, body, api_key)
    }
}
