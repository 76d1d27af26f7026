//! Configuration consumed by the delivery client.
//!
//! [`NotifierBuilder`](crate::builder::NotifierBuilder) and
//! [`NotifierConfig`](crate::config::NotifierConfig) produce these values
//! before a [`DeliveryClient`](super::DeliveryClient) is constructed.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default notice endpoint for API version 2.
pub const DEFAULT_ENDPOINT: &str = "http://hoptoadapp.com/notifier_api/v2/notices";
/// Default number of attempts, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Default wait after a rate-limited (503) response.
pub const DEFAULT_RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(20);
/// Default connection timeout for the HTTP agent.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default overall request timeout for the HTTP agent.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for posting notices.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// URL notices are POSTed to.
    pub endpoint: String,
    /// Attempt budget, including the first attempt.
    pub max_attempts: u32,
    /// Fixed wait between attempts after a 503.
    #[serde(rename = "backoff_ms", with = "duration_ms")]
    pub backoff: Duration,
    /// Timeout for establishing connections.
    #[serde(rename = "connect_timeout_ms", with = "duration_ms")]
    pub connect_timeout: Duration,
    /// Timeout for a complete request.
    #[serde(rename = "request_timeout_ms", with = "duration_ms")]
    pub request_timeout: Duration,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_RATE_LIMIT_BACKOFF,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Serde adapter storing a [`Duration`] as whole milliseconds.
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
