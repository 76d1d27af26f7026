//! Builder for [`Notifier`](crate::notifier::Notifier).
//!
//! Exposes the endpoint, retry budget, backoff interval, HTTP timeouts,
//! backtrace filter and notifier identity. Unset values fall back to
//! [`NotifierConfig::default`].

use std::time::Duration;

use crate::backtrace::FilterPolicy;
use crate::config::{ConfigError, NotifierConfig};
use crate::frame_filter::NoisePatterns;
use crate::notice_xml::NotifierIdentity;
use crate::notifier::Notifier;

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(ConfigError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for constructing [`Notifier`] instances.
#[derive(Clone, Debug, Default)]
pub struct NotifierBuilder {
    endpoint: Option<String>,
    max_attempts: Option<u32>,
    backoff_ms: Option<u64>,
    connect_timeout_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
    backtrace_filter: Option<FilterPolicy>,
    normalize: Option<bool>,
    noise_patterns: Option<NoisePatterns>,
    identity: Option<NotifierIdentity>,
}

impl NotifierBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the notice endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    option_setter!(
        #[doc = "Set the attempt budget, including the first attempt."]
        with_max_attempts,
        max_attempts,
        u32
    );
    option_setter!(
        #[doc = "Set the wait after a 503 response, in milliseconds."]
        with_backoff_ms,
        backoff_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the connect timeout in milliseconds."]
        with_connect_timeout_ms,
        connect_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the request timeout in milliseconds."]
        with_request_timeout_ms,
        request_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Select the backtrace filter variant."]
        with_backtrace_filter,
        backtrace_filter,
        FilterPolicy
    );
    option_setter!(
        #[doc = "Rewrite alternate stack conventions before filtering."]
        with_normalize,
        normalize,
        bool
    );
    option_setter!(
        #[doc = "Override the notifier name, version and URL."]
        with_identity,
        identity,
        NotifierIdentity
    );

    /// Replace the quiet filter's deny-list.
    pub fn with_noise_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.noise_patterns = Some(NoisePatterns::new(patterns));
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(endpoint) = &self.endpoint
            && endpoint.trim().is_empty()
        {
            return Err(ConfigError::InvalidConfig(
                "endpoint must not be empty".into(),
            ));
        }
        if let Some(attempts) = self.max_attempts {
            ensure_positive!(attempts, "max_attempts")?;
        }
        if let Some(timeout) = self.connect_timeout_ms {
            ensure_positive!(timeout, "connect_timeout_ms")?;
        }
        if let Some(timeout) = self.request_timeout_ms {
            ensure_positive!(timeout, "request_timeout_ms")?;
        }
        Ok(())
    }

    /// Resolve the configuration without building a notifier.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] for empty endpoints or zero
    /// attempt budgets and timeouts.
    pub fn build_config(&self) -> Result<NotifierConfig, ConfigError> {
        self.validate()?;

        let mut config = NotifierConfig::default();
        let delivery = &mut config.delivery;
        if let Some(endpoint) = &self.endpoint {
            delivery.endpoint = endpoint.trim().to_owned();
        }
        delivery.max_attempts = self.max_attempts.unwrap_or(delivery.max_attempts);
        delivery.backoff = self
            .backoff_ms
            .map_or(delivery.backoff, Duration::from_millis);
        delivery.connect_timeout = self
            .connect_timeout_ms
            .map_or(delivery.connect_timeout, Duration::from_millis);
        delivery.request_timeout = self
            .request_timeout_ms
            .map_or(delivery.request_timeout, Duration::from_millis);
        if let Some(policy) = self.backtrace_filter {
            config.backtrace_filter = policy;
        }
        if let Some(normalize) = self.normalize {
            config.normalize = normalize;
        }
        if let Some(noise) = &self.noise_patterns {
            config.noise_patterns = noise.clone();
        }
        if let Some(identity) = &self.identity {
            config.identity = identity.clone();
        }
        Ok(config)
    }

    /// Build a notifier posting over HTTP.
    ///
    /// # Errors
    ///
    /// See [`build_config`](Self::build_config).
    pub fn build(&self) -> Result<Notifier, ConfigError> {
        Notifier::from_config(self.build_config()?)
    }
}
