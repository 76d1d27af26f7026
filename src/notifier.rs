//! Entry point tying filtering, serialization and delivery together.
//!
//! # Example
//!
//! ```rust,no_run
//! use hoptoad_rs::{NotifierBuilder, notice::Notice};
//!
//! let notifier = NotifierBuilder::new()
//!     .with_endpoint("http://localhost:3000/notifier_api/v2/notices")
//!     .build()?;
//!
//! let backtrace = notifier.backtrace(&["at com.acme.App.main(App.java:9)"]);
//! let notice = Notice::new("api-key", "boom")
//!     .with_error_class("java.lang.IllegalStateException")
//!     .with_backtrace(backtrace)
//!     .with_environment("production");
//!
//! let outcome = notifier.notify(&notice)?;
//! assert_eq!(outcome.status, 200);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::backtrace::Backtrace;
use crate::config::{ConfigError, NotifierConfig};
use crate::delivery::{
    CancellablePause, CancellationToken, DeliveryClient, DeliveryError, DeliveryOutcome, Pause,
    Transport, UreqTransport,
};
use crate::frame_filter::BacktraceFilter;
use crate::notice::Notice;
use crate::notice_xml::NoticeSerializer;

/// Serializes notices and posts them to the configured endpoint.
#[derive(Clone, Debug)]
pub struct Notifier<T = UreqTransport, P = CancellablePause> {
    endpoint: String,
    filter: BacktraceFilter,
    serializer: NoticeSerializer,
    client: DeliveryClient<T, P>,
}

impl Notifier {
    /// Notifier posting over HTTP with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] when `config` fails validation.
    pub fn from_config(config: NotifierConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = DeliveryClient::from_config(&config.delivery);
        Ok(Self::with_client(config, client))
    }
}

impl<T: Transport, P: Pause> Notifier<T, P> {
    /// Notifier using an already constructed delivery client.
    pub fn with_client(config: NotifierConfig, client: DeliveryClient<T, P>) -> Self {
        Self {
            filter: config.backtrace_filter(),
            endpoint: config.delivery.endpoint,
            serializer: NoticeSerializer::new(config.identity),
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Filter used by [`backtrace`](Self::backtrace).
    pub fn filter(&self) -> &BacktraceFilter {
        &self.filter
    }

    pub fn serializer(&self) -> &NoticeSerializer {
        &self.serializer
    }

    /// Build a backtrace from raw trace lines with the configured filter.
    pub fn backtrace<S: AsRef<str>>(&self, lines: &[S]) -> Backtrace {
        self.filter.backtrace(lines)
    }

    /// Render `notice` as XML.
    pub fn serialize(&self, notice: &Notice) -> String {
        self.serializer.serialize(notice)
    }

    /// Serialize and deliver `notice`.
    ///
    /// # Errors
    ///
    /// Propagates the [`DeliveryError`] from the delivery client.
    pub fn notify(&self, notice: &Notice) -> Result<DeliveryOutcome, DeliveryError> {
        self.notify_with_cancel(notice, &CancellationToken::new())
    }

    /// Serialize and deliver `notice`, aborting backoff waits on `cancel`.
    ///
    /// # Errors
    ///
    /// Propagates the [`DeliveryError`] from the delivery client.
    pub fn notify_with_cancel(
        &self,
        notice: &Notice,
        cancel: &CancellationToken,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        let xml = self.serialize(notice);
        self.client
            .deliver_with_cancel(&xml, &self.endpoint, notice.api_key(), cancel)
    }
}
