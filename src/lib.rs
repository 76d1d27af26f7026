//! Hoptoad error notifier core.
//!
//! Parses and filters stack traces into [`backtrace::Frame`] values,
//! serializes a [`notice::Notice`] to the version 2.0.0 notice XML schema and
//! posts it to the tracking service, retrying while the service answers 503.
//!
//! ```rust
//! use hoptoad_rs::{frame_filter::BacktraceFilter, notice::Notice, notice_xml::NoticeSerializer};
//!
//! let backtrace = BacktraceFilter::quiet().backtrace(&[
//!     "at com.acme.App.main(App.java:9)",
//!     "at org.junit.runners.ParentRunner.run(ParentRunner.java:236)",
//! ]);
//! let notice = Notice::new("api-key", "boom").with_backtrace(backtrace);
//! let xml = NoticeSerializer::default().serialize(&notice);
//! assert!(xml.contains(r#"<line method="com.acme.App.main" file="App.java" number="9"/>"#));
//! assert!(!xml.contains("ParentRunner"));
//! ```

pub mod backtrace;
pub mod builder;
pub mod config;
pub mod delivery;
pub mod frame_filter;
pub mod notice;
pub mod notice_xml;
pub mod notifier;

pub use backtrace::{Backtrace, FilterPolicy, Frame, StructuredFrame};
pub use builder::NotifierBuilder;
pub use config::{ConfigError, NotifierConfig};
pub use delivery::{
    CancellationToken, DeliveryClient, DeliveryConfig, DeliveryError, DeliveryOutcome,
};
pub use frame_filter::{BacktraceFilter, NoisePatterns};
pub use notice::{Notice, Request, Session};
pub use notice_xml::{NoticeSerializer, NotifierIdentity};
pub use notifier::Notifier;
