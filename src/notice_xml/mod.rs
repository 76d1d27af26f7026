//! Serializer for the Hoptoad notice XML schema, version 2.0.0.
//!
//! Elements are written with no whitespace between them:
//!
//! ```text
//! <?xml version="1.0"?><notice version="2.0.0"><api-key>…</api-key>
//! <notifier><name>…</name><version>…</version><url>…</url></notifier>
//! <error><class>…</class><message>…</message><backtrace>…</backtrace></error>
//! [<request><url>…</url><component>…</component><session>…</session></request>]
//! <server-environment><environment-name>…</environment-name></server-environment>
//! </notice>
//! ```
//!
//! Free text is entity-escaped. Structured frames are written as
//! `<line method="…" file="…" number="…"/>` without escaping; the frame
//! grammar already rejects characters that would need it. Raw frames are
//! written as escaped text, each terminated by a newline so adjacent raw
//! frames stay distinct.
//!
//! # Example
//!
//! ```rust
//! use hoptoad_rs::notice::Notice;
//! use hoptoad_rs::notice_xml::NoticeSerializer;
//!
//! let notice = Notice::new("abc123", "boom").with_environment("<blink>production</blink>");
//! let xml = NoticeSerializer::default().serialize(&notice);
//! assert!(xml.contains("<environment-name>&lt;blink&gt;production&lt;/blink&gt;</environment-name>"));
//! assert!(!xml.contains("<request>"));
//! ```

mod escape;


pub use escape::escape_xml;

use serde::{Deserialize, Serialize};

use crate::backtrace::{Backtrace, Frame};
use crate::notice::{Notice, Request};

/// Version attribute written on the `<notice>` root element.
pub const NOTICE_SCHEMA_VERSION: &str = "2.0.0";
/// Default notifier name reported to the service.
pub const DEFAULT_NOTIFIER_NAME: &str = "hoptoad";
/// Default notifier version reported to the service.
pub const DEFAULT_NOTIFIER_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Default notifier URL reported to the service.
pub const DEFAULT_NOTIFIER_URL: &str = "http://hoptoad.googlecode.com";

/// Name, version and URL identifying this notifier to the service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifierIdentity {
    pub name: String,
    pub version: String,
    pub url: String,
}

impl NotifierIdentity {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            url: url.into(),
        }
    }
}

impl Default for NotifierIdentity {
    fn default() -> Self {
        Self::new(
            DEFAULT_NOTIFIER_NAME,
            DEFAULT_NOTIFIER_VERSION,
            DEFAULT_NOTIFIER_URL,
        )
    }
}

/// Renders [`Notice`] values as XML.
///
/// Serialization is pure: the same notice and identity always produce the
/// same bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoticeSerializer {
    identity: NotifierIdentity,
}

impl NoticeSerializer {
    /// Serializer reporting the given identity.
    pub fn new(identity: NotifierIdentity) -> Self {
        Self { identity }
    }

    /// Identity written into the `<notifier>` element.
    pub fn identity(&self) -> &NotifierIdentity {
        &self.identity
    }

    /// Render `notice` as a complete XML document.
    pub fn serialize(&self, notice: &Notice) -> String {
        let mut out = String::with_capacity(512 + notice.backtrace().len() * 96);
        out.push_str(r#"<?xml version="1.0"?>"#);
        out.push_str(r#"<notice version=""#);
        out.push_str(NOTICE_SCHEMA_VERSION);
        out.push_str(r#"">"#);
        emit_text_element(&mut out, "api-key", notice.api_key());
        self.emit_notifier(&mut out);
        emit_error(&mut out, notice);
        if let Some(request) = notice.request() {
            emit_request(&mut out, request);
        }
        out.push_str("<server-environment>");
        emit_text_element(
            &mut out,
            "environment-name",
            notice.environment_name().unwrap_or_default(),
        );
        out.push_str("</server-environment>");
        out.push_str("</notice>");
        out
    }

    fn emit_notifier(&self, out: &mut String) {
        out.push_str("<notifier>");
        emit_text_element(out, "name", &self.identity.name);
        emit_text_element(out, "version", &self.identity.version);
        emit_text_element(out, "url", &self.identity.url);
        out.push_str("</notifier>");
    }
}

/// Write `<tag>escaped text</tag>`.
fn emit_text_element(out: &mut String, tag: &str, text: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&escape_xml(text));
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn emit_error(out: &mut String, notice: &Notice) {
    out.push_str("<error>");
    emit_text_element(out, "class", notice.error_class());
    emit_text_element(out, "message", notice.error_message());
    emit_backtrace(out, notice.backtrace());
    out.push_str("</error>");
}

fn emit_backtrace(out: &mut String, backtrace: &Backtrace) {
    out.push_str("<backtrace>");
    for frame in backtrace {
        emit_frame(out, frame);
    }
    out.push_str("</backtrace>");
}

fn emit_frame(out: &mut String, frame: &Frame) {
    match frame {
        Frame::Structured(f) => {
            out.push_str(r#"<line method=""#);
            out.push_str(f.method());
            out.push_str(r#"" file=""#);
            out.push_str(f.file());
            out.push_str(r#"" number=""#);
            out.push_str(&f.line().to_string());
            out.push_str(r#""/>"#);
        }
        Frame::Raw { text } => {
            out.push_str(&escape_xml(text));
            out.push('\n');
        }
    }
}

fn emit_request(out: &mut String, request: &Request) {
    out.push_str("<request>");
    emit_text_element(out, "url", &request.url);
    emit_text_element(out, "component", &request.component);
    out.push_str("<session>");
    for (key, value) in request.session.iter() {
        out.push_str(r#"<var key=""#);
        out.push_str(&escape_xml(key));
        out.push_str(r#"">"#);
        out.push_str(&escape_xml(value));
        out.push_str("</var>");
    }
    out.push_str("</session>");
    out.push_str("</request>");
}
