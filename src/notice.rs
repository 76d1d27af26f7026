//! The notice value handed to the serializer.
//!
//! A [`Notice`] is assembled by whatever integrates the notifier with an
//! application (exception hooks, logging bridges). Once built it is never
//! mutated; the serializer only borrows it.

use serde::{Deserialize, Serialize};

use crate::backtrace::Backtrace;

/// Session variables in insertion order.
///
/// Inserting an existing key replaces its value without moving it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session {
    vars: Vec<(String, String)>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a variable.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.vars.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.vars.push((key, value)),
        }
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Variables in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Session
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut session = Self::new();
        for (k, v) in iter {
            session.insert(k, v);
        }
        session
    }
}

/// Request context attached to a notice.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// URL being served when the error occurred.
    pub url: String,
    /// Controller or component name.
    pub component: String,
    #[serde(default)]
    pub session: Session,
}

impl Request {
    pub fn new(url: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            component: component.into(),
            session: Session::default(),
        }
    }

    /// Attach session variables.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }
}

/// One reported error, ready for serialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    api_key: String,
    error_class: String,
    error_message: String,
    #[serde(default)]
    backtrace: Backtrace,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    environment_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request: Option<Request>,
}

impl Notice {
    /// Start a notice with the two mandatory fields.
    pub fn new(api_key: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            error_class: String::new(),
            error_message: error_message.into(),
            backtrace: Backtrace::default(),
            environment_name: None,
            request: None,
        }
    }

    pub fn with_error_class(mut self, class: impl Into<String>) -> Self {
        self.error_class = class.into();
        self
    }

    pub fn with_backtrace(mut self, backtrace: Backtrace) -> Self {
        self.backtrace = backtrace;
        self
    }

    pub fn with_environment(mut self, name: impl Into<String>) -> Self {
        self.environment_name = Some(name.into());
        self
    }

    pub fn with_request(mut self, request: Request) -> Self {
        self.request = Some(request);
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn error_class(&self) -> &str {
        &self.error_class
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    pub fn environment_name(&self) -> Option<&str> {
        self.environment_name.as_deref()
    }

    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn session_keeps_insertion_order_and_replaces_in_place() {
        let mut session = Session::new();
        session.insert("color", "orange");
        session.insert("lights", "<blink>");
        session.insert("color", "red");
        let vars: Vec<_> = session.iter().collect();
        assert_eq!(vars, vec![("color", "red"), ("lights", "<blink>")]);
        assert_eq!(session.get("lights"), Some("<blink>"));
        assert_eq!(session.get("missing"), None);
    }

    #[rstest]
    fn notice_defaults_leave_optional_fields_empty() {
        let notice = Notice::new("key", "message");
        assert_eq!(notice.api_key(), "key");
        assert_eq!(notice.error_message(), "message");
        assert_eq!(notice.error_class(), "");
        assert!(notice.backtrace().is_empty());
        assert!(notice.environment_name().is_none());
        assert!(notice.request().is_none());
    }

    #[rstest]
    fn notice_deserialises_from_json() {
        let json = r#"{
            "api_key": "k",
            "error_class": "RuntimeError",
            "error_message": "boom",
            "request": {"url": "http://example.com", "component": "carburetor",
                        "session": [["color", "orange"]]}
        }"#;
        let notice: Notice = serde_json::from_str(json).expect("deserialise");
        let request = notice.request().expect("request");
        assert_eq!(request.component, "carburetor");
        assert_eq!(request.session.get("color"), Some("orange"));
    }
}
