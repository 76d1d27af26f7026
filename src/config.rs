//! Notifier configuration.
//!
//! [`NotifierConfig`] gathers everything the core needs: delivery settings,
//! the backtrace filter policy with its noise deny-list, and the notifier
//! identity reported in each notice. Values come from [`Default`], from any
//! serde format, or from an INI file with a `[notifier]` section:
//!
//! ```ini
//! [notifier]
//! endpoint = https://errors.example.com/notifier_api/v2/notices
//! max_attempts = 3
//! backoff_ms = 5000
//! backtrace_filter = quiet
//! normalize = true
//! noise_patterns = org.junit., sun.reflect.
//! ```

use std::path::Path;
use std::time::Duration;

use ini::{Ini, Properties};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backtrace::FilterPolicy;
use crate::delivery::DeliveryConfig;
use crate::frame_filter::{BacktraceFilter, NoisePatterns, QuietFilter};
use crate::notice_xml::NotifierIdentity;

/// INI section read by [`NotifierConfig::from_ini_str`].
pub const INI_SECTION: &str = "notifier";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value is out of range or otherwise unusable.
    #[error("invalid notifier configuration: {0}")]
    InvalidConfig(String),
    /// The INI text could not be parsed.
    #[error("failed to parse notifier INI: {0}")]
    IniParse(#[from] ini::ParseError),
    /// The INI file could not be read or parsed.
    #[error("failed to load notifier INI file: {0}")]
    IniFile(#[from] ini::Error),
}

/// Complete notifier configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    #[serde(flatten)]
    pub delivery: DeliveryConfig,
    /// Filter applied when building backtraces through the notifier.
    pub backtrace_filter: FilterPolicy,
    /// Rewrite alternate stack conventions before the identity or quiet
    /// filter runs.
    pub normalize: bool,
    /// Deny-list for the quiet filter.
    pub noise_patterns: NoisePatterns,
    /// Identity written into every notice.
    pub identity: NotifierIdentity,
}

impl NotifierConfig {
    /// Parse configuration from INI text.
    ///
    /// Keys missing from the `[notifier]` section keep their defaults; a
    /// missing section yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IniParse`] for malformed INI and
    /// [`ConfigError::InvalidConfig`] for unusable values.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text)?;
        Self::from_ini(&ini)
    }

    /// Load configuration from an INI file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IniFile`] when the file cannot be read or parsed
    /// and [`ConfigError::InvalidConfig`] for unusable values.
    pub fn from_ini_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path)?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(section) = ini.section(Some(INI_SECTION)) {
            config.apply_section(section)?;
        }
        config.validate()?;
        Ok(config)
    }

    fn apply_section(&mut self, section: &Properties) -> Result<(), ConfigError> {
        let delivery = &mut self.delivery;
        if let Some(endpoint) = section.get("endpoint") {
            delivery.endpoint = endpoint.trim().to_owned();
        }
        if let Some(value) = section.get("max_attempts") {
            delivery.max_attempts = parse_number("max_attempts", value)?;
        }
        if let Some(value) = section.get("backoff_ms") {
            delivery.backoff = Duration::from_millis(parse_number("backoff_ms", value)?);
        }
        if let Some(value) = section.get("connect_timeout_ms") {
            delivery.connect_timeout =
                Duration::from_millis(parse_number("connect_timeout_ms", value)?);
        }
        if let Some(value) = section.get("request_timeout_ms") {
            delivery.request_timeout =
                Duration::from_millis(parse_number("request_timeout_ms", value)?);
        }
        if let Some(value) = section.get("backtrace_filter") {
            self.backtrace_filter = parse_filter_policy(value)?;
        }
        if let Some(value) = section.get("normalize") {
            self.normalize = parse_flag("normalize", value)?;
        }
        if let Some(value) = section.get("noise_patterns") {
            self.noise_patterns = NoisePatterns::new(value.split(',').map(str::trim));
        }
        if let Some(value) = section.get("notifier_name") {
            self.identity.name = value.trim().to_owned();
        }
        if let Some(value) = section.get("notifier_version") {
            self.identity.version = value.trim().to_owned();
        }
        if let Some(value) = section.get("notifier_url") {
            self.identity.url = value.trim().to_owned();
        }
        Ok(())
    }

    /// Check the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] when the endpoint is empty, the
    /// attempt budget is zero, or a timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let delivery = &self.delivery;
        if delivery.endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "endpoint must not be empty".into(),
            ));
        }
        if delivery.max_attempts == 0 {
            return Err(ConfigError::InvalidConfig(
                "max_attempts must be greater than zero".into(),
            ));
        }
        for (field, value) in [
            ("connect_timeout_ms", delivery.connect_timeout),
            ("request_timeout_ms", delivery.request_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::InvalidConfig(format!(
                    "{field} must be greater than zero"
                )));
            }
        }
        Ok(())
    }

    /// The backtrace filter described by this configuration.
    ///
    /// With `normalize` set, the identity policy becomes
    /// [`BacktraceFilter::Normalized`] and the quiet policy normalizes before
    /// dropping noise.
    pub fn backtrace_filter(&self) -> BacktraceFilter {
        match (self.backtrace_filter, self.normalize) {
            (FilterPolicy::Identity, false) => BacktraceFilter::Identity,
            (FilterPolicy::Quiet, false) => {
                BacktraceFilter::quiet_with(self.noise_patterns.clone())
            }
            (FilterPolicy::Quiet, true) => BacktraceFilter::Quiet(
                QuietFilter::new(self.noise_patterns.clone()).normalizing(),
            ),
            (FilterPolicy::Identity | FilterPolicy::Normalized, _) => {
                BacktraceFilter::Normalized
            }
        }
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidConfig(format!("{field} must be a non-negative integer")))
}

fn parse_flag(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidConfig(format!(
            "{field} must be true or false"
        ))),
    }
}

fn parse_filter_policy(value: &str) -> Result<FilterPolicy, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "identity" => Ok(FilterPolicy::Identity),
        "quiet" => Ok(FilterPolicy::Quiet),
        "normalized" => Ok(FilterPolicy::Normalized),
        other => Err(ConfigError::InvalidConfig(format!(
            "unknown backtrace_filter {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_filter::DEFAULT_NOISE_PATTERNS;
    use rstest::rstest;
    use std::io::Write;

    #[rstest]
    fn default_config_is_valid() {
        let config = NotifierConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.backtrace_filter, FilterPolicy::Identity);
        assert_eq!(config.noise_patterns.patterns().len(), DEFAULT_NOISE_PATTERNS.len());
    }

    #[rstest]
    fn ini_overrides_defaults() {
        let config = NotifierConfig::from_ini_str(
            "[notifier]\n\
             endpoint = https://errors.example.com/notices\n\
             max_attempts = 3\n\
             backoff_ms = 1500\n\
             backtrace_filter = Quiet\n\
             noise_patterns = com.acme.internal., ,org.junit.\n\
             notifier_name = acme-notifier\n",
        )
        .expect("parse");
        assert_eq!(config.delivery.endpoint, "https://errors.example.com/notices");
        assert_eq!(config.delivery.max_attempts, 3);
        assert_eq!(config.delivery.backoff, Duration::from_millis(1500));
        assert_eq!(config.delivery.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.identity.name, "acme-notifier");
        assert_eq!(
            config.noise_patterns.patterns(),
            ["com.acme.internal.".to_owned(), "org.junit.".to_owned()]
        );
        assert!(matches!(config.backtrace_filter(), BacktraceFilter::Quiet(_)));
    }

    #[rstest]
    fn missing_section_yields_defaults() {
        let config = NotifierConfig::from_ini_str("[other]\nkey = value\n").expect("parse");
        assert_eq!(config, NotifierConfig::default());
    }

    #[rstest]
    #[case("max_attempts = 0", "max_attempts must be greater than zero")]
    #[case("max_attempts = -1", "max_attempts must be a non-negative integer")]
    #[case("backoff_ms = soon", "backoff_ms must be a non-negative integer")]
    #[case("endpoint =  ", "endpoint must not be empty")]
    #[case("request_timeout_ms = 0", "request_timeout_ms must be greater than zero")]
    #[case("backtrace_filter = loud", "unknown backtrace_filter \"loud\"")]
    #[case("normalize = maybe", "normalize must be true or false")]
    fn invalid_values_are_rejected(#[case] line: &str, #[case] message: &str) {
        let err = NotifierConfig::from_ini_str(&format!("[notifier]\n{line}\n"))
            .expect_err("invalid");
        match err {
            ConfigError::InvalidConfig(msg) => assert_eq!(msg, message),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[rstest]
    fn quiet_with_normalize_builds_normalizing_quiet_filter() {
        let config = NotifierConfig::from_ini_str(
            "[notifier]\nbacktrace_filter = quiet\nnormalize = true\n",
        )
        .expect("parse");
        assert!(config.normalize);
        let filter = config.backtrace_filter();
        assert_eq!(
            filter,
            BacktraceFilter::Quiet(QuietFilter::default().normalizing())
        );
        assert_eq!(filter.policy(), FilterPolicy::Quiet);

        let frames = filter.filter(&[
            "ParentRunner.java:236:in `org.junit.runners.ParentRunner.run'",
            "App.java:9:in `com.acme.App.main'",
        ]);
        let methods: Vec<_> = frames.iter().map(|f| f.method()).collect();
        assert_eq!(methods, vec![Some("com.acme.App.main")]);
    }

    #[rstest]
    #[case(FilterPolicy::Identity, false, FilterPolicy::Identity)]
    #[case(FilterPolicy::Identity, true, FilterPolicy::Normalized)]
    #[case(FilterPolicy::Normalized, false, FilterPolicy::Normalized)]
    #[case(FilterPolicy::Quiet, true, FilterPolicy::Quiet)]
    fn normalize_flag_selects_filter(
        #[case] policy: FilterPolicy,
        #[case] normalize: bool,
        #[case] expected: FilterPolicy,
    ) {
        let config = NotifierConfig {
            backtrace_filter: policy,
            normalize,
            ..NotifierConfig::default()
        };
        assert_eq!(config.backtrace_filter().policy(), expected);
    }

    #[rstest]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "[notifier]\nbacktrace_filter = normalized").expect("write");
        let config = NotifierConfig::from_ini_file(file.path()).expect("load");
        assert_eq!(config.backtrace_filter, FilterPolicy::Normalized);
    }

    #[rstest]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = NotifierConfig::from_ini_file(dir.path().join("absent.ini")).expect_err("missing");
        assert!(matches!(err, ConfigError::IniFile(_)));
    }

    #[rstest]
    fn deserialises_from_json_with_millisecond_durations() {
        let config: NotifierConfig = serde_json::from_str(
            r#"{"endpoint": "http://localhost/notices", "backoff_ms": 250,
                "backtrace_filter": "quiet", "noise_patterns": ["x."]}"#,
        )
        .expect("deserialise");
        assert_eq!(config.delivery.endpoint, "http://localhost/notices");
        assert_eq!(config.delivery.backoff, Duration::from_millis(250));
        assert_eq!(config.delivery.max_attempts, 5);
        assert_eq!(config.noise_patterns.patterns(), ["x.".to_owned()]);
        assert_eq!(config.identity, NotifierIdentity::default());
    }
}
