//! Backtrace filters that turn raw trace lines into [`Frame`] sequences.
//!
//! Three variants are available through [`BacktraceFilter`]:
//!
//! - [`BacktraceFilter::Identity`] parses every line and keeps all frames.
//! - [`BacktraceFilter::Quiet`] drops test-runner and reflection frames as well
//!   as `... N more` elision markers.
//! - [`BacktraceFilter::Normalized`] rewrites Ruby-style lines and Python
//!   tracebacks into the canonical `at method(file:line)` form first.
//!
//! The variant is chosen when a notice is built; the resulting
//! [`Backtrace`] records which one was used.
//!
//! # Example
//!
//! ```rust
//! use hoptoad_rs::frame_filter::BacktraceFilter;
//!
//! let lines = [
//!     "at com.acme.App.run(App.java:10)",
//!     "at org.junit.runners.ParentRunner.run(ParentRunner.java:236)",
//!     "... 12 more",
//! ];
//!
//! let frames = BacktraceFilter::quiet().filter(&lines);
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].method(), Some("com.acme.App.run"));
//! ```

mod normalize;


pub use normalize::normalize_lines;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::backtrace::{Backtrace, FilterPolicy, Frame};

/// Method prefixes treated as noise by the default quiet filter.
///
/// These cover JUnit, Surefire and Eclipse test runners plus the JDK
/// reflection machinery they call through.
pub const DEFAULT_NOISE_PATTERNS: &[&str] = &[
    "org.junit.",
    "junit.framework.",
    "org.apache.maven.surefire.",
    "org.eclipse.jdt.internal.junit",
    "sun.reflect.",
    "java.lang.reflect.",
    "jdk.internal.reflect.",
];

static ELISION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\.\.\. \d+ more\s*$").expect("ELISION_MARKER regex pattern is valid")
});

/// Keep only the frames for which `predicate` returns `true`.
pub fn filter_frames<F>(frames: Vec<Frame>, predicate: F) -> Vec<Frame>
where
    F: Fn(&Frame) -> bool,
{
    frames.into_iter().filter(|f| predicate(f)).collect()
}

/// Returns `true` for `... N more` lines emitted by chained traces.
pub fn is_elision_marker(text: &str) -> bool {
    ELISION_MARKER.is_match(text)
}

fn matches_any_pattern(text: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|p| text.contains(p.as_str()))
}

/// Deny-list used by the quiet filter.
///
/// Patterns are matched as substrings of a structured frame's method or of a
/// raw frame's text. The list is fixed once constructed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoisePatterns {
    patterns: Vec<String>,
}

impl NoisePatterns {
    /// Build a deny-list from arbitrary patterns. Empty patterns are ignored.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    /// The configured patterns.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns `true` when `frame` should be dropped.
    pub fn is_noise(&self, frame: &Frame) -> bool {
        match frame {
            Frame::Structured(f) => matches_any_pattern(f.method(), &self.patterns),
            Frame::Raw { text } => {
                is_elision_marker(text) || matches_any_pattern(text, &self.patterns)
            }
        }
    }
}

impl Default for NoisePatterns {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_PATTERNS.iter().copied())
    }
}

/// Settings for the quiet variant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuietFilter {
    noise: NoisePatterns,
    normalize: bool,
}

impl QuietFilter {
    /// Quiet filter with a custom deny-list.
    pub fn new(noise: NoisePatterns) -> Self {
        Self {
            noise,
            normalize: false,
        }
    }

    /// Rewrite alternate stack conventions before dropping noise.
    pub fn normalizing(mut self) -> Self {
        self.normalize = true;
        self
    }

    /// The deny-list in use.
    pub fn noise(&self) -> &NoisePatterns {
        &self.noise
    }

    fn filter<S: AsRef<str>>(&self, lines: &[S]) -> Vec<Frame> {
        let frames = if self.normalize {
            parse_all(&normalize_lines(lines))
        } else {
            parse_all(lines)
        };
        filter_frames(frames, |f| !self.noise.is_noise(f))
    }
}

/// Strategy applied to raw trace lines when a notice is built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BacktraceFilter {
    /// Parse every line and keep everything.
    #[default]
    Identity,
    /// Drop noise frames.
    Quiet(QuietFilter),
    /// Rewrite alternate conventions into canonical form, then parse.
    Normalized,
}

impl BacktraceFilter {
    /// Quiet filter with [`DEFAULT_NOISE_PATTERNS`].
    pub fn quiet() -> Self {
        Self::Quiet(QuietFilter::default())
    }

    /// Quiet filter with a custom deny-list.
    pub fn quiet_with(noise: NoisePatterns) -> Self {
        Self::Quiet(QuietFilter::new(noise))
    }

    /// The policy tag recorded on backtraces built by this filter.
    pub fn policy(&self) -> FilterPolicy {
        match self {
            Self::Identity => FilterPolicy::Identity,
            Self::Quiet(_) => FilterPolicy::Quiet,
            Self::Normalized => FilterPolicy::Normalized,
        }
    }

    /// Turn raw lines into frames according to the variant.
    pub fn filter<S: AsRef<str>>(&self, lines: &[S]) -> Vec<Frame> {
        match self {
            Self::Identity => parse_all(lines),
            Self::Quiet(quiet) => quiet.filter(lines),
            Self::Normalized => parse_all(&normalize_lines(lines)),
        }
    }

    /// Filter `lines` and tag the result with [`Self::policy`].
    pub fn backtrace<S: AsRef<str>>(&self, lines: &[S]) -> Backtrace {
        Backtrace::new(self.filter(lines), self.policy())
    }
}

fn parse_all<S: AsRef<str>>(lines: &[S]) -> Vec<Frame> {
    lines.iter().map(|l| Frame::parse(l.as_ref())).collect()
}
