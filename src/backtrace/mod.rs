//! Backtrace model shared by the filters and the XML serializer.
//!
//! A backtrace is an ordered list of [`Frame`] values. Each frame is either
//! structured (method, file, line number) or raw text that did not match the
//! canonical `at <method>(<file>:<line>)` grammar. The [`FilterPolicy`] tag
//! records which filter variant produced the list.
//!
//! # Example
//!
//! ```rust
//! use hoptoad_rs::backtrace::Frame;
//!
//! let frame = Frame::parse("at a.b.C.m(File.java:42)");
//! assert_eq!(frame.method(), Some("a.b.C.m"));
//!
//! let raw = Frame::parse("... 23 more");
//! assert_eq!(raw.raw_text(), Some("... 23 more"));
//! ```

mod line;

#[cfg(test)]
mod tests;

pub use line::{MalformedFrame, parse_structured};

use line::check_parts;

use serde::{Deserialize, Serialize};

/// A stack frame that matched the canonical grammar.
///
/// Fields are only reachable through accessors so every value, including
/// deserialized ones, has a method and file that are safe to write into an
/// XML attribute.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "StructuredFrameParts")]
pub struct StructuredFrame {
    method: String,
    file: String,
    line: u32,
}

#[derive(Deserialize)]
struct StructuredFrameParts {
    method: String,
    file: String,
    line: u32,
}

impl TryFrom<StructuredFrameParts> for StructuredFrame {
    type Error = MalformedFrame;

    fn try_from(parts: StructuredFrameParts) -> Result<Self, Self::Error> {
        Self::new(parts.method, parts.file, parts.line)
    }
}

impl StructuredFrame {
    /// Construct a structured frame from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedFrame::InvalidMethod`] or
    /// [`MalformedFrame::InvalidFile`] when a part could not appear in a
    /// canonical `at <method>(<file>:<line>)` line.
    pub fn new(
        method: impl Into<String>,
        file: impl Into<String>,
        line: u32,
    ) -> Result<Self, MalformedFrame> {
        let method = method.into();
        let file = file.into();
        check_parts(&method, &file)?;
        Ok(Self { method, file, line })
    }

    /// Dotted method path, e.g. `a.b.C.m`.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Source file name as printed in the trace.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Line number within the file.
    pub fn line(&self) -> u32 {
        self.line
    }
}

/// One entry in a backtrace.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frame {
    /// Frame parsed into method, file and line number.
    Structured(StructuredFrame),
    /// Text kept verbatim because it did not match the frame grammar.
    Raw {
        /// Original line, unchanged.
        text: String,
    },
}

impl Frame {
    /// Parse a single backtrace line.
    ///
    /// Never fails: anything that does not match the canonical grammar is
    /// kept as a [`Frame::Raw`] carrying the input unchanged.
    pub fn parse(line: &str) -> Self {
        match parse_structured(line) {
            Ok(frame) => Self::Structured(frame),
            Err(err) => {
                log::trace!("keeping backtrace line as raw text ({err}): {line:?}");
                Self::raw(line)
            }
        }
    }

    /// Build a raw frame from text.
    pub fn raw(text: impl Into<String>) -> Self {
        Self::Raw { text: text.into() }
    }

    /// Build a structured frame from its parts.
    ///
    /// # Errors
    ///
    /// See [`StructuredFrame::new`].
    pub fn structured(
        method: impl Into<String>,
        file: impl Into<String>,
        line: u32,
    ) -> Result<Self, MalformedFrame> {
        StructuredFrame::new(method, file, line).map(Self::Structured)
    }

    /// Method path for structured frames.
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Structured(frame) => Some(frame.method()),
            Self::Raw { .. } => None,
        }
    }

    /// Original text for raw frames.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            Self::Structured(_) => None,
            Self::Raw { text } => Some(text),
        }
    }

    /// Returns `true` when the frame matched the canonical grammar.
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }
}

impl From<StructuredFrame> for Frame {
    fn from(frame: StructuredFrame) -> Self {
        Self::Structured(frame)
    }
}

/// Which filter variant produced a [`Backtrace`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPolicy {
    /// Every line parsed, nothing removed.
    #[default]
    Identity,
    /// Noise frames removed.
    Quiet,
    /// Lines rewritten from another stack convention before parsing.
    Normalized,
}

/// Ordered frames plus the policy that produced them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backtrace {
    frames: Vec<Frame>,
    policy: FilterPolicy,
}

impl Backtrace {
    /// Wrap already filtered frames.
    pub fn new(frames: Vec<Frame>, policy: FilterPolicy) -> Self {
        Self { frames, policy }
    }

    /// Parse `lines` without filtering.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        Self::new(
            lines.iter().map(|l| Frame::parse(l.as_ref())).collect(),
            FilterPolicy::Identity,
        )
    }

    /// Frames in order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The filter variant that built this backtrace.
    pub fn policy(&self) -> FilterPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Iterate over the frames.
    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }
}

impl<'a> IntoIterator for &'a Backtrace {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}
