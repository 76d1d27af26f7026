//! Parser for a single `at <method>(<file>:<line>)` backtrace line.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::StructuredFrame;

/// Canonical frame grammar.
///
/// The file group excludes characters that would need escaping inside an XML
/// attribute so structured frames can be emitted verbatim.
static FRAME_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*at\s+([A-Za-z0-9_$]+(?:\.[A-Za-z0-9_$]+)*)\(([^:()"<>&]+):([0-9]+)\)\s*$"#)
        .expect("FRAME_LINE regex pattern is valid")
});

static METHOD_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_$]+(?:\.[A-Za-z0-9_$]+)*$")
        .expect("METHOD_PATH regex pattern is valid")
});

static FILE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[^:()"<>&]+$"#).expect("FILE_NAME regex pattern is valid"));

/// Reasons a line could not be read as a structured frame.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MalformedFrame {
    /// The line does not follow `at <method>(<file>:<line>)`.
    #[error("line does not match the frame grammar")]
    NoMatch,
    /// The captured line number is not a valid `u32`.
    #[error("invalid line number {0:?}")]
    InvalidLineNumber(String),
    /// The method is not a dotted identifier path.
    #[error("invalid method {0:?}")]
    InvalidMethod(String),
    /// The file name contains characters outside the frame grammar.
    #[error("invalid file {0:?}")]
    InvalidFile(String),
}

/// Check `method` and `file` against the frame grammar.
pub(super) fn check_parts(method: &str, file: &str) -> Result<(), MalformedFrame> {
    if !METHOD_PATH.is_match(method) {
        return Err(MalformedFrame::InvalidMethod(method.to_owned()));
    }
    if !FILE_NAME.is_match(file) {
        return Err(MalformedFrame::InvalidFile(file.to_owned()));
    }
    Ok(())
}

/// Parse `line` as a structured frame.
///
/// # Errors
///
/// Returns [`MalformedFrame::NoMatch`] when the grammar does not match and
/// [`MalformedFrame::InvalidLineNumber`] when the digits overflow `u32`.
pub fn parse_structured(line: &str) -> Result<StructuredFrame, MalformedFrame> {
    let caps = FRAME_LINE.captures(line).ok_or(MalformedFrame::NoMatch)?;
    let number = &caps[3];
    let line_number = number
        .parse::<u32>()
        .map_err(|_| MalformedFrame::InvalidLineNumber(number.to_owned()))?;
    Ok(StructuredFrame {
        method: caps[1].to_owned(),
        file: caps[2].to_owned(),
        line: line_number,
    })
}
