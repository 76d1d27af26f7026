//! Rewrites traces captured in other stack conventions into canonical lines.
//!
//! Canonical lines look like `at method(file:line)`, outermost call first.
//! Two foreign conventions are recognised:
//!
//! - Ruby-style lines, `file:line:in `method'`.
//! - Python tracebacks, introduced by `Traceback (most recent call last):` and
//!   listing `File "f", line N, in m` entries outermost call first, each
//!   optionally followed by more deeply indented source excerpts.
//!
//! Only line syntax is rewritten; frame order is kept as received. Lines in
//! neither convention pass through unchanged, so normalizing an already
//! canonical sequence is a no-op.

use std::iter::Peekable;

use once_cell::sync::Lazy;
use regex::Regex;

static RUBY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^:\s][^:]*):([0-9]+):in `([^']+)'\s*$")
        .expect("RUBY_LINE regex pattern is valid")
});

static PYTHON_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*Traceback \(most recent call last\):\s*$")
        .expect("PYTHON_HEADER regex pattern is valid")
});

static PYTHON_FRAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*File "([^"]+)", line ([0-9]+), in (.+?)\s*$"#)
        .expect("PYTHON_FRAME regex pattern is valid")
});

fn canonical(method: &str, file: &str, line: &str) -> String {
    format!("at {method}({file}:{line})")
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn rewrite_ruby(line: &str) -> Option<String> {
    let caps = RUBY_LINE.captures(line)?;
    Some(canonical(&caps[3], &caps[1], &caps[2]))
}

/// Consume the frames following a Python traceback header.
///
/// Stops at the first line that is neither a frame nor an excerpt belonging
/// to the previous frame, leaving it for the caller.
fn rewrite_python_block<'a, I>(lines: &mut Peekable<I>) -> Vec<String>
where
    I: Iterator<Item = &'a str>,
{
    let mut frames = Vec::new();
    while let Some(line) = lines.peek().copied() {
        let Some(caps) = PYTHON_FRAME.captures(line) else {
            break;
        };
        frames.push(canonical(&caps[3], &caps[1], &caps[2]));
        let indent = indent_of(line);
        lines.next();
        while let Some(next) = lines.peek().copied() {
            if indent_of(next) <= indent || PYTHON_FRAME.is_match(next) {
                break;
            }
            lines.next();
        }
    }
    frames
}

/// Rewrite `lines` into canonical form, keeping their order.
pub fn normalize_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut iter = lines.iter().map(|l| l.as_ref()).peekable();
    while let Some(line) = iter.next() {
        if PYTHON_HEADER.is_match(line) {
            out.extend(rewrite_python_block(&mut iter));
            continue;
        }
        out.push(rewrite_ruby(line).unwrap_or_else(|| line.to_owned()));
    }
    out
}
