//! Tests for backtrace line parsing.

use super::*;
use proptest::prelude::*;
use rstest::rstest;

fn structured(method: &str, file: &str, line: u32) -> Frame {
    Frame::structured(method, file, line).expect("valid structured frame")
}

#[rstest]
fn parses_canonical_frame() {
    let frame = Frame::parse("at a.b.C.m(File.java:42)");
    assert_eq!(frame, structured("a.b.C.m", "File.java", 42));
}

#[rstest]
#[case("\tat org.junit.internal.runners.MethodRoadie.run(MethodRoadie.java:42)  ")]
#[case("    at org.junit.internal.runners.MethodRoadie.run(MethodRoadie.java:42)")]
fn tolerates_surrounding_whitespace(#[case] line: &str) {
    let frame = Frame::parse(line);
    assert_eq!(
        frame,
        structured("org.junit.internal.runners.MethodRoadie.run", "MethodRoadie.java", 42)
    );
}

#[rstest]
fn accepts_inner_class_and_lambda_segments() {
    let frame = Frame::parse("at com.acme.Outer$Inner.lambda$run$0(Outer.java:7)");
    assert_eq!(frame.method(), Some("com.acme.Outer$Inner.lambda$run$0"));
}

#[rstest]
#[case("Caused by: java.lang.NullPointerException")]
#[case("... 23 more")]
#[case("java.lang.RuntimeException: an expression is not valid")]
#[case("at java.lang.Thread.run(Thread.java)")]
#[case("at sun.reflect.NativeMethodAccessorImpl.invoke0(Native Method)")]
#[case("at a.b.C.<init>(C.java:3)")]
#[case("at a.b.C.m(\"quoted\".java:3)")]
#[case("")]
fn unrecognised_lines_stay_raw(#[case] line: &str) {
    let frame = Frame::parse(line);
    assert_eq!(frame.raw_text(), Some(line));
    assert!(!frame.is_structured());
}

#[rstest]
fn overflowing_line_number_degrades_to_raw() {
    let line = "at a.b.C.m(File.java:99999999999999999999)";
    assert_eq!(
        parse_structured(line),
        Err(MalformedFrame::InvalidLineNumber("99999999999999999999".into()))
    );
    assert_eq!(Frame::parse(line), Frame::raw(line));
}

#[rstest]
fn grammar_mismatch_is_reported() {
    assert_eq!(parse_structured("free text"), Err(MalformedFrame::NoMatch));
}

#[rstest]
fn line_zero_is_structured() {
    let frame = Frame::parse("at a.B.c(B.java:0)");
    assert_eq!(frame, structured("a.B.c", "B.java", 0));
}

#[rstest]
fn backtrace_from_lines_keeps_order() {
    let trace = Backtrace::from_lines(&["at a.B.c(B.java:1)", "... 1 more", "at d.E.f(E.java:2)"]);
    assert_eq!(trace.policy(), FilterPolicy::Identity);
    assert_eq!(trace.len(), 3);
    let methods: Vec<_> = trace.iter().map(Frame::method).collect();
    assert_eq!(methods, vec![Some("a.B.c"), None, Some("d.E.f")]);
}

#[rstest]
fn frame_serialises_with_kind_tag() {
    let json = serde_json::to_string(&Frame::raw("x")).expect("serialise");
    assert_eq!(json, r#"{"kind":"raw","text":"x"}"#);
}

proptest! {
    #[test]
    fn parse_never_panics_and_raw_keeps_text(line in ".*") {
        match Frame::parse(&line) {
            Frame::Raw { text } => prop_assert_eq!(text, line),
            Frame::Structured(frame) => prop_assert!(!frame.method().is_empty()),
        }
    }

    #[test]
    fn canonical_lines_round_trip_fields(
        method in "[a-z]{1,8}(\\.[A-Za-z]{1,8}){0,4}",
        file in "[A-Za-z]{1,10}\\.java",
        line in any::<u32>(),
    ) {
        let frame = Frame::parse(&format!("at {method}({file}:{line})"));
        prop_assert_eq!(frame, structured(&method, &file, line));
    }
}

#[rstest]
#[case("a.b.C<m>", "F.java", MalformedFrame::InvalidMethod("a.b.C<m>".into()))]
#[case("", "F.java", MalformedFrame::InvalidMethod(String::new()))]
#[case("a.B.c", "\"quoted\".java", MalformedFrame::InvalidFile("\"quoted\".java".into()))]
#[case("a.B.c", "A&B.java", MalformedFrame::InvalidFile("A&B.java".into()))]
fn structured_parts_outside_grammar_are_refused(
    #[case] method: &str,
    #[case] file: &str,
    #[case] expected: MalformedFrame,
) {
    assert_eq!(StructuredFrame::new(method, file, 1), Err(expected));
}

#[rstest]
fn structured_frame_exposes_parts() {
    let frame = StructuredFrame::new("a.B.c", "B.java", 7).expect("valid");
    assert_eq!((frame.method(), frame.file(), frame.line()), ("a.B.c", "B.java", 7));
}

#[rstest]
fn deserialising_checks_structured_parts() {
    let ok: Frame = serde_json::from_str(
        r#"{"kind":"structured","method":"a.B.c","file":"B.java","line":3}"#,
    )
    .expect("deserialise");
    assert_eq!(ok, structured("a.B.c", "B.java", 3));

    let bad = serde_json::from_str::<Frame>(
        r#"{"kind":"structured","method":"a.B.c","file":"<x>","line":3}"#,
    );
    assert!(bad.is_err());
}
