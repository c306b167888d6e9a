//! Unit tests for firsttrace.
//!
//! These tests are in a separate file for organization but remain in the `src/`
//! directory to retain access to `pub(crate)` items like `TraceSource`.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use crate::input::Input;
use crate::message::{Context, Message, Opaque};
use crate::trace::{Frame, TraceSource, is_glue_symbol, is_internal_symbol};
use crate::{Cause, Error, MAX_CAUSE_DEPTH, TRACE_HEADER, Trace, Traced, WithStack};
use crate::{resolve, resolve_in_chain};

static_assertions::assert_impl_all!(Traced: Send, Sync);
static_assertions::assert_impl_all!(Trace: Send, Sync, Clone);
static_assertions::assert_impl_all!(WithStack: Send, Sync);
static_assertions::assert_impl_all!(Frame: Send, Sync);

/// An error whose source is itself.
#[derive(Debug)]
struct Loop;

impl fmt::Display for Loop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("loop")
    }
}

impl StdError for Loop {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self)
    }
}

/// Stack `layers` context nodes over `inner`.
fn layered(inner: Traced, layers: usize) -> Context {
    let mut err = Context::new("layer 0", inner);
    for i in 1..layers {
        err = Context::new(format!("layer {}", i), err);
    }
    err
}

// ============================================================================
// Trace normalization
// ============================================================================

#[test]
fn frames_render_in_backtrace_layout() {
    let frames = [
        Frame::new("app::db::query").at("src/db.rs", 3, Some(7)),
        Frame::new("main"),
    ];
    let trace = Trace::from_frames(&frames);
    assert_eq!(
        trace.as_str(),
        "stack backtrace:\n   0: app::db::query\n             at src/db.rs:3:7\n   1: main\n"
    );
}

#[test]
fn frame_without_symbol_or_column() {
    let frame = Frame::default().at("src/lib.rs", 9, None);
    assert_eq!(frame.to_string(), "<unknown>\n             at src/lib.rs:9");
}

#[test]
fn frame_from_location() {
    let loc = core::panic::Location::caller();
    let frame = Frame::from_location(loc);
    assert_eq!(frame.file(), Some(loc.file()));
    assert_eq!(frame.line(), Some(loc.line()));
    assert_eq!(frame.column(), Some(loc.column()));
    assert!(frame.symbol().is_none());
}

#[test]
fn raw_text_gets_header_once() {
    let trace = Trace::from_source(TraceSource::Raw(Cow::Borrowed("   0: main\n")));
    assert_eq!(trace.as_str(), "stack backtrace:\n   0: main\n");

    let again = Trace::from_raw(trace.as_str());
    assert_eq!(again, trace);
}

#[test]
fn empty_raw_stays_empty() {
    assert!(Trace::from_raw("").is_empty());
    assert!(Trace::empty().is_empty());
    assert_eq!(Trace::default().len(), 0);
}

#[test]
fn capture_is_nonempty_with_header() {
    let trace = Trace::capture();
    assert!(trace.as_str().starts_with(TRACE_HEADER));
    assert!(trace.len() > TRACE_HEADER.len());
}

#[test]
fn capture_starts_at_the_caller() {
    let err = Traced::new("x");
    let first = err.trace().as_str().lines().nth(1).unwrap_or_default();
    assert!(
        first.contains("capture_starts_at_the_caller"),
        "Frame 0 should be this test. Got:\n{}",
        err.trace()
    );
    assert!(!err.trace().as_str().contains("firsttrace::resolve::capture"));
}

#[test]
fn with_stack_frames_start_at_the_caller() {
    let err = WithStack::msg("x");
    let first = crate::StackTracer::stack_trace(&err)[0].symbol().unwrap_or_default();
    assert!(!is_internal_symbol(first), "Got: {}", first);
}

#[test]
fn internal_symbols_are_recognized() {
    assert!(is_internal_symbol("firsttrace::trace::Trace::capture"));
    assert!(is_internal_symbol("firsttrace::traced::Traced::new"));
    assert!(is_internal_symbol(
        "<firsttrace::traced::Traced as core::convert::From<&str>>::from"
    ));
    assert!(is_internal_symbol(
        "<app::Error as firsttrace::ext::ErrorTraceExt>::traced"
    ));
    assert!(!is_internal_symbol("firsttrace::tests::some_test"));
    assert!(!is_internal_symbol("app::db::query"));
}

#[test]
fn glue_symbols_are_recognized() {
    assert!(is_glue_symbol("core::option::Option<T>::unwrap_or_else"));
    assert!(is_glue_symbol("<T as core::convert::Into<U>>::into"));
    assert!(is_glue_symbol("backtrace::backtrace::trace"));
    assert!(!is_glue_symbol("app::main"));
}

#[test]
fn trace_clone_shares_allocation() {
    let a = Trace::from_raw("x");
    let b = a.clone();
    let c = Trace::from_raw("x");
    assert!(Trace::ptr_eq(&a, &b));
    assert!(!Trace::ptr_eq(&a, &c));
    assert_eq!(a, c);
}

// ============================================================================
// Input classification
// ============================================================================

#[test]
fn classify_recognized_kinds() {
    assert!(matches!(Input::classify(Box::new("a")), Ok(Input::Message(_))));
    assert!(matches!(
        Input::classify(Box::new(String::from("a"))),
        Ok(Input::Message(_))
    ));
    assert!(matches!(
        Input::classify(Box::new(Cow::<'static, str>::Borrowed("a"))),
        Ok(Input::Message(_))
    ));
    assert!(matches!(
        Input::classify(Box::new(Traced::new("a"))),
        Ok(Input::Traced(_))
    ));
    assert!(matches!(
        Input::classify(Box::new(WithStack::msg("a"))),
        Ok(Input::Stacked(_))
    ));
    assert!(matches!(
        Input::classify(Box::new(std::io::Error::other("a"))),
        Ok(Input::Error(_))
    ));
    let boxed: Box<dyn StdError + Send + Sync> = Box::new(Traced::new("a"));
    assert!(matches!(Input::classify(Box::new(boxed)), Ok(Input::Traced(_))));
}

#[test]
fn classify_accepts_input_itself() {
    let input = Input::Error(Box::new(Traced::new("a")));
    assert!(matches!(Input::classify(Box::new(input)), Ok(Input::Traced(_))));
}

#[test]
fn value_describes_only_unrecognized_kinds() {
    assert!(matches!(Input::value("a"), Input::Message(_)));
    match Input::value(7u8) {
        Input::Error(err) => {
            let opaque = err.downcast_ref::<Opaque>().expect("opaque description");
            assert_eq!(opaque.to_string(), "error::u8 = 7");
        }
        other => panic!("expected Error, got {:?}", other),
    }
}

#[test]
fn classify_hands_back_unknown_values() {
    let rest = Input::classify(Box::new(7u8)).unwrap_err();
    assert_eq!(rest.downcast_ref::<u8>(), Some(&7));
}

#[test]
fn from_any_rejects_bool() {
    let err = Input::from_any(true).unwrap_err();
    assert_eq!(err, Error::InvalidInput { type_name: "bool" });
    assert!(err.to_string().contains("`bool`"));
}

#[test]
fn normalize_unboxes_traced() {
    let inner = Traced::new("inner");
    let trace = inner.trace().clone();
    let input = Input::Error(Box::new(inner));
    match input.normalize() {
        Input::Traced(t) => assert!(Trace::ptr_eq(t.trace(), &trace)),
        other => panic!("expected Traced, got {:?}", other),
    }
}

#[test]
fn opaque_describes_value() {
    let opaque = Opaque::describe::<(u8, char)>(&(1u8, 'x'));
    assert_eq!(opaque.type_name(), "(u8, char)");
    assert_eq!(opaque.value(), "(1, 'x')");
    assert_eq!(opaque.to_string(), "error::(u8, char) = (1, 'x')");
}

// ============================================================================
// Chain view
// ============================================================================

#[test]
fn cause_of_classifies_known_types() {
    let traced = Traced::new("t");
    let stacked = WithStack::msg("s");
    let plain = Message::new("p");
    assert!(Cause::of(&traced).is_traced());
    assert!(Cause::of(&stacked).is_stacked());
    assert!(matches!(Cause::of(&plain), Cause::Plain(_)));
}

#[test]
fn cause_link_keeps_stacked_inputs() {
    let err = Traced::new(WithStack::msg("s"));
    assert!(err.cause_link().is_stacked());
    let err = Traced::new("m");
    assert!(matches!(err.cause_link(), Cause::Plain(_)));
}

#[test]
fn chain_lists_links_outermost_first() {
    let err = Traced::new("base").wrap("mid").wrap("top");
    let rendered: Vec<String> = err.chain().map(|c| c.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "top: mid: base",
            "top: mid: base",
            "mid: base",
            "mid: base",
            "base",
            "base",
        ]
    );
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn walk_reuses_trace_at_depth_limit() {
    let inner = Traced::new("bottom");
    let trace = inner.trace().clone();
    let chain = layered(inner, MAX_CAUSE_DEPTH);
    let found = resolve_in_chain(Cause::Plain(&chain)).expect("trace within limit");
    assert!(Trace::ptr_eq(&found, &trace));
}

#[test]
fn walk_gives_up_past_depth_limit() {
    let inner = Traced::new("bottom");
    let trace = inner.trace().clone();
    let chain = layered(inner, MAX_CAUSE_DEPTH + 1);
    assert!(resolve_in_chain(Cause::Plain(&chain)).is_none());

    let fresh = resolve(Cause::Plain(&chain));
    assert!(!fresh.is_empty());
    assert!(!Trace::ptr_eq(&fresh, &trace));
}

#[test]
fn cyclic_source_terminates() {
    assert!(resolve_in_chain(Cause::Plain(&Loop)).is_none());
    let err = Traced::new(Input::error(Loop));
    assert!(err.trace().as_str().starts_with(TRACE_HEADER));
}

#[test]
fn stacked_frames_convert_when_chain_is_empty() {
    let frames = vec![Frame::new("worker::run").at("src/worker.rs", 12, Some(4))];
    let err = WithStack::from_frames(Message::new("crashed"), frames.clone());
    let trace = resolve_in_chain(Cause::Stacked(&err)).expect("own frames");
    assert_eq!(trace, Trace::from_frames(&frames));
}

#[test]
fn stacked_without_frames_captures() {
    let err = WithStack::from_frames(Message::new("crashed"), Vec::new());
    assert!(resolve_in_chain(Cause::Stacked(&err)).is_none());
    let traced = Traced::new(err);
    assert!(traced.trace().len() > TRACE_HEADER.len());
}

#[test]
fn empty_stacked_link_is_walked_past() {
    let inner = Traced::new("bottom");
    let trace = inner.trace().clone();
    let chain = Context::new("outer", WithStack::from_frames(inner, Vec::new()));
    let found = resolve_in_chain(Cause::Plain(&chain)).expect("trace below empty link");
    assert!(Trace::ptr_eq(&found, &trace));
}

// ============================================================================
// Construction details
// ============================================================================

#[test]
fn message_override_is_used() {
    let given = Trace::from_raw("   0: somewhere\n");
    let err = Traced::with_trace("m", given.clone());
    assert!(Trace::ptr_eq(err.trace(), &given));
}

#[test]
fn empty_override_means_capture() {
    let err = Traced::with_trace("m", Trace::empty());
    assert!(!err.trace().is_empty());
}

#[test]
fn stacked_input_ignores_override() {
    let frames = vec![Frame::new("a")];
    let given = Trace::from_raw("   0: elsewhere\n");
    let err = Traced::with_trace(
        WithStack::from_frames(Message::new("x"), frames.clone()),
        given.clone(),
    );
    assert_eq!(err.trace(), &Trace::from_frames(&frames));
    assert!(!Trace::ptr_eq(err.trace(), &given));
}

#[test]
fn debug_shows_message_then_trace() {
    let err = Traced::with_trace("broken pipe", Trace::from_raw("   0: main\n"));
    assert_eq!(
        format!("{:?}", err),
        "Error: broken pipe\n\nstack backtrace:\n   0: main\n"
    );
    assert_eq!(
        err.report().to_string(),
        "broken pipe\nstack backtrace:\n   0: main\n"
    );
}
