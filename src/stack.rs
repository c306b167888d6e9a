//! Errors that carry structured stack frames.
//!
//! [`StackTracer`] is the capability; [`WithStack`] is the built-in error that
//! has it, capturing frames through the `backtrace` crate when created.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use crate::cause::Cause;
use crate::message::Message;
use crate::trace::{Frame, FrameVec, frames_from_backtrace};

/// An error that exposes a structured stack trace.
///
/// Implement this for error types that record their own frames. When such an
/// error is handed to [`Traced::new`](crate::Traced::new), its frames become the
/// trace, unless something deeper in its chain already carries one.
///
/// ```rust
/// use firsttrace::{Frame, StackTracer, Traced};
/// use std::fmt;
///
/// #[derive(Debug)]
/// struct Parse { frames: Vec<Frame> }
///
/// impl fmt::Display for Parse {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("parse failed") }
/// }
/// impl std::error::Error for Parse {}
///
/// impl StackTracer for Parse {
///     fn stack_trace(&self) -> &[Frame] { &self.frames }
/// }
///
/// let err = Traced::new(firsttrace::Input::stacked(Parse {
///     frames: vec![Frame::new("parser::expr").at("src/parser.rs", 10, None)],
/// }));
/// assert!(err.trace().as_str().contains("parser::expr"));
/// ```
pub trait StackTracer: Error {
    /// Frames recorded by this error, innermost call first.
    fn stack_trace(&self) -> &[Frame];

    /// The next link of the chain below this error.
    ///
    /// Defaults to classifying [`Error::source`]. Override it to hand out a
    /// nested custom `StackTracer` as [`Cause::Stacked`].
    fn next_cause(&self) -> Option<Cause<'_>> {
        self.source().map(Cause::of)
    }
}

// ============================================================================
// WithStack - built-in stack-capable error
// ============================================================================

/// An error annotated with the frames of the stack that created it.
///
/// This is the structured counterpart to [`Traced`](crate::Traced): it records
/// frames but not a normalized trace. Wrapping it in `Traced` converts the
/// frames, so the trace points at where the `WithStack` was made.
///
/// ```rust
/// use firsttrace::{StackTracer, WithStack};
///
/// let err = WithStack::msg("connection reset");
/// assert_eq!(err.to_string(), "connection reset");
/// assert!(!err.stack_trace().is_empty());
/// ```
pub struct WithStack {
    error: Box<dyn Error + Send + Sync>,
    frames: FrameVec,
}

impl WithStack {
    /// Wrap an error and capture the current stack as frames.
    #[inline(never)]
    pub fn new(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        let bt = backtrace::Backtrace::new();
        Self {
            error: error.into(),
            frames: frames_from_backtrace(&bt),
        }
    }

    /// Create a message error and capture the current stack as frames.
    #[inline(never)]
    pub fn msg(text: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Message::new(text))
    }

    /// Wrap an error with frames recorded elsewhere.
    pub fn from_frames(
        error: impl Into<Box<dyn Error + Send + Sync>>,
        frames: impl IntoIterator<Item = Frame>,
    ) -> Self {
        Self {
            error: error.into(),
            frames: frames.into_iter().collect(),
        }
    }

    /// The wrapped error.
    pub fn get_ref(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.error
    }

    /// Consume self and return the wrapped error, discarding the frames.
    pub fn into_inner(self) -> Box<dyn Error + Send + Sync> {
        self.error
    }
}

impl StackTracer for WithStack {
    fn stack_trace(&self) -> &[Frame] {
        &self.frames
    }
}

impl fmt::Display for WithStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl fmt::Debug for WithStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WithStack")
            .field("error", &self.error)
            .field("frames", &self.frames.len())
            .finish()
    }
}

impl Error for WithStack {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.error)
    }
}
