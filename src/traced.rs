//! The `Traced` wrapper type.
//!
//! This module provides [`Traced`], an error paired with the trace of the first
//! place it was captured. It's the primary API surface for firsttrace.

use std::any::Any;
use std::error::Error;
use std::fmt;

use crate::cause::{Cause, Chain};
use crate::input::Input;
use crate::message::{Context, Message};
use crate::resolve::{MAX_CAUSE_DEPTH, capture, resolve, resolve_in_chain};
use crate::stack::StackTracer;
use crate::trace::Trace;

// ============================================================================
// Traced - Core wrapper type
// ============================================================================

/// An error carrying the stack trace of its original failure site.
///
/// ## Trace stability
///
/// The trace is fixed when a `Traced` is created and shared by every wrapper
/// built on top of it. Wrapping adds to the message, never to the trace:
///
/// ```rust
/// use firsttrace::{Trace, Traced};
///
/// let origin = Traced::new("record not found");
/// let first = origin.trace().clone();
///
/// let err = origin.wrap("loading user").wrap("handling request");
/// assert!(Trace::ptr_eq(err.trace(), &first));
/// assert_eq!(err.to_string(), "handling request: loading user: record not found");
/// ```
///
/// ## Construction
///
/// | Input | Trace |
/// |-------|-------|
/// | `Traced` | returned unchanged |
/// | message string | override, else fresh capture |
/// | [`StackTracer`] error | reused from its chain, else its own frames |
/// | any other error | reused from its chain, else override, else fresh capture |
pub struct Traced {
    cause: Source,
    trace: Trace,
}

/// The wrapped error, keeping stack-capable errors distinguishable.
enum Source {
    Error(Box<dyn Error + Send + Sync>),
    Stacked(Box<dyn StackTracer + Send + Sync>),
}

// ============================================================================
// Traced Implementation
// ============================================================================

impl Traced {
    /// Normalize `input` into a traced error.
    ///
    /// ```rust
    /// use firsttrace::Traced;
    ///
    /// let err = Traced::new("boom");
    /// assert!(!err.trace().is_empty());
    ///
    /// let io = std::io::Error::other("disk gone");
    /// let err = Traced::new(io);
    /// assert_eq!(err.to_string(), "disk gone");
    /// ```
    pub fn new(input: impl Into<Input>) -> Self {
        Self::with_trace(input, Trace::empty())
    }

    /// Normalize `input`, using `trace` instead of a fresh capture.
    ///
    /// An empty `trace` means no override. A trace found in the input's cause
    /// chain still wins over the override, and stack-capable inputs ignore it.
    pub fn with_trace(input: impl Into<Input>, trace: Trace) -> Self {
        match input.into().normalize() {
            Input::Traced(traced) => traced,
            Input::Message(msg) => Self {
                cause: Source::Error(Box::new(Message::new(msg))),
                trace: or_capture(trace),
            },
            Input::Stacked(stacked) => {
                let trace = resolve(Cause::Stacked(&*stacked));
                Self {
                    cause: Source::Stacked(stacked),
                    trace,
                }
            }
            Input::Error(err) => {
                let trace = resolve_in_chain(Cause::Plain(&*err)).unwrap_or_else(|| or_capture(trace));
                Self {
                    cause: Source::Error(err),
                    trace,
                }
            }
        }
    }

    /// Normalize a dynamically-typed value.
    ///
    /// Fails with [`Error::InvalidInput`](crate::Error::InvalidInput) when the
    /// value is not one of the kinds [`Input::from_any`] recognizes.
    pub fn from_any<T: Any + Send>(value: T) -> Result<Self, crate::Error> {
        Input::from_any(value).map(Self::new)
    }

    /// Add context, keeping the trace.
    ///
    /// The new error prints as `"{msg}: {self}"` and shares `self`'s trace.
    /// Use the [`wrap!`](crate::wrap!) macro for format arguments.
    pub fn wrap(self, msg: impl fmt::Display) -> Self {
        let trace = self.trace.clone();
        Self {
            cause: Source::Error(Box::new(Context::new(msg.to_string(), self))),
            trace,
        }
    }

    /// Add context to any input, then run it through construction.
    ///
    /// `Traced` inputs go through [`wrap`](Self::wrap). Everything else is
    /// wrapped in a [`Context`] first, so a trace deeper in its chain is still
    /// found and reused.
    pub(crate) fn wrap_input(input: Input, msg: impl fmt::Display) -> Self {
        let err: Box<dyn Error + Send + Sync> = match input.normalize() {
            Input::Traced(traced) => return traced.wrap(msg),
            Input::Message(text) => Box::new(Message::new(text)),
            Input::Stacked(stacked) => stacked,
            Input::Error(err) => err,
        };
        Self::new(Input::Error(Box::new(Context::new(msg.to_string(), err))))
    }

    /// The trace, shared with every error this one wraps or is wrapped by.
    #[inline]
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// The wrapped error.
    pub fn cause(&self) -> &(dyn Error + Send + Sync + 'static) {
        match &self.cause {
            Source::Error(err) => &**err,
            Source::Stacked(stacked) => &**stacked,
        }
    }

    /// The wrapped error as a chain link.
    pub(crate) fn cause_link(&self) -> Cause<'_> {
        match &self.cause {
            Source::Error(err) => Cause::of(&**err),
            Source::Stacked(stacked) => Cause::Stacked(&**stacked),
        }
    }

    /// Iterate over the cause chain, starting with `self`.
    pub fn chain(&self) -> Chain<'_> {
        Cause::Traced(self).iter()
    }

    /// The innermost error of the chain.
    ///
    /// ```rust
    /// use firsttrace::{Message, Traced};
    ///
    /// let err = Traced::new("no such table").wrap("migrating");
    /// let root = err.root_cause().downcast_ref::<Message>().unwrap();
    /// assert_eq!(root.as_str(), "no such table");
    /// ```
    pub fn root_cause(&self) -> &(dyn Error + 'static) {
        self.chain()
            .take(MAX_CAUSE_DEPTH)
            .last()
            .map_or(self as &(dyn Error + 'static), |link| link.as_error())
    }

    /// Format the message chain followed by the trace.
    pub fn report(&self) -> impl fmt::Display + '_ {
        TracedReport { traced: self }
    }
}

fn or_capture(trace: Trace) -> Trace {
    if trace.is_empty() { capture() } else { trace }
}

// ============================================================================
// Normalization helpers
// ============================================================================

/// Coerce an input into a [`Traced`].
///
/// A `Traced` comes back unchanged. Messages and errors go through
/// [`Traced::new`], so a trace already in an error's chain is reused. Any error
/// type reaches this through [`Input::error`]; values that are not errors go
/// through [`Input::value`]. This never fails.
///
/// ```rust
/// use firsttrace::{Input, traced};
///
/// let err = traced("lease lost");
/// assert_eq!(err.to_string(), "lease lost");
///
/// let err = traced(Input::value(42));
/// assert_eq!(err.to_string(), "error::i32 = 42");
/// assert!(!err.trace().is_empty());
/// ```
pub fn traced(value: impl Into<Input>) -> Traced {
    Traced::new(value)
}

/// Add context to an input and return it traced.
///
/// A `Traced` keeps its trace. An error or message is wrapped in a
/// [`Context`] first and then traced, reusing any trace in its chain.
///
/// ```rust
/// use firsttrace::{Context, Input, Trace, Traced, traced_wrap};
///
/// let origin = Traced::new("timeout");
/// let first = origin.trace().clone();
///
/// let layered = Context::new("reading lease", origin);
/// let err = traced_wrap(Input::error(layered), "polling");
/// assert_eq!(err.to_string(), "polling: reading lease: timeout");
/// assert!(Trace::ptr_eq(err.trace(), &first));
/// ```
pub fn traced_wrap(value: impl Into<Input>, msg: impl fmt::Display) -> Traced {
    Traced::wrap_input(value.into(), msg)
}

// ============================================================================
// Formatting
// ============================================================================

/// Formatter that shows the message chain and then the trace.
struct TracedReport<'a> {
    traced: &'a Traced,
}

impl fmt::Display for TracedReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.traced)?;
        if !self.traced.trace.is_empty() {
            write!(f, "\n{}", self.traced.trace)?;
        }
        Ok(())
    }
}

impl fmt::Display for Traced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.cause(), f)
    }
}

impl fmt::Debug for Traced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Error: {}", self)?;
        if !self.trace.is_empty() {
            writeln!(f)?;
            write!(f, "{}", self.trace)?;
        }
        Ok(())
    }
}

impl Error for Traced {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.cause())
    }
}

// ============================================================================
// From impls for Traced
// ============================================================================

impl From<&'static str> for Traced {
    #[inline]
    fn from(msg: &'static str) -> Self {
        Traced::new(msg)
    }
}

impl From<String> for Traced {
    #[inline]
    fn from(msg: String) -> Self {
        Traced::new(msg)
    }
}

impl From<std::io::Error> for Traced {
    #[inline]
    fn from(err: std::io::Error) -> Self {
        Traced::new(err)
    }
}

impl From<crate::stack::WithStack> for Traced {
    #[inline]
    fn from(err: crate::stack::WithStack) -> Self {
        Traced::new(err)
    }
}
