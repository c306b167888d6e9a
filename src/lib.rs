//! # firsttrace - errors that remember where they started
//!
//! Wrap an error as often as you like: the message grows, the stack trace stays
//! the one from the original failure site.
//!
//! ```text
//! handling request: loading user: record not found
//! stack backtrace:
//!    0: app::db::query_user
//!              at ./src/db.rs:142:9
//!    1: app::service::get_user
//!              at ./src/service.rs:31:5
//! ```
//!
//! ## Try It Now
//!
//! ```rust
//! use firsttrace::{Traced, ResultTraceExt, wrap};
//!
//! fn query(_id: u64) -> Result<String, Traced> {
//!     Err(Traced::new("record not found"))   // stack captured here, once
//! }
//!
//! fn load(id: u64) -> Result<String, Traced> {
//!     query(id).wrap("loading user")
//! }
//!
//! let err = load(7).map_err(|e| wrap!(e, "handling request {}", 7)).unwrap_err();
//! assert_eq!(err.to_string(), "handling request 7: loading user: record not found");
//! println!("{}", err.report());  // message chain, then the first trace
//! ```
//!
//! ## How a Trace Is Chosen
//!
//! Construction walks the cause chain ([`Error::source`](std::error::Error::source))
//! before it ever touches the stack:
//!
//! | Link found | Result |
//! |------------|--------|
//! | a [`Traced`] | its trace is shared, nothing is captured |
//! | a [`StackTracer`] (e.g. [`WithStack`]) | its frames are rendered into the trace |
//! | a plain error with a source | keep walking |
//! | a plain error without a source | stop |
//!
//! Only when the walk finds nothing is the current stack captured. Walks stop
//! after [`MAX_CAUSE_DEPTH`] links.
//!
//! ## Entry Points
//!
//! | Function | Use when |
//! |----------|----------|
//! | [`Traced::new`] | you have a message, an error, or a `Traced` |
//! | [`Traced::with_trace`] | you already hold trace bytes to attach |
//! | [`Traced::from_any`] | the value's type is only known at runtime; rejects unknown kinds |
//! | [`traced()`] | normalizing any [`Input`]; never fails |
//! | [`Input::error`] / [`Input::value`] | turning an arbitrary error, or a value that is not one, into an `Input` |
//! | [`Traced::wrap`] / [`wrap!`] | adding context to a `Traced` |
//! | [`traced_wrap()`] | adding context to any `Input` |
//!
//! ## Trace Format
//!
//! Every non-empty trace starts with [`TRACE_HEADER`]. Captured stacks keep the
//! `backtrace` crate's dump layout; structured [`Frame`]s are rendered into the
//! same layout, so consumers read both the same way.

#![deny(unsafe_code)]

mod cause;
mod error;
mod ext;
mod input;
mod message;
pub mod prelude;
mod resolve;
mod stack;
mod trace;
mod traced;

pub use cause::{Cause, Chain};
pub use error::Error;
pub use ext::{ErrorTraceExt, ResultStartTraceExt, ResultTraceExt};
pub use input::Input;
pub use message::{Context, Message, Opaque};
pub use resolve::{MAX_CAUSE_DEPTH, resolve, resolve_in_chain};
pub use stack::{StackTracer, WithStack};
pub use trace::{Frame, FrameVec, TRACE_HEADER, Trace};
pub use traced::{Traced, traced, traced_wrap};

/// Add context to a [`Traced`], formatting only when arguments are given.
///
/// With a single message the text is used as-is, braces included. With
/// arguments it is formatted like `format!`.
///
/// ```rust
/// use firsttrace::{Traced, wrap};
///
/// let err = wrap!(Traced::new("eof"), "reading {header}");
/// assert_eq!(err.to_string(), "reading {header}: eof");
///
/// let err = wrap!(err, "chunk {} of {}", 3, 8);
/// assert_eq!(err.to_string(), "chunk 3 of 8: reading {header}: eof");
/// ```
#[macro_export]
macro_rules! wrap {
    ($err:expr, $msg:expr $(,)?) => {
        $crate::Traced::wrap($err, $msg)
    };
    ($err:expr, $fmt:expr, $($arg:tt)+) => {
        $crate::Traced::wrap($err, ::std::format!($fmt, $($arg)+))
    };
}

#[cfg(test)]
mod tests;
