//! Extension traits for ergonomic tracing on errors and Results.
//!
//! This module provides extension traits that avoid verbose `map_err` boilerplate.
//!
//! - [`ErrorTraceExt`]: Call `.traced()` on any error to wrap it in [`Traced`]
//! - [`ResultTraceExt`]: Call `.wrap()` on `Result<T, Traced>` to add context
//! - [`ResultStartTraceExt`]: Call `.traced()` on `Result<T, E>` to begin tracing

use std::error::Error;
use std::fmt;

use crate::input::Input;
use crate::traced::Traced;

// ============================================================================
// ErrorTraceExt Trait - for calling .traced() directly on error values
// ============================================================================

/// Extension trait that allows calling `.traced()` on error types.
///
/// ```rust
/// use firsttrace::{ErrorTraceExt, Traced};
///
/// fn read() -> Result<(), Traced> {
///     Err(std::io::Error::other("permission denied").traced())
/// }
///
/// let err = read().unwrap_err();
/// assert_eq!(err.to_string(), "permission denied");
/// ```
pub trait ErrorTraceExt: Sized {
    /// Wrap this error in [`Traced`], reusing any trace in its chain.
    ///
    /// Calling this on a `Traced` returns it unchanged.
    fn traced(self) -> Traced;
}

impl<E: Error + Send + Sync + 'static> ErrorTraceExt for E {
    #[inline]
    fn traced(self) -> Traced {
        Traced::new(Input::error(self))
    }
}

// ============================================================================
// ResultTraceExt Trait - for adding context to Results with Traced errors
// ============================================================================

/// Extension trait for adding context to `Result<T, Traced>`.
///
/// ## Example
///
/// ```rust
/// use firsttrace::{ResultTraceExt, Traced};
///
/// fn inner() -> Result<(), Traced> {
///     Err(Traced::new("socket closed"))
/// }
///
/// fn outer(peer: &str) -> Result<(), Traced> {
///     inner().wrap("sending heartbeat")?;
///     inner().wrap_with(|| format!("notifying {}", peer))
/// }
///
/// let err = outer("10.0.0.7").unwrap_err();
/// assert_eq!(err.to_string(), "sending heartbeat: socket closed");
/// ```
pub trait ResultTraceExt<T> {
    /// Add context if this is `Err`. The trace is unchanged.
    fn wrap(self, msg: impl fmt::Display) -> Result<T, Traced>;

    /// Add lazily-computed context if this is `Err`.
    ///
    /// The closure only runs on the error path.
    fn wrap_with<M: fmt::Display>(self, f: impl FnOnce() -> M) -> Result<T, Traced>;
}

impl<T> ResultTraceExt<T> for Result<T, Traced> {
    #[inline]
    fn wrap(self, msg: impl fmt::Display) -> Result<T, Traced> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(e.wrap(msg)),
        }
    }

    #[inline]
    fn wrap_with<M: fmt::Display>(self, f: impl FnOnce() -> M) -> Result<T, Traced> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(e.wrap(f())),
        }
    }
}

// ============================================================================
// ResultStartTraceExt - for starting traces on untraced errors
// ============================================================================

/// Extension trait for converting untraced errors to traced errors.
///
/// Use `.traced()` on `Result<T, E>` to wrap the error in [`Traced`]. For
/// Results that already carry a `Traced`, use [`ResultTraceExt::wrap`].
///
/// ```rust
/// use firsttrace::{ResultStartTraceExt, Traced};
///
/// fn parse(s: &str) -> Result<u16, Traced> {
///     s.parse::<u16>().traced_wrap(format!("parsing port {:?}", s))
/// }
///
/// let err = parse("http").unwrap_err();
/// assert!(err.to_string().starts_with("parsing port \"http\": "));
/// ```
pub trait ResultStartTraceExt<T, E> {
    /// Wrap the error in [`Traced`] if this is `Err`.
    fn traced(self) -> Result<T, Traced>;

    /// Add context to the error, then trace it, if this is `Err`.
    fn traced_wrap(self, msg: impl fmt::Display) -> Result<T, Traced>;
}

impl<T, E: Error + Send + Sync + 'static> ResultStartTraceExt<T, E> for Result<T, E> {
    #[inline]
    fn traced(self) -> Result<T, Traced> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(e.traced()),
        }
    }

    #[inline]
    fn traced_wrap(self, msg: impl fmt::Display) -> Result<T, Traced> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(Traced::wrap_input(Input::error(e), msg)),
        }
    }
}
