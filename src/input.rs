//! The input kinds accepted by construction.
//!
//! [`Input`] is the closed set of values [`Traced::new`](crate::Traced::new)
//! knows how to normalize. Static callers convert through `From`; dynamic
//! callers go through [`Input::from_any`], which rejects anything else with
//! [`Error::InvalidInput`].

use std::any::{Any, type_name};
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use crate::error::Error;
use crate::message::Opaque;
use crate::stack::{StackTracer, WithStack};
use crate::traced::Traced;

/// A value that construction can turn into a [`Traced`].
pub enum Input {
    /// Already traced. Construction returns it unchanged.
    Traced(Traced),
    /// A bare message. Becomes a [`Message`](crate::Message) base error.
    Message(Cow<'static, str>),
    /// An error exposing structured frames.
    Stacked(Box<dyn StackTracer + Send + Sync>),
    /// Any other error.
    Error(Box<dyn StdError + Send + Sync>),
}

impl Input {
    /// Classify a concrete error value.
    ///
    /// A `Traced` or `WithStack` passed here lands in its own variant.
    pub fn error<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::from_boxed(Box::new(err))
    }

    /// Wrap a custom stack-capable error.
    pub fn stacked<S: StackTracer + Send + Sync + 'static>(err: S) -> Self {
        Input::Stacked(Box::new(err))
    }

    /// Classify a boxed error, unboxing `Traced` and `WithStack`.
    pub fn from_boxed(err: Box<dyn StdError + Send + Sync>) -> Self {
        let err = match err.downcast::<Traced>() {
            Ok(traced) => return Input::Traced(*traced),
            Err(err) => err,
        };
        match err.downcast::<WithStack>() {
            Ok(stacked) => Input::Stacked(stacked),
            Err(err) => Input::Error(err),
        }
    }

    /// Describe a value that is not an error.
    ///
    /// Recognized kinds (the ones [`from_any`](Self::from_any) accepts) are
    /// classified as usual. Anything else becomes an [`Opaque`] error reading
    /// `error::{type} = {value:?}`. Error types belong in
    /// [`error`](Self::error), which keeps their cause chain.
    ///
    /// ```rust
    /// use firsttrace::{Input, Traced};
    ///
    /// let err = Traced::new(Input::value(3.5f64));
    /// assert_eq!(err.to_string(), "error::f64 = 3.5");
    /// ```
    pub fn value<T: Any + fmt::Debug + Send>(value: T) -> Self {
        match Self::classify(Box::new(value)) {
            Ok(input) => input,
            Err(rest) => Input::Error(Box::new(Opaque::describe::<T>(&*rest))),
        }
    }

    /// Convert a dynamically-typed value at a trust boundary.
    ///
    /// Recognized kinds are `Input` itself, `Traced`, `WithStack`, `String`,
    /// `&'static str`, `Cow<'static, str>`, `Box<dyn Error + Send + Sync>` and
    /// `std::io::Error`. Other error types are not visible through `Any`; box
    /// them or pass them as `Input::error(e)` first.
    ///
    /// ```rust
    /// use firsttrace::{Error, Input};
    ///
    /// assert!(Input::from_any("boom").is_ok());
    /// assert_eq!(
    ///     Input::from_any(true).err(),
    ///     Some(Error::InvalidInput { type_name: "bool" }),
    /// );
    /// ```
    pub fn from_any<T: Any + Send>(value: T) -> Result<Self, Error> {
        Self::classify(Box::new(value)).map_err(|_| Error::InvalidInput {
            type_name: type_name::<T>(),
        })
    }

    /// Match a boxed value against the recognized kinds, handing it back
    /// untouched if none fits.
    pub(crate) fn classify(value: Box<dyn Any + Send>) -> Result<Self, Box<dyn Any + Send>> {
        let value = match value.downcast::<Input>() {
            Ok(input) => return Ok(input.normalize()),
            Err(value) => value,
        };
        let value = match value.downcast::<Traced>() {
            Ok(traced) => return Ok(Input::Traced(*traced)),
            Err(value) => value,
        };
        let value = match value.downcast::<WithStack>() {
            Ok(stacked) => return Ok(Input::Stacked(stacked)),
            Err(value) => value,
        };
        let value = match value.downcast::<String>() {
            Ok(msg) => return Ok(Input::Message(Cow::Owned(*msg))),
            Err(value) => value,
        };
        let value = match value.downcast::<&'static str>() {
            Ok(msg) => return Ok(Input::Message(Cow::Borrowed(*msg))),
            Err(value) => value,
        };
        let value = match value.downcast::<Cow<'static, str>>() {
            Ok(msg) => return Ok(Input::Message(*msg)),
            Err(value) => value,
        };
        let value = match value.downcast::<Box<dyn StdError + Send + Sync>>() {
            Ok(err) => return Ok(Self::from_boxed(*err)),
            Err(value) => value,
        };
        match value.downcast::<std::io::Error>() {
            Ok(err) => Ok(Input::Error(err)),
            Err(value) => Err(value),
        }
    }

    /// Re-run classification on a directly built `Input::Error`.
    pub(crate) fn normalize(self) -> Self {
        match self {
            Input::Error(err) => Self::from_boxed(err),
            other => other,
        }
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Traced(t) => f.debug_tuple("Traced").field(&format_args!("{}", t)).finish(),
            Input::Message(m) => f.debug_tuple("Message").field(m).finish(),
            Input::Stacked(s) => f.debug_tuple("Stacked").field(&format_args!("{}", s)).finish(),
            Input::Error(e) => f.debug_tuple("Error").field(&format_args!("{}", e)).finish(),
        }
    }
}

impl From<Traced> for Input {
    fn from(traced: Traced) -> Self {
        Input::Traced(traced)
    }
}

impl From<WithStack> for Input {
    fn from(err: WithStack) -> Self {
        Input::Stacked(Box::new(err))
    }
}

impl From<&'static str> for Input {
    fn from(msg: &'static str) -> Self {
        Input::Message(Cow::Borrowed(msg))
    }
}

impl From<String> for Input {
    fn from(msg: String) -> Self {
        Input::Message(Cow::Owned(msg))
    }
}

impl From<Cow<'static, str>> for Input {
    fn from(msg: Cow<'static, str>) -> Self {
        Input::Message(msg)
    }
}

impl From<Box<dyn StdError + Send + Sync>> for Input {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        Self::from_boxed(err)
    }
}

impl From<std::io::Error> for Input {
    fn from(err: std::io::Error) -> Self {
        Input::Error(Box::new(err))
    }
}
