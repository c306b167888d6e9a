//! Plain error nodes used to build message chains.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

/// A base error holding only a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message(Cow<'static, str>);

impl Message {
    /// Create a message error. Static strings are stored without copying.
    pub fn new(text: impl Into<Cow<'static, str>>) -> Self {
        Self(text.into())
    }

    /// The message text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for Message {}

/// A context message layered over another error.
///
/// Prints as `"{message}: {source}"`, so a chain of contexts reads outermost
/// first. The wrapped error stays reachable through [`Error::source`].
#[derive(Debug)]
pub struct Context {
    message: String,
    source: Box<dyn Error + Send + Sync>,
}

impl Context {
    /// Layer `message` over `source`.
    pub fn new(message: impl Into<String>, source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self {
            message: message.into(),
            source: source.into(),
        }
    }

    /// The context message alone.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.message, self.source)
    }
}

impl Error for Context {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.source)
    }
}

/// An error synthesized from a value that is not an error.
///
/// Prints as `error::{type} = {value:?}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opaque {
    type_name: &'static str,
    value: String,
}

impl Opaque {
    pub(crate) fn describe<T: fmt::Debug + 'static>(value: &dyn core::any::Any) -> Self {
        Self {
            type_name: core::any::type_name::<T>(),
            value: value
                .downcast_ref::<T>()
                .map(|v| format!("{:?}", v))
                .unwrap_or_default(),
        }
    }

    /// Name of the original value's type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Debug rendering of the original value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error::{} = {}", self.type_name, self.value)
    }
}

impl Error for Opaque {}
